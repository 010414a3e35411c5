use crate::config::load_config;
use crate::export::{OutputMode, export};
use crate::ir::{DomainSet, Item};
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::records::{parse_records, parse_records_for};
use crate::render::write_output;
use crate::text_metrics::Metrics;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "rmr", version, about = "Risk-of-bias matrix renderer")]
pub struct Args {
    /// Records file (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, layout, risk levels)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Domain preset: `rob2` or a count for D1..Dn. Overrides the records file.
    #[arg(long = "domains")]
    pub domains: Option<String>,

    /// Write the computed layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
    Summary,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Svg => OutputMode::Svg,
            OutputFormat::Png => OutputMode::Png,
            OutputFormat::Pdf => OutputMode::MatrixPdf,
            OutputFormat::Summary => OutputMode::SummaryPdf,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let (items, domains) =
        resolve_records(&input, args.domains.as_deref(), config.domains.clone())?;

    if items.is_empty() {
        eprintln!("warning: no items found in input; rendering an empty matrix");
    }

    if let Some(path) = args.dump_layout.as_deref() {
        let metrics = Metrics::resolve(&config.theme.font_family, config.layout.fast_text_metrics);
        let layout = compute_layout(
            &items,
            &domains,
            &config.styles,
            &config.theme,
            &config.layout,
            &metrics,
        );
        write_layout_dump(path, &layout, &items, &domains)?;
    }

    let mode = OutputMode::from(args.output_format);
    let output_path = match mode {
        OutputMode::Svg => args.output.clone(),
        _ => Some(ensure_output(&args.output, mode.extension())?),
    };

    let output = export(&items, &domains, &config, mode)?;
    for diagnostic in &output.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    write_output(&output.bytes, output_path.as_deref())?;
    Ok(())
}

/// Domain precedence: `--domains`, then the records file, then the config file,
/// then `rob2`. List-shaped values are matched against the winning set.
fn resolve_records(
    input: &str,
    preset: Option<&str>,
    config_domains: Option<DomainSet>,
) -> Result<(Vec<Item>, DomainSet)> {
    if let Some(preset) = preset {
        let domains = parse_domain_preset(preset)?;
        let records = parse_records_for(input, &domains)?;
        return Ok((records.items, domains));
    }
    let fallback = config_domains.unwrap_or_else(DomainSet::rob2);
    let records = parse_records(input, &fallback)?;
    Ok((records.items, records.domains.unwrap_or(fallback)))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn parse_domain_preset(preset: &str) -> Result<DomainSet> {
    match preset.trim() {
        "rob2" => Ok(DomainSet::rob2()),
        count => match count.parse::<usize>() {
            Ok(n) if n > 0 => Ok(DomainSet::numbered(n)),
            _ => Err(anyhow::anyhow!(
                "unknown domain preset `{preset}` (expected `rob2` or a positive count)"
            )),
        },
    }
}
