use crate::config::Config;
use crate::diagnostic::{Diagnostic, report};
use crate::ir::{DomainSet, Item};
use crate::render::render_svg;
use crate::summary::build_summary;
use crate::text_metrics::{Metrics, TextMeasurer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("computed canvas {width}x{height} has no drawable area")]
    InvalidCanvas { width: f32, height: f32 },
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
    #[error("failed to write PDF: {0}")]
    PdfWrite(String),
    #[error("{0} output is not enabled in this build")]
    Disabled(&'static str),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// The deliverable a caller asks for. Never inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    Svg,
    Png,
    /// The matrix canvas as a single PDF page.
    MatrixPdf,
    /// Flowed, text-searchable summary restating the matrix.
    SummaryPdf,
}

impl OutputMode {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputMode::Svg => "image/svg+xml",
            OutputMode::Png => "image/png",
            OutputMode::MatrixPdf | OutputMode::SummaryPdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputMode::Svg => "svg",
            OutputMode::Png => "png",
            OutputMode::MatrixPdf | OutputMode::SummaryPdf => "pdf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub diagnostics: Vec<Diagnostic>,
}

/// Renders `items` in `mode`, resolving text metrics from the theme font.
pub fn export(
    items: &[Item],
    domains: &DomainSet,
    config: &Config,
    mode: OutputMode,
) -> Result<RenderOutput> {
    if mode == OutputMode::SummaryPdf {
        return export_summary(items, domains, config);
    }
    let metrics = Metrics::resolve(&config.theme.font_family, config.layout.fast_text_metrics);
    let mut diagnostics = Vec::new();
    if metrics.is_fallback() && !config.layout.fast_text_metrics {
        report(
            &mut diagnostics,
            Diagnostic::FallbackFontMetrics {
                family: config.theme.font_family.clone(),
            },
        );
    }
    let mut output = export_with_measurer(items, domains, config, mode, &metrics)?;
    diagnostics.append(&mut output.diagnostics);
    output.diagnostics = diagnostics;
    Ok(output)
}

/// Like [`export`], with the caller's own text measurer for the canvas modes.
pub fn export_with_measurer(
    items: &[Item],
    domains: &DomainSet,
    config: &Config,
    mode: OutputMode,
    measurer: &dyn TextMeasurer,
) -> Result<RenderOutput> {
    let encode: fn(&str, &Config) -> Result<Vec<u8>> = match mode {
        OutputMode::SummaryPdf => return export_summary(items, domains, config),
        OutputMode::Svg => svg_bytes,
        OutputMode::Png => svg_to_png,
        OutputMode::MatrixPdf => svg_to_pdf,
    };
    let rendered = render_svg(items, domains, config, measurer);
    ensure_canvas(rendered.layout.width, rendered.layout.height)?;
    Ok(RenderOutput {
        bytes: encode(&rendered.svg, config)?,
        mime_type: mode.mime_type(),
        diagnostics: rendered.diagnostics,
    })
}

fn export_summary(items: &[Item], domains: &DomainSet, config: &Config) -> Result<RenderOutput> {
    let mut diagnostics = Vec::new();
    let document = build_summary(items, domains, config, &mut diagnostics);
    Ok(RenderOutput {
        bytes: encode_summary(&document)?,
        mime_type: OutputMode::SummaryPdf.mime_type(),
        diagnostics,
    })
}

fn svg_bytes(svg: &str, _config: &Config) -> Result<Vec<u8>> {
    Ok(svg.as_bytes().to_vec())
}

/// Rejects canvases an encoder cannot represent.
pub fn ensure_canvas(width: f32, height: f32) -> Result<()> {
    if width.is_finite() && height.is_finite() && width >= 1.0 && height >= 1.0 {
        Ok(())
    } else {
        Err(ExportError::InvalidCanvas { width, height })
    }
}

#[cfg(feature = "pdf")]
fn encode_summary(document: &crate::summary::SummaryDocument) -> Result<Vec<u8>> {
    crate::summary::encode_summary_pdf(document)
}

#[cfg(not(feature = "pdf"))]
fn encode_summary(_document: &crate::summary::SummaryDocument) -> Result<Vec<u8>> {
    Err(ExportError::Disabled("PDF"))
}

#[cfg(feature = "png")]
pub fn svg_to_png(svg: &str, config: &Config) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = primary_family(&config.theme.font_family);

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| ExportError::SvgParse)?;
    let scale = config.render.scale.max(0.01);
    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap =
        resvg::tiny_skia::Pixmap::new(width_px, height_px).ok_or(ExportError::PixmapAlloc)?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap.encode_png().map_err(|_| ExportError::PngEncode)
}

#[cfg(not(feature = "png"))]
pub fn svg_to_png(_svg: &str, _config: &Config) -> Result<Vec<u8>> {
    Err(ExportError::Disabled("PNG"))
}

#[cfg(feature = "pdf")]
pub fn svg_to_pdf(svg: &str, config: &Config) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = primary_family(&config.theme.font_family);

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| ExportError::SvgParse)?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| ExportError::PdfConvert)
}

#[cfg(not(feature = "pdf"))]
pub fn svg_to_pdf(_svg: &str, _config: &Config) -> Result<Vec<u8>> {
    Err(ExportError::Disabled("PDF"))
}

#[cfg_attr(not(any(feature = "png", feature = "pdf")), allow(dead_code))]
fn primary_family(font_family: &str) -> String {
    font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\''))
        .find(|part| !part.is_empty())
        .unwrap_or("sans-serif")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.layout.fast_text_metrics = true;
        config
    }

    #[test]
    fn mime_types_match_modes() {
        assert_eq!(OutputMode::Svg.mime_type(), "image/svg+xml");
        assert_eq!(OutputMode::Png.mime_type(), "image/png");
        assert_eq!(OutputMode::MatrixPdf.mime_type(), "application/pdf");
        assert_eq!(OutputMode::SummaryPdf.mime_type(), "application/pdf");
    }

    #[test]
    fn degenerate_canvas_is_an_error() {
        assert!(ensure_canvas(820.0, 240.0).is_ok());
        assert!(matches!(
            ensure_canvas(0.0, 240.0),
            Err(ExportError::InvalidCanvas { .. })
        ));
        assert!(matches!(
            ensure_canvas(820.0, f32::NAN),
            Err(ExportError::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn negative_geometry_fails_before_encoding() {
        let mut config = config();
        config.layout.column_width = -400.0;
        config.layout.right_padding = -5000.0;
        let err = export(
            &[Item::new("Trial")],
            &DomainSet::rob2(),
            &config,
            OutputMode::Svg,
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::InvalidCanvas { .. }));
    }

    #[test]
    fn svg_mode_returns_markup() {
        let output = export(&[], &DomainSet::rob2(), &config(), OutputMode::Svg).unwrap();
        assert_eq!(output.mime_type, "image/svg+xml");
        let text = String::from_utf8(output.bytes).unwrap();
        assert!(text.contains("Legend:"));
        assert!(text.contains("D5"));
    }

    #[test]
    fn primary_family_takes_first_entry() {
        assert_eq!(primary_family("\"Trebuchet MS\", Arial"), "Trebuchet MS");
        assert_eq!(primary_family(""), "sans-serif");
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_mode_produces_png_signature() {
        let output = export(&[Item::new("Trial")], &DomainSet::rob2(), &config(), OutputMode::Png)
            .unwrap();
        assert!(output.bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_modes_produce_pdf_signature() {
        for mode in [OutputMode::MatrixPdf, OutputMode::SummaryPdf] {
            let output =
                export(&[Item::new("Trial")], &DomainSet::rob2(), &config(), mode).unwrap();
            assert!(output.bytes.starts_with(b"%PDF-"), "{mode:?}");
        }
    }

    #[test]
    fn missing_font_falls_back_with_a_diagnostic() {
        let mut config = Config::default();
        config.layout.fast_text_metrics = false;
        config.theme.font_family = "Definitely Not A Font".to_string();

        let output = export(
            &[Item::new("Trial")],
            &DomainSet::rob2(),
            &config,
            OutputMode::Svg,
        )
        .unwrap();
        assert!(output.bytes.starts_with(b"<svg"));
        assert_eq!(
            output.diagnostics.first(),
            Some(&Diagnostic::FallbackFontMetrics {
                family: "Definitely Not A Font".to_string(),
            })
        );
    }
}
