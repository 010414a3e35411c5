use crate::config::{Config, MarkerShape};
use crate::diagnostic::Diagnostic;
use crate::ir::{DomainSet, Item};
use crate::layout::{MatrixLayout, compute_layout};
use crate::style::resolve_row;
use crate::text_metrics::{FontSpec, TextMeasurer};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectCommand {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleCommand {
    pub cx: f32,
    pub cy: f32,
    pub r: f32,
    pub fill: String,
    pub stroke: Option<String>,
    pub stroke_width: f32,
}

/// A single line of text; `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font: FontSpec,
    pub fill: String,
    pub anchor: TextAnchor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Canvas {
        width: f32,
        height: f32,
        background: String,
    },
    Rect(RectCommand),
    Circle(CircleCommand),
    Text(TextRun),
}

/// Anything the matrix can be painted onto.
pub trait Surface {
    fn begin(&mut self, width: f32, height: f32, background: &str);
    fn rect(&mut self, rect: &RectCommand);
    fn circle(&mut self, circle: &CircleCommand);
    fn text(&mut self, run: &TextRun);
}

/// Keeps the commands instead of drawing them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
}

impl Surface for CommandRecorder {
    fn begin(&mut self, width: f32, height: f32, background: &str) {
        self.commands.push(DrawCommand::Canvas {
            width,
            height,
            background: background.to_string(),
        });
    }

    fn rect(&mut self, rect: &RectCommand) {
        self.commands.push(DrawCommand::Rect(rect.clone()));
    }

    fn circle(&mut self, circle: &CircleCommand) {
        self.commands.push(DrawCommand::Circle(circle.clone()));
    }

    fn text(&mut self, run: &TextRun) {
        self.commands.push(DrawCommand::Text(run.clone()));
    }
}

/// Writes the commands as an SVG document.
#[derive(Debug, Default)]
pub struct SvgSurface {
    svg: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(mut self) -> String {
        self.svg.push_str("</svg>");
        self.svg
    }
}

impl Surface for SvgSurface {
    fn begin(&mut self, width: f32, height: f32, background: &str) {
        self.svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
        ));
        self.svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(background)
        ));
    }

    fn rect(&mut self, rect: &RectCommand) {
        self.svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"{}/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            rect.fill.as_deref().map(escape_xml).unwrap_or_else(|| "none".to_string()),
            stroke_attrs(rect.stroke.as_deref(), rect.stroke_width)
        ));
    }

    fn circle(&mut self, circle: &CircleCommand) {
        self.svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"{}/>",
            circle.cx,
            circle.cy,
            circle.r,
            escape_xml(&circle.fill),
            stroke_attrs(circle.stroke.as_deref(), circle.stroke_width)
        ));
    }

    fn text(&mut self, run: &TextRun) {
        let anchor = match run.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
        };
        let weight = if run.font.bold { " font-weight=\"bold\"" } else { "" };
        self.svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{}\"{weight} fill=\"{}\">{}</text>",
            run.x,
            run.y,
            escape_xml(&run.font.family),
            run.font.size,
            escape_xml(&run.fill),
            escape_xml(&run.text)
        ));
    }
}

fn stroke_attrs(stroke: Option<&str>, width: f32) -> String {
    match stroke {
        Some(color) => format!(" stroke=\"{}\" stroke-width=\"{width}\"", escape_xml(color)),
        None => String::new(),
    }
}

/// Paints `layout` onto `surface`: header, one row per item, legend.
/// Cells follow `domains` order. Returns the fallbacks taken along the way.
pub fn render_matrix(
    layout: &MatrixLayout,
    items: &[Item],
    domains: &DomainSet,
    config: &Config,
    measurer: &dyn TextMeasurer,
    surface: &mut dyn Surface,
) -> Vec<Diagnostic> {
    let theme = &config.theme;
    let styles = &config.styles;
    let mut diagnostics = Vec::new();
    surface.begin(layout.width, layout.height, &config.render.background);

    for cell in &layout.header {
        surface.rect(&bordered(
            cell.x,
            layout.header_y,
            layout.column_width,
            layout.header_height,
            &theme.header_fill,
            theme,
        ));
        let lines = cell.label.lines.len() as f32;
        let top = layout.header_y + (layout.header_height - lines * layout.line_height) / 2.0;
        draw_lines(
            surface,
            &cell.label.lines,
            cell.x + layout.text_inset,
            top,
            &layout.header_font,
            layout.line_height,
            theme,
            measurer,
        );
    }

    let name_x = layout.column_xs.first().copied().unwrap_or(0.0);
    for (idx, (item, row)) in items.iter().zip(&layout.rows).enumerate() {
        surface.rect(&bordered(
            name_x,
            row.y,
            layout.column_width,
            row.height,
            &theme.name_fill,
            theme,
        ));
        draw_lines(
            surface,
            &row.name.lines,
            name_x + layout.text_inset,
            row.y + config.layout.row_padding / 2.0,
            &layout.body_font,
            layout.line_height,
            theme,
            measurer,
        );

        let cells = resolve_row(
            idx,
            item,
            domains,
            styles,
            config.annotation_shape,
            &mut diagnostics,
        );
        for (x, lookup) in layout.column_xs.iter().skip(1).zip(cells) {
            let style = lookup.style;
            let cx = x + layout.column_width / 2.0;
            let cy = row.y + row.height / 2.0;
            match config.layout.marker_shape {
                MarkerShape::Cell => {
                    surface.rect(&bordered(
                        *x,
                        row.y,
                        layout.column_width,
                        row.height,
                        &style.fill,
                        theme,
                    ));
                }
                MarkerShape::Circle => {
                    surface.rect(&bordered(
                        *x,
                        row.y,
                        layout.column_width,
                        row.height,
                        &theme.background,
                        theme,
                    ));
                    surface.circle(&CircleCommand {
                        cx,
                        cy,
                        r: config.layout.marker_radius,
                        fill: style.fill.clone(),
                        stroke: Some(theme.border_color.clone()),
                        stroke_width: theme.border_width,
                    });
                }
            }
            draw_centered(surface, &style.symbol, cx, cy, &layout.body_font, theme, measurer);
        }
    }

    let legend = &layout.legend;
    let heading_metrics = measurer.line_metrics(&layout.header_font);
    surface.text(&TextRun {
        x: legend.x,
        y: legend.y + heading_metrics.ascent,
        text: legend.heading.clone(),
        font: layout.header_font.clone(),
        fill: theme.text_color.clone(),
        anchor: TextAnchor::Start,
    });
    for entry in &legend.entries {
        let style = styles.style_for(&entry.token).style;
        let size = entry.swatch_size;
        surface.rect(&bordered(
            entry.swatch_x,
            entry.swatch_y,
            size,
            size,
            &style.fill,
            theme,
        ));
        draw_centered(
            surface,
            &style.symbol,
            entry.swatch_x + size / 2.0,
            entry.swatch_y + size / 2.0,
            &layout.body_font,
            theme,
            measurer,
        );
        let metrics = measurer.line_metrics(&layout.body_font);
        let baseline = entry.swatch_y + (size + metrics.ascent - metrics.descent) / 2.0;
        surface.text(&TextRun {
            x: entry.label_x,
            y: baseline,
            text: entry.label.clone(),
            font: layout.body_font.clone(),
            fill: theme.text_color.clone(),
            anchor: TextAnchor::Start,
        });
    }

    diagnostics
}

fn bordered(x: f32, y: f32, width: f32, height: f32, fill: &str, theme: &Theme) -> RectCommand {
    RectCommand {
        x,
        y,
        width,
        height,
        fill: Some(fill.to_string()),
        stroke: Some(theme.border_color.clone()),
        stroke_width: theme.border_width,
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_lines(
    surface: &mut dyn Surface,
    lines: &[String],
    x: f32,
    top: f32,
    font: &FontSpec,
    line_height: f32,
    theme: &Theme,
    measurer: &dyn TextMeasurer,
) {
    let metrics = measurer.line_metrics(font);
    // Each line box is line_height tall; centre the glyphs inside it.
    let lead = (line_height - metrics.ascent - metrics.descent) / 2.0;
    for (idx, line) in lines.iter().enumerate() {
        surface.text(&TextRun {
            x,
            y: top + idx as f32 * line_height + lead + metrics.ascent,
            text: line.clone(),
            font: font.clone(),
            fill: theme.text_color.clone(),
            anchor: TextAnchor::Start,
        });
    }
}

fn draw_centered(
    surface: &mut dyn Surface,
    text: &str,
    cx: f32,
    cy: f32,
    font: &FontSpec,
    theme: &Theme,
    measurer: &dyn TextMeasurer,
) {
    if text.is_empty() {
        return;
    }
    let metrics = measurer.line_metrics(font);
    surface.text(&TextRun {
        x: cx,
        y: cy + (metrics.ascent - metrics.descent) / 2.0,
        text: text.to_string(),
        font: font.clone(),
        fill: theme.text_color.clone(),
        anchor: TextAnchor::Middle,
    });
}

/// Layout plus SVG for one matrix.
#[derive(Debug, Clone)]
pub struct RenderedMatrix {
    pub layout: MatrixLayout,
    pub svg: String,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn render_svg(
    items: &[Item],
    domains: &DomainSet,
    config: &Config,
    measurer: &dyn TextMeasurer,
) -> RenderedMatrix {
    let layout = compute_layout(
        items,
        domains,
        &config.styles,
        &config.theme,
        &config.layout,
        measurer,
    );
    let mut surface = SvgSurface::new();
    let diagnostics = render_matrix(
        &layout,
        items,
        domains,
        config,
        measurer,
        &mut surface,
    );
    RenderedMatrix {
        layout,
        svg: surface.finish(),
        diagnostics,
    }
}

pub fn write_output(bytes: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes)?;
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(bytes)?;
        }
    }
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
