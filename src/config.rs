use crate::ir::{AnnotationShape, Domain, DomainSet};
use crate::style::{RiskLevel, RiskStyle, RiskStyleTable};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How each domain cell shows its risk level. One shape per render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    /// Fill the whole cell.
    #[default]
    Cell,
    /// Filled circle centred in the cell.
    Circle,
}

/// Text shown in the domain header cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderLabels {
    #[default]
    Code,
    Label,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub column_width: f32,
    pub base_cell_height: f32,
    pub line_height: f32,
    pub row_padding: f32,
    pub cell_text_inset: f32,
    pub top_margin: f32,
    pub left_margin: f32,
    pub right_padding: f32,
    pub bottom_padding: f32,
    pub legend_gap: f32,
    pub legend_height: f32,
    pub legend_swatch_size: f32,
    pub legend_swatch_label_gap: f32,
    pub legend_entry_gap: f32,
    pub legend_entry_pitch: f32,
    pub legend_row_offset: f32,
    pub min_canvas_height: f32,
    pub marker_radius: f32,
    pub marker_shape: MarkerShape,
    pub header_labels: HeaderLabels,
    pub name_header: String,
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: 120.0,
            base_cell_height: 40.0,
            line_height: 18.0,
            row_padding: 10.0,
            cell_text_inset: 10.0,
            top_margin: 50.0,
            left_margin: 50.0,
            right_padding: 50.0,
            bottom_padding: 30.0,
            legend_gap: 20.0,
            legend_height: 100.0,
            legend_swatch_size: 20.0,
            legend_swatch_label_gap: 10.0,
            legend_entry_gap: 20.0,
            legend_entry_pitch: 120.0,
            legend_row_offset: 30.0,
            min_canvas_height: 240.0,
            marker_radius: 14.0,
            marker_shape: MarkerShape::Cell,
            header_labels: HeaderLabels::Code,
            name_header: "Project".to_string(),
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Raster scale factor applied to the canvas size.
    pub scale: f32,
    pub background: String,
    pub summary_title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: "#FFFFFF".to_string(),
            summary_title: "Risk of bias summary".to_string(),
        }
    }
}

/// Everything a render reads besides the items and the domain set.
#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub styles: RiskStyleTable,
    pub annotation_shape: AnnotationShape,
    /// Domain set named by a config file; callers may ignore it.
    pub domains: Option<DomainSet>,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            styles: RiskStyleTable::default(),
            annotation_shape: AnnotationShape::default(),
            domains: None,
        }
    }
}

impl Config {
    pub fn modern() -> Self {
        let theme = Theme::modern();
        let layout = LayoutConfig {
            marker_shape: MarkerShape::Circle,
            ..Default::default()
        };
        Self {
            theme,
            layout,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    header_bold: Option<bool>,
    text_color: Option<String>,
    border_color: Option<String>,
    border_width: Option<f32>,
    header_fill: Option<String>,
    name_fill: Option<String>,
    background: Option<String>,
    legend_heading: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    column_width: Option<f32>,
    base_cell_height: Option<f32>,
    line_height: Option<f32>,
    row_padding: Option<f32>,
    cell_text_inset: Option<f32>,
    top_margin: Option<f32>,
    left_margin: Option<f32>,
    right_padding: Option<f32>,
    bottom_padding: Option<f32>,
    legend_gap: Option<f32>,
    legend_height: Option<f32>,
    legend_swatch_size: Option<f32>,
    legend_swatch_label_gap: Option<f32>,
    legend_entry_gap: Option<f32>,
    legend_entry_pitch: Option<f32>,
    legend_row_offset: Option<f32>,
    min_canvas_height: Option<f32>,
    marker_radius: Option<f32>,
    marker_shape: Option<MarkerShape>,
    header_labels: Option<HeaderLabels>,
    name_header: Option<String>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    scale: Option<f32>,
    background: Option<String>,
    summary_title: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    risk_levels: Option<Vec<RiskLevel>>,
    fallback_style: Option<RiskStyle>,
    domains: Option<Vec<Domain>>,
    annotation_shape: Option<AnnotationShape>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = match parsed.theme.as_deref() {
        Some("modern") => Config::modern(),
        Some("classic") | Some("default") | None => Config::default(),
        Some(other) => return Err(anyhow::anyhow!("unknown theme `{other}`")),
    };

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            theme.font_size = v;
        }
        if let Some(v) = vars.header_bold {
            theme.header_bold = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.border_color {
            theme.border_color = v;
        }
        if let Some(v) = vars.border_width {
            theme.border_width = v;
        }
        if let Some(v) = vars.header_fill {
            theme.header_fill = v;
        }
        if let Some(v) = vars.name_fill {
            theme.name_fill = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            theme.background = v;
        }
        if let Some(v) = vars.legend_heading {
            theme.legend_heading = v;
        }
    }

    if let Some(file) = parsed.layout {
        let layout = &mut config.layout;
        if let Some(v) = file.column_width {
            layout.column_width = v;
        }
        if let Some(v) = file.base_cell_height {
            layout.base_cell_height = v;
        }
        if let Some(v) = file.line_height {
            layout.line_height = v;
        }
        if let Some(v) = file.row_padding {
            layout.row_padding = v;
        }
        if let Some(v) = file.cell_text_inset {
            layout.cell_text_inset = v;
        }
        if let Some(v) = file.top_margin {
            layout.top_margin = v;
        }
        if let Some(v) = file.left_margin {
            layout.left_margin = v;
        }
        if let Some(v) = file.right_padding {
            layout.right_padding = v;
        }
        if let Some(v) = file.bottom_padding {
            layout.bottom_padding = v;
        }
        if let Some(v) = file.legend_gap {
            layout.legend_gap = v;
        }
        if let Some(v) = file.legend_height {
            layout.legend_height = v;
        }
        if let Some(v) = file.legend_swatch_size {
            layout.legend_swatch_size = v;
        }
        if let Some(v) = file.legend_swatch_label_gap {
            layout.legend_swatch_label_gap = v;
        }
        if let Some(v) = file.legend_entry_gap {
            layout.legend_entry_gap = v;
        }
        if let Some(v) = file.legend_entry_pitch {
            layout.legend_entry_pitch = v;
        }
        if let Some(v) = file.legend_row_offset {
            layout.legend_row_offset = v;
        }
        if let Some(v) = file.min_canvas_height {
            layout.min_canvas_height = v;
        }
        if let Some(v) = file.marker_radius {
            layout.marker_radius = v;
        }
        if let Some(v) = file.marker_shape {
            layout.marker_shape = v;
        }
        if let Some(v) = file.header_labels {
            layout.header_labels = v;
        }
        if let Some(v) = file.name_header {
            layout.name_header = v;
        }
        if let Some(v) = file.fast_text_metrics {
            layout.fast_text_metrics = v;
        }
    }

    if let Some(file) = parsed.render {
        if let Some(v) = file.scale {
            config.render.scale = v;
        }
        if let Some(v) = file.background {
            config.render.background = v;
        }
        if let Some(v) = file.summary_title {
            config.render.summary_title = v;
        }
    }

    if parsed.risk_levels.is_some() || parsed.fallback_style.is_some() {
        let levels = parsed
            .risk_levels
            .unwrap_or_else(|| config.styles.levels().to_vec());
        let fallback = parsed
            .fallback_style
            .unwrap_or_else(RiskStyleTable::default_fallback);
        config.styles = RiskStyleTable::new(levels, fallback)?;
    }

    if let Some(domains) = parsed.domains {
        config.domains = Some(DomainSet::new(domains)?);
    }

    if let Some(shape) = parsed.annotation_shape {
        config.annotation_shape = shape;
    }

    Ok(config)
}
