use crate::text_metrics::FontSpec;

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

/// One header cell: the name column first, then one per domain.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub x: f32,
    pub label: TextBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub y: f32,
    pub height: f32,
    pub name: TextBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub token: String,
    pub swatch_x: f32,
    pub swatch_y: f32,
    pub swatch_size: f32,
    pub label_x: f32,
    pub label_width: f32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    pub x: f32,
    pub y: f32,
    pub heading: String,
    pub width: f32,
    pub entries: Vec<LegendEntry>,
}

/// Pure canvas arithmetic: counts and sizes in, offsets out.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryInput<'a> {
    pub domain_count: usize,
    pub row_heights: &'a [f32],
    pub header_height: f32,
    pub column_width: f32,
    pub top_margin: f32,
    pub left_margin: f32,
    pub right_padding: f32,
    pub bottom_padding: f32,
    pub legend_gap: f32,
    pub legend_height: f32,
    /// Measured width of the legend row; widens the canvas only when it overflows.
    pub legend_width: f32,
    pub min_canvas_height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub width: f32,
    pub height: f32,
    /// Left edge of every column; index 0 is the name column.
    pub column_xs: Vec<f32>,
    pub row_tops: Vec<f32>,
    pub legend_origin: (f32, f32),
}

/// Absolute placement of everything the renderer draws.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixLayout {
    pub width: f32,
    pub height: f32,
    pub column_width: f32,
    pub header_y: f32,
    pub header_height: f32,
    pub column_xs: Vec<f32>,
    pub header: Vec<HeaderCell>,
    pub rows: Vec<RowLayout>,
    pub legend: LegendLayout,
    pub body_font: FontSpec,
    pub header_font: FontSpec,
    pub line_height: f32,
    pub text_inset: f32,
}

impl MatrixLayout {
    pub fn row_heights(&self) -> Vec<f32> {
        self.rows.iter().map(|row| row.height).collect()
    }
}
