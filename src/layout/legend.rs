use crate::config::LayoutConfig;
use crate::style::RiskStyleTable;
use crate::text_metrics::{FontSpec, TextMeasurer};

use super::{LegendEntry, LegendLayout};

/// Places the legend heading and one entry per known level, left to right from `origin`.
/// Each entry advances past its measured label, so long labels never overlap.
pub(super) fn layout_legend(
    styles: &RiskStyleTable,
    heading: &str,
    font: &FontSpec,
    config: &LayoutConfig,
    measurer: &dyn TextMeasurer,
    origin: (f32, f32),
) -> LegendLayout {
    let (x, y) = origin;
    let swatch = config.legend_swatch_size;
    let swatch_y = y + config.legend_row_offset;
    let mut cursor = x;
    let mut right = x + measurer.text_width(heading, font);
    let mut entries = Vec::with_capacity(styles.levels().len());

    for level in styles.levels() {
        let label_width = measurer.text_width(&level.style.label, font);
        let label_x = cursor + swatch + config.legend_swatch_label_gap;
        entries.push(LegendEntry {
            token: level.token.clone(),
            swatch_x: cursor,
            swatch_y,
            swatch_size: swatch,
            label_x,
            label_width,
            label: level.style.label.clone(),
        });
        right = right.max(label_x + label_width);
        let measured =
            swatch + config.legend_swatch_label_gap + label_width + config.legend_entry_gap;
        cursor += measured.max(config.legend_entry_pitch);
    }

    LegendLayout {
        x,
        y,
        heading: heading.to_string(),
        width: right - x,
        entries,
    }
}

impl LegendLayout {
    pub(super) fn shift_y(&mut self, dy: f32) {
        self.y += dy;
        for entry in &mut self.entries {
            entry.swatch_y += dy;
        }
    }
}
