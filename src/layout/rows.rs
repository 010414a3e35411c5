use crate::config::LayoutConfig;

/// Height of a row holding `line_count` wrapped lines. Never below `base_height`.
pub fn row_height(line_count: usize, base_height: f32, line_height: f32, padding: f32) -> f32 {
    base_height.max(line_count as f32 * line_height + padding)
}

pub fn plan_row_heights(line_counts: &[usize], config: &LayoutConfig) -> Vec<f32> {
    line_counts
        .iter()
        .map(|count| {
            row_height(
                *count,
                config.base_cell_height,
                config.line_height,
                config.row_padding,
            )
        })
        .collect()
}
