use crate::text_metrics::{FontSpec, TextMeasurer};

use super::TextBlock;

/// Greedy word wrap under `max_width`. Words are never split: one wider than the
/// budget gets a line of its own. Empty or blank input gives no lines.
pub fn wrap_text(
    text: &str,
    font: &FontSpec,
    max_width: f32,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measurer.text_width(&candidate, font) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wraps `text` and measures the resulting block.
pub fn measure_block(
    text: &str,
    font: &FontSpec,
    max_width: f32,
    line_height: f32,
    measurer: &dyn TextMeasurer,
) -> TextBlock {
    let lines = wrap_text(text, font, max_width, measurer);
    let width = lines
        .iter()
        .map(|line| measurer.text_width(line, font))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * line_height;
    TextBlock {
        lines,
        width,
        height,
    }
}
