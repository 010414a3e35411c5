mod legend;
mod rows;
mod text;
pub(crate) mod types;
pub use rows::{plan_row_heights, row_height};
pub use text::{measure_block, wrap_text};
pub use types::*;
use legend::*;

use crate::config::{HeaderLabels, LayoutConfig};
use crate::ir::{DomainSet, Item};
use crate::style::RiskStyleTable;
use crate::text_metrics::{FontSpec, TextMeasurer};
use crate::theme::Theme;

/// Canvas size and offsets from row heights and margins.
///
/// Width is `left_margin + (domains + 1) * column_width + right_padding`, widened
/// only when the legend row is wider. Height is floored at `min_canvas_height`.
pub fn compute_geometry(input: &GeometryInput<'_>) -> Geometry {
    let columns = input.domain_count + 1;
    let column_xs: Vec<f32> = (0..columns)
        .map(|idx| input.left_margin + idx as f32 * input.column_width)
        .collect();

    let body_top = input.top_margin + input.header_height;
    let mut row_tops = Vec::with_capacity(input.row_heights.len());
    let mut y = body_top;
    for height in input.row_heights {
        row_tops.push(y);
        y += height;
    }
    let body_bottom = y;

    let table_width = input.left_margin + columns as f32 * input.column_width + input.right_padding;
    let legend_width = input.left_margin + input.legend_width + input.right_padding;
    let width = table_width.max(legend_width);

    let natural_height = body_bottom + input.legend_height + input.bottom_padding;
    let height = natural_height.max(input.min_canvas_height);

    Geometry {
        width,
        height,
        column_xs,
        row_tops,
        legend_origin: (input.left_margin, body_bottom + input.legend_gap),
    }
}

/// Lays out the whole matrix: wrapped header and names, row heights, legend.
/// Deterministic for identical inputs.
pub fn compute_layout(
    items: &[Item],
    domains: &DomainSet,
    styles: &RiskStyleTable,
    theme: &Theme,
    config: &LayoutConfig,
    measurer: &dyn TextMeasurer,
) -> MatrixLayout {
    let body_font = FontSpec::new(theme.font_family.clone(), theme.font_size);
    let header_font = body_font.clone().bold(theme.header_bold);
    let text_width = (config.column_width - 2.0 * config.cell_text_inset).max(1.0);

    let mut header_labels = Vec::with_capacity(domains.len() + 1);
    header_labels.push(measure_block(
        &config.name_header,
        &header_font,
        text_width,
        config.line_height,
        measurer,
    ));
    for domain in domains {
        let text = match config.header_labels {
            HeaderLabels::Code => domain.code.as_str(),
            HeaderLabels::Label => domain.label.as_str(),
        };
        header_labels.push(measure_block(
            text,
            &header_font,
            text_width,
            config.line_height,
            measurer,
        ));
    }
    let header_lines = header_labels
        .iter()
        .map(|block| block.lines.len())
        .max()
        .unwrap_or(0);
    let header_height = row_height(
        header_lines,
        config.base_cell_height,
        config.line_height,
        config.row_padding,
    );

    let names: Vec<TextBlock> = items
        .iter()
        .map(|item| {
            measure_block(
                &item.name,
                &body_font,
                text_width,
                config.line_height,
                measurer,
            )
        })
        .collect();
    let line_counts: Vec<usize> = names.iter().map(|block| block.lines.len()).collect();
    let row_heights = plan_row_heights(&line_counts, config);

    let mut legend = layout_legend(
        styles,
        &theme.legend_heading,
        &header_font,
        config,
        measurer,
        (config.left_margin, 0.0),
    );

    let geometry = compute_geometry(&GeometryInput {
        domain_count: domains.len(),
        row_heights: &row_heights,
        header_height,
        column_width: config.column_width,
        top_margin: config.top_margin,
        left_margin: config.left_margin,
        right_padding: config.right_padding,
        bottom_padding: config.bottom_padding,
        legend_gap: config.legend_gap,
        legend_height: config.legend_height,
        legend_width: legend.width,
        min_canvas_height: config.min_canvas_height,
    });
    legend.shift_y(geometry.legend_origin.1);

    let header = geometry
        .column_xs
        .iter()
        .zip(header_labels)
        .map(|(x, label)| HeaderCell { x: *x, label })
        .collect();

    let rows = geometry
        .row_tops
        .iter()
        .zip(row_heights)
        .zip(names)
        .map(|((y, height), name)| RowLayout {
            y: *y,
            height,
            name,
        })
        .collect();

    log::debug!(
        "matrix layout: {} rows x {} domains, canvas {}x{}",
        items.len(),
        domains.len(),
        geometry.width,
        geometry.height
    );

    MatrixLayout {
        width: geometry.width,
        height: geometry.height,
        column_width: config.column_width,
        header_y: config.top_margin,
        header_height,
        column_xs: geometry.column_xs,
        header,
        rows,
        legend,
        body_font,
        header_font,
        line_height: config.line_height,
        text_inset: config.cell_text_inset,
    }
}
