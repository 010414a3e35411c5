use crate::ir::{DomainSet, Item};
use crate::layout::MatrixLayout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub column_width: f32,
    pub line_height: f32,
    pub header: HeaderDump,
    pub rows: Vec<RowDump>,
    pub legend: LegendDump,
}

#[derive(Debug, Serialize)]
pub struct HeaderDump {
    pub y: f32,
    pub height: f32,
    pub cells: Vec<CellDump>,
}

#[derive(Debug, Serialize)]
pub struct CellDump {
    /// Domain id; `None` for the name column.
    pub domain: Option<String>,
    pub x: f32,
    pub label_lines: Vec<String>,
    pub label_width: f32,
}

#[derive(Debug, Serialize)]
pub struct RowDump {
    pub index: usize,
    pub item: String,
    pub y: f32,
    pub height: f32,
    pub name_lines: Vec<String>,
    pub values: Vec<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct LegendDump {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub heading: String,
    pub entries: Vec<LegendEntryDump>,
}

#[derive(Debug, Serialize)]
pub struct LegendEntryDump {
    pub token: String,
    pub label: String,
    pub swatch: [f32; 3],
    pub label_x: f32,
}

impl LayoutDump {
    pub fn from_layout(layout: &MatrixLayout, items: &[Item], domains: &DomainSet) -> Self {
        let column_ids = std::iter::once(None).chain(domains.iter().map(|d| Some(d.id.clone())));
        let cells = layout
            .header
            .iter()
            .zip(column_ids)
            .map(|(cell, domain)| CellDump {
                domain,
                x: cell.x,
                label_lines: cell.label.lines.clone(),
                label_width: cell.label.width,
            })
            .collect();

        let rows = layout
            .rows
            .iter()
            .zip(items)
            .enumerate()
            .map(|(index, (row, item))| RowDump {
                index,
                item: item.name.clone(),
                y: row.y,
                height: row.height,
                name_lines: row.name.lines.clone(),
                values: domains
                    .iter()
                    .map(|domain| item.value_for(&domain.id).map(str::to_string))
                    .collect(),
            })
            .collect();

        let legend = LegendDump {
            x: layout.legend.x,
            y: layout.legend.y,
            width: layout.legend.width,
            heading: layout.legend.heading.clone(),
            entries: layout
                .legend
                .entries
                .iter()
                .map(|entry| LegendEntryDump {
                    token: entry.token.clone(),
                    label: entry.label.clone(),
                    swatch: [entry.swatch_x, entry.swatch_y, entry.swatch_size],
                    label_x: entry.label_x,
                })
                .collect(),
        };

        LayoutDump {
            width: layout.width,
            height: layout.height,
            column_width: layout.column_width,
            line_height: layout.line_height,
            header: HeaderDump {
                y: layout.header_y,
                height: layout.header_height,
                cells,
            },
            rows,
            legend,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &MatrixLayout,
    items: &[Item],
    domains: &DomainSet,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, items, domains);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
