//! Text-searchable tabular summary: the same data as the matrix, flowed onto A4 pages.

use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::ir::{DomainSet, Item};
use crate::layout::wrap_text;
use crate::style::resolve_row;
use crate::text_metrics::{FallbackMetrics, FontSpec};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const INDENT_MM: f32 = 6.0;
const PT_TO_MM: f32 = 25.4 / 72.0;
const LEADING: f32 = 1.35;

const TITLE_PT: f32 = 16.0;
const HEADING_PT: f32 = 12.0;
const BODY_PT: f32 = 10.0;
const SEPARATOR: &str = " - ";

/// One positioned line. `y` is the baseline, measured in mm from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub bold: bool,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryPage {
    pub lines: Vec<SummaryLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryDocument {
    pub title: String,
    pub pages: Vec<SummaryPage>,
}

struct Flow {
    pages: Vec<SummaryPage>,
    cursor: f32,
}

impl Flow {
    fn new() -> Self {
        Self {
            pages: vec![SummaryPage::default()],
            cursor: MARGIN_MM,
        }
    }

    /// Wraps `text` to the printable width at `indent` and appends it, breaking pages as needed.
    fn paragraph(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        let font = FontSpec::new("Helvetica", size).bold(bold);
        let max_width_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM - indent) / PT_TO_MM;
        let line_mm = size * LEADING * PT_TO_MM;
        for line in wrap_text(text, &font, max_width_pt, &FallbackMetrics) {
            if self.cursor + line_mm > PAGE_HEIGHT_MM - MARGIN_MM {
                self.pages.push(SummaryPage::default());
                self.cursor = MARGIN_MM;
            }
            self.cursor += line_mm;
            if let Some(page) = self.pages.last_mut() {
                page.lines.push(SummaryLine {
                    x: MARGIN_MM + indent,
                    y: self.cursor,
                    size,
                    bold,
                    text: line,
                });
            }
        }
    }

    fn gap(&mut self, mm: f32) {
        self.cursor += mm;
    }
}

/// Flows the items into pages: per item a heading, then one
/// `CODE Domain label: Level - comment` line per domain, then a key of the domains.
pub fn build_summary(
    items: &[Item],
    domains: &DomainSet,
    config: &Config,
    diagnostics: &mut Vec<Diagnostic>,
) -> SummaryDocument {
    let shape = config.annotation_shape;
    let mut flow = Flow::new();
    flow.paragraph(&config.render.summary_title, TITLE_PT, true, 0.0);
    flow.paragraph(
        &format!("{} items assessed across {} domains", items.len(), domains.len()),
        BODY_PT,
        false,
        0.0,
    );
    flow.gap(4.0);

    if items.is_empty() {
        flow.paragraph("No items to report.", BODY_PT, false, 0.0);
        flow.gap(4.0);
    }

    for (idx, item) in items.iter().enumerate() {
        flow.paragraph(&item.name, HEADING_PT, true, 0.0);
        let cells = resolve_row(idx, item, domains, &config.styles, shape, diagnostics);
        for (domain, lookup) in domains.iter().zip(cells) {
            let mut line = format!(
                "{} {}: {}",
                domain.code, domain.label, lookup.style.label
            );
            if let Some(comment) = item.comment_for(shape, &domain.id) {
                line.push_str(SEPARATOR);
                line.push_str(comment);
            }
            flow.paragraph(&line, BODY_PT, false, INDENT_MM);
        }
        if let Some(comment) = item.shared_comment(shape) {
            flow.paragraph(&format!("Comments: {comment}"), BODY_PT, false, INDENT_MM);
        }
        flow.gap(4.0);
    }

    flow.paragraph("Domains", HEADING_PT, true, 0.0);
    for domain in domains {
        let mut line = format!("{}: {}", domain.code, domain.label);
        if let Some(question) = &domain.question {
            line.push_str(SEPARATOR);
            line.push_str(question);
        }
        flow.paragraph(&line, BODY_PT, false, INDENT_MM);
    }

    SummaryDocument {
        title: config.render.summary_title.clone(),
        pages: flow.pages,
    }
}

/// Writes the document with the base-14 Helvetica faces. Output carries no ids or
/// timestamps, so equal documents encode to equal bytes.
#[cfg(feature = "pdf")]
pub fn encode_summary_pdf(
    document: &SummaryDocument,
) -> Result<Vec<u8>, crate::export::ExportError> {
    use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};

    if document.pages.is_empty() {
        return Err(crate::export::ExportError::PdfWrite(
            "summary has no pages".to_string(),
        ));
    }

    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let regular_id = Ref::new(3);
    let bold_id = Ref::new(4);
    let info_id = Ref::new(5);
    let page_ids: Vec<(Ref, Ref)> = (0..document.pages.len() as i32)
        .map(|idx| (Ref::new(6 + 2 * idx), Ref::new(7 + 2 * idx)))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_ids.len() as i32);
    pdf.document_info(info_id).title(TextStr(&document.title));
    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let media_box = Rect::new(0.0, 0.0, mm_to_pt(PAGE_WIDTH_MM), mm_to_pt(PAGE_HEIGHT_MM));
    for (page, (page_id, content_id)) in document.pages.iter().zip(&page_ids) {
        let mut content = Content::new();
        for line in &page.lines {
            let font = if line.bold { Name(b"F2") } else { Name(b"F1") };
            content.begin_text();
            content.set_font(font, line.size);
            content.next_line(mm_to_pt(line.x), mm_to_pt(PAGE_HEIGHT_MM - line.y));
            content.show(Str(&win_ansi(&line.text)));
            content.end_text();
        }

        let mut writer = pdf.page(*page_id);
        writer.media_box(media_box);
        writer.parent(tree_id);
        writer.contents(*content_id);
        writer
            .resources()
            .fonts()
            .pair(Name(b"F1"), regular_id)
            .pair(Name(b"F2"), bold_id);
        drop(writer);
        pdf.stream(*content_id, &content.finish());
    }

    Ok(pdf.finish())
}

#[cfg(feature = "pdf")]
fn mm_to_pt(mm: f32) -> f32 {
    mm / PT_TO_MM
}

/// Encodes text for the builtin fonts' WinAnsi encoding; unmapped characters become `?`.
#[cfg(feature = "pdf")]
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Annotation, AnnotationShape};
    use std::collections::BTreeMap;

    fn texts(document: &SummaryDocument) -> Vec<&str> {
        document
            .pages
            .iter()
            .flat_map(|page| page.lines.iter().map(|line| line.text.as_str()))
            .collect()
    }

    #[test]
    fn per_domain_comments_follow_each_line() {
        let mut config = Config::default();
        config.annotation_shape = AnnotationShape::PerDomain;
        let mut comments = BTreeMap::new();
        comments.insert("D2".to_string(), "concealment unclear".to_string());
        let item = Item::new("Trial A")
            .with_value("D1", "low")
            .with_value("D2", "some")
            .with_annotation(Annotation::PerDomain(comments));
        let mut diagnostics = Vec::new();
        let document = build_summary(&[item], &DomainSet::numbered(2), &config, &mut diagnostics);
        let lines = texts(&document);
        assert!(lines.contains(&"Trial A"));
        assert!(lines.contains(&"D1 Domain 1: Low"));
        assert!(lines.contains(&"D2 Domain 2: Some - concealment unclear"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn shared_comment_is_printed_once() {
        let config = Config::default();
        let item = Item::new("Trial B")
            .with_value("D1", "high")
            .with_annotation(Annotation::Shared("industry funded".into()));
        let mut diagnostics = Vec::new();
        let document = build_summary(&[item], &DomainSet::numbered(1), &config, &mut diagnostics);
        let lines = texts(&document);
        assert_eq!(lines.iter().filter(|l| l.contains("industry funded")).count(), 1);
        assert!(lines.contains(&"D1 Domain 1: High"));
    }

    #[test]
    fn mismatched_annotation_is_reported_and_skipped() {
        let mut config = Config::default();
        config.annotation_shape = AnnotationShape::PerDomain;
        let item = Item::new("Trial C")
            .with_value("D1", "low")
            .with_annotation(Annotation::Shared("ignored".into()));
        let mut diagnostics = Vec::new();
        let document = build_summary(&[item], &DomainSet::numbered(1), &config, &mut diagnostics);
        assert!(!texts(&document).iter().any(|l| l.contains("ignored")));
        assert!(matches!(
            diagnostics[0],
            Diagnostic::AnnotationShapeMismatch { .. }
        ));
    }

    #[test]
    fn long_reports_break_onto_new_pages() {
        let config = Config::default();
        let domains = DomainSet::rob2();
        let items: Vec<Item> = (0..40)
            .map(|n| {
                let mut item = Item::new(format!("Trial {n}"));
                for domain in &domains {
                    item = item.with_value(domain.id.clone(), "low");
                }
                item
            })
            .collect();
        let mut diagnostics = Vec::new();
        let document = build_summary(&items, &domains, &config, &mut diagnostics);
        assert!(document.pages.len() > 1);
        for page in &document.pages {
            for line in &page.lines {
                assert!(line.y <= PAGE_HEIGHT_MM - MARGIN_MM + 0.001);
            }
        }
    }

    #[test]
    fn empty_input_still_produces_a_page() {
        let mut diagnostics = Vec::new();
        let document = build_summary(&[], &DomainSet::rob2(), &Config::default(), &mut diagnostics);
        assert_eq!(document.pages.len(), 1);
        assert!(texts(&document).contains(&"No items to report."));
    }

    #[test]
    fn rob2_lines_read_without_the_key() {
        let item = Item::new("Trial D").with_value("D1", "some");
        let mut diagnostics = Vec::new();
        let document = build_summary(
            &[item],
            &DomainSet::rob2(),
            &Config::default(),
            &mut diagnostics,
        );
        assert!(texts(&document).contains(&"D1 Randomization process: Some"));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn encoded_summary_is_reproducible() {
        let item = Item::new("Müller – cohort")
            .with_value("D1", "low")
            .with_annotation(Annotation::Shared("(blinded) assessors".into()));
        let mut diagnostics = Vec::new();
        let document = build_summary(
            &[item],
            &DomainSet::rob2(),
            &Config::default(),
            &mut diagnostics,
        );
        let first = encode_summary_pdf(&document).unwrap();
        let second = encode_summary_pdf(&document).unwrap();
        assert!(first.starts_with(b"%PDF-"));
        assert_eq!(first, second);
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn win_ansi_maps_latin_and_typographic_characters() {
        assert_eq!(win_ansi("Müller"), b"M\xfcller".to_vec());
        assert_eq!(win_ansi("a – b"), b"a \x96 b".to_vec());
        assert_eq!(win_ansi("\u{4e2d}"), b"?".to_vec());
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn document_without_pages_is_rejected() {
        let document = SummaryDocument {
            title: "Empty".into(),
            pages: Vec::new(),
        };
        assert!(encode_summary_pdf(&document).is_err());
    }
}
