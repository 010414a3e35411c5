use crate::diagnostic::{Diagnostic, report};
use crate::ir::{AnnotationShape, DomainSet, Item};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Visual style of one risk level: fill colour, symbol drawn on the marker, legend label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskStyle {
    pub fill: String,
    pub symbol: String,
    pub label: String,
}

impl RiskStyle {
    pub fn new(
        fill: impl Into<String>,
        symbol: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            fill: fill.into(),
            symbol: symbol.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLevel {
    pub token: String,
    #[serde(flatten)]
    pub style: RiskStyle,
}

impl RiskLevel {
    pub fn new(token: impl Into<String>, style: RiskStyle) -> Self {
        Self {
            token: token.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleTableError {
    #[error("risk level token must not be empty")]
    EmptyToken,
    #[error("risk level `{0}` is defined twice")]
    DuplicateToken(String),
    #[error("risk levels `{first}` and `{second}` share fill {fill}")]
    SharedFill {
        first: String,
        second: String,
        fill: String,
    },
    #[error("risk level `{0}` uses the fallback fill colour")]
    FallbackCollision(String),
    #[error("risk level `{token}` has unparsable fill `{fill}`")]
    InvalidFill { token: String, fill: String },
    #[error("fallback style has unparsable fill `{0}`")]
    InvalidFallbackFill(String),
}

/// Result of looking up a token. `fallback` is set when the token was not recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleLookup<'a> {
    pub style: &'a RiskStyle,
    pub fallback: bool,
}

/// Token -> style table. Levels keep their declared order; that is legend order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskStyleTable {
    levels: Vec<RiskLevel>,
    fallback: RiskStyle,
}

impl RiskStyleTable {
    pub fn new(levels: Vec<RiskLevel>, fallback: RiskStyle) -> Result<Self, StyleTableError> {
        let fallback_fill = parse_fill(&fallback.fill)
            .ok_or_else(|| StyleTableError::InvalidFallbackFill(fallback.fill.clone()))?;
        let mut tokens = BTreeSet::new();
        let mut fills: Vec<(usize, [u8; 4])> = Vec::with_capacity(levels.len());
        for (idx, level) in levels.iter().enumerate() {
            let token = normalize(&level.token);
            if token.is_empty() {
                return Err(StyleTableError::EmptyToken);
            }
            if !tokens.insert(token) {
                return Err(StyleTableError::DuplicateToken(level.token.clone()));
            }
            let fill =
                parse_fill(&level.style.fill).ok_or_else(|| StyleTableError::InvalidFill {
                    token: level.token.clone(),
                    fill: level.style.fill.clone(),
                })?;
            if fill == fallback_fill {
                return Err(StyleTableError::FallbackCollision(level.token.clone()));
            }
            if let Some((first, _)) = fills.iter().find(|(_, other)| *other == fill) {
                return Err(StyleTableError::SharedFill {
                    first: levels[*first].token.clone(),
                    second: level.token.clone(),
                    fill: level.style.fill.clone(),
                });
            }
            fills.push((idx, fill));
        }
        Ok(Self { levels, fallback })
    }

    /// `high` / `some` / `low` with the pastel traffic-light fills.
    pub fn traffic_light() -> Self {
        Self {
            levels: vec![
                RiskLevel::new("high", RiskStyle::new("#f8d7da", "X", "High")),
                RiskLevel::new("some", RiskStyle::new("#fff3cd", "-", "Some")),
                RiskLevel::new("low", RiskStyle::new("#d4edda", "+", "Low")),
            ],
            fallback: Self::default_fallback(),
        }
    }

    pub fn default_fallback() -> RiskStyle {
        RiskStyle::new("#d9d9d9", "?", "Unknown")
    }

    pub fn levels(&self) -> &[RiskLevel] {
        &self.levels
    }

    pub fn fallback(&self) -> &RiskStyle {
        &self.fallback
    }

    pub fn style_for(&self, token: &str) -> StyleLookup<'_> {
        let key = normalize(token);
        match self
            .levels
            .iter()
            .find(|level| normalize(&level.token) == key)
        {
            Some(level) => StyleLookup {
                style: &level.style,
                fallback: false,
            },
            None => StyleLookup {
                style: &self.fallback,
                fallback: true,
            },
        }
    }
}

impl Default for RiskStyleTable {
    fn default() -> Self {
        Self::traffic_light()
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Resolves any CSS colour form (`#f00`, `#FF0000`, `red`, `rgb(...)`) to RGBA,
/// so equal colours compare equal however they are spelled.
fn parse_fill(fill: &str) -> Option<[u8; 4]> {
    let color: svgtypes::Color = fill.trim().parse().ok()?;
    Some([color.red, color.green, color.blue, color.alpha])
}

/// Styles for one item's cells in domain order, reporting every fallback taken.
pub(crate) fn resolve_row<'a>(
    row: usize,
    item: &Item,
    domains: &DomainSet,
    styles: &'a RiskStyleTable,
    shape: AnnotationShape,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<StyleLookup<'a>> {
    for key in item.values.keys() {
        if !domains.contains(key) {
            report(
                diagnostics,
                Diagnostic::UnknownDomain {
                    row,
                    item: item.name.clone(),
                    domain: key.clone(),
                },
            );
        }
    }
    if !item.annotation_matches(shape) {
        report(
            diagnostics,
            Diagnostic::AnnotationShapeMismatch {
                row,
                item: item.name.clone(),
                expected: shape,
            },
        );
    }

    domains
        .iter()
        .map(|domain| match item.value_for(&domain.id) {
            Some(token) if !token.trim().is_empty() => {
                let lookup = styles.style_for(token);
                if lookup.fallback {
                    report(
                        diagnostics,
                        Diagnostic::UnknownRiskToken {
                            row,
                            item: item.name.clone(),
                            domain: domain.id.clone(),
                            token: token.to_string(),
                        },
                    );
                }
                lookup
            }
            _ => {
                report(
                    diagnostics,
                    Diagnostic::MissingDomainValue {
                        row,
                        item: item.name.clone(),
                        domain: domain.id.clone(),
                    },
                );
                StyleLookup {
                    style: styles.fallback(),
                    fallback: true,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_resolve_case_insensitively() {
        let table = RiskStyleTable::traffic_light();
        let lookup = table.style_for(" High ");
        assert!(!lookup.fallback);
        assert_eq!(lookup.style.label, "High");
    }

    #[test]
    fn unknown_token_gets_distinct_fallback() {
        let table = RiskStyleTable::traffic_light();
        let lookup = table.style_for("unknown_token");
        assert!(lookup.fallback);
        assert_eq!(lookup.style.symbol, "?");
        for level in table.levels() {
            assert_ne!(level.style.fill, lookup.style.fill);
        }
    }

    #[test]
    fn table_rejects_merged_styles() {
        let dup = RiskStyleTable::new(
            vec![
                RiskLevel::new("high", RiskStyle::new("#f00", "X", "High")),
                RiskLevel::new("HIGH", RiskStyle::new("#0f0", "X", "High")),
            ],
            RiskStyleTable::default_fallback(),
        );
        assert_eq!(dup, Err(StyleTableError::DuplicateToken("HIGH".into())));

        let shared = RiskStyleTable::new(
            vec![
                RiskLevel::new("high", RiskStyle::new("#F00", "X", "High")),
                RiskLevel::new("low", RiskStyle::new("#f00", "+", "Low")),
            ],
            RiskStyleTable::default_fallback(),
        );
        assert!(matches!(shared, Err(StyleTableError::SharedFill { .. })));

        let grey = RiskStyleTable::new(
            vec![RiskLevel::new("low", RiskStyle::new("#D9D9D9", "+", "Low"))],
            RiskStyleTable::default_fallback(),
        );
        assert_eq!(grey, Err(StyleTableError::FallbackCollision("low".into())));
    }

    #[test]
    fn resolve_row_reports_each_fallback() {
        let table = RiskStyleTable::traffic_light();
        let domains = DomainSet::numbered(3);
        let item = Item::new("Trial")
            .with_value("D1", "low")
            .with_value("D2", "unknown_token")
            .with_value("D9", "high");
        let mut diagnostics = Vec::new();
        let cells = resolve_row(
            0,
            &item,
            &domains,
            &table,
            AnnotationShape::Shared,
            &mut diagnostics,
        );
        assert_eq!(cells.len(), 3);
        assert!(!cells[0].fallback);
        assert!(cells[1].fallback);
        assert!(cells[2].fallback);
        assert_eq!(diagnostics.len(), 3);
        assert!(matches!(diagnostics[0], Diagnostic::UnknownDomain { .. }));
        assert!(matches!(diagnostics[1], Diagnostic::UnknownRiskToken { .. }));
        assert!(matches!(diagnostics[2], Diagnostic::MissingDomainValue { .. }));
    }

    #[test]
    fn equivalent_colour_spellings_are_one_fill() {
        let level =
            |token: &str, fill: &str| RiskLevel::new(token, RiskStyle::new(fill, "!", "Bad"));
        for (a, b) in [("#f00", "#FF0000"), ("red", "#ff0000"), ("rgb(255, 0, 0)", "#f00")] {
            let table = RiskStyleTable::new(
                vec![level("high", a), level("serious", b)],
                RiskStyleTable::default_fallback(),
            );
            assert!(
                matches!(table, Err(StyleTableError::SharedFill { .. })),
                "{a} vs {b}"
            );
        }

        let grey = RiskStyleTable::new(
            vec![level("low", "rgb(217, 217, 217)")],
            RiskStyleTable::default_fallback(),
        );
        assert_eq!(grey, Err(StyleTableError::FallbackCollision("low".into())));
    }

    #[test]
    fn unparsable_fills_are_rejected() {
        let table = RiskStyleTable::new(
            vec![RiskLevel::new("low", RiskStyle::new("greenish", "+", "Low"))],
            RiskStyleTable::default_fallback(),
        );
        assert_eq!(
            table,
            Err(StyleTableError::InvalidFill {
                token: "low".into(),
                fill: "greenish".into(),
            })
        );

        let fallback = RiskStyleTable::new(Vec::new(), RiskStyle::new("#zzz", "?", "Unknown"));
        assert!(matches!(fallback, Err(StyleTableError::InvalidFallbackFill(_))));
    }

    #[test]
    fn distinct_fills_with_shared_symbols_are_accepted() {
        let table = RiskStyleTable::new(
            vec![
                RiskLevel::new("high", RiskStyle::new("#f00", "!", "High")),
                RiskLevel::new("serious", RiskStyle::new("#800000", "!", "Serious")),
            ],
            RiskStyleTable::default_fallback(),
        );
        assert!(table.is_ok());
    }
}
