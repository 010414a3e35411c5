use crate::ir::AnnotationShape;
use serde::Serialize;
use std::fmt;

/// Non-fatal data-quality findings collected while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    UnknownRiskToken {
        row: usize,
        item: String,
        domain: String,
        token: String,
    },
    MissingDomainValue {
        row: usize,
        item: String,
        domain: String,
    },
    /// A value keyed by a domain outside the active set. It is never drawn.
    UnknownDomain {
        row: usize,
        item: String,
        domain: String,
    },
    AnnotationShapeMismatch {
        row: usize,
        item: String,
        expected: AnnotationShape,
    },
    FallbackFontMetrics {
        family: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownRiskToken {
                row,
                item,
                domain,
                token,
            } => write!(
                f,
                "row {row} ({item}): unknown risk level `{token}` for domain {domain}, using fallback style"
            ),
            Diagnostic::MissingDomainValue { row, item, domain } => write!(
                f,
                "row {row} ({item}): no value for domain {domain}, using fallback style"
            ),
            Diagnostic::UnknownDomain { row, item, domain } => write!(
                f,
                "row {row} ({item}): value for unknown domain `{domain}` ignored"
            ),
            Diagnostic::AnnotationShapeMismatch {
                row,
                item,
                expected,
            } => write!(
                f,
                "row {row} ({item}): annotation is not {expected:?}, ignoring it"
            ),
            Diagnostic::FallbackFontMetrics { family } => write!(
                f,
                "font `{family}` unavailable, using built-in text metrics"
            ),
        }
    }
}

/// Logs `diagnostic` and appends it to `sink`.
pub(crate) fn report(sink: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    log::warn!("{diagnostic}");
    sink.push(diagnostic);
}
