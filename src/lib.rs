#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod export;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod records;
pub mod render;
pub mod style;
pub mod summary;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use diagnostic::Diagnostic;
pub use export::{ExportError, OutputMode, RenderOutput, export, export_with_measurer};
pub use ir::{Annotation, AnnotationShape, Domain, DomainSet, Item};
pub use layout::{MatrixLayout, compute_layout};
pub use render::{CommandRecorder, DrawCommand, Surface, SvgSurface, render_matrix, render_svg};
pub use style::{RiskLevel, RiskStyle, RiskStyleTable};
pub use text_metrics::{FallbackMetrics, FontSpec, Metrics, TextMeasurer};
pub use theme::Theme;
