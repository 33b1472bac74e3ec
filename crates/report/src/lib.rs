mod coverage;
mod error;
mod format;

pub use coverage::{
    report, report_with_annotations, AnnotationMismatch, ColorCollision, CoverageReport,
    ReportConfig, DEFAULT_THRESHOLD,
};
pub use error::ReportError;
pub use format::{render_text, ReportSummary};
