//! Reporting for sheetval.
//!
//! - [`summary`]: counts by category and by error type
//! - [`render`]: error rows with header labels, CSV export
//! - [`json`]: JSON report with a fingerprint of the validated file
//! - [`annotate`]: highlighted xlsx copy of the validated source

pub mod annotate;
pub mod error;
pub mod json;
pub mod render;
pub mod summary;

pub use annotate::{
    AnnotationOutcome, Highlight, HighlightPlan, annotate, annotate_loaded,
    default_annotation_path,
};
pub use error::{ReportError, Result};
pub use json::{JsonReport, ReportSource, file_sha256};
pub use render::{DEFAULT_SEPARATOR, ErrorRow, export_csv, render_rows, to_csv_string, write_csv};
pub use summary::{RunStatus, ValidationSummary};
