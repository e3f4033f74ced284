//! Error types for report output.

use std::path::PathBuf;

use thiserror::Error;

/// Failures writing a report artifact.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV to {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize report: {0}")]
    Json(#[source] serde_json::Error),

    /// Workbook writer failure, flattened to text.
    #[error("failed to write workbook {path}: {message}")]
    Xlsx { path: PathBuf, message: String },

    #[error("failed to re-read source {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: sheetval_ingest::IngestError,
    },

    #[error("failed to replace {target_path} with {temp_path}: {source}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn xlsx(path: &std::path::Path, error: &rust_xlsxwriter::XlsxError) -> Self {
        Self::Xlsx {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
