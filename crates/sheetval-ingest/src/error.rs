//! Error types for tabular loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a table.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds maximum allowed size.
    #[error("file too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File extension is not a supported tabular format.
    #[error("unsupported file format '{extension}': {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// File encoding is not supported (only UTF-8 is).
    #[error("unsupported encoding {encoding} in {path} (only UTF-8 is supported)")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    // === CSV Errors ===
    /// Failed to parse CSV.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    // === Workbook Errors ===
    /// Workbook could not be opened or a sheet could not be read.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Workbook has no sheets.
    #[error("workbook has no sheets: {path}")]
    NoSheets { path: PathBuf },

    /// Requested sheet does not exist.
    #[error("sheet '{sheet}' not found in {path} (available: {})", available.join(", "))]
    SheetNotFound {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/path/to/file.xlsx"),
        };
        assert_eq!(err.to_string(), "file not found: /path/to/file.xlsx");
    }

    #[test]
    fn test_sheet_not_found_lists_sheets() {
        let err = IngestError::SheetNotFound {
            path: PathBuf::from("book.xlsx"),
            sheet: "Data".to_string(),
            available: vec!["Sheet1".to_string(), "Sheet2".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "sheet 'Data' not found in book.xlsx (available: Sheet1, Sheet2)"
        );
    }
}
