//! Source file checks and format detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{IngestError, Result};

/// Maximum file size accepted for loading (500 MB).
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Tabular formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text; the delimiter comes from options or is sniffed.
    Csv,
    /// Tab-separated text.
    Tsv,
    /// Spreadsheet workbook read through calamine (xlsx, xlsm, xlsb, xls, ods).
    Workbook,
}

impl SourceFormat {
    /// Detect the format from the file extension.
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "xlam" | "ods" => Ok(Self::Workbook),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    pub fn is_workbook(&self) -> bool {
        matches!(self, Self::Workbook)
    }
}

fn open_error(path: &Path, error: std::io::Error) -> IngestError {
    if error.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

/// Check file existence and size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| open_error(path, e))?;
    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    Ok(())
}

/// Reject UTF-16 text files; a UTF-8 BOM is accepted.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn detects_formats_by_extension() {
        assert_eq!(
            SourceFormat::detect(Path::new("a.CSV")).unwrap(),
            SourceFormat::Csv
        );
        assert_eq!(
            SourceFormat::detect(Path::new("a.xlsx")).unwrap(),
            SourceFormat::Workbook
        );
        assert_eq!(
            SourceFormat::detect(Path::new("a.ods")).unwrap(),
            SourceFormat::Workbook
        );
        assert!(matches!(
            SourceFormat::detect(Path::new("a.pdf")),
            Err(IngestError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = check_file_size(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }

    #[test]
    fn size_limit_is_enforced() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();
        file.flush().unwrap();
        assert!(check_file_size_with_limit(file.path(), 100).is_ok());
        assert!(matches!(
            check_file_size_with_limit(file.path(), 5),
            Err(IngestError::FileTooLarge { size: 10, .. })
        ));
    }

    #[test]
    fn utf16_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xFE, b'a', 0]).unwrap();
        file.flush().unwrap();
        assert!(matches!(
            validate_encoding(file.path()),
            Err(IngestError::UnsupportedEncoding { .. })
        ));
    }
}
