//! JSON validation report with a fingerprint of the validated file.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sheetval_model::ValidationError;
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::summary::ValidationSummary;

pub const REPORT_SCHEMA: &str = "sheetval.report/v1";

const BUFFER_SIZE: usize = 65536; // 64 KB

/// The file a report was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSource {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Absent when the file could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ReportSource {
    /// Describe `path`, fingerprinting it when it is readable.
    pub fn describe(path: &Path, sheet: Option<&str>) -> Self {
        let sha256 = match file_sha256(path) {
            Ok(hash) => Some(hash),
            Err(error) => {
                debug!(%error, "source not fingerprinted");
                None
            }
        };
        Self {
            path: path.to_path_buf(),
            sheet: sheet.map(str::to_string),
            sha256,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    pub schema: &'static str,
    pub generated_at: DateTime<Utc>,
    pub source: ReportSource,
    pub summary: &'a ValidationSummary,
    pub errors: &'a [ValidationError],
}

impl<'a> JsonReport<'a> {
    pub fn new(
        source: ReportSource,
        summary: &'a ValidationSummary,
        errors: &'a [ValidationError],
    ) -> Self {
        Self {
            schema: REPORT_SCHEMA,
            generated_at: Utc::now(),
            source,
            summary,
            errors,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ReportError::Json)
    }

    /// Write the report next to `path` and rename it into place.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        write_atomic(path, json.as_bytes())?;
        debug!(path = %path.display(), "wrote JSON report");
        Ok(())
    }
}

/// Hex-encoded SHA-256 of a file's contents.
pub fn file_sha256(path: &Path) -> Result<String> {
    let io_error = |operation, source| ReportError::Io {
        operation,
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|source| io_error("open", source))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|source| io_error("read", source))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let hash = hex::encode(hasher.finalize());
    debug!(path = %path.display(), sha256 = %hash, "fingerprinted source");
    Ok(hash)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|source| ReportError::Io {
        operation: "create",
        path: temp_path.clone(),
        source,
    })?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|source| ReportError::Io {
            operation: "write",
            path: temp_path.clone(),
            source,
        })?;
    drop(file);
    fs::rename(&temp_path, path).map_err(|source| ReportError::AtomicWriteFailed {
        temp_path,
        target_path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sha256_of_known_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "abc").unwrap();
        assert_eq!(
            file_sha256(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn unreadable_source_has_no_fingerprint() {
        let dir = TempDir::new().unwrap();
        let source = ReportSource::describe(&dir.path().join("missing.xlsx"), Some("Data"));
        assert_eq!(source.sha256, None);
        assert_eq!(source.sheet.as_deref(), Some("Data"));
    }
}
