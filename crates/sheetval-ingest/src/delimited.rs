//! Delimited text loading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::ReaderBuilder;
use sheetval_model::CellValue;

use crate::error::{IngestError, Result};
use crate::grid::SheetGrid;

const UTF8_BOM: char = '\u{feff}';

/// Pick `;`, tab or `,` from whichever appears most in the first line.
pub fn sniff_delimiter(path: &Path) -> Result<u8> {
    let file = File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

    let count = |delimiter: char| first_line.matches(delimiter).count();
    let delimiter = [(b',', count(',')), (b';', count(';')), (b'\t', count('\t'))]
        .into_iter()
        .max_by_key(|(_, n)| *n)
        .filter(|(_, n)| *n > 0)
        .map_or(b',', |(delimiter, _)| delimiter);
    Ok(delimiter)
}

fn to_cell(raw: &str) -> CellValue {
    if raw.is_empty() {
        CellValue::Empty
    } else {
        CellValue::text(raw)
    }
}

/// Read every record of a delimited file as text cells.
///
/// Records may have different lengths. Empty fields become absent cells.
pub fn read_csv_grid(path: &Path, delimiter: u8) -> Result<SheetGrid> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let row: Vec<CellValue> = record
            .iter()
            .enumerate()
            .map(|(column, raw)| {
                if index == 0 && column == 0 {
                    to_cell(raw.trim_start_matches(UTF8_BOM))
                } else {
                    to_cell(raw)
                }
            })
            .collect();
        rows.push(row);
    }

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        delimiter = %(delimiter as char),
        "read delimited file"
    );
    Ok(SheetGrid::new(rows))
}
