//! Workbook loading through calamine.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Reader, Sheets, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use sheetval_model::CellValue;

use crate::error::{IngestError, Result};
use crate::grid::SheetGrid;

type Workbook = Sheets<BufReader<File>>;

fn workbook_error(path: &Path, error: impl std::fmt::Display) -> IngestError {
    IngestError::Workbook {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Names of the sheets in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path).map_err(|e| workbook_error(path, e))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Read one sheet into a grid.
///
/// Without a requested name the first sheet is used. Returns the resolved
/// sheet name together with the grid.
pub fn read_sheet_grid(path: &Path, sheet: Option<&str>) -> Result<(String, SheetGrid)> {
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(path, e))?;
    let available = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(requested) => available
            .iter()
            .find(|name| name.as_str() == requested)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: requested.to_string(),
                available: available.clone(),
            })?,
        None => available
            .first()
            .cloned()
            .ok_or_else(|| IngestError::NoSheets {
                path: path.to_path_buf(),
            })?,
    };

    let grid = read_range(&mut workbook, path, &name)?;
    Ok((name, grid))
}

/// Read every sheet, in workbook order.
pub fn read_all_sheet_grids(path: &Path) -> Result<Vec<(String, SheetGrid)>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(path, e))?;
    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let grid = read_range(&mut workbook, path, &name)?;
        sheets.push((name, grid));
    }
    Ok(sheets)
}

fn read_range(workbook: &mut Workbook, path: &Path, name: &str) -> Result<SheetGrid> {
    let range = workbook
        .worksheet_range(name)
        .map_err(|e| workbook_error(path, format!("sheet '{name}': {e}")))?;

    // The range starts at its first used cell; pad so grid positions match
    // sheet coordinates.
    let (row_offset, column_offset) = range
        .start()
        .map_or((0, 0), |(row, column)| (row as usize, column as usize));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
    for source in range.rows() {
        let mut cells = vec![CellValue::Empty; column_offset];
        cells.extend(source.iter().map(convert_cell));
        while cells.last().is_some_and(CellValue::is_missing) {
            cells.pop();
        }
        rows.push(cells);
    }

    tracing::debug!(
        path = %path.display(),
        sheet = %name,
        rows = rows.len(),
        "read workbook sheet"
    );
    Ok(SheetGrid::new(rows))
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(text) if text.is_empty() => CellValue::Empty,
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(number) => CellValue::Number(*number),
        Data::Int(number) => CellValue::Number(*number as f64),
        Data::Bool(flag) => CellValue::Bool(*flag),
        Data::Error(error) => CellValue::Text(error.to_string()),
        Data::DateTime(datetime) => datetime
            .as_datetime()
            .map_or_else(|| CellValue::Number(datetime.as_f64()), CellValue::DateTime),
        Data::DateTimeIso(text) => {
            parse_iso_datetime(text).map_or_else(|| CellValue::Text(text.clone()), CellValue::DateTime)
        }
        Data::DurationIso(text) => CellValue::Text(text.clone()),
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
