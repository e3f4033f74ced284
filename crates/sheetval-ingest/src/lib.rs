//! Tabular loading for sheetval.
//!
//! Reads a CSV file or one sheet of a workbook into a [`SheetGrid`] (every
//! row, as stored) and the [`RowTable`] snapshot the validators run over.
//!
//! ```no_run
//! use std::path::Path;
//! use sheetval_ingest::{LoadOptions, load_table};
//!
//! let loaded = load_table(Path::new("customers.xlsx"), &LoadOptions::default())?;
//! println!("{} rows from sheet {}", loaded.table.len(), loaded.sheet_name);
//! # Ok::<(), sheetval_ingest::IngestError>(())
//! ```

pub mod delimited;
pub mod error;
pub mod grid;
pub mod source;
pub mod workbook;

use std::path::{Path, PathBuf};

use sheetval_model::RowTable;

pub use error::{IngestError, Result};
pub use grid::SheetGrid;
pub use source::{
    MAX_FILE_SIZE, SourceFormat, check_file_size, check_file_size_with_limit, validate_encoding,
};

/// Name reported for the single "sheet" of a delimited file.
pub const TEXT_SHEET_NAME: &str = "Sheet1";

/// Options for [`load_table`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Sheet to read from a workbook; the first sheet when unset.
    pub sheet: Option<String>,
    /// Delimiter for text files; sniffed from the first line when unset.
    pub delimiter: Option<u8>,
}

/// A loaded sheet.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub sheet_name: String,
    pub grid: SheetGrid,
    pub table: RowTable,
}

/// Load one sheet of a tabular file.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<LoadedTable> {
    let format = SourceFormat::detect(path)?;
    check_file_size(path)?;

    let (sheet_name, grid) = match format {
        SourceFormat::Workbook => workbook::read_sheet_grid(path, options.sheet.as_deref())?,
        SourceFormat::Csv | SourceFormat::Tsv => {
            validate_encoding(path)?;
            let delimiter = match (options.delimiter, format) {
                (Some(delimiter), _) => delimiter,
                (None, SourceFormat::Tsv) => b'\t',
                (None, _) => delimited::sniff_delimiter(path)?,
            };
            (
                TEXT_SHEET_NAME.to_string(),
                delimited::read_csv_grid(path, delimiter)?,
            )
        }
    };

    let table = grid.to_table();
    tracing::info!(
        path = %path.display(),
        sheet = %sheet_name,
        rows = table.len(),
        columns = table.width(),
        "loaded table"
    );

    Ok(LoadedTable {
        path: path.to_path_buf(),
        format,
        sheet_name,
        grid,
        table,
    })
}

/// Sheet names of a tabular file; delimited files have a single sheet.
pub fn list_sheets(path: &Path) -> Result<Vec<String>> {
    let format = SourceFormat::detect(path)?;
    check_file_size(path)?;
    if format.is_workbook() {
        workbook::sheet_names(path)
    } else {
        Ok(vec![TEXT_SHEET_NAME.to_string()])
    }
}
