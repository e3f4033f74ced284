//! Highlighted copy of a validated source.
//!
//! Every sheet of the source is rewritten cell for cell into a new workbook.
//! On the validated sheet each coordinate named by an error is filled: red
//! for single-column errors, orange for errors spanning several columns.
//! When two errors land on the same cell the later one decides the fill.
//! Other sheets are copied unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook, Worksheet, XlsxError};
use sheetval_ingest::{LoadedTable, SheetGrid, workbook};
use sheetval_model::{CellValue, ValidationError, column_index};
use tracing::{debug, info, warn};

use crate::error::{ReportError, Result};

pub const SINGLE_COLUMN_FILL: u32 = 0xFF0000;
pub const MULTI_COLUMN_FILL: u32 = 0xFFA500;

/// Largest row number an xlsx sheet can hold.
pub const MAX_ROWS: u32 = 1_048_576;
/// Largest column count an xlsx sheet can hold.
pub const MAX_COLUMNS: usize = 16_384;

const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    SingleColumn,
    MultiColumn,
}

impl Highlight {
    pub fn for_error(error: &ValidationError) -> Self {
        if error.is_multi_column() {
            Self::MultiColumn
        } else {
            Self::SingleColumn
        }
    }

    pub fn rgb(self) -> u32 {
        match self {
            Self::SingleColumn => SINGLE_COLUMN_FILL,
            Self::MultiColumn => MULTI_COLUMN_FILL,
        }
    }
}

/// Zero-based `(row, column)` cells to fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightPlan {
    pub cells: BTreeMap<(u32, u16), Highlight>,
    /// Coordinates that could not be placed on a sheet.
    pub skipped: usize,
}

impl HighlightPlan {
    pub fn from_errors(errors: &[ValidationError]) -> Self {
        let mut plan = Self::default();
        for error in errors {
            let highlight = Highlight::for_error(error);
            for column in &error.columns {
                match resolve(error.row, column) {
                    Some(cell) => {
                        plan.cells.insert(cell, highlight);
                    }
                    None => {
                        warn!(row = error.row, column = %column, "skipping unresolvable coordinate");
                        plan.skipped += 1;
                    }
                }
            }
        }
        plan
    }

    pub fn get(&self, row: u32, column: u16) -> Option<Highlight> {
        self.cells.get(&(row, column)).copied()
    }
}

fn resolve(row: u32, column: &str) -> Option<(u32, u16)> {
    if row == 0 || row > MAX_ROWS {
        return None;
    }
    let index = column_index(column).filter(|index| *index < MAX_COLUMNS)?;
    Some((row - 1, u16::try_from(index).ok()?))
}

/// What an annotation run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationOutcome {
    pub path: PathBuf,
    pub highlighted_cells: usize,
    pub skipped_coordinates: usize,
}

struct Styles {
    plain: Format,
    date: Format,
    fills: [Format; 2],
    date_fills: [Format; 2],
}

impl Styles {
    fn new() -> Self {
        let fill = |highlight: Highlight| {
            Format::new()
                .set_background_color(Color::RGB(highlight.rgb()))
                .set_pattern(FormatPattern::Solid)
        };
        let single = fill(Highlight::SingleColumn);
        let multi = fill(Highlight::MultiColumn);
        Self {
            plain: Format::new(),
            date: Format::new().set_num_format(DATETIME_NUM_FORMAT),
            date_fills: [
                single.clone().set_num_format(DATETIME_NUM_FORMAT),
                multi.clone().set_num_format(DATETIME_NUM_FORMAT),
            ],
            fills: [single, multi],
        }
    }

    fn pick(&self, highlight: Option<Highlight>, is_date: bool) -> &Format {
        let slot = |highlight: Highlight| match highlight {
            Highlight::SingleColumn => 0,
            Highlight::MultiColumn => 1,
        };
        match (highlight, is_date) {
            (None, false) => &self.plain,
            (None, true) => &self.date,
            (Some(highlight), false) => &self.fills[slot(highlight)],
            (Some(highlight), true) => &self.date_fills[slot(highlight)],
        }
    }
}

/// `errors_<unix timestamp>_<source stem>.xlsx` inside `directory`.
pub fn default_annotation_path(directory: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map_or_else(|| "sheet".into(), |stem| stem.to_string_lossy());
    directory.join(format!("errors_{}_{stem}.xlsx", Utc::now().timestamp()))
}

/// Write the highlighted copy of a loaded source to `output`.
///
/// Workbook sources are re-read so that sheets other than the validated one
/// are carried over; a delimited file becomes a one-sheet workbook.
pub fn annotate_loaded(
    loaded: &LoadedTable,
    errors: &[ValidationError],
    output: &Path,
) -> Result<AnnotationOutcome> {
    if !loaded.format.is_workbook() {
        let sheets = [(loaded.sheet_name.as_str(), &loaded.grid)];
        return annotate(&sheets, &loaded.sheet_name, errors, output);
    }

    let sheets = workbook::read_all_sheet_grids(&loaded.path).map_err(|source| {
        ReportError::Source {
            path: loaded.path.clone(),
            source,
        }
    })?;
    let sheets: Vec<(&str, &SheetGrid)> = sheets
        .iter()
        .map(|(name, grid)| {
            // The validated sheet is written from the grid the errors refer to.
            let grid = if *name == loaded.sheet_name {
                &loaded.grid
            } else {
                grid
            };
            (name.as_str(), grid)
        })
        .collect();
    annotate(&sheets, &loaded.sheet_name, errors, output)
}

/// Write `sheets` to `output`, highlighting `errors` on the sheet named
/// `validated`.
pub fn annotate<N: AsRef<str>>(
    sheets: &[(N, &SheetGrid)],
    validated: &str,
    errors: &[ValidationError],
    output: &Path,
) -> Result<AnnotationOutcome> {
    let plan = HighlightPlan::from_errors(errors);
    let untouched = HighlightPlan::default();
    let styles = Styles::new();
    let mut workbook = Workbook::new();
    for (name, grid) in sheets {
        let name = name.as_ref();
        let sheet_plan = if name == validated { &plan } else { &untouched };
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, grid, name, sheet_plan, &styles)
            .map_err(|e| ReportError::xlsx(output, &e))?;
    }
    workbook
        .save(output)
        .map_err(|e| ReportError::xlsx(output, &e))?;

    info!(
        path = %output.display(),
        sheets = sheets.len(),
        cells = plan.cells.len(),
        skipped = plan.skipped,
        "wrote highlighted workbook"
    );
    Ok(AnnotationOutcome {
        path: output.to_path_buf(),
        highlighted_cells: plan.cells.len(),
        skipped_coordinates: plan.skipped,
    })
}

fn write_sheet(
    worksheet: &mut Worksheet,
    grid: &SheetGrid,
    sheet_name: &str,
    plan: &HighlightPlan,
    styles: &Styles,
) -> std::result::Result<(), XlsxError> {
    worksheet.set_name(sheet_name)?;

    for (number, cells) in grid.rows() {
        if number > MAX_ROWS {
            debug!(row = number, "grid row beyond sheet limits");
            break;
        }
        let row = number - 1;
        for (index, value) in cells.iter().enumerate().take(MAX_COLUMNS) {
            let Ok(column) = u16::try_from(index) else {
                break;
            };
            write_cell(worksheet, (row, column), value, plan.get(row, column), styles)?;
        }
    }

    // Highlighted coordinates outside the grid become filled blanks.
    for (&(row, column), &highlight) in &plan.cells {
        if grid.cell(row + 1, usize::from(column)).is_none() {
            worksheet.write_blank(row, column, styles.pick(Some(highlight), false))?;
        }
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    (row, column): (u32, u16),
    value: &CellValue,
    highlight: Option<Highlight>,
    styles: &Styles,
) -> std::result::Result<(), XlsxError> {
    let format = styles.pick(highlight, matches!(value, CellValue::DateTime(_)));
    match value {
        _ if value.is_missing() => {
            if highlight.is_some() {
                worksheet.write_blank(row, column, format)?;
            }
        }
        CellValue::Number(number) if number.is_finite() => {
            worksheet.write_number_with_format(row, column, *number, format)?;
        }
        CellValue::Bool(flag) => {
            worksheet.write_boolean_with_format(row, column, *flag, format)?;
        }
        CellValue::DateTime(datetime) => {
            worksheet.write_datetime_with_format(row, column, datetime, format)?;
        }
        other => {
            worksheet.write_string_with_format(row, column, other.as_text(), format)?;
        }
    }
    Ok(())
}
