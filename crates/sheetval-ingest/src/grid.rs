//! Raw sheet grid.
//!
//! The grid keeps every row of the sheet, blank ones included, so a
//! highlighted copy can reproduce the sheet cell for cell. The row snapshot is
//! derived from it.

use sheetval_model::{CellValue, RowTable};

/// All rows of one sheet; index 0 is row 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Cell at a one-based row and zero-based column.
    pub fn cell(&self, row: u32, column: usize) -> Option<&CellValue> {
        let index = usize::try_from(row).ok()?.checked_sub(1)?;
        self.rows.get(index)?.get(column)
    }

    /// Rows with their one-based numbers.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &[CellValue])> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, cells)| (index as u32 + 1, cells.as_slice()))
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row snapshot of this grid; blank rows are dropped.
    pub fn to_table(&self) -> RowTable {
        RowTable::from_rows(
            self.rows()
                .map(|(number, cells)| (number, cells.to_vec())),
        )
    }
}
