//! Row table snapshot and header map.
//!
//! The snapshot is an ordered map from one-based row number to the row's cells.
//! Fully blank rows are dropped when the snapshot is built, so row numbers keep
//! their position in the source sheet and may have gaps. Row 1 is the header
//! row: its non-blank values become the header labels.

use std::collections::BTreeMap;

use crate::column::{column_index, column_letter};
use crate::value::CellValue;

/// Row number reserved for the header.
pub const HEADER_ROW: u32 = 1;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Cells of one row, indexed by zero-based column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Value for a column identifier; unresolved columns read as absent.
    pub fn get(&self, column: &str) -> &CellValue {
        column_index(column)
            .and_then(|index| self.cells.get(index))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn get_index(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is absent or zero-length text.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_missing)
    }

    /// Iterate `(column letter, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (String, &CellValue)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, value)| (column_letter(index), value))
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

/// Header labels keyed by zero-based column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMap {
    labels: BTreeMap<usize, String>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build labels from a header row, skipping missing cells.
    pub fn from_row(row: &Row) -> Self {
        let labels = row
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_missing())
            .map(|(index, value)| (index, value.as_text().into_owned()))
            .collect();
        Self { labels }
    }

    pub fn insert(&mut self, column: &str, label: impl Into<String>) {
        if let Some(index) = column_index(column) {
            self.labels.insert(index, label.into());
        }
    }

    pub fn label(&self, column: &str) -> Option<&str> {
        column_index(column)
            .and_then(|index| self.labels.get(&index))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate `(column letter, label)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> {
        self.labels
            .iter()
            .map(|(index, label)| (column_letter(*index), label.as_str()))
    }
}

/// In-memory snapshot of one sheet's non-blank rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowTable {
    rows: BTreeMap<u32, Row>,
    headers: HeaderMap,
}

impl RowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(row number, cells)` pairs.
    ///
    /// Blank rows are dropped and the header map is taken from row 1 when it
    /// survives.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (u32, Vec<CellValue>)>,
    {
        let mut table = Self::new();
        for (number, cells) in rows {
            table.push_row(number, cells);
        }
        table
    }

    /// Build a snapshot from consecutive rows starting at row 1.
    pub fn from_sequential_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        Self::from_rows(
            rows.into_iter()
                .enumerate()
                .map(|(offset, cells)| (offset as u32 + 1, cells)),
        )
    }

    /// Insert a row; returns false when the row is blank and was dropped.
    pub fn push_row(&mut self, number: u32, cells: Vec<CellValue>) -> bool {
        let row = Row::new(cells);
        if row.is_blank() {
            return false;
        }
        if number == HEADER_ROW {
            self.headers = HeaderMap::from_row(&row);
        }
        self.rows.insert(number, row);
        true
    }

    pub fn row(&self, number: u32) -> Option<&Row> {
        self.rows.get(&number)
    }

    /// Value at a row and column; anything unresolved reads as absent.
    pub fn value(&self, number: u32, column: &str) -> &CellValue {
        self.rows
            .get(&number)
            .map_or(&EMPTY_CELL, |row| row.get(column))
    }

    /// All rows in ascending order, including the header row.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &Row)> {
        self.rows.iter().map(|(number, row)| (*number, row))
    }

    /// Rows other than the header row, in ascending order.
    pub fn data_rows(&self) -> impl Iterator<Item = (u32, &Row)> {
        self.rows().filter(|(number, _)| *number != HEADER_ROW)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row, in columns.
    pub fn width(&self) -> usize {
        self.rows.values().map(Row::len).max().unwrap_or(0)
    }
}
