//! Per-run state: the snapshot and the lookup tables built from it.
//!
//! A context lives for exactly one validation run. Duplicate and uniqueness
//! counts are built lazily the first time a column (or column tuple) is asked
//! about and are dropped with the context.

use std::collections::HashMap;

use sheetval_model::{CellValue, HEADER_ROW, RowTable};

type Counts<K> = HashMap<K, usize>;

pub struct RunContext<'t> {
    table: &'t RowTable,
    column_counts: HashMap<(String, bool, u32), Counts<String>>,
    combination_counts: HashMap<(Vec<String>, bool), Counts<Vec<String>>>,
}

fn normalize(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

impl<'t> RunContext<'t> {
    pub fn new(table: &'t RowTable) -> Self {
        Self {
            table,
            column_counts: HashMap::new(),
            combination_counts: HashMap::new(),
        }
    }

    pub fn table(&self) -> &'t RowTable {
        self.table
    }

    /// True when another row of `column`, numbered `first_row` or later,
    /// holds `value`.
    ///
    /// `first_row` is the first row the calling category evaluates, so rows
    /// it never visits are never counted. `value` may differ from the stored
    /// cell (a trimmed copy); the row's own stored cell is only discounted
    /// when it normalizes to the same key.
    pub fn is_duplicate(
        &mut self,
        column: &str,
        row: u32,
        value: &CellValue,
        case_sensitive: bool,
        first_row: u32,
    ) -> bool {
        let table = self.table;
        let counts = self
            .column_counts
            .entry((column.to_string(), case_sensitive, first_row))
            .or_insert_with(|| {
                let mut counts = Counts::new();
                for (_, data) in table.rows().filter(|(number, _)| *number >= first_row) {
                    let key = normalize(&data.get(column).as_text(), case_sensitive);
                    *counts.entry(key).or_insert(0) += 1;
                }
                counts
            });

        let key = normalize(&value.as_text(), case_sensitive);
        let occurrences = counts.get(&key).copied().unwrap_or(0);
        let own = if row >= first_row
            && normalize(&table.value(row, column).as_text(), case_sensitive) == key
        {
            1
        } else {
            0
        };
        occurrences.saturating_sub(own) > 0
    }

    /// True when another non-header row holds the same value tuple for
    /// `columns`. Absent cells read as empty text.
    pub fn is_repeated_combination(
        &mut self,
        columns: &[String],
        row: u32,
        case_sensitive: bool,
    ) -> bool {
        let table = self.table;
        let tuple = |number: u32| -> Vec<String> {
            columns
                .iter()
                .map(|column| normalize(&table.value(number, column).as_text(), case_sensitive))
                .collect()
        };

        let counts = self
            .combination_counts
            .entry((columns.to_vec(), case_sensitive))
            .or_insert_with(|| {
                let mut counts = Counts::new();
                for (number, _) in table.data_rows() {
                    *counts.entry(tuple(number)).or_insert(0) += 1;
                }
                counts
            });

        let own = usize::from(row != HEADER_ROW);
        counts
            .get(&tuple(row))
            .copied()
            .unwrap_or(0)
            .saturating_sub(own)
            > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST_DATA_ROW: u32 = HEADER_ROW + 1;

    fn table() -> RowTable {
        RowTable::from_sequential_rows([
            vec![CellValue::text("Code"), CellValue::text("Kind")],
            vec![CellValue::text("a1"), CellValue::text("x")],
            vec![CellValue::text("A1"), CellValue::text("X")],
            vec![CellValue::text("b2"), CellValue::text("x")],
            vec![CellValue::text(" b2"), CellValue::text("y")],
        ])
    }

    #[test]
    fn duplicates_respect_case_setting() {
        let table = table();
        let mut context = RunContext::new(&table);
        assert!(!context.is_duplicate("A", 2, &CellValue::text("a1"), true, FIRST_DATA_ROW));
        assert!(context.is_duplicate("A", 2, &CellValue::text("a1"), false, FIRST_DATA_ROW));
        assert!(context.is_duplicate("A", 3, &CellValue::text("A1"), false, FIRST_DATA_ROW));
    }

    #[test]
    fn trimmed_probe_matches_other_rows_only() {
        let table = table();
        let mut context = RunContext::new(&table);
        // Row 5 stores " b2"; its trimmed form matches row 4.
        assert!(context.is_duplicate("A", 5, &CellValue::text("b2"), true, FIRST_DATA_ROW));
        // Row 4 stores "b2"; nobody else stores exactly "b2".
        assert!(!context.is_duplicate("A", 4, &CellValue::text("b2"), true, FIRST_DATA_ROW));
    }

    #[test]
    fn header_row_is_not_counted() {
        let table = table();
        let mut context = RunContext::new(&table);
        assert!(!context.is_duplicate("A", 2, &CellValue::text("Code"), true, FIRST_DATA_ROW));
        assert!(!context.is_duplicate("A", 1, &CellValue::text("Code"), true, FIRST_DATA_ROW));
    }

    #[test]
    fn counting_from_row_one_includes_the_header() {
        let table = RowTable::from_sequential_rows([
            vec![CellValue::text("x")],
            vec![CellValue::text("x")],
            vec![CellValue::text("y")],
        ]);
        let mut context = RunContext::new(&table);
        assert!(context.is_duplicate("A", 1, &CellValue::text("x"), true, 1));
        assert!(context.is_duplicate("A", 2, &CellValue::text("x"), true, 1));
        assert!(!context.is_duplicate("A", 3, &CellValue::text("y"), true, 1));
        assert!(!context.is_duplicate("A", 2, &CellValue::text("x"), true, FIRST_DATA_ROW));
    }

    #[test]
    fn combinations_flag_both_rows() {
        let table = table();
        let mut context = RunContext::new(&table);
        let columns = vec!["A".to_string(), "B".to_string()];
        assert!(context.is_repeated_combination(&columns, 2, false));
        assert!(context.is_repeated_combination(&columns, 3, false));
        assert!(!context.is_repeated_combination(&columns, 4, false));
        assert!(!context.is_repeated_combination(&columns, 2, true));
    }
}
