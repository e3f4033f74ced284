//! Tabular rendering of validation errors and CSV export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use sheetval_model::{RowTable, ValidationError};
use tracing::debug;

use crate::error::{ReportError, Result};

/// Field separator of exported error tables.
pub const DEFAULT_SEPARATOR: u8 = b';';

pub const CSV_HEADERS: [&str; 5] = ["Row", "Column(s)", "Coordinate", "Message", "Value(s)"];

/// One error resolved against the table it was raised on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRow {
    pub row: u32,
    /// Column labels joined by `, `.
    pub columns: String,
    pub coordinate: String,
    pub message: String,
    /// Values joined by `, `.
    pub values: String,
}

impl ErrorRow {
    fn fields(&self) -> [String; 5] {
        [
            self.row.to_string(),
            self.columns.clone(),
            self.coordinate.clone(),
            self.message.clone(),
            self.values.clone(),
        ]
    }
}

/// Resolve errors to display rows.
///
/// Each column is shown by its header label when the table has one. A
/// non-blank value in `reference_column` on the error's row is prefixed as
/// `"<reference> - <label>"`.
pub fn render_rows(
    errors: &[ValidationError],
    table: &RowTable,
    reference_column: &str,
) -> Vec<ErrorRow> {
    errors
        .iter()
        .map(|error| {
            let reference = table.value(error.row, reference_column).as_text();
            let reference = reference.trim();
            let columns = error
                .columns
                .iter()
                .map(|column| {
                    let label = table.headers().label(column).unwrap_or(column.as_str());
                    if reference.is_empty() {
                        label.to_string()
                    } else {
                        format!("{reference} - {label}")
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            let values = error
                .values
                .iter()
                .map(|value| value.as_text().into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            ErrorRow {
                row: error.row,
                columns,
                coordinate: error.coordinate(),
                message: error.message.clone(),
                values,
            }
        })
        .collect()
}

/// Write rows with a header line to any writer.
pub fn write_csv<W: Write>(rows: &[ErrorRow], writer: W, separator: u8) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(separator)
        .from_writer(writer);
    writer.write_record(CSV_HEADERS)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }
    writer.flush()?;
    Ok(())
}

/// Render rows to an in-memory CSV string.
pub fn to_csv_string(rows: &[ErrorRow], separator: u8) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer, separator).map_err(|source| ReportError::Csv {
        path: "<memory>".into(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write rows to a CSV file, replacing any existing file.
pub fn export_csv(rows: &[ErrorRow], path: &Path, separator: u8) -> Result<()> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        operation: "create",
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(rows, file, separator).map_err(|source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), rows = rows.len(), "exported error table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetval_model::{CellValue, RuleCategory, source_failure};

    fn table() -> RowTable {
        RowTable::from_sequential_rows([
            vec![
                CellValue::text("Id"),
                CellValue::text("Name"),
                CellValue::text("Amount"),
            ],
            vec![
                CellValue::Number(1.0),
                CellValue::text("Ada"),
                CellValue::Number(12.5),
            ],
            vec![CellValue::Number(2.0), CellValue::Empty, CellValue::text("x")],
        ])
    }

    #[test]
    fn labels_use_header_and_reference() {
        let errors = vec![
            ValidationError::single(
                2,
                "C",
                "Validation error Integer",
                CellValue::Number(12.5),
                RuleCategory::Simple,
            ),
            ValidationError::single(
                3,
                "C",
                "Validation error Integer",
                CellValue::text("x"),
                RuleCategory::Simple,
            ),
        ];
        let rows = render_rows(&errors, &table(), "B");
        assert_eq!(rows[0].columns, "Ada - Amount");
        assert_eq!(rows[0].values, "12.5");
        assert_eq!(rows[1].columns, "Amount");
        assert_eq!(rows[1].coordinate, "C3");
    }

    #[test]
    fn unlabeled_columns_fall_back_to_the_letter() {
        let errors = vec![ValidationError::spanning(
            3,
            vec!["A".into(), "D".into()],
            "Multicolumn validation error sum_equals",
            vec![CellValue::Number(2.0), CellValue::Empty],
            RuleCategory::Multicolumn,
        )];
        let rows = render_rows(&errors, &table(), "B");
        assert_eq!(rows[0].columns, "Id, D");
        assert_eq!(rows[0].values, "2, ");
    }

    #[test]
    fn csv_uses_the_separator_and_quotes_when_needed() {
        let mut errors = vec![source_failure("bad; header")];
        errors.push(ValidationError::single(
            2,
            "B",
            "Validation error NotBlank",
            CellValue::text("Ada"),
            RuleCategory::Simple,
        ));
        let rows = render_rows(&errors, &table(), "B");
        let csv = to_csv_string(&rows, DEFAULT_SEPARATOR).unwrap();
        insta::assert_snapshot!(csv.trim_end(), @r#"
        Row;Column(s);Coordinate;Message;Value(s)
        0;Id;A0;"Error reading the file: bad; header";
        2;Ada - Name;B2;Validation error NotBlank;Ada
        "#);
    }
}
