//! Validation error records.

use serde::{Deserialize, Serialize};

use crate::column::coordinate;
use crate::rule::RuleCategory;
use crate::value::CellValue;

/// Column used by the synthetic error of an unreadable source.
pub const SOURCE_FAILURE_COLUMN: &str = "A";

/// One failed check, scoped to a row and one or more columns.
///
/// `values` is aligned with `columns`: one value per column, same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: u32,
    pub columns: Vec<String>,
    pub message: String,
    pub values: Vec<CellValue>,
    pub category: RuleCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl ValidationError {
    /// Error on a single cell.
    pub fn single(
        row: u32,
        column: impl Into<String>,
        message: impl Into<String>,
        value: CellValue,
        category: RuleCategory,
    ) -> Self {
        Self {
            row,
            columns: vec![column.into()],
            message: message.into(),
            values: vec![value],
            category,
            rule_id: None,
        }
    }

    /// Error spanning several cells of one row.
    pub fn spanning(
        row: u32,
        columns: Vec<String>,
        message: impl Into<String>,
        values: Vec<CellValue>,
        category: RuleCategory,
    ) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self {
            row,
            columns,
            message: message.into(),
            values,
            category,
            rule_id: None,
        }
    }

    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    /// `A2` for one column, `A2+B2+C2` for several.
    pub fn coordinate(&self) -> String {
        coordinate(&self.columns, self.row)
    }

    pub fn is_multi_column(&self) -> bool {
        self.columns.len() > 1
    }
}

/// The single error reported when the source could not be read at all.
pub fn source_failure(cause: impl std::fmt::Display) -> ValidationError {
    ValidationError {
        row: 0,
        columns: vec![SOURCE_FAILURE_COLUMN.to_string()],
        message: format!("Error reading the file: {cause}"),
        values: vec![CellValue::Empty],
        category: RuleCategory::Source,
        rule_id: None,
    }
}
