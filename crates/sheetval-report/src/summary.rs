//! Summary statistics over a validation run.

use std::collections::BTreeMap;

use serde::Serialize;
use sheetval_model::{RuleCategory, ValidationError};

pub const SUCCESS_MESSAGE: &str = "No errors detected. The file conforms to the rules.";

const MULTI_SIMPLE_LABEL: &str = "Multi-column simple rule error";
const SIMPLE_LABEL: &str = "Simple error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Error,
}

/// Counts derived from an ordered error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub status: RunStatus,
    pub total_errors: usize,
    /// Errors that are neither multi-simple nor multicolumn.
    pub simple_errors: usize,
    pub multi_simple_errors: usize,
    pub multicolumn_errors: usize,
    pub by_category: BTreeMap<RuleCategory, usize>,
    pub errors_by_type: BTreeMap<String, usize>,
    pub message: String,
}

impl ValidationSummary {
    pub fn from_errors(errors: &[ValidationError]) -> Self {
        let mut by_category = BTreeMap::new();
        let mut errors_by_type = BTreeMap::new();
        for error in errors {
            *by_category.entry(error.category).or_insert(0) += 1;
            *errors_by_type.entry(type_label(error)).or_insert(0) += 1;
        }

        let count = |category| by_category.get(&category).copied().unwrap_or(0);
        let multicolumn_errors = count(RuleCategory::Multicolumn);
        let multi_simple_errors = count(RuleCategory::MultiSimple);
        let total_errors = errors.len();
        let simple_errors = total_errors - multicolumn_errors - multi_simple_errors;

        let (status, message) = if total_errors == 0 {
            (RunStatus::Success, SUCCESS_MESSAGE.to_string())
        } else {
            (
                RunStatus::Error,
                format!(
                    "{total_errors} error(s) detected ({simple_errors} simple, {multicolumn_errors} multicolumn)"
                ),
            )
        };

        Self {
            status,
            total_errors,
            simple_errors,
            multi_simple_errors,
            multicolumn_errors,
            by_category,
            errors_by_type,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Grouping label of one error in `errors_by_type`.
pub fn type_label(error: &ValidationError) -> String {
    match error.category {
        RuleCategory::Multicolumn => {
            format!("Multicolumn error ({} columns)", error.columns.len())
        }
        RuleCategory::MultiSimple => MULTI_SIMPLE_LABEL.to_string(),
        _ => match error.message.split_once(':') {
            Some((prefix, _)) if !prefix.trim().is_empty() => prefix.trim().to_string(),
            _ => SIMPLE_LABEL.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetval_model::{CellValue, source_failure};

    fn simple(row: u32, message: &str) -> ValidationError {
        ValidationError::single(row, "A", message, CellValue::Empty, RuleCategory::Simple)
    }

    fn spanning(row: u32, columns: &[&str], category: RuleCategory) -> ValidationError {
        ValidationError::spanning(
            row,
            columns.iter().map(|column| (*column).to_string()).collect(),
            "Multicolumn validation error sum_equals",
            vec![CellValue::Empty; columns.len()],
            category,
        )
    }

    #[test]
    fn empty_run_is_a_success() {
        let summary = ValidationSummary::from_errors(&[]);
        assert!(summary.is_success());
        assert_eq!(summary.message, SUCCESS_MESSAGE);
        assert!(summary.errors_by_type.is_empty());
    }

    #[test]
    fn counts_and_groups() {
        let errors = vec![
            simple(2, "Validation error NotBlank"),
            simple(3, "Bad code: expected 3 letters"),
            simple(4, "Bad code: expected 3 letters"),
            ValidationError::single(
                2,
                "B",
                "Validation error Email on several columns",
                CellValue::text("ada"),
                RuleCategory::MultiSimple,
            ),
            spanning(2, &["A", "B", "C"], RuleCategory::Multicolumn),
        ];
        let summary = ValidationSummary::from_errors(&errors);

        assert_eq!(summary.status, RunStatus::Error);
        assert_eq!(summary.total_errors, 5);
        assert_eq!(summary.simple_errors, 3);
        assert_eq!(summary.multi_simple_errors, 1);
        assert_eq!(summary.multicolumn_errors, 1);
        assert_eq!(summary.message, "5 error(s) detected (3 simple, 1 multicolumn)");
        assert_eq!(summary.errors_by_type["Bad code"], 2);
        assert_eq!(summary.errors_by_type["Simple error"], 1);
        assert_eq!(summary.errors_by_type["Multi-column simple rule error"], 1);
        assert_eq!(summary.errors_by_type["Multicolumn error (3 columns)"], 1);
        assert_eq!(summary.by_category[&RuleCategory::Simple], 3);
    }

    #[test]
    fn source_failure_groups_by_its_prefix() {
        let summary = ValidationSummary::from_errors(&[source_failure("corrupt zip")]);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.errors_by_type["Error reading the file"], 1);
        assert_eq!(summary.by_category[&RuleCategory::Source], 1);
    }

    #[test]
    fn serializes_category_keys_as_names() {
        let summary = ValidationSummary::from_errors(&[simple(2, "x")]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["by_category"]["simple"], 1);
    }
}
