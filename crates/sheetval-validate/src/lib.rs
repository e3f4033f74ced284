//! Rule validation for sheetval.
//!
//! - [`condition`]: one cell against one literal
//! - [`predicates`]: single-value checks used by simple and multi-simple rules
//! - [`conditional`]: condition combination and actions
//! - [`multicolumn`]: cross-column checks on one row
//! - [`engine`]: the [`RuleEngine`] running all four categories
//!
//! ```
//! use sheetval_model::{CellValue, FieldCheck, FieldRule, RowTable, RuleSet, SimpleRule};
//! use sheetval_validate::validate;
//!
//! let table = RowTable::from_sequential_rows([
//!     vec![CellValue::text("Name"), CellValue::text("City")],
//!     vec![CellValue::text(""), CellValue::text("Paris")],
//!     vec![CellValue::text("Ada"), CellValue::text("Lyon")],
//! ]);
//! let mut rules = RuleSet::new();
//! rules
//!     .simple_rules
//!     .push(SimpleRule::new("rule_1", "A", FieldRule::new(FieldCheck::NotBlank)));
//!
//! let errors = validate(&table, &rules);
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].coordinate(), "A2");
//! assert_eq!(errors[0].message, "Validation error NotBlank");
//! ```

pub mod condition;
pub mod conditional;
pub mod context;
pub mod dates;
pub mod engine;
pub mod fault;
pub mod multicolumn;
pub mod predicates;
pub mod syntax;

use sheetval_model::{RowTable, RuleSet, ValidationError};

pub use context::RunContext;
pub use engine::RuleEngine;
pub use fault::EvaluationFault;
pub use syntax::{BuiltinSyntax, FieldSyntax};

/// Validate with the built-in syntax checkers.
pub fn validate(table: &RowTable, rules: &RuleSet) -> Vec<ValidationError> {
    RuleEngine::new().validate(table, rules)
}
