//! Data model shared by the sheetval crates: cell values, the row table
//! snapshot, typed rule sets and validation errors.

pub mod check;
pub mod column;
pub mod error;
pub mod rule;
pub mod table;
pub mod validation;
pub mod value;

pub use check::{
    ActionKind, CastType, DateFormat, Extremum, FieldCheck, FieldRule, MulticolumnCheck, Operator,
    Pattern, SumOperator, TargetEnd,
};
pub use column::{cell_address, column_index, column_letter, coordinate, split_address};
pub use error::{ModelError, Result};
pub use rule::{
    Action, Condition, ConditionalRule, HeaderConfig, Logic, MultiSimpleRule, MulticolumnRule,
    RuleCategory, RuleSet, SimpleRule,
};
pub use table::{HEADER_ROW, HeaderMap, Row, RowTable};
pub use validation::{ValidationError, source_failure};
pub use value::CellValue;
