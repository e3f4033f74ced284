//! Single-value predicates.
//!
//! Every predicate is total: a value that cannot be read the way the check
//! needs simply fails. Except for `NotBlank`, a missing value (absent or
//! zero-length text) passes.

use sheetval_model::value::parse_f64;
use sheetval_model::{CastType, CellValue, FieldCheck};

use crate::condition;
use crate::syntax::FieldSyntax;

/// Literal strings accepted by `Type(bool)`.
const BOOL_LITERALS: [&str; 6] = ["0", "1", "true", "false", "True", "False"];

/// Apply a predicate to a value that has already been trimmed if requested.
///
/// `Duplicate` depends on the whole column and is answered by the engine
/// through the run context; here it only applies the blank policy.
pub fn check<S: FieldSyntax + ?Sized>(check: &FieldCheck, value: &CellValue, syntax: &S) -> bool {
    match check {
        FieldCheck::NotBlank => return !value.is_blank(),
        FieldCheck::Duplicate { .. } => return true,
        _ if value.is_missing() => return true,
        _ => {}
    }

    match check {
        FieldCheck::Length { min, max } => {
            let length = value.as_text().trim().chars().count();
            min.is_none_or(|min| length >= min) && max.is_none_or(|max| length <= max)
        }
        FieldCheck::Type(cast) => is_castable(value, *cast),
        FieldCheck::Regex(pattern) => pattern.is_match(&value.as_text()),
        FieldCheck::Email => match value {
            CellValue::Text(text) => syntax.is_valid_email(text),
            _ => false,
        },
        FieldCheck::Choice {
            choices,
            case_sensitive,
        } => {
            let text = value.as_text();
            if *case_sensitive {
                choices.iter().any(|choice| *choice == text)
            } else {
                let text = text.to_lowercase();
                choices.iter().any(|choice| choice.to_lowercase() == text)
            }
        }
        FieldCheck::Country => syntax.is_known_country(&value.as_text()),
        FieldCheck::Date(format) => match value {
            CellValue::DateTime(_) => true,
            CellValue::Text(text) => format.parse(text).is_some(),
            _ => false,
        },
        FieldCheck::Comparison { operator, value: literal } => {
            condition::evaluate(value, *operator, literal)
        }
        FieldCheck::NotBlank | FieldCheck::Duplicate { .. } => true,
    }
}

fn is_castable(value: &CellValue, cast: CastType) -> bool {
    match cast {
        CastType::Integer => match value {
            CellValue::Number(number) => number.is_finite(),
            CellValue::Bool(_) => true,
            CellValue::Text(text) => text.trim().parse::<i128>().is_ok(),
            CellValue::Empty | CellValue::DateTime(_) => false,
        },
        CastType::Float => match value {
            CellValue::Number(_) | CellValue::Bool(_) => true,
            CellValue::Text(text) => parse_f64(text).is_some(),
            CellValue::Empty | CellValue::DateTime(_) => false,
        },
        CastType::Bool => BOOL_LITERALS.contains(&value.as_text().as_ref()),
    }
}
