//! Condition evaluation: one cell value against one literal.

use sheetval_model::value::parse_f64;
use sheetval_model::{CellValue, Operator};

/// Evaluate `value <operator> literal`.
///
/// String operators compare trimmed text. Numeric operators parse both sides
/// as floats; when either side does not parse the condition is unmet.
pub fn evaluate(value: &CellValue, operator: Operator, literal: &str) -> bool {
    let text = value.as_text();
    let text = text.trim();
    let literal = literal.trim();

    match operator {
        Operator::Equals => text == literal,
        Operator::NotEquals => text != literal,
        Operator::StartsWith => text.starts_with(literal),
        Operator::EndsWith => text.ends_with(literal),
        Operator::Contains => text.contains(literal),
        Operator::NotContains => !text.contains(literal),
        Operator::IsEmpty => text.is_empty(),
        Operator::IsNotEmpty => !text.is_empty(),
        Operator::GreaterThan
        | Operator::LessThan
        | Operator::GreaterEqual
        | Operator::LessEqual => {
            let (Some(left), Some(right)) = (value.as_number(), parse_f64(literal)) else {
                return false;
            };
            compare(operator, left, right)
        }
    }
}

fn compare(operator: Operator, left: f64, right: f64) -> bool {
    match operator {
        Operator::GreaterThan => left > right,
        Operator::LessThan => left < right,
        Operator::GreaterEqual => left >= right,
        Operator::LessEqual => left <= right,
        _ => false,
    }
}
