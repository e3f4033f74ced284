//! Cross-column checks evaluated on one row.
//!
//! Column order matters: sums take the last column as their target, date
//! checks compare the first two columns, `percentage_of` reads the first
//! column as a share of the second.

use sheetval_model::{CellValue, Extremum, MulticolumnCheck, Row, SumOperator, TargetEnd};

use crate::context::RunContext;
use crate::dates::{day_difference, parse_date};
use crate::fault::{EvaluationFault, Outcome, finite};

/// Tolerance of the `equals` operator of `conditional_sum`.
const CONDITIONAL_SUM_TOLERANCE: f64 = 0.01;

/// One row as seen by a cross-column check.
pub struct RowView<'a> {
    pub number: u32,
    pub row: &'a Row,
    pub columns: &'a [String],
    pub values: &'a [&'a CellValue],
}

/// Evaluate a cross-column check on one row.
pub fn evaluate(
    check: &MulticolumnCheck,
    view: &RowView<'_>,
    context: &mut RunContext<'_>,
) -> Outcome {
    let values = view.values;
    match check {
        MulticolumnCheck::SumEquals {
            target_column,
            tolerance,
        } => sum_equals(view, target_column.as_deref(), *tolerance),
        MulticolumnCheck::SumRange { min, max } => {
            let Some(total) = sum(values.iter().copied())? else {
                return Ok(false);
            };
            Ok(*min <= total && total <= *max)
        }
        MulticolumnCheck::DateBefore => Ok(date_pair(values).is_none_or(|(a, b)| a < b)),
        MulticolumnCheck::DateAfter => Ok(date_pair(values).is_none_or(|(a, b)| a > b)),
        MulticolumnCheck::DateRange { min_days, max_days } => {
            Ok(date_pair(values).is_none_or(|(first, second)| {
                let days = day_difference(first, second).abs();
                *min_days <= days && days <= *max_days
            }))
        }
        MulticolumnCheck::PercentageOf {
            percentage,
            tolerance,
        } => percentage_of(values, *percentage, *tolerance),
        MulticolumnCheck::AllOrNone => {
            let filled = values.iter().filter(|value| !value.is_blank()).count();
            Ok(filled == 0 || filled == values.len())
        }
        MulticolumnCheck::UniqueCombination { case_sensitive } => {
            Ok(!context.is_repeated_combination(view.columns, view.number, *case_sensitive))
        }
        MulticolumnCheck::ConditionalSum {
            condition_column,
            condition_value,
            operator,
            target_value,
        } => {
            let Some(condition_column) = condition_column else {
                return Ok(true);
            };
            if view.row.get(condition_column).as_text() != condition_value.as_str() {
                return Ok(true);
            }
            let Some(total) = sum(values.iter().copied())? else {
                return Ok(false);
            };
            Ok(compare_sum(*operator, total, *target_value))
        }
        MulticolumnCheck::MaxMinCheck {
            operation,
            target,
            tolerance,
        } => max_min(values, *operation, *target, *tolerance),
    }
}

/// Numeric reading where a missing value counts as zero.
fn number_or_zero(value: &CellValue) -> Option<f64> {
    if value.is_missing() {
        Some(0.0)
    } else {
        value.as_number()
    }
}

/// Sum with missing values as zero; `None` when any value is not numeric.
fn sum<'a>(
    values: impl Iterator<Item = &'a CellValue>,
) -> Result<Option<f64>, EvaluationFault> {
    let mut total = 0.0;
    for value in values {
        let Some(number) = number_or_zero(value) else {
            return Ok(None);
        };
        total += number;
    }
    finite(total, "sum").map(Some)
}

fn sum_equals(view: &RowView<'_>, target_column: Option<&str>, tolerance: f64) -> Outcome {
    let values = view.values;
    let (sources, target): (Vec<&CellValue>, &CellValue) = match target_column {
        Some(target) => match view.columns.iter().position(|column| column == target) {
            Some(index) => (
                values
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != index)
                    .map(|(_, value)| *value)
                    .collect(),
                values[index],
            ),
            None => (values.to_vec(), view.row.get(target)),
        },
        None => match values.split_last() {
            Some((last, rest)) => (rest.to_vec(), *last),
            None => return Ok(true),
        },
    };

    let Some(total) = sum(sources.into_iter())? else {
        return Ok(false);
    };
    let Some(expected) = number_or_zero(target) else {
        return Ok(false);
    };
    let difference = finite((total - expected).abs(), "sum difference")?;
    Ok(difference <= tolerance)
}

fn date_pair(values: &[&CellValue]) -> Option<(chrono::NaiveDateTime, chrono::NaiveDateTime)> {
    let first = parse_date(values.first()?)?;
    let second = parse_date(values.get(1)?)?;
    Some((first, second))
}

fn percentage_of(values: &[&CellValue], percentage: f64, tolerance: f64) -> Outcome {
    let (Some(part), Some(whole)) = (values.first(), values.get(1)) else {
        return Ok(true);
    };
    let (Some(part), Some(whole)) = (number_or_zero(part), number_or_zero(whole)) else {
        return Ok(false);
    };
    if whole == 0.0 {
        return Ok(part == 0.0);
    }
    let expected = finite(whole * percentage / 100.0, "percentage")?;
    let deviation = finite((part - expected).abs(), "percentage deviation")?;
    Ok(deviation <= whole * tolerance)
}

fn compare_sum(operator: SumOperator, total: f64, target: f64) -> bool {
    match operator {
        SumOperator::GreaterThan => total > target,
        SumOperator::LessThan => total < target,
        SumOperator::Equals => (total - target).abs() <= CONDITIONAL_SUM_TOLERANCE,
        SumOperator::GreaterEqual => total >= target,
        SumOperator::LessEqual => total <= target,
    }
}

fn max_min(
    values: &[&CellValue],
    operation: Extremum,
    target: TargetEnd,
    tolerance: f64,
) -> Outcome {
    if values.len() < 2 {
        return Ok(true);
    }
    let (sources, target) = match target {
        TargetEnd::Last => (&values[..values.len() - 1], values[values.len() - 1]),
        TargetEnd::First => (&values[1..], values[0]),
    };

    let numbers: Vec<f64> = sources
        .iter()
        .filter(|value| !value.is_missing())
        .filter_map(|value| value.as_number())
        .collect();
    let expected = match operation {
        Extremum::Max => numbers.iter().copied().reduce(f64::max),
        Extremum::Min => numbers.iter().copied().reduce(f64::min),
    };
    let Some(expected) = expected else {
        return Ok(true);
    };
    if target.is_missing() {
        return Ok(false);
    }
    let Some(actual) = target.as_number() else {
        return Ok(false);
    };
    let difference = finite((actual - expected).abs(), "extremum difference")?;
    Ok(difference <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetval_model::RowTable;

    fn run(check: &MulticolumnCheck, cells: Vec<CellValue>) -> Outcome {
        let width = cells.len();
        run_columns(check, cells, width)
    }

    /// Evaluate with only the first `width` cells as rule columns.
    fn run_columns(check: &MulticolumnCheck, cells: Vec<CellValue>, width: usize) -> Outcome {
        let table = RowTable::from_rows([(2, cells)]);
        let columns: Vec<String> = (0..width).map(sheetval_model::column_letter).collect();
        let row = table.row(2).unwrap();
        let values: Vec<&CellValue> = columns.iter().map(|column| row.get(column)).collect();
        let view = RowView {
            number: 2,
            row,
            columns: &columns,
            values: &values,
        };
        let mut context = RunContext::new(&table);
        evaluate(check, &view, &mut context)
    }

    fn num(value: f64) -> CellValue {
        CellValue::Number(value)
    }

    #[test]
    fn sum_equals_uses_last_column_as_target() {
        let check = MulticolumnCheck::SumEquals {
            target_column: None,
            tolerance: 0.01,
        };
        assert_eq!(run(&check, vec![num(2.0), num(3.0), num(5.0)]), Ok(true));
        assert_eq!(run(&check, vec![num(2.0), num(3.0), num(6.0)]), Ok(false));
        assert_eq!(
            run(&check, vec![num(2.0), CellValue::Empty, num(2.0)]),
            Ok(true)
        );
        assert_eq!(
            run(&check, vec![num(2.0), CellValue::text("x"), num(2.0)]),
            Ok(false)
        );
    }

    #[test]
    fn sum_equals_target_column_override() {
        let check = MulticolumnCheck::SumEquals {
            target_column: Some("A".to_string()),
            tolerance: 0.0,
        };
        assert_eq!(run(&check, vec![num(5.0), num(2.0), num(3.0)]), Ok(true));
        assert_eq!(run(&check, vec![num(2.0), num(3.0), num(5.0)]), Ok(false));
    }

    #[test]
    fn sum_overflow_is_a_fault() {
        let check = MulticolumnCheck::SumRange {
            min: 0.0,
            max: f64::INFINITY,
        };
        assert!(matches!(
            run(&check, vec![CellValue::text("inf"), num(1.0)]),
            Err(EvaluationFault::NonFinite { .. })
        ));
        assert_eq!(run(&check, vec![num(1.0), CellValue::Empty]), Ok(true));
    }

    #[test]
    fn percentage_of_with_zero_base() {
        let check = MulticolumnCheck::PercentageOf {
            percentage: 20.0,
            tolerance: 0.05,
        };
        assert_eq!(run(&check, vec![num(20.0), num(100.0)]), Ok(true));
        assert_eq!(run(&check, vec![num(25.0), num(100.0)]), Ok(true));
        assert_eq!(run(&check, vec![num(26.0), num(100.0)]), Ok(false));
        assert_eq!(run(&check, vec![num(0.0), num(0.0)]), Ok(true));
        assert_eq!(run(&check, vec![num(1.0), CellValue::Empty]), Ok(false));
        assert_eq!(
            run(&check, vec![CellValue::text("abc"), num(10.0)]),
            Ok(false)
        );
    }

    #[test]
    fn all_or_none_counts_blank_cells() {
        let check = MulticolumnCheck::AllOrNone;
        assert_eq!(
            run(&check, vec![CellValue::text("a"), CellValue::text("b")]),
            Ok(true)
        );
        assert_eq!(
            run(&check, vec![CellValue::text(" "), CellValue::Empty, CellValue::text("")]),
            Ok(true)
        );
        assert_eq!(
            run(&check, vec![CellValue::text("a"), CellValue::Empty, CellValue::text("c")]),
            Ok(false)
        );
    }

    #[test]
    fn date_checks_pass_vacuously_on_unparsable_dates() {
        let before = MulticolumnCheck::DateBefore;
        assert_eq!(
            run(&before, vec![CellValue::text("2024-01-05"), CellValue::text("2024-01-10")]),
            Ok(true)
        );
        assert_eq!(
            run(&before, vec![CellValue::text("2024-01-10"), CellValue::text("2024-01-10")]),
            Ok(false)
        );
        assert_eq!(
            run(&before, vec![CellValue::text("soon"), CellValue::text("2024-01-10")]),
            Ok(true)
        );

        let range = MulticolumnCheck::DateRange {
            min_days: 1,
            max_days: 7,
        };
        assert_eq!(
            run(&range, vec![CellValue::text("2024-01-10"), CellValue::text("2024-01-05")]),
            Ok(true)
        );
        assert_eq!(
            run(&range, vec![CellValue::text("2024-01-01"), CellValue::text("2024-01-09")]),
            Ok(false)
        );
    }

    #[test]
    fn conditional_sum_only_applies_when_condition_matches() {
        let check = MulticolumnCheck::ConditionalSum {
            condition_column: Some("C".to_string()),
            condition_value: "VIP".to_string(),
            operator: SumOperator::GreaterThan,
            target_value: 100.0,
        };
        assert_eq!(
            run_columns(&check, vec![num(10.0), num(20.0), CellValue::text("VIP")], 2),
            Ok(false)
        );
        assert_eq!(
            run_columns(&check, vec![num(60.0), num(50.0), CellValue::text("VIP")], 2),
            Ok(true)
        );
        assert_eq!(
            run_columns(&check, vec![num(10.0), num(20.0), CellValue::text("Standard")], 2),
            Ok(true)
        );
        // The condition cell compares untrimmed.
        assert_eq!(
            run_columns(&check, vec![num(10.0), num(20.0), CellValue::text("VIP ")], 2),
            Ok(true)
        );

        let unset = MulticolumnCheck::ConditionalSum {
            condition_column: None,
            condition_value: "VIP".to_string(),
            operator: SumOperator::GreaterThan,
            target_value: 100.0,
        };
        assert_eq!(
            run_columns(&unset, vec![num(10.0), num(20.0), CellValue::text("VIP")], 2),
            Ok(true)
        );
    }

    #[test]
    fn max_min_skips_non_numeric_sources() {
        let check = MulticolumnCheck::MaxMinCheck {
            operation: Extremum::Max,
            target: TargetEnd::Last,
            tolerance: 0.01,
        };
        assert_eq!(
            run(&check, vec![num(3.0), CellValue::text("n/a"), num(7.0), num(7.0)]),
            Ok(true)
        );
        assert_eq!(run(&check, vec![num(3.0), num(7.0), num(3.0)]), Ok(false));
        assert_eq!(
            run(&check, vec![num(3.0), num(7.0), CellValue::Empty]),
            Ok(false)
        );
        assert_eq!(
            run(&check, vec![CellValue::text("n/a"), CellValue::Empty, CellValue::text("?")]),
            Ok(true)
        );

        let min_first = MulticolumnCheck::MaxMinCheck {
            operation: Extremum::Min,
            target: TargetEnd::First,
            tolerance: 0.01,
        };
        assert_eq!(run(&min_first, vec![num(2.0), num(5.0), num(2.0)]), Ok(true));
    }
}
