//! Conditional rules: combined conditions gating per-column actions.

use sheetval_model::{ActionKind, CellValue, ConditionalRule, Logic, Row};

use crate::condition;

/// True when the rule's conditions, combined with its logic, hold on `row`.
pub fn conditions_hold(rule: &ConditionalRule, row: &Row) -> bool {
    let mut results = rule
        .conditions
        .iter()
        .map(|c| condition::evaluate(row.get(&c.column), c.operator, &c.value));
    match rule.logic {
        Logic::And => results.all(|held| held),
        Logic::Or => results.any(|held| held),
    }
}

/// True when an action's value satisfies it.
pub fn action_passes(kind: &ActionKind, value: &CellValue) -> bool {
    match kind {
        ActionKind::MustBeEmpty => value.is_blank(),
        ActionKind::MustNotBeEmpty => !value.is_blank(),
        ActionKind::MustBeBetween { min, max } => value
            .as_number()
            .is_some_and(|number| *min <= number && number <= *max),
        ActionKind::MustBeInList { values } => {
            let text = value.as_text();
            values.iter().any(|allowed| *allowed == text)
        }
        ActionKind::MustMatchPattern(pattern) => pattern.is_match(&value.as_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetval_model::{Action, Condition, Operator, Pattern};

    fn row(cells: &[&str]) -> Row {
        Row::new(cells.iter().map(|cell| CellValue::from(*cell)).collect())
    }

    fn rule(logic: Logic) -> ConditionalRule {
        ConditionalRule::new(
            "cond_1",
            vec![
                Condition::new("A", Operator::Equals, "VIP"),
                Condition::new("B", Operator::GreaterThan, "100"),
            ],
            logic,
            vec![Action::new("C", ActionKind::MustNotBeEmpty)],
        )
    }

    #[test]
    fn and_requires_every_condition() {
        let rule = rule(Logic::And);
        assert!(conditions_hold(&rule, &row(&["VIP", "150"])));
        assert!(!conditions_hold(&rule, &row(&["VIP", "50"])));
    }

    #[test]
    fn or_requires_one_condition() {
        let rule = rule(Logic::Or);
        assert!(conditions_hold(&rule, &row(&["VIP", "50"])));
        assert!(conditions_hold(&rule, &row(&["Std", "150"])));
        assert!(!conditions_hold(&rule, &row(&["Std", "abc"])));
    }

    #[test]
    fn actions() {
        let between = ActionKind::MustBeBetween {
            min: 1000.0,
            max: 10000.0,
        };
        assert!(action_passes(&between, &CellValue::Number(1000.0)));
        assert!(!action_passes(&between, &CellValue::Number(500.0)));
        assert!(!action_passes(&between, &CellValue::text("lots")));
        assert!(!action_passes(&between, &CellValue::Empty));

        let list = ActionKind::MustBeInList {
            values: vec!["Gold".to_string(), "5".to_string()],
        };
        assert!(action_passes(&list, &CellValue::text("Gold")));
        assert!(action_passes(&list, &CellValue::Number(5.0)));
        assert!(!action_passes(&list, &CellValue::text("Gold ")));

        let pattern = ActionKind::MustMatchPattern(Pattern::new("[A-Z]{2}").unwrap());
        assert!(action_passes(&pattern, &CellValue::text("FR-1")));
        assert!(!action_passes(&pattern, &CellValue::text("fr")));

        assert!(action_passes(&ActionKind::MustBeEmpty, &CellValue::text(" ")));
        assert!(!action_passes(&ActionKind::MustNotBeEmpty, &CellValue::Empty));
    }
}
