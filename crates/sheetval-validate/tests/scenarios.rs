//! End-to-end validation runs over small tables.

use sheetval_model::{
    Action, ActionKind, CellValue, Condition, ConditionalRule, FieldCheck, FieldRule, Logic,
    MulticolumnCheck, MulticolumnRule, Operator, RowTable, RuleCategory, RuleSet, SimpleRule,
    ValidationError,
};
use sheetval_validate::{FieldSyntax, RuleEngine, validate};

fn table(rows: Vec<Vec<CellValue>>) -> RowTable {
    RowTable::from_sequential_rows(rows)
}

fn text(value: &str) -> CellValue {
    CellValue::text(value)
}

fn num(value: f64) -> CellValue {
    CellValue::Number(value)
}

fn coordinates(errors: &[ValidationError]) -> Vec<String> {
    errors.iter().map(ValidationError::coordinate).collect()
}

#[test]
fn not_blank_flags_the_empty_cell() {
    let table = table(vec![
        vec![text("Name"), text("City")],
        vec![text(""), text("Paris")],
        vec![text("x"), text("Lyon")],
    ]);
    let mut rules = RuleSet::new();
    rules.simple_rules.push(SimpleRule::new(
        "rule_1",
        "A",
        FieldRule::new(FieldCheck::NotBlank),
    ));

    let errors = validate(&table, &rules);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row, 2);
    assert_eq!(errors[0].columns, vec!["A"]);
    assert_eq!(errors[0].message, "Validation error NotBlank");
    assert_eq!(errors[0].category, RuleCategory::Simple);
}

#[test]
fn sum_equals_reports_all_values() {
    let table = table(vec![
        vec![text("A"), text("B"), text("Total")],
        vec![num(2.0), num(3.0), num(5.0)],
        vec![num(2.0), num(3.0), num(6.0)],
    ]);
    let mut rules = RuleSet::new();
    rules.multicolumn_rules.push(MulticolumnRule::new(
        "multi_1",
        &["A", "B", "C"],
        MulticolumnCheck::SumEquals {
            target_column: None,
            tolerance: 0.01,
        },
    ));

    let errors = validate(&table, &rules);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row, 3);
    assert_eq!(errors[0].values, vec![num(2.0), num(3.0), num(6.0)]);
    assert_eq!(errors[0].coordinate(), "A3+B3+C3");
    assert_eq!(errors[0].message, "Multicolumn validation error sum_equals");
}

#[test]
fn unique_combination_flags_both_rows() {
    let table = table(vec![
        vec![text("Id"), text("Code")],
        vec![num(1.0), text("x")],
        vec![num(1.0), text("X")],
    ]);
    let mut rules = RuleSet::new();
    rules.multicolumn_rules.push(MulticolumnRule::new(
        "multi_1",
        &["A", "B"],
        MulticolumnCheck::UniqueCombination {
            case_sensitive: false,
        },
    ));

    let errors = validate(&table, &rules);
    assert_eq!(coordinates(&errors), vec!["A2+B2", "A3+B3"]);
}

#[test]
fn conditional_action_fires_only_when_condition_holds() {
    let table = table(vec![
        vec![text("A"), text("B"), text("C"), text("Tier"), text("Amount")],
        vec![text("a"), text("b"), text("c"), text("VIP"), num(500.0)],
        vec![text("a"), text("b"), text("c"), text("Standard"), num(500.0)],
    ]);
    let mut rules = RuleSet::new();
    rules.conditional_rules.push(
        ConditionalRule::new(
            "cond_1",
            vec![Condition::new("D", Operator::Equals, "VIP")],
            Logic::And,
            vec![Action::new(
                "E",
                ActionKind::MustBeBetween {
                    min: 1000.0,
                    max: 10000.0,
                },
            )],
        )
        .with_message("VIP amount out of range"),
    );

    let errors = validate(&table, &rules);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].coordinate(), "E2");
    assert_eq!(errors[0].message, "VIP amount out of range");
    assert_eq!(errors[0].values, vec![num(500.0)]);
    assert_eq!(errors[0].rule_id.as_deref(), Some("cond_1"));
}

#[test]
fn date_before_passes_on_unparsable_dates() {
    let table = table(vec![
        vec![text("Start"), text("End")],
        vec![text("2024-01-10"), text("2024-01-05")],
        vec![text("not a date"), text("2024-01-05")],
    ]);
    let mut rules = RuleSet::new();
    rules.multicolumn_rules.push(MulticolumnRule::new(
        "multi_1",
        &["A", "B"],
        MulticolumnCheck::DateBefore,
    ));

    let errors = validate(&table, &rules);
    assert_eq!(coordinates(&errors), vec!["A2+B2"]);
}

#[test]
fn categories_run_in_fixed_order() {
    let table = table(vec![
        vec![text("Name"), text("Start"), text("End")],
        vec![text(""), text("2024-02-01"), text("2024-01-01")],
        vec![text(""), text("2024-02-01"), text("2024-01-01")],
    ]);
    let mut rules = RuleSet::new();
    rules.multicolumn_rules.push(MulticolumnRule::new(
        "multi_1",
        &["B", "C"],
        MulticolumnCheck::DateBefore,
    ));
    rules.simple_rules.push(SimpleRule::new(
        "rule_1",
        "A",
        FieldRule::new(FieldCheck::NotBlank),
    ));

    let categories: Vec<(RuleCategory, u32)> = validate(&table, &rules)
        .iter()
        .map(|error| (error.category, error.row))
        .collect();
    assert_eq!(
        categories,
        vec![
            (RuleCategory::Simple, 2),
            (RuleCategory::Simple, 3),
            (RuleCategory::Multicolumn, 2),
            (RuleCategory::Multicolumn, 3),
        ]
    );
}

#[test]
fn non_finite_sum_becomes_an_error_naming_the_kind() {
    let table = table(vec![
        vec![text("A"), text("B")],
        vec![text("inf"), num(1.0)],
    ]);
    let mut rules = RuleSet::new();
    rules.multicolumn_rules.push(MulticolumnRule::new(
        "multi_1",
        &["A", "B"],
        MulticolumnCheck::SumRange {
            min: 0.0,
            max: 10.0,
        },
    ));

    let errors = validate(&table, &rules);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("sum_range"));
}

struct AcceptAll;

impl FieldSyntax for AcceptAll {
    fn is_valid_email(&self, _text: &str) -> bool {
        true
    }

    fn is_known_country(&self, _text: &str) -> bool {
        true
    }
}

#[test]
fn syntax_checkers_are_pluggable() {
    let table = table(vec![vec![text("Email")], vec![text("not-an-email")]]);
    let mut rules = RuleSet::new();
    rules
        .simple_rules
        .push(SimpleRule::new("rule_1", "A", FieldRule::new(FieldCheck::Email)));

    assert_eq!(validate(&table, &rules).len(), 1);
    assert!(RuleEngine::with_syntax(AcceptAll)
        .validate(&table, &rules)
        .is_empty());
}
