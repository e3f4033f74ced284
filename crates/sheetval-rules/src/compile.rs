//! Compilation of a rule document into a typed rule set.
//!
//! Every parameter a rule kind needs is checked here, so the engine never sees
//! a malformed rule. Inactive rules that fail to compile are dropped with a
//! warning instead of failing the whole document.

use std::collections::HashSet;

use sheetval_model::check::{
    DEFAULT_PERCENTAGE_TOLERANCE, DEFAULT_SUM_TOLERANCE, default_multi_simple_message,
    default_simple_message,
};
use sheetval_model::{
    Action, ActionKind, CastType, Condition, ConditionalRule, DateFormat, Extremum, FieldCheck,
    FieldRule, HeaderConfig, Logic, MultiSimpleRule, MulticolumnCheck, MulticolumnRule, Operator,
    Pattern, RuleSet, SimpleRule, SumOperator, TargetEnd,
};
use tracing::{debug, warn};

use crate::document::{
    ActionEntry, ConditionalRuleEntry, DefaultRuleEntry, MultiSimpleRuleEntry,
    MulticolumnRuleEntry, Params, RuleDocument, SimpleRuleEntry,
};
use crate::error::{Result, RuleError};
use crate::params::{ParamReader, value_text};

/// Default bounds of a `must_be_between` action.
const DEFAULT_BETWEEN_MIN: f64 = 0.0;
const DEFAULT_BETWEEN_MAX: f64 = 100.0;

/// Default bounds of a `date_range` rule, in days.
const DEFAULT_MIN_DAYS: i64 = 0;
const DEFAULT_MAX_DAYS: i64 = 365;

/// Canonical column identifier: trimmed, upper-case letters.
pub fn normalize_column(column: &str) -> String {
    column.trim().to_ascii_uppercase()
}

fn column_id(rule_id: &str, column: &str) -> Result<String> {
    let column = normalize_column(column);
    if column.is_empty() {
        return Err(RuleError::EmptyColumn {
            rule_id: rule_id.to_string(),
        });
    }
    Ok(column)
}

fn column_ids(rule_id: &str, kind: &str, columns: &[String]) -> Result<Vec<String>> {
    let columns = columns
        .iter()
        .map(|column| column_id(rule_id, column))
        .collect::<Result<Vec<_>>>()?;
    if columns.len() < 2 {
        return Err(RuleError::TooFewColumns {
            rule_id: rule_id.to_string(),
            kind: kind.to_string(),
            min: 2,
            found: columns.len(),
        });
    }
    Ok(columns)
}

fn message_or(message: &str, default: impl FnOnce() -> String) -> String {
    if message.trim().is_empty() {
        default()
    } else {
        message.to_string()
    }
}

/// Build a single-value predicate from its kind name and parameters.
pub fn field_check(rule_id: &str, kind: &str, params: &Params) -> Result<FieldCheck> {
    let reader = ParamReader::new(rule_id, kind, params);
    let check = match kind {
        "NotBlank" => FieldCheck::NotBlank,
        "Length" => {
            let min = reader.usize("min")?;
            let max = reader.usize("max")?;
            if let (Some(min), Some(max)) = (min, max)
                && min > max
            {
                return Err(reader.range_error("min", min as f64, max as f64));
            }
            FieldCheck::Length { min, max }
        }
        "Type" => {
            let name = reader.text("type").ok_or_else(|| reader.missing("type"))?;
            let cast = CastType::parse(&name).ok_or_else(|| RuleError::InvalidParam {
                rule_id: rule_id.to_string(),
                kind: kind.to_string(),
                param: "type",
                reason: format!("unknown type '{name}' (expected integer, float or bool)"),
            })?;
            FieldCheck::Type(cast)
        }
        "Regex" => {
            let pattern = reader
                .text("pattern")
                .ok_or_else(|| reader.missing("pattern"))?;
            FieldCheck::Regex(Pattern::new(pattern).map_err(|e| reader.model_error(e))?)
        }
        "Email" => FieldCheck::Email,
        "Choice" => {
            let choices = reader
                .list("choices")?
                .ok_or_else(|| reader.missing("choices"))?;
            FieldCheck::Choice {
                choices,
                case_sensitive: reader.bool_any(&["caseSensitive", "case_sensitive"], true)?,
            }
        }
        "Country" => FieldCheck::Country,
        "Date" | "ExcelDate" => {
            let format = match reader.text("format") {
                Some(format) => DateFormat::new(format).map_err(|e| reader.model_error(e))?,
                None => DateFormat::default(),
            };
            FieldCheck::Date(format)
        }
        "Comparison" => {
            let name = reader
                .text("operator")
                .ok_or_else(|| reader.missing("operator"))?;
            let operator = Operator::parse(&name).ok_or_else(|| RuleError::UnknownOperator {
                rule_id: rule_id.to_string(),
                operator: name.clone(),
            })?;
            FieldCheck::Comparison {
                operator,
                value: reader.raw_text("value").unwrap_or_default(),
            }
        }
        "Duplicate" => FieldCheck::Duplicate {
            case_sensitive: reader.bool_any(&["caseSensitive", "case_sensitive"], true)?,
        },
        other => {
            return Err(RuleError::UnknownKind {
                rule_id: rule_id.to_string(),
                category: "simple",
                kind: other.to_string(),
            });
        }
    };
    Ok(check)
}

fn field_rule(
    rule_id: &str,
    kind: &str,
    params: &Params,
    message: String,
) -> Result<FieldRule> {
    let check = field_check(rule_id, kind, params)?;
    let trim = ParamReader::new(rule_id, kind, params).bool_or("trim", false)?;
    Ok(FieldRule {
        check,
        trim,
        message,
    })
}

pub fn compile_simple(entry: &SimpleRuleEntry) -> Result<SimpleRule> {
    let message = message_or(&entry.message, || default_simple_message(&entry.rule_type));
    Ok(SimpleRule {
        id: entry.id.clone(),
        column: column_id(&entry.id, &entry.column)?,
        rule: field_rule(&entry.id, &entry.rule_type, &entry.params, message)?,
        active: entry.active,
    })
}

pub fn compile_multi_simple(entry: &MultiSimpleRuleEntry) -> Result<MultiSimpleRule> {
    let message = message_or(&entry.message, || {
        default_multi_simple_message(&entry.rule_type)
    });
    Ok(MultiSimpleRule {
        id: entry.id.clone(),
        columns: column_ids(&entry.id, &entry.rule_type, &entry.columns)?,
        rule: field_rule(&entry.id, &entry.rule_type, &entry.params, message)?,
        active: entry.active,
    })
}

fn compile_default(index: usize, entry: &DefaultRuleEntry) -> Result<FieldRule> {
    let rule_id = format!("default_{}", index + 1);
    let message = message_or(&entry.message, || default_simple_message(&entry.rule_type));
    field_rule(&rule_id, &entry.rule_type, &entry.params, message)
}

fn compile_action(rule_id: &str, entry: &ActionEntry) -> Result<Action> {
    let reader = ParamReader::new(rule_id, &entry.kind, &entry.params);
    let kind = match entry.kind.as_str() {
        "must_be_empty" => ActionKind::MustBeEmpty,
        "must_not_be_empty" => ActionKind::MustNotBeEmpty,
        "must_be_between" => {
            let min = reader.f64_or("min", DEFAULT_BETWEEN_MIN)?;
            let max = reader.f64_or("max", DEFAULT_BETWEEN_MAX)?;
            if min > max {
                return Err(reader.range_error("min", min, max));
            }
            ActionKind::MustBeBetween { min, max }
        }
        "must_be_in_list" => ActionKind::MustBeInList {
            values: reader.list("values")?.unwrap_or_default(),
        },
        "must_match_pattern" => {
            let pattern = reader.raw_text("pattern").unwrap_or_default();
            ActionKind::MustMatchPattern(Pattern::new(pattern).map_err(|e| reader.model_error(e))?)
        }
        other => {
            return Err(RuleError::UnknownKind {
                rule_id: rule_id.to_string(),
                category: "conditional action",
                kind: other.to_string(),
            });
        }
    };
    Ok(Action {
        column: column_id(rule_id, &entry.column)?,
        kind,
    })
}

pub fn compile_conditional(entry: &ConditionalRuleEntry) -> Result<ConditionalRule> {
    let rule_id = entry.id.as_str();
    let logic = Logic::parse(&entry.logic).ok_or_else(|| RuleError::UnknownLogic {
        rule_id: rule_id.to_string(),
        logic: entry.logic.clone(),
    })?;
    let conditions = entry
        .conditions
        .iter()
        .map(|condition| {
            let operator = Operator::parse(&condition.operator).ok_or_else(|| {
                RuleError::UnknownOperator {
                    rule_id: rule_id.to_string(),
                    operator: condition.operator.clone(),
                }
            })?;
            Ok(Condition {
                column: column_id(rule_id, &condition.column)?,
                operator,
                value: value_text(&condition.value),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let actions = entry
        .actions
        .iter()
        .map(|action| compile_action(rule_id, action))
        .collect::<Result<Vec<_>>>()?;
    Ok(ConditionalRule {
        id: entry.id.clone(),
        conditions,
        logic,
        actions,
        message: message_or(&entry.message, || {
            sheetval_model::check::DEFAULT_CONDITIONAL_MESSAGE.to_string()
        }),
        active: entry.active,
    })
}

/// Build a cross-column check from its kind name and parameters.
pub fn multicolumn_check(rule_id: &str, kind: &str, params: &Params) -> Result<MulticolumnCheck> {
    let reader = ParamReader::new(rule_id, kind, params);
    let check = match kind {
        "sum_equals" => MulticolumnCheck::SumEquals {
            target_column: reader.text("target_column").map(|c| normalize_column(&c)),
            tolerance: reader.tolerance("tolerance", DEFAULT_SUM_TOLERANCE)?,
        },
        "sum_range" => {
            let min = reader.f64_or("min_value", 0.0)?;
            let max = reader.f64_or("max_value", f64::INFINITY)?;
            if min > max {
                return Err(reader.range_error("min_value", min, max));
            }
            MulticolumnCheck::SumRange { min, max }
        }
        "date_before" => MulticolumnCheck::DateBefore,
        "date_after" => MulticolumnCheck::DateAfter,
        "date_range" => {
            let min_days = reader.i64("min_days")?.unwrap_or(DEFAULT_MIN_DAYS);
            let max_days = reader.i64("max_days")?.unwrap_or(DEFAULT_MAX_DAYS);
            if min_days > max_days {
                return Err(reader.range_error("min_days", min_days as f64, max_days as f64));
            }
            MulticolumnCheck::DateRange { min_days, max_days }
        }
        "percentage_of" => MulticolumnCheck::PercentageOf {
            percentage: reader
                .f64("percentage")?
                .ok_or_else(|| reader.missing("percentage"))?,
            tolerance: reader.tolerance("tolerance", DEFAULT_PERCENTAGE_TOLERANCE)?,
        },
        "all_or_none" => MulticolumnCheck::AllOrNone,
        "unique_combination" => MulticolumnCheck::UniqueCombination {
            case_sensitive: reader.bool_any(&["case_sensitive", "caseSensitive"], true)?,
        },
        "conditional_sum" => {
            let condition_column = reader.text("condition_column").map(|c| normalize_column(&c));
            if condition_column.is_none() {
                warn!(
                    rule_id,
                    "conditional_sum has no condition_column; the rule passes on every row"
                );
            }
            let name = reader
                .text("operator")
                .unwrap_or_else(|| SumOperator::GreaterThan.as_str().to_string());
            let operator = SumOperator::parse(&name).ok_or_else(|| RuleError::UnknownOperator {
                rule_id: rule_id.to_string(),
                operator: name.clone(),
            })?;
            MulticolumnCheck::ConditionalSum {
                condition_column,
                condition_value: reader.raw_text("condition_value").unwrap_or_default(),
                operator,
                target_value: reader.f64_or("target_value", 0.0)?,
            }
        }
        "max_min_check" => {
            let operation = match reader
                .text("operation")
                .unwrap_or_else(|| "max".to_string())
                .to_lowercase()
                .as_str()
            {
                "max" => Extremum::Max,
                "min" => Extremum::Min,
                other => {
                    return Err(RuleError::InvalidParam {
                        rule_id: rule_id.to_string(),
                        kind: kind.to_string(),
                        param: "operation",
                        reason: format!("expected max or min, found '{other}'"),
                    });
                }
            };
            let target = match reader
                .text("target_column")
                .unwrap_or_else(|| "last".to_string())
                .to_lowercase()
                .as_str()
            {
                "last" => TargetEnd::Last,
                "first" => TargetEnd::First,
                other => {
                    return Err(RuleError::InvalidParam {
                        rule_id: rule_id.to_string(),
                        kind: kind.to_string(),
                        param: "target_column",
                        reason: format!("expected first or last, found '{other}'"),
                    });
                }
            };
            MulticolumnCheck::MaxMinCheck {
                operation,
                target,
                tolerance: reader.tolerance("tolerance", DEFAULT_SUM_TOLERANCE)?,
            }
        }
        other => {
            return Err(RuleError::UnknownKind {
                rule_id: rule_id.to_string(),
                category: "multicolumn",
                kind: other.to_string(),
            });
        }
    };
    Ok(check)
}

pub fn compile_multicolumn(entry: &MulticolumnRuleEntry) -> Result<MulticolumnRule> {
    let check = multicolumn_check(&entry.id, &entry.rule_type, &entry.params)?;
    Ok(MulticolumnRule {
        id: entry.id.clone(),
        columns: column_ids(&entry.id, &entry.rule_type, &entry.columns)?,
        message: message_or(&entry.message, || {
            sheetval_model::check::default_multicolumn_message(check.kind())
        }),
        check,
        active: entry.active,
    })
}

/// Compile one category, keeping inactive rules that compile and dropping
/// inactive rules that do not.
fn compile_category<E, T>(
    category: &'static str,
    entries: &[E],
    id: impl Fn(&E) -> &str,
    active: impl Fn(&E) -> bool,
    compile: impl Fn(&E) -> Result<T>,
) -> Result<Vec<T>> {
    let mut seen = HashSet::new();
    let mut compiled = Vec::with_capacity(entries.len());
    for entry in entries {
        let rule_id = id(entry);
        if !seen.insert(rule_id.to_string()) {
            return Err(RuleError::DuplicateId {
                rule_id: rule_id.to_string(),
                category,
            });
        }
        match compile(entry) {
            Ok(rule) => compiled.push(rule),
            Err(error) if !active(entry) => {
                warn!(rule_id, %error, "dropping inactive rule that does not compile");
            }
            Err(error) => return Err(error),
        }
    }
    Ok(compiled)
}

/// Compile a whole document, settings included.
pub fn compile(document: &RuleDocument) -> Result<RuleSet> {
    let simple_rules = compile_category(
        "simple_rules",
        &document.simple_rules,
        |entry| entry.id.as_str(),
        |entry| entry.active,
        compile_simple,
    )?;
    let multi_simple_rules = compile_category(
        "multi_simple_rules",
        &document.multi_simple_rules,
        |entry| entry.id.as_str(),
        |entry| entry.active,
        compile_multi_simple,
    )?;
    let conditional_rules = compile_category(
        "conditional_rules",
        &document.conditional_rules,
        |entry| entry.id.as_str(),
        |entry| entry.active,
        compile_conditional,
    )?;
    let multicolumn_rules = compile_category(
        "multicolumn_rules",
        &document.multicolumn_rules,
        |entry| entry.id.as_str(),
        |entry| entry.active,
        compile_multicolumn,
    )?;

    let settings = &document.settings;
    let default_rules = settings
        .default_rules
        .iter()
        .enumerate()
        .map(|(index, entry)| compile_default(index, entry))
        .collect::<Result<Vec<_>>>()?;
    let header = match &settings.header {
        HeaderConfig::Marker(marker) if marker.trim().is_empty() => HeaderConfig::default(),
        other => other.clone(),
    };
    let reference_column = match normalize_column(&settings.reference_column) {
        column if column.is_empty() => sheetval_model::rule::DEFAULT_REFERENCE_COLUMN.to_string(),
        column => column,
    };

    let rules = RuleSet {
        simple_rules,
        multi_simple_rules,
        conditional_rules,
        multicolumn_rules,
        default_rules,
        excludes: settings
            .excludes
            .iter()
            .map(|column| normalize_column(column))
            .filter(|column| !column.is_empty())
            .collect(),
        header,
        reference_column,
    };
    debug!(
        simple = rules.simple_rules.len(),
        multi_simple = rules.multi_simple_rules.len(),
        conditional = rules.conditional_rules.len(),
        multicolumn = rules.multicolumn_rules.len(),
        default = rules.default_rules.len(),
        "compiled rule document"
    );
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    fn simple(id: &str, column: &str, kind: &str, value: serde_json::Value) -> SimpleRuleEntry {
        SimpleRuleEntry {
            id: id.to_string(),
            column: column.to_string(),
            rule_type: kind.to_string(),
            params: params(value),
            message: String::new(),
            active: true,
            created_at: None,
        }
    }

    #[test]
    fn simple_rule_gets_default_message_and_trim() {
        let rule = compile_simple(&simple("r1", " a ", "NotBlank", json!({"trim": true}))).unwrap();
        assert_eq!(rule.column, "A");
        assert!(rule.rule.trim);
        assert_eq!(rule.rule.message, "Validation error NotBlank");
    }

    #[test]
    fn excel_date_is_a_date_alias() {
        let check = field_check("r", "ExcelDate", &params(json!({"format": "%d/%m/%Y"}))).unwrap();
        assert!(matches!(&check, FieldCheck::Date(format) if format.as_str() == "%d/%m/%Y"));
    }

    #[test]
    fn missing_required_params_are_rejected() {
        for (kind, value) in [
            ("Regex", json!({})),
            ("Choice", json!({})),
            ("Type", json!({})),
            ("Comparison", json!({"value": 3})),
        ] {
            let error = field_check("r", kind, &params(value)).unwrap_err();
            assert!(
                matches!(error, RuleError::MissingParam { .. }),
                "{kind}: {error}"
            );
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let error = field_check("r", "Palindrome", &Params::new()).unwrap_err();
        assert!(matches!(error, RuleError::UnknownKind { .. }));
    }

    #[test]
    fn multicolumn_needs_two_columns() {
        let entry = MulticolumnRuleEntry {
            id: "m1".to_string(),
            columns: vec!["A".to_string()],
            rule_type: "all_or_none".to_string(),
            params: Params::new(),
            message: String::new(),
            active: true,
            created_at: None,
        };
        let error = compile_multicolumn(&entry).unwrap_err();
        assert!(matches!(error, RuleError::TooFewColumns { found: 1, .. }));
    }

    #[test]
    fn multicolumn_defaults() {
        let check = multicolumn_check("m", "sum_equals", &Params::new()).unwrap();
        assert_eq!(
            check,
            MulticolumnCheck::SumEquals {
                target_column: None,
                tolerance: 0.01
            }
        );
        let check = multicolumn_check("m", "date_range", &Params::new()).unwrap();
        assert_eq!(
            check,
            MulticolumnCheck::DateRange {
                min_days: 0,
                max_days: 365
            }
        );
        let check = multicolumn_check("m", "conditional_sum", &Params::new()).unwrap();
        assert!(matches!(
            check,
            MulticolumnCheck::ConditionalSum {
                condition_column: None,
                operator: SumOperator::GreaterThan,
                ..
            }
        ));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let error = multicolumn_check(
            "m",
            "sum_range",
            &params(json!({"min_value": 10, "max_value": 1})),
        )
        .unwrap_err();
        assert!(matches!(error, RuleError::InvalidParam { .. }));
    }

    #[test]
    fn inactive_broken_rules_are_dropped() {
        let mut document = RuleDocument::new();
        let mut broken = simple("r1", "A", "Regex", json!({}));
        broken.active = false;
        document.simple_rules.push(broken);
        document
            .simple_rules
            .push(simple("r2", "B", "NotBlank", json!({})));
        let rules = compile(&document).unwrap();
        assert_eq!(rules.simple_rules.len(), 1);
        assert_eq!(rules.simple_rules[0].id, "r2");
    }

    #[test]
    fn active_broken_rule_fails_the_document() {
        let mut document = RuleDocument::new();
        document
            .simple_rules
            .push(simple("r1", "A", "Regex", json!({"pattern": "("})));
        assert!(matches!(
            compile(&document),
            Err(RuleError::Model { .. })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut document = RuleDocument::new();
        document
            .simple_rules
            .push(simple("r1", "A", "NotBlank", json!({})));
        document
            .simple_rules
            .push(simple("r1", "B", "NotBlank", json!({})));
        assert!(matches!(
            compile(&document),
            Err(RuleError::DuplicateId { .. })
        ));
    }

    #[test]
    fn settings_are_normalized() {
        let mut document = RuleDocument::new();
        document.settings.excludes = vec!["c".to_string(), " ".to_string()];
        document.settings.reference_column = "d".to_string();
        document.settings.header = HeaderConfig::Marker("  ".to_string());
        let rules = compile(&document).unwrap();
        assert_eq!(rules.excludes, vec!["C".to_string()]);
        assert_eq!(rules.reference_column, "D");
        assert_eq!(rules.header, HeaderConfig::Flag(true));
    }
}
