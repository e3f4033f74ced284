//! Rule validation engine.
//!
//! One [`RuleEngine::validate`] call runs the four rule categories in a fixed
//! order (simple, multi-simple, conditional, multicolumn) over an immutable
//! snapshot and returns the errors in that order, row-ascending within each
//! category. All lookup tables live in a [`RunContext`] created for the call,
//! so an engine can be shared between runs.

use std::borrow::Cow;
use std::time::Instant;

use sheetval_model::{
    CellValue, FieldCheck, FieldRule, HEADER_ROW, HeaderConfig, RuleCategory, RowTable, RuleSet,
    ValidationError, column_letter,
};
use tracing::{debug, info, trace, warn};

use crate::conditional::{action_passes, conditions_hold};
use crate::context::RunContext;
use crate::multicolumn::{self, RowView};
use crate::predicates;
use crate::syntax::{BuiltinSyntax, FieldSyntax};

/// Evaluates rule sets against row snapshots.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine<S = BuiltinSyntax> {
    syntax: S,
}

impl RuleEngine {
    /// Engine with the built-in email and country checkers.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: FieldSyntax> RuleEngine<S> {
    /// Engine with custom email and country checkers.
    pub fn with_syntax(syntax: S) -> Self {
        Self { syntax }
    }

    /// Validate `table` against every active rule in `rules`.
    pub fn validate(&self, table: &RowTable, rules: &RuleSet) -> Vec<ValidationError> {
        let started = Instant::now();
        let mut context = RunContext::new(table);
        let mut errors = Vec::new();

        self.apply_simple_rules(&mut context, rules, &mut errors);
        let simple = errors.len();
        debug!(errors = simple, "simple rules applied");

        self.apply_multi_simple_rules(&mut context, rules, &mut errors);
        let multi_simple = errors.len() - simple;
        debug!(errors = multi_simple, "multi-simple rules applied");

        apply_conditional_rules(table, rules, &mut errors);
        let conditional = errors.len() - simple - multi_simple;
        debug!(errors = conditional, "conditional rules applied");

        apply_multicolumn_rules(&mut context, rules, &mut errors);
        let multicolumn = errors.len() - simple - multi_simple - conditional;
        debug!(errors = multicolumn, "multicolumn rules applied");

        info!(
            rows = table.len(),
            rules = rules.len(),
            errors = errors.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "validation finished"
        );
        errors
    }

    fn apply_simple_rules(
        &self,
        context: &mut RunContext<'_>,
        rules: &RuleSet,
        errors: &mut Vec<ValidationError>,
    ) {
        let table = context.table();
        let Some(last_skipped) = last_pre_data_row(table, &rules.header) else {
            warn!(
                header = ?rules.header,
                "header marker not found; simple rules skipped"
            );
            return;
        };

        let columns: Vec<String> = (0..table.width())
            .map(column_letter)
            .filter(|column| !rules.is_excluded(column))
            .collect();

        let first_row = last_skipped + 1;
        for (number, row) in table.rows().filter(|(number, _)| *number >= first_row) {
            for column in &columns {
                let cell = Cell {
                    row: number,
                    column,
                    value: row.get(column),
                    first_row,
                };
                let bound = rules.rules_for_column(column);
                if bound.is_empty() {
                    for rule in &rules.default_rules {
                        let category = RuleCategory::Simple;
                        self.apply_field_rule(context, rule, None, &cell, category, errors);
                    }
                } else {
                    for simple in bound {
                        self.apply_field_rule(
                            context,
                            &simple.rule,
                            Some(simple.id.as_str()),
                            &cell,
                            RuleCategory::Simple,
                            errors,
                        );
                    }
                }
            }
        }
    }

    fn apply_multi_simple_rules(
        &self,
        context: &mut RunContext<'_>,
        rules: &RuleSet,
        errors: &mut Vec<ValidationError>,
    ) {
        let table = context.table();
        for rule in rules.multi_simple_rules.iter().filter(|rule| rule.active) {
            for (number, row) in table.data_rows() {
                for column in &rule.columns {
                    let cell = Cell {
                        row: number,
                        column,
                        value: row.get(column),
                        first_row: HEADER_ROW + 1,
                    };
                    self.apply_field_rule(
                        context,
                        &rule.rule,
                        Some(rule.id.as_str()),
                        &cell,
                        RuleCategory::MultiSimple,
                        errors,
                    );
                }
            }
        }
    }

    fn apply_field_rule(
        &self,
        context: &mut RunContext<'_>,
        rule: &FieldRule,
        rule_id: Option<&str>,
        cell: &Cell<'_>,
        category: RuleCategory,
        errors: &mut Vec<ValidationError>,
    ) {
        let Cell {
            row,
            column,
            value,
            first_row,
        } = *cell;
        let value: Cow<'_, CellValue> = if rule.trim {
            value.trimmed()
        } else {
            Cow::Borrowed(value)
        };

        let passed = match &rule.check {
            FieldCheck::Duplicate { case_sensitive } => {
                value.is_blank()
                    || !context.is_duplicate(column, row, &value, *case_sensitive, first_row)
            }
            check => predicates::check(check, &value, &self.syntax),
        };

        if !passed {
            trace!(row, column, kind = rule.check.kind(), value = %value, "field rule failed");
            let mut error =
                ValidationError::single(row, column, &rule.message, value.into_owned(), category);
            if let Some(id) = rule_id {
                error = error.with_rule_id(id);
            }
            errors.push(error);
        }
    }
}

/// The cell a field rule is applied to.
#[derive(Clone, Copy)]
struct Cell<'a> {
    row: u32,
    column: &'a str,
    value: &'a CellValue,
    /// First row its category evaluates; duplicates are counted from here.
    first_row: u32,
}

/// Last row that simple rules skip, or `None` when the header marker is
/// missing and no row qualifies.
fn last_pre_data_row(table: &RowTable, header: &HeaderConfig) -> Option<u32> {
    match header {
        HeaderConfig::Flag(true) => Some(HEADER_ROW),
        HeaderConfig::Flag(false) => Some(0),
        HeaderConfig::Marker(marker) => {
            let marker = marker.trim();
            table
                .rows()
                .find(|(_, row)| {
                    row.cells()
                        .iter()
                        .any(|cell| cell.as_text().trim() == marker)
                })
                .map(|(number, _)| number)
        }
    }
}

fn apply_conditional_rules(table: &RowTable, rules: &RuleSet, errors: &mut Vec<ValidationError>) {
    for rule in rules.conditional_rules.iter().filter(|rule| rule.active) {
        for (number, row) in table.data_rows() {
            if !conditions_hold(rule, row) {
                continue;
            }
            for action in &rule.actions {
                let value = row.get(&action.column);
                if !action_passes(&action.kind, value) {
                    trace!(
                        row = number,
                        column = %action.column,
                        action = action.kind.kind(),
                        "action failed"
                    );
                    errors.push(
                        ValidationError::single(
                            number,
                            &action.column,
                            &rule.message,
                            value.clone(),
                            RuleCategory::Conditional,
                        )
                        .with_rule_id(&rule.id),
                    );
                }
            }
        }
    }
}

fn apply_multicolumn_rules(
    context: &mut RunContext<'_>,
    rules: &RuleSet,
    errors: &mut Vec<ValidationError>,
) {
    let table = context.table();
    for rule in rules.multicolumn_rules.iter().filter(|rule| rule.active) {
        for (number, row) in table.data_rows() {
            let values: Vec<&CellValue> =
                rule.columns.iter().map(|column| row.get(column)).collect();
            let view = RowView {
                number,
                row,
                columns: &rule.columns,
                values: &values,
            };
            let message = match multicolumn::evaluate(&rule.check, &view, context) {
                Ok(true) => continue,
                Ok(false) => Cow::Borrowed(rule.message.as_str()),
                Err(fault) => {
                    warn!(rule = %rule.id, row = number, %fault, "multicolumn rule faulted");
                    Cow::Owned(fault.message_for(rule.check.kind()))
                }
            };
            errors.push(
                ValidationError::spanning(
                    number,
                    rule.columns.clone(),
                    message,
                    values.into_iter().cloned().collect(),
                    RuleCategory::Multicolumn,
                )
                .with_rule_id(&rule.id),
            );
        }
    }
}
