use std::path::Path;

use anyhow::{Context, Result, bail};
use sheetval_ingest::list_sheets;
use sheetval_rules::{RuleStore, field_kinds, multicolumn_kinds};
use tracing::info;

use sheetval_cli::params::{parse_action, parse_condition, parse_params, split_columns};
use sheetval_cli::pipeline::{RunOptions, RunOutcome, run_validation};

use crate::cli::{RulesArgs, RulesCommand, ValidateArgs};
use crate::summary::{print_kinds, print_rules, print_sheets, print_statistics};

pub fn run_validate(args: &ValidateArgs) -> Result<RunOutcome> {
    let annotated = args.annotated.as_ref().map(|target| {
        target.clone().unwrap_or_else(|| {
            args.file
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf()
        })
    });
    let options = RunOptions {
        input: args.file.clone(),
        rules: args.rules.clone(),
        sheet: args.sheet.clone(),
        delimiter: args.delimiter.map(byte_of).transpose()?,
        reference_column: args.reference_column.clone(),
        errors_csv: args.errors_csv.clone(),
        annotated,
        report_json: args.report_json.clone(),
        separator: byte_of(args.separator)?,
    };
    run_validation(&options)
}

pub fn run_sheets(file: &Path) -> Result<()> {
    let names = list_sheets(file).with_context(|| format!("list sheets of {}", file.display()))?;
    print_sheets(&names);
    Ok(())
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let mut store = RuleStore::open(&args.file)
        .with_context(|| format!("open rules file {}", args.file.display()))?;

    match &args.command {
        RulesCommand::List => print_rules(&store.summary_rows()),
        RulesCommand::Stats => print_statistics(&store.statistics()),
        RulesCommand::Kinds => {
            print_kinds("Column rules", field_kinds());
            println!();
            print_kinds("Multicolumn rules", multicolumn_kinds());
        }
        RulesCommand::AddSimple {
            column,
            rule_type,
            params,
            message,
        } => {
            let id = store
                .add_simple_rule(column, rule_type, parse_params(params)?, message)?
                .id
                .clone();
            save_and_report(&store, "added", &id)?;
        }
        RulesCommand::AddMultiSimple {
            columns,
            rule_type,
            params,
            message,
        } => {
            let columns = split_columns(columns);
            let id = store
                .add_multi_simple_rule(&columns, rule_type, parse_params(params)?, message)?
                .id
                .clone();
            save_and_report(&store, "added", &id)?;
        }
        RulesCommand::AddConditional {
            conditions,
            actions,
            logic,
            message,
        } => {
            let conditions = conditions
                .iter()
                .map(|text| parse_condition(text))
                .collect::<Result<Vec<_>>>()?;
            let actions = actions
                .iter()
                .map(|text| parse_action(text))
                .collect::<Result<Vec<_>>>()?;
            let id = store
                .add_conditional_rule(conditions, actions, message, logic.as_str())?
                .id
                .clone();
            save_and_report(&store, "added", &id)?;
        }
        RulesCommand::AddMulticolumn {
            columns,
            rule_type,
            params,
            message,
        } => {
            let columns = split_columns(columns);
            let id = store
                .add_multicolumn_rule(&columns, rule_type, parse_params(params)?, message)?
                .id
                .clone();
            save_and_report(&store, "added", &id)?;
        }
        RulesCommand::Toggle { id } => {
            let Some(active) = store.toggle(id) else {
                bail!("no rule with id {id}");
            };
            save_and_report(&store, if active { "activated" } else { "deactivated" }, id)?;
        }
        RulesCommand::Delete { id } => {
            if !store.delete(id) {
                bail!("no rule with id {id}");
            }
            save_and_report(&store, "deleted", id)?;
        }
        RulesCommand::Import { source } => {
            let summary = store
                .import(source)
                .with_context(|| format!("import rules from {}", source.display()))?;
            println!(
                "Imported {} rule(s), skipped {} already present",
                summary.imported, summary.skipped
            );
        }
        RulesCommand::Export { target } => {
            store
                .export(target)
                .with_context(|| format!("export rules to {}", target.display()))?;
            println!("Exported rules to {}", target.display());
        }
    }
    Ok(())
}

fn save_and_report(store: &RuleStore, action: &str, id: &str) -> Result<()> {
    store
        .save()
        .with_context(|| format!("save rules file {}", store.path().display()))?;
    info!(rule = id, action, "rules file updated");
    println!("Rule {id} {action}");
    Ok(())
}

fn byte_of(ch: char) -> Result<u8> {
    if !ch.is_ascii() {
        bail!("separator '{ch}' must be a single ASCII character");
    }
    Ok(ch as u8)
}
