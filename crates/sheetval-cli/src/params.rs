//! Parsing of rule parameters, conditions and actions given on the command line.
//!
//! - `--param key=value`: the value is read as JSON when it parses
//!   (`3`, `true`, `["a","b"]`), otherwise kept as text.
//! - `--condition COLUMN:OPERATOR[:VALUE]`
//! - `--action COLUMN:KIND[:{json params}]`

use anyhow::{Context, Result, bail};
use serde_json::Value;
use sheetval_rules::{ActionEntry, ConditionEntry, Params};

pub fn parse_param(text: &str) -> Result<(String, Value)> {
    let Some((key, raw)) = text.split_once('=') else {
        bail!("parameter '{text}' is not of the form key=value");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("parameter '{text}' has an empty key");
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

pub fn parse_params(items: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for item in items {
        let (key, value) = parse_param(item)?;
        params.insert(key, value);
    }
    Ok(params)
}

pub fn parse_condition(text: &str) -> Result<ConditionEntry> {
    let mut parts = text.splitn(3, ':');
    let column = parts.next().unwrap_or_default().trim();
    let Some(operator) = parts.next().map(str::trim).filter(|op| !op.is_empty()) else {
        bail!("condition '{text}' is not of the form COLUMN:OPERATOR[:VALUE]");
    };
    if column.is_empty() {
        bail!("condition '{text}' has no column");
    }
    Ok(ConditionEntry {
        column: column.to_string(),
        operator: operator.to_string(),
        value: Value::String(parts.next().unwrap_or_default().to_string()),
    })
}

pub fn parse_action(text: &str) -> Result<ActionEntry> {
    let mut parts = text.splitn(3, ':');
    let column = parts.next().unwrap_or_default().trim();
    let Some(kind) = parts.next().map(str::trim).filter(|kind| !kind.is_empty()) else {
        bail!("action '{text}' is not of the form COLUMN:KIND[:PARAMS]");
    };
    if column.is_empty() {
        bail!("action '{text}' has no column");
    }
    let params = match parts.next().map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => serde_json::from_str::<Params>(raw)
            .with_context(|| format!("action '{text}': parameters must be a JSON object"))?,
        None => Params::new(),
    };
    Ok(ActionEntry {
        column: column.to_string(),
        kind: kind.to_string(),
        params,
    })
}

/// Column list given as `A,B,C` or as repeated values.
pub fn split_columns(items: &[String]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.split(','))
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(str::to_string)
        .collect()
}
