//! Rules files on disk: compiling a full document and merging imports.

use std::fs;

use sheetval_model::{ActionKind, FieldCheck, HeaderConfig, Logic, MulticolumnCheck, Operator};
use sheetval_rules::{RuleStore, RulesFileError};
use tempfile::TempDir;

const DOCUMENT: &str = r#"{
  "simple_rules": [
    {"id": "rule_1", "column": "A", "rule_type": "NotBlank", "params": {"trim": true},
     "message": "Name: required", "active": true},
    {"id": "rule_2", "column": "C", "rule_type": "Choice",
     "params": {"choices": ["Yes", "No"], "caseSensitive": false}, "active": false}
  ],
  "multi_simple_rules": [
    {"id": "multi_simple_1", "columns": ["B", "C"], "rule_type": "Length",
     "params": {"min": 1, "max": "10"}}
  ],
  "conditional_rules": [
    {"id": "cond_1",
     "conditions": [{"column": "D", "operator": "equals", "value": "VIP"}],
     "actions": [{"column": "E", "type": "must_be_between", "params": {"min": 1000, "max": 10000}}],
     "logic": "AND", "message": "VIP amount out of range"}
  ],
  "multicolumn_rules": [
    {"id": "multi_1", "columns": ["A", "B", "C"], "rule_type": "sum_equals",
     "params": {"tolerance": 0.5}}
  ],
  "settings": {"header": "Customer", "excludes": ["f"], "reference_column": "a"},
  "metadata": {"created_at": "2024-01-01T00:00:00", "last_modified": "2024-01-01T00:00:00",
               "version": "2.0"}
}"#;

#[test]
fn full_document_compiles() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.json");
    fs::write(&path, DOCUMENT).unwrap();

    let store = RuleStore::open(&path).unwrap();
    let rules = store.compile().unwrap();

    assert_eq!(rules.simple_rules.len(), 2);
    assert_eq!(rules.simple_rules[0].rule.message, "Name: required");
    assert!(rules.simple_rules[0].rule.trim);
    assert!(!rules.simple_rules[1].active);
    assert_eq!(
        rules.simple_rules[1].rule.check,
        FieldCheck::Choice {
            choices: vec!["Yes".to_string(), "No".to_string()],
            case_sensitive: false,
        }
    );

    assert_eq!(
        rules.multi_simple_rules[0].rule.check,
        FieldCheck::Length {
            min: Some(1),
            max: Some(10)
        }
    );
    assert_eq!(
        rules.multi_simple_rules[0].rule.message,
        "Validation error Length on several columns"
    );

    let conditional = &rules.conditional_rules[0];
    assert_eq!(conditional.logic, Logic::And);
    assert_eq!(conditional.conditions[0].operator, Operator::Equals);
    assert_eq!(conditional.conditions[0].value, "VIP");
    assert_eq!(
        conditional.actions[0].kind,
        ActionKind::MustBeBetween {
            min: 1000.0,
            max: 10000.0
        }
    );

    assert_eq!(
        rules.multicolumn_rules[0].check,
        MulticolumnCheck::SumEquals {
            target_column: None,
            tolerance: 0.5
        }
    );

    assert_eq!(rules.header, HeaderConfig::Marker("Customer".to_string()));
    assert_eq!(rules.excludes, vec!["F".to_string()]);
    assert_eq!(rules.reference_column, "A");
}

#[test]
fn import_merges_and_skips_existing_ids() {
    let dir = TempDir::new().unwrap();
    let incoming = dir.path().join("incoming.json");
    fs::write(&incoming, DOCUMENT).unwrap();

    let mut store = RuleStore::open(dir.path().join("rules.json")).unwrap();
    let summary = store.import(&incoming).unwrap();
    assert_eq!(summary.imported, 5);
    assert_eq!(summary.skipped, 0);

    let again = store.import(&incoming).unwrap();
    assert_eq!(again.imported, 0);
    assert_eq!(again.skipped, 5);

    let reopened = RuleStore::open(store.path()).unwrap();
    assert_eq!(reopened.statistics().total_rules, 5);
    assert_eq!(reopened.statistics().active_rules, 4);
}

#[test]
fn import_of_broken_rules_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let incoming = dir.path().join("broken.json");
    fs::write(
        &incoming,
        r#"{"simple_rules": [{"id": "x", "column": "A", "rule_type": "Regex", "params": {}}]}"#,
    )
    .unwrap();

    let mut store = RuleStore::open(dir.path().join("rules.json")).unwrap();
    let error = store.import(&incoming).unwrap_err();
    assert!(matches!(error, RulesFileError::Rule(_)));
    assert_eq!(store.statistics().total_rules, 0);
}

#[test]
fn invalid_json_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        RuleStore::open(&path),
        Err(RulesFileError::Parse { .. })
    ));
}

#[test]
fn export_writes_a_readable_copy() {
    let dir = TempDir::new().unwrap();
    let mut store = RuleStore::open(dir.path().join("rules.json")).unwrap();
    store
        .add_simple_rule("A", "Email", Default::default(), "")
        .unwrap();
    let target = dir.path().join("out").join("export.json");
    store.export(&target).unwrap();
    let copy = RuleStore::open(&target).unwrap();
    assert_eq!(copy.document().simple_rules, store.document().simple_rules);
}
