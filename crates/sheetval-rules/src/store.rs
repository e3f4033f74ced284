//! File-backed rule store.
//!
//! A store wraps one rules file. Mutations only change the in-memory document;
//! call [`RuleStore::save`] to persist them. Saves are atomic (temp file then
//! rename).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sheetval_model::RuleSet;
use sheetval_model::check::{
    DEFAULT_CONDITIONAL_MESSAGE, default_multi_simple_message, default_multicolumn_message,
    default_simple_message,
};
use tracing::{debug, info};

use crate::catalog::multicolumn_kind;
use crate::compile::{
    compile, compile_conditional, compile_multi_simple, compile_multicolumn, compile_simple,
};
use crate::document::{
    ActionEntry, ConditionEntry, ConditionalRuleEntry, MultiSimpleRuleEntry,
    MulticolumnRuleEntry, Params, RuleDocument, SimpleRuleEntry, timestamp_now,
};
use crate::error::RulesFileError;

type Result<T> = std::result::Result<T, RulesFileError>;

/// Counts of rules per category plus document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleStatistics {
    pub total_rules: usize,
    pub simple_rules: usize,
    pub multi_simple_rules: usize,
    pub conditional_rules: usize,
    pub multicolumn_rules: usize,
    pub active_rules: usize,
    pub created_at: String,
    pub last_modified: String,
    pub version: String,
}

/// One line of the rules overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummaryRow {
    pub id: String,
    pub category: &'static str,
    pub columns: String,
    pub rule: String,
    pub message: String,
    pub active: bool,
}

/// Outcome of merging another rules file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Rules file plus its parsed document.
#[derive(Debug, Clone)]
pub struct RuleStore {
    path: PathBuf,
    document: RuleDocument,
}

fn read_document(path: &Path) -> Result<RuleDocument> {
    let text = fs::read_to_string(path).map_err(|source| RulesFileError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RulesFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_document(document: &RuleDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document).map_err(RulesFileError::Serialize)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| RulesFileError::Io {
            operation: "create directory for",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|source| RulesFileError::Io {
        operation: "create",
        path: temp_path.clone(),
        source,
    })?;
    file.write_all(json.as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .and_then(|()| file.sync_all())
        .map_err(|source| RulesFileError::Io {
            operation: "write",
            path: temp_path.clone(),
            source,
        })?;

    fs::rename(&temp_path, path).map_err(|source| RulesFileError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source,
    })
}

/// `<prefix>_<n>_<unix seconds>`, where `n` starts after the rules already in
/// the category and skips ids that are taken.
fn next_id(document: &RuleDocument, prefix: &str, count: usize) -> String {
    let timestamp = chrono::Local::now().timestamp();
    let mut n = count + 1;
    loop {
        let id = format!("{prefix}_{n}_{timestamp}");
        if !document.contains_id(&id) {
            return id;
        }
        n += 1;
    }
}

fn active_label(active: bool) -> &'static str {
    if active { "active" } else { "inactive" }
}

impl RuleStore {
    /// Open a rules file, creating an empty one when it does not exist.
    ///
    /// Documents written by an older version are upgraded and saved back.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            let store = Self {
                path,
                document: RuleDocument::new(),
            };
            store.save()?;
            info!(path = %store.path.display(), "created empty rules file");
            return Ok(store);
        }

        let mut document = read_document(&path)?;
        let upgraded = document.upgrade();
        let store = Self { path, document };
        if upgraded {
            store.save()?;
            info!(path = %store.path.display(), "upgraded rules file");
        }
        debug!(
            path = %store.path.display(),
            rules = store.document.rule_count(),
            "loaded rules file"
        );
        Ok(store)
    }

    /// Wrap an in-memory document; nothing is read or written.
    pub fn from_document(path: impl Into<PathBuf>, document: RuleDocument) -> Self {
        Self {
            path: path.into(),
            document,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &RuleDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut RuleDocument {
        &mut self.document
    }

    pub fn save(&self) -> Result<()> {
        write_document(&self.document, &self.path)?;
        debug!(path = %self.path.display(), "saved rules file");
        Ok(())
    }

    /// Compile the current document into a rule set.
    pub fn compile(&self) -> Result<RuleSet> {
        Ok(compile(&self.document)?)
    }

    /// Add a single-column rule. The rule is compiled first and rejected when
    /// malformed.
    pub fn add_simple_rule(
        &mut self,
        column: &str,
        rule_type: &str,
        params: Params,
        message: &str,
    ) -> Result<&SimpleRuleEntry> {
        let entry = SimpleRuleEntry {
            id: next_id(&self.document, "rule", self.document.simple_rules.len()),
            column: column.trim().to_string(),
            rule_type: rule_type.to_string(),
            params,
            message: if message.trim().is_empty() {
                default_simple_message(rule_type)
            } else {
                message.to_string()
            },
            active: true,
            created_at: Some(timestamp_now()),
        };
        compile_simple(&entry)?;
        self.document.simple_rules.push(entry);
        self.document.touch();
        Ok(&self.document.simple_rules[self.document.simple_rules.len() - 1])
    }

    /// Add one predicate broadcast over several columns.
    pub fn add_multi_simple_rule(
        &mut self,
        columns: &[String],
        rule_type: &str,
        params: Params,
        message: &str,
    ) -> Result<&MultiSimpleRuleEntry> {
        let entry = MultiSimpleRuleEntry {
            id: next_id(&self.document, "multi_simple", self.document.multi_simple_rules.len()),
            columns: columns.iter().map(|c| c.trim().to_string()).collect(),
            rule_type: rule_type.to_string(),
            params,
            message: if message.trim().is_empty() {
                default_multi_simple_message(rule_type)
            } else {
                message.to_string()
            },
            active: true,
            created_at: Some(timestamp_now()),
        };
        compile_multi_simple(&entry)?;
        self.document.multi_simple_rules.push(entry);
        self.document.touch();
        Ok(&self.document.multi_simple_rules[self.document.multi_simple_rules.len() - 1])
    }

    pub fn add_conditional_rule(
        &mut self,
        conditions: Vec<ConditionEntry>,
        actions: Vec<ActionEntry>,
        message: &str,
        logic: &str,
    ) -> Result<&ConditionalRuleEntry> {
        let entry = ConditionalRuleEntry {
            id: next_id(&self.document, "cond", self.document.conditional_rules.len()),
            conditions,
            actions,
            logic: logic.trim().to_uppercase(),
            message: if message.trim().is_empty() {
                DEFAULT_CONDITIONAL_MESSAGE.to_string()
            } else {
                message.to_string()
            },
            active: true,
            created_at: Some(timestamp_now()),
        };
        compile_conditional(&entry)?;
        self.document.conditional_rules.push(entry);
        self.document.touch();
        Ok(&self.document.conditional_rules[self.document.conditional_rules.len() - 1])
    }

    pub fn add_multicolumn_rule(
        &mut self,
        columns: &[String],
        rule_type: &str,
        params: Params,
        message: &str,
    ) -> Result<&MulticolumnRuleEntry> {
        let entry = MulticolumnRuleEntry {
            id: next_id(&self.document, "multi", self.document.multicolumn_rules.len()),
            columns: columns.iter().map(|c| c.trim().to_string()).collect(),
            rule_type: rule_type.to_string(),
            params,
            message: if message.trim().is_empty() {
                default_multicolumn_message(rule_type)
            } else {
                message.to_string()
            },
            active: true,
            created_at: Some(timestamp_now()),
        };
        compile_multicolumn(&entry)?;
        self.document.multicolumn_rules.push(entry);
        self.document.touch();
        Ok(&self.document.multicolumn_rules[self.document.multicolumn_rules.len() - 1])
    }

    /// Flip the active flag of the rule with this id, in any category.
    ///
    /// Returns the new state, or `None` when no rule has the id.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let doc = &mut self.document;
        let state = if let Some(rule) = doc.simple_rules.iter_mut().find(|r| r.id == id) {
            rule.active = !rule.active;
            rule.active
        } else if let Some(rule) = doc.multi_simple_rules.iter_mut().find(|r| r.id == id) {
            rule.active = !rule.active;
            rule.active
        } else if let Some(rule) = doc.conditional_rules.iter_mut().find(|r| r.id == id) {
            rule.active = !rule.active;
            rule.active
        } else if let Some(rule) = doc.multicolumn_rules.iter_mut().find(|r| r.id == id) {
            rule.active = !rule.active;
            rule.active
        } else {
            return None;
        };
        doc.touch();
        Some(state)
    }

    /// Remove the rule with this id. Returns false when no rule has the id.
    pub fn delete(&mut self, id: &str) -> bool {
        let doc = &mut self.document;
        let before = doc.rule_count();
        doc.simple_rules.retain(|rule| rule.id != id);
        doc.multi_simple_rules.retain(|rule| rule.id != id);
        doc.conditional_rules.retain(|rule| rule.id != id);
        doc.multicolumn_rules.retain(|rule| rule.id != id);
        let removed = doc.rule_count() != before;
        if removed {
            doc.touch();
        }
        removed
    }

    /// Merge the rules of another file, skipping ids already present in the
    /// same category, then save.
    ///
    /// The merged document must compile; otherwise nothing changes.
    pub fn import(&mut self, path: &Path) -> Result<ImportSummary> {
        let incoming = read_document(path)?;
        let mut merged = self.document.clone();
        let mut summary = ImportSummary::default();

        fn merge<T: Clone>(
            target: &mut Vec<T>,
            source: &[T],
            id: impl Fn(&T) -> &str,
            summary: &mut ImportSummary,
        ) {
            for rule in source {
                if target.iter().any(|existing| id(existing) == id(rule)) {
                    summary.skipped += 1;
                } else {
                    target.push(rule.clone());
                    summary.imported += 1;
                }
            }
        }

        merge(
            &mut merged.simple_rules,
            &incoming.simple_rules,
            |rule| rule.id.as_str(),
            &mut summary,
        );
        merge(
            &mut merged.multi_simple_rules,
            &incoming.multi_simple_rules,
            |rule| rule.id.as_str(),
            &mut summary,
        );
        merge(
            &mut merged.conditional_rules,
            &incoming.conditional_rules,
            |rule| rule.id.as_str(),
            &mut summary,
        );
        merge(
            &mut merged.multicolumn_rules,
            &incoming.multicolumn_rules,
            |rule| rule.id.as_str(),
            &mut summary,
        );

        compile(&merged)?;
        merged.touch();
        self.document = merged;
        self.save()?;
        info!(
            from = %path.display(),
            imported = summary.imported,
            skipped = summary.skipped,
            "imported rules"
        );
        Ok(summary)
    }

    /// Write the current document to another path.
    pub fn export(&mut self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(RulesFileError::EmptyPath);
        }
        self.document.touch();
        write_document(&self.document, path)?;
        info!(to = %path.display(), "exported rules");
        Ok(())
    }

    pub fn statistics(&self) -> RuleStatistics {
        let doc = &self.document;
        let active_rules = doc.simple_rules.iter().filter(|r| r.active).count()
            + doc.multi_simple_rules.iter().filter(|r| r.active).count()
            + doc.conditional_rules.iter().filter(|r| r.active).count()
            + doc.multicolumn_rules.iter().filter(|r| r.active).count();
        RuleStatistics {
            total_rules: doc.rule_count(),
            simple_rules: doc.simple_rules.len(),
            multi_simple_rules: doc.multi_simple_rules.len(),
            conditional_rules: doc.conditional_rules.len(),
            multicolumn_rules: doc.multicolumn_rules.len(),
            active_rules,
            created_at: doc.metadata.created_at.clone(),
            last_modified: doc.metadata.last_modified.clone(),
            version: doc.metadata.version.clone(),
        }
    }

    /// Overview of every rule, in category order.
    pub fn summary_rows(&self) -> Vec<RuleSummaryRow> {
        let doc = &self.document;
        let simple = doc.simple_rules.iter().map(|rule| RuleSummaryRow {
            id: rule.id.clone(),
            category: "Simple",
            columns: rule.column.clone(),
            rule: rule.rule_type.clone(),
            message: rule.message.clone(),
            active: rule.active,
        });
        let multi_simple = doc.multi_simple_rules.iter().map(|rule| RuleSummaryRow {
            id: rule.id.clone(),
            category: "Simple multi",
            columns: rule.columns.join(", "),
            rule: format!("{} (multi)", rule.rule_type),
            message: rule.message.clone(),
            active: rule.active,
        });
        let conditional = doc.conditional_rules.iter().map(|rule| RuleSummaryRow {
            id: rule.id.clone(),
            category: "Conditional",
            columns: format!("Conditions: {} condition(s)", rule.conditions.len()),
            rule: format!("{} -> {} action(s)", rule.logic, rule.actions.len()),
            message: rule.message.clone(),
            active: rule.active,
        });
        let multicolumn = doc.multicolumn_rules.iter().map(|rule| RuleSummaryRow {
            id: rule.id.clone(),
            category: "Multicolumn",
            columns: rule.columns.join(", "),
            rule: multicolumn_kind(&rule.rule_type)
                .map_or_else(|| rule.rule_type.clone(), |info| info.name.to_string()),
            message: rule.message.clone(),
            active: rule.active,
        });
        simple
            .chain(multi_simple)
            .chain(conditional)
            .chain(multicolumn)
            .collect()
    }
}

impl RuleSummaryRow {
    pub fn status(&self) -> &'static str {
        active_label(self.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn open_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.json");
        let store = RuleStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.statistics().total_rules, 0);
        assert_eq!(store.statistics().version, "2.0");
    }

    #[test]
    fn add_generates_ids_and_default_messages() {
        let dir = TempDir::new().unwrap();
        let mut store = RuleStore::open(dir.path().join("rules.json")).unwrap();
        let id = store
            .add_simple_rule("A", "NotBlank", Params::new(), "")
            .unwrap()
            .id
            .clone();
        assert!(id.starts_with("rule_1_"));
        let rule = &store.document().simple_rules[0];
        assert_eq!(rule.message, "Validation error NotBlank");

        let id = store
            .add_multicolumn_rule(
                &["A".to_string(), "B".to_string()],
                "all_or_none",
                Params::new(),
                "",
            )
            .unwrap()
            .id
            .clone();
        assert!(id.starts_with("multi_1_"));
        assert_eq!(
            store.document().multicolumn_rules[0].message,
            "Multicolumn validation error all_or_none"
        );
    }

    #[test]
    fn add_rejects_malformed_rule() {
        let dir = TempDir::new().unwrap();
        let mut store = RuleStore::open(dir.path().join("rules.json")).unwrap();
        let result = store.add_simple_rule("A", "Regex", params(json!({"pattern": "["})), "");
        assert!(result.is_err());
        assert!(store.document().simple_rules.is_empty());
    }

    #[test]
    fn toggle_and_delete_by_id() {
        let dir = TempDir::new().unwrap();
        let mut store = RuleStore::open(dir.path().join("rules.json")).unwrap();
        let id = store
            .add_simple_rule("A", "NotBlank", Params::new(), "")
            .unwrap()
            .id
            .clone();
        assert_eq!(store.toggle(&id), Some(false));
        assert_eq!(store.statistics().active_rules, 0);
        assert_eq!(store.toggle(&id), Some(true));
        assert_eq!(store.toggle("missing"), None);
        assert!(store.delete(&id));
        assert!(!store.delete(&id));
        assert_eq!(store.statistics().total_rules, 0);
    }

    #[test]
    fn save_then_reopen_keeps_rules() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.json");
        let mut store = RuleStore::open(&path).unwrap();
        store
            .add_simple_rule("B", "Length", params(json!({"min": 2})), "too short")
            .unwrap();
        store.save().unwrap();
        let reopened = RuleStore::open(&path).unwrap();
        assert_eq!(reopened.document().simple_rules, store.document().simple_rules);
    }

    #[test]
    fn summary_rows_cover_all_categories() {
        let dir = TempDir::new().unwrap();
        let mut store = RuleStore::open(dir.path().join("rules.json")).unwrap();
        store
            .add_simple_rule("A", "NotBlank", Params::new(), "")
            .unwrap();
        store
            .add_conditional_rule(
                vec![ConditionEntry {
                    column: "D".to_string(),
                    operator: "equals".to_string(),
                    value: json!("VIP"),
                }],
                vec![ActionEntry {
                    column: "E".to_string(),
                    kind: "must_not_be_empty".to_string(),
                    params: Params::new(),
                }],
                "",
                "and",
            )
            .unwrap();
        store
            .add_multicolumn_rule(
                &["A".to_string(), "B".to_string(), "C".to_string()],
                "sum_equals",
                Params::new(),
                "",
            )
            .unwrap();
        let rows = store.summary_rows();
        let categories: Vec<&str> = rows.iter().map(|row| row.category).collect();
        assert_eq!(categories, vec!["Simple", "Conditional", "Multicolumn"]);
        assert_eq!(rows[1].rule, "AND -> 1 action(s)");
        assert_eq!(rows[2].rule, "Sum equals");
        assert_eq!(rows[2].columns, "A, B, C");
        assert_eq!(rows[0].status(), "active");
    }
}
