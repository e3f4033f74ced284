//! On-disk shape of a rules file.
//!
//! Parameters stay untyped JSON here; [`crate::compile`] turns a document into
//! a typed [`sheetval_model::RuleSet`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sheetval_model::HeaderConfig;
use sheetval_model::rule::DEFAULT_REFERENCE_COLUMN;

/// Schema version written by this crate.
pub const DOCUMENT_VERSION: &str = "2.0";

/// Untyped rule parameters.
pub type Params = Map<String, Value>;

fn default_true() -> bool {
    true
}

fn default_logic() -> String {
    "AND".to_string()
}

fn default_reference_column() -> String {
    DEFAULT_REFERENCE_COLUMN.to_string()
}

/// Current local time in the format used by document timestamps.
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleRuleEntry {
    pub id: String,
    pub column: String,
    pub rule_type: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSimpleRuleEntry {
    pub id: String,
    pub columns: Vec<String>,
    pub rule_type: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub column: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub column: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: Params,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRuleEntry {
    pub id: String,
    #[serde(default)]
    pub conditions: Vec<ConditionEntry>,
    #[serde(default)]
    pub actions: Vec<ActionEntry>,
    #[serde(default = "default_logic")]
    pub logic: String,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MulticolumnRuleEntry {
    pub id: String,
    pub columns: Vec<String>,
    pub rule_type: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Predicate applied to every column that has no bound simple rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultRuleEntry {
    pub rule_type: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub message: String,
}

/// Validation settings stored alongside the rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub header: HeaderConfig,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub default_rules: Vec<DefaultRuleEntry>,
    #[serde(default = "default_reference_column")]
    pub reference_column: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            header: HeaderConfig::default(),
            excludes: Vec::new(),
            default_rules: Vec::new(),
            reference_column: default_reference_column(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub version: String,
}

impl Metadata {
    pub fn new() -> Self {
        let now = timestamp_now();
        Self {
            created_at: now.clone(),
            last_modified: now,
            version: DOCUMENT_VERSION.to_string(),
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete rules file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default)]
    pub simple_rules: Vec<SimpleRuleEntry>,
    #[serde(default)]
    pub multi_simple_rules: Vec<MultiSimpleRuleEntry>,
    #[serde(default)]
    pub conditional_rules: Vec<ConditionalRuleEntry>,
    #[serde(default)]
    pub multicolumn_rules: Vec<MulticolumnRuleEntry>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub metadata: Metadata,
}

impl RuleDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rules across the four categories.
    pub fn rule_count(&self) -> usize {
        self.simple_rules.len()
            + self.multi_simple_rules.len()
            + self.conditional_rules.len()
            + self.multicolumn_rules.len()
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self) {
        self.metadata.last_modified = timestamp_now();
    }

    /// Bring documents written by older versions up to the current version.
    ///
    /// Returns true when the document changed.
    pub fn upgrade(&mut self) -> bool {
        if self.metadata.version.as_str() < DOCUMENT_VERSION {
            self.metadata.version = DOCUMENT_VERSION.to_string();
            return true;
        }
        false
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.simple_rules.iter().any(|rule| rule.id == id)
            || self.multi_simple_rules.iter().any(|rule| rule.id == id)
            || self.conditional_rules.iter().any(|rule| rule.id == id)
            || self.multicolumn_rules.iter().any(|rule| rule.id == id)
    }
}
