//! Rule set consumed by the validation engine.

use serde::{Deserialize, Serialize};

use crate::check::{
    ActionKind, DEFAULT_CONDITIONAL_MESSAGE, FieldRule, MulticolumnCheck, Operator,
    default_multicolumn_message,
};

/// Column whose value is shown next to error labels when none is configured.
pub const DEFAULT_REFERENCE_COLUMN: &str = "B";

/// Rule category, in engine execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Simple,
    MultiSimple,
    Conditional,
    Multicolumn,
    /// Synthetic category of a file that could not be read.
    Source,
}

impl RuleCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Simple => "Simple",
            Self::MultiSimple => "Multi simple",
            Self::Conditional => "Conditional",
            Self::Multicolumn => "Multicolumn",
            Self::Source => "Source",
        }
    }
}

/// Header handling for single-column rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderConfig {
    /// `true` skips row 1, `false` evaluates it.
    Flag(bool),
    /// Skip every row up to and including the first row holding this value.
    Marker(String),
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self::Flag(true)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleRule {
    pub id: String,
    pub column: String,
    pub rule: FieldRule,
    pub active: bool,
}

impl SimpleRule {
    pub fn new(id: impl Into<String>, column: impl Into<String>, rule: FieldRule) -> Self {
        Self {
            id: id.into(),
            column: column.into(),
            rule,
            active: true,
        }
    }
}

/// One predicate broadcast over several columns, each checked on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSimpleRule {
    pub id: String,
    pub columns: Vec<String>,
    pub rule: FieldRule,
    pub active: bool,
}

impl MultiSimpleRule {
    pub fn new(id: impl Into<String>, columns: &[&str], rule: FieldRule) -> Self {
        Self {
            id: id.into(),
            columns: columns.iter().map(|column| (*column).to_string()).collect(),
            rule,
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: String,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }
}

/// How condition results combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub column: String,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(column: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            column: column.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalRule {
    pub id: String,
    pub conditions: Vec<Condition>,
    pub logic: Logic,
    pub actions: Vec<Action>,
    pub message: String,
    pub active: bool,
}

impl ConditionalRule {
    pub fn new(
        id: impl Into<String>,
        conditions: Vec<Condition>,
        logic: Logic,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            id: id.into(),
            conditions,
            logic,
            actions,
            message: DEFAULT_CONDITIONAL_MESSAGE.to_string(),
            active: true,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Cross-column rule. Column order is significant for most checks.
#[derive(Debug, Clone, PartialEq)]
pub struct MulticolumnRule {
    pub id: String,
    pub columns: Vec<String>,
    pub check: MulticolumnCheck,
    pub message: String,
    pub active: bool,
}

impl MulticolumnRule {
    pub fn new(id: impl Into<String>, columns: &[&str], check: MulticolumnCheck) -> Self {
        let message = default_multicolumn_message(check.kind());
        Self {
            id: id.into(),
            columns: columns.iter().map(|column| (*column).to_string()).collect(),
            check,
            message,
            active: true,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Everything one validation run needs besides the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub simple_rules: Vec<SimpleRule>,
    pub multi_simple_rules: Vec<MultiSimpleRule>,
    pub conditional_rules: Vec<ConditionalRule>,
    pub multicolumn_rules: Vec<MulticolumnRule>,
    /// Applied to every column without a bound simple rule.
    pub default_rules: Vec<FieldRule>,
    /// Columns skipped by simple rules.
    pub excludes: Vec<String>,
    pub header: HeaderConfig,
    pub reference_column: String,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            simple_rules: Vec::new(),
            multi_simple_rules: Vec::new(),
            conditional_rules: Vec::new(),
            multicolumn_rules: Vec::new(),
            default_rules: Vec::new(),
            excludes: Vec::new(),
            header: HeaderConfig::default(),
            reference_column: DEFAULT_REFERENCE_COLUMN.to_string(),
        }
    }
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rules across all categories, active or not.
    pub fn len(&self) -> usize {
        self.simple_rules.len()
            + self.multi_simple_rules.len()
            + self.conditional_rules.len()
            + self.multicolumn_rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.default_rules.is_empty()
    }

    pub fn is_excluded(&self, column: &str) -> bool {
        self.excludes.iter().any(|excluded| excluded == column)
    }

    /// Active simple rules bound to a column, in declaration order.
    pub fn rules_for_column(&self, column: &str) -> Vec<&SimpleRule> {
        self.simple_rules
            .iter()
            .filter(|rule| rule.active && rule.column == column)
            .collect()
    }
}
