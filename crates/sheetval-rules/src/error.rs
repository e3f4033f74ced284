//! Error types for rule documents.

use std::path::PathBuf;

use sheetval_model::ModelError;
use thiserror::Error;

/// A rule that cannot be turned into a typed rule.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Rule kind is not part of the vocabulary of its category.
    #[error("rule {rule_id}: unknown {category} rule kind '{kind}'")]
    UnknownKind {
        rule_id: String,
        category: &'static str,
        kind: String,
    },

    /// A parameter the kind cannot work without is absent.
    #[error("rule {rule_id}: {kind} requires parameter '{param}'")]
    MissingParam {
        rule_id: String,
        kind: String,
        param: &'static str,
    },

    /// A parameter is present but unusable.
    #[error("rule {rule_id}: invalid parameter '{param}' for {kind}: {reason}")]
    InvalidParam {
        rule_id: String,
        kind: String,
        param: &'static str,
        reason: String,
    },

    #[error("rule {rule_id}: unknown operator '{operator}'")]
    UnknownOperator { rule_id: String, operator: String },

    #[error("rule {rule_id}: unknown logic '{logic}' (expected AND or OR)")]
    UnknownLogic { rule_id: String, logic: String },

    #[error("rule {rule_id}: {kind} needs at least {min} columns, found {found}")]
    TooFewColumns {
        rule_id: String,
        kind: String,
        min: usize,
        found: usize,
    },

    #[error("rule {rule_id}: empty column identifier")]
    EmptyColumn { rule_id: String },

    #[error("duplicate rule id '{rule_id}' in {category}")]
    DuplicateId {
        rule_id: String,
        category: &'static str,
    },

    #[error("rule {rule_id}: {source}")]
    Model {
        rule_id: String,
        #[source]
        source: ModelError,
    },
}

/// Failures reading or writing a rules file.
#[derive(Debug, Error)]
pub enum RulesFileError {
    #[error("failed to {operation} rules file {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rules file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize rules: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to replace {target_path} with {temp_path}: {source}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("export path is empty")]
    EmptyPath,

    #[error(transparent)]
    Rule(#[from] RuleError),
}

pub type Result<T> = std::result::Result<T, RuleError>;
