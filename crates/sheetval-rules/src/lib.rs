//! Rule documents for sheetval.
//!
//! A rules file is a JSON document authored by a rule manager. This crate
//! reads and writes it ([`RuleStore`]), creates rules with generated ids and
//! default messages, and compiles the untyped document into the typed
//! [`sheetval_model::RuleSet`] the engine runs ([`compile`]).

pub mod catalog;
pub mod compile;
pub mod document;
pub mod error;
mod params;
pub mod store;

pub use catalog::{KindInfo, field_kinds, multicolumn_kinds};
pub use compile::{compile, field_check, multicolumn_check, normalize_column};
pub use document::{
    ActionEntry, ConditionEntry, ConditionalRuleEntry, DOCUMENT_VERSION, DefaultRuleEntry,
    Metadata, MultiSimpleRuleEntry, MulticolumnRuleEntry, Params, RuleDocument, Settings,
    SimpleRuleEntry,
};
pub use error::{Result, RuleError, RulesFileError};
pub use params::value_text;
pub use store::{ImportSummary, RuleStatistics, RuleStore, RuleSummaryRow};
