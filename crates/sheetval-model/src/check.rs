//! Typed rule parameters.
//!
//! Every rule kind is a closed enum variant carrying its own parameters, so a
//! rule that reaches evaluation has already been checked for the parameters it
//! needs. Pattern and date-format parameters are validated on construction.

use std::fmt;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::error::{ModelError, Result};

/// Date format used by the `Date` predicate when none is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default tolerance for `sum_equals` and `max_min_check`.
pub const DEFAULT_SUM_TOLERANCE: f64 = 0.01;

/// Default relative tolerance for `percentage_of`.
pub const DEFAULT_PERCENTAGE_TOLERANCE: f64 = 0.05;

/// Binary comparison operator used by conditions and `Comparison` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    StartsWith,
    EndsWith,
    Contains,
    NotContains,
    IsEmpty,
    IsNotEmpty,
}

impl Operator {
    pub const ALL: [Operator; 12] = [
        Self::Equals,
        Self::NotEquals,
        Self::GreaterThan,
        Self::LessThan,
        Self::GreaterEqual,
        Self::LessEqual,
        Self::StartsWith,
        Self::EndsWith,
        Self::Contains,
        Self::NotContains,
        Self::IsEmpty,
        Self::IsNotEmpty,
    ];

    /// Parse an operator name (`greater_than`, `is_empty`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|operator| operator.as_str() == s.trim())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::GreaterEqual => "greater_equal",
            Self::LessEqual => "less_equal",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
        }
    }

    /// True for operators that compare both operands as numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::LessThan | Self::GreaterEqual | Self::LessEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A regular expression anchored at the start of the text.
///
/// Matching succeeds when the pattern matches a prefix of the text; the rest
/// of the text is not required to match.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let regex = Regex::new(&format!(r"\A(?:{source})")).map_err(|error| {
            ModelError::InvalidPattern {
                pattern: source.clone(),
                reason: error.to_string(),
            }
        })?;
        Ok(Self { source, regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A strftime-style date format that chrono accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat(String);

impl DateFormat {
    pub fn new(format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        if format.trim().is_empty()
            || StrftimeItems::new(&format).any(|item| matches!(item, Item::Error))
        {
            return Err(ModelError::InvalidDateFormat { format });
        }
        Ok(Self(format))
    }

    /// Parse text under this format.
    ///
    /// Formats without a time part yield midnight; formats without a date part
    /// are anchored on 1900-01-01.
    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, &self.0) {
            return Some(datetime);
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, &self.0) {
            return Some(date.and_time(NaiveTime::MIN));
        }
        let time = NaiveTime::parse_from_str(text, &self.0).ok()?;
        NaiveDate::from_ymd_opt(1900, 1, 1).map(|date| date.and_time(time))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self(DEFAULT_DATE_FORMAT.to_string())
    }
}

/// Target type of a `Type` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Integer,
    Float,
    Bool,
}

impl CastType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "integer" | "int" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "bool" | "boolean" => Some(Self::Bool),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }
}

/// Single-value predicate with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCheck {
    NotBlank,
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    Type(CastType),
    Regex(Pattern),
    Email,
    Choice {
        choices: Vec<String>,
        case_sensitive: bool,
    },
    Country,
    Date(DateFormat),
    Comparison {
        operator: Operator,
        value: String,
    },
    Duplicate {
        case_sensitive: bool,
    },
}

impl FieldCheck {
    /// Kind name as written in rule documents.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotBlank => "NotBlank",
            Self::Length { .. } => "Length",
            Self::Type(_) => "Type",
            Self::Regex(_) => "Regex",
            Self::Email => "Email",
            Self::Choice { .. } => "Choice",
            Self::Country => "Country",
            Self::Date(_) => "Date",
            Self::Comparison { .. } => "Comparison",
            Self::Duplicate { .. } => "Duplicate",
        }
    }
}

/// A predicate bound to a column (or broadcast over several), with its
/// leading trim option and failure message.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub check: FieldCheck,
    pub trim: bool,
    pub message: String,
}

impl FieldRule {
    /// A rule with the default message for its kind.
    pub fn new(check: FieldCheck) -> Self {
        let message = default_simple_message(check.kind());
        Self {
            check,
            trim: false,
            message,
        }
    }

    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Default failure message of a single-column rule.
pub fn default_simple_message(kind: &str) -> String {
    format!("Validation error {kind}")
}

/// Default failure message of a rule broadcast over several columns.
pub fn default_multi_simple_message(kind: &str) -> String {
    format!("Validation error {kind} on several columns")
}

/// Default failure message of a cross-column rule.
pub fn default_multicolumn_message(kind: &str) -> String {
    format!("Multicolumn validation error {kind}")
}

/// Default failure message of a conditional rule.
pub const DEFAULT_CONDITIONAL_MESSAGE: &str = "Conditional rule not satisfied";

/// Check applied to a conditional rule's action column.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    MustBeEmpty,
    MustNotBeEmpty,
    MustBeBetween { min: f64, max: f64 },
    MustBeInList { values: Vec<String> },
    MustMatchPattern(Pattern),
}

impl ActionKind {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MustBeEmpty => "must_be_empty",
            Self::MustNotBeEmpty => "must_not_be_empty",
            Self::MustBeBetween { .. } => "must_be_between",
            Self::MustBeInList { .. } => "must_be_in_list",
            Self::MustMatchPattern(_) => "must_match_pattern",
        }
    }
}

/// Operator of a `conditional_sum` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumOperator {
    GreaterThan,
    LessThan,
    /// Equal within 0.01.
    Equals,
    GreaterEqual,
    LessEqual,
}

impl SumOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "greater_than" => Some(Self::GreaterThan),
            "less_than" => Some(Self::LessThan),
            "equals" => Some(Self::Equals),
            "greater_equal" => Some(Self::GreaterEqual),
            "less_equal" => Some(Self::LessEqual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Equals => "equals",
            Self::GreaterEqual => "greater_equal",
            Self::LessEqual => "less_equal",
        }
    }
}

/// Aggregate used by `max_min_check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

/// Which end of the column list holds the expected aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEnd {
    First,
    Last,
}

/// Cross-column check with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum MulticolumnCheck {
    SumEquals {
        target_column: Option<String>,
        tolerance: f64,
    },
    SumRange {
        min: f64,
        max: f64,
    },
    DateBefore,
    DateAfter,
    DateRange {
        min_days: i64,
        max_days: i64,
    },
    PercentageOf {
        percentage: f64,
        tolerance: f64,
    },
    AllOrNone,
    UniqueCombination {
        case_sensitive: bool,
    },
    ConditionalSum {
        condition_column: Option<String>,
        condition_value: String,
        operator: SumOperator,
        target_value: f64,
    },
    MaxMinCheck {
        operation: Extremum,
        target: TargetEnd,
        tolerance: f64,
    },
}

impl MulticolumnCheck {
    /// Kind name as written in rule documents.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SumEquals { .. } => "sum_equals",
            Self::SumRange { .. } => "sum_range",
            Self::DateBefore => "date_before",
            Self::DateAfter => "date_after",
            Self::DateRange { .. } => "date_range",
            Self::PercentageOf { .. } => "percentage_of",
            Self::AllOrNone => "all_or_none",
            Self::UniqueCombination { .. } => "unique_combination",
            Self::ConditionalSum { .. } => "conditional_sum",
            Self::MaxMinCheck { .. } => "max_min_check",
        }
    }
}
