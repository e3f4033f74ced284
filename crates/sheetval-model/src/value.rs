//! Cell values held in a row snapshot.
//!
//! A cell is either absent, text, a number, a boolean or a date-time. Most
//! predicates treat absent cells and empty text the same way ("blank"), so the
//! helpers here expose both the strict and the trimmed notion of emptiness.

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Display format used for date-time cells.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for an absent cell or a zero-length text cell.
    ///
    /// Whitespace-only text is *not* missing; it is only blank.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// True when the trimmed textual form is empty.
    pub fn is_blank(&self) -> bool {
        self.as_text().trim().is_empty()
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Textual form of the value.
    ///
    /// Absent cells render as an empty string, numbers without a trailing
    /// `.0`, booleans as `true`/`false`, and date-times as
    /// `YYYY-MM-DD HH:MM:SS`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text.as_str()),
            Self::Number(number) => Cow::Owned(format_numeric(*number)),
            Self::Bool(flag) => Cow::Borrowed(if *flag { "true" } else { "false" }),
            Self::DateTime(datetime) => {
                Cow::Owned(datetime.format(DATETIME_DISPLAY_FORMAT).to_string())
            }
        }
    }

    /// Numeric reading of the value.
    ///
    /// Text is parsed after trimming; booleans read as 1 and 0. Absent cells
    /// and date-times have no numeric reading.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Self::Text(text) => parse_f64(text),
            Self::Empty | Self::DateTime(_) => None,
        }
    }

    /// Returns a copy with surrounding whitespace removed from text values.
    pub fn trimmed(&self) -> Cow<'_, CellValue> {
        match self {
            Self::Text(text) if text.trim().len() != text.len() => {
                Cow::Owned(Self::Text(text.trim().to_string()))
            }
            _ => Cow::Borrowed(self),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// Formats a float the shortest way that round-trips, without a trailing `.0`.
pub fn format_numeric(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Parses trimmed text as a float. Accepts `inf` and `nan` spellings.
pub fn parse_f64(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
