//! Date reading for cross-column date checks.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sheetval_model::CellValue;

/// Formats tried in order; the first successful parse wins.
pub const MULTICOLUMN_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y%m%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
];

/// Date-time reading of a cell, or `None` when it is unparsable.
///
/// Date-time cells are used as they are; text is trimmed and tried against
/// [`MULTICOLUMN_DATE_FORMATS`]. Anything else has no date reading.
pub fn parse_date(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::DateTime(datetime) => Some(*datetime),
        CellValue::Text(text) => parse_date_text(text.trim()),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    MULTICOLUMN_DATE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(text, format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, format)
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
    })
}

/// Whole days from `earlier` to `later`, rounded toward negative infinity.
pub fn day_difference(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    (later - earlier).num_milliseconds().div_euclid(86_400_000)
}
