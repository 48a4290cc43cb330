//! Conversions between ISO 8601 Gregorian dates and the local calendar
//! representations used by the exchanges.
//!
//! TWSE and TPEx publish row dates in the Republic-of-China (ROC) era, a
//! slash-separated form offset by 1911 years (`113/05/02` for 2024-05-02).
//! TAIFEX uses slash-separated Gregorian dates. All conversions are pure
//! reformatting; any well-formed date converts in both directions.

use time::macros::format_description;
use time::{Date, Month};

use crate::ValidationError;

const ROC_YEAR_OFFSET: i32 = 1911;

/// Parse an ISO 8601 calendar date (`2024-05-02`).
pub fn parse_iso(value: &str) -> Result<Date, ValidationError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value.trim(), format).map_err(|_| ValidationError::InvalidDate {
        value: value.to_owned(),
    })
}

/// Format a date as ISO 8601 (`2024-05-02`).
pub fn format_iso(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Format as an ROC-era slash date (`113/05/02`).
pub fn to_roc(date: Date) -> String {
    format!(
        "{}/{:02}/{:02}",
        date.year() - ROC_YEAR_OFFSET,
        u8::from(date.month()),
        date.day()
    )
}

/// Parse an ROC-era slash date back into a Gregorian date.
///
/// Malformed input yields `None`; table rows carrying such cells are simply
/// never matched.
pub fn from_roc(value: &str) -> Option<Date> {
    parse_slash_date(value, ROC_YEAR_OFFSET)
}

/// Format as a slash-separated Gregorian date (`2024/05/02`).
pub fn to_slash(date: Date) -> String {
    format!(
        "{:04}/{:02}/{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parse a slash-separated Gregorian date.
pub fn from_slash(value: &str) -> Option<Date> {
    parse_slash_date(value, 0)
}

/// Format as the compact `yyyyMMdd` form used by TWSE query parameters.
pub fn to_compact(date: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn parse_slash_date(value: &str, year_offset: i32) -> Option<Date> {
    let mut parts = value.trim().splitn(3, '/');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u8 = parts.next()?.trim().parse().ok()?;
    let day: u8 = parts.next()?.trim().parse().ok()?;
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year + year_offset, month, day).ok()
}
