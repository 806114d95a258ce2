use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Parse a ticket creation date.
///
/// The exporting systems emit one of two formats: "day/month/year hour:minute"
/// or ISO "year-month-day". They are tried strictly, in that order, and the
/// first success wins. The order matters: the two formats are not always
/// distinguishable by shape, and guessing wrong would misattribute trend data.
pub fn parse_creation_date(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%d/%m/%Y %H:%M") {
        return Ok(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d.and_time(chrono::NaiveTime::MIN));
    }
    Err(Error::DateParse(raw.to_string()))
}

/// Calendar month bucket key, e.g. "2024-03".
pub fn month_key(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m").to_string()
}

/// Week-of-year bucket key with Sunday as the first day, e.g. "2024-10".
pub fn week_key(dt: NaiveDateTime) -> String {
    dt.format("%Y-%U").to_string()
}

/// Weekday name bucket key, e.g. "Friday".
pub fn weekday_key(dt: NaiveDateTime) -> String {
    dt.format("%A").to_string()
}
