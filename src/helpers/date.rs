//! Date helper functions

use chrono::{DateTime, NaiveDateTime};

use crate::content::parse_date_string;

/// Format a date in full format (like "January 15, 2024")
pub fn full_date(date: &NaiveDateTime) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Short display form for a timestamp column (like "Jan 15, 2024").
///
/// Accepts the RFC 3339 timestamps PostgREST returns for `timestamptz`
/// columns as well as the looser formats authors use in front-matter.
/// Unparseable input is returned unchanged.
pub fn display_date(value: &str) -> String {
    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| parse_date_string(value));

    match parsed {
        Some(dt) => dt.format("%b %-d, %Y").to_string(),
        None => value.to_string(),
    }
}
