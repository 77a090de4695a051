// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format a date for display: day without leading zero, abbreviated month,
/// 4-digit year (e.g. "3 Jun 2024").
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Parse a stored ISO-8601 timestamp, with or without a UTC offset.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| d.and_hms_opt(0, 0, 0).unwrap()).ok()
}

/// Render a stored timestamp as a display date, falling back to the raw
/// string when it does not parse.
pub fn display_date_or_raw(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| format_display_date(dt.date()))
        .unwrap_or_else(|| raw.to_string())
}

/// Short English month name for a "YYYY-MM" bucket key (e.g. "Jun").
pub fn month_label(month_key: &str) -> Option<String> {
    let first = format!("{month_key}-01");
    NaiveDate::parse_from_str(&first, "%Y-%m-%d")
        .map(|d| d.format("%b").to_string())
        .ok()
}
