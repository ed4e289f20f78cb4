// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Date-time layouts seen in Strong, Hevy (old and new) and spreadsheet
/// exports. Tried in order. `%.f` also matches a missing fraction.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d %b %Y, %H:%M",
    "%b %d, %Y, %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing, unless the comma
///   is clearly a decimal comma (`"62,5"`).
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = match s.rsplit_once(',') {
        Some((_, frac)) if !s.contains('.') && frac.len() != 3 => s.replace(',', "."),
        _ => s.replace(',', ""),
    };
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u32>().ok()
}

/// Parse a timestamp or a bare date. Bare dates map to midnight.
///
/// RFC 3339 values keep the wall-clock time they were written with, so
/// `2024-01-01T23:30:00-05:00` stays on Jan 1.
pub fn parse_datetime_safe(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    parse_datetime_safe(s).map(|dt| dt.date())
}

/// Parse a workout duration into minutes.
///
/// Accepts `"1h 5m"`, `"45m"`, `"90s"`, `"1h"` and plain numbers, which are
/// read as minutes.
pub fn parse_duration_minutes(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(v) = parse_f64_safe(Some(s)) {
        return (v >= 0.0).then_some(v);
    }
    let mut total = 0.0;
    let mut matched = false;
    for part in s.split_whitespace() {
        let split = part.find(|c: char| c.is_ascii_alphabetic())?;
        let (num, unit) = part.split_at(split);
        let value: f64 = num.parse().ok()?;
        total += match unit {
            "h" => value * 60.0,
            "m" | "min" => value,
            "s" => value / 60.0,
            _ => return None,
        };
        matched = true;
    }
    matched.then_some(total)
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Like `format_number` but with an explicit sign, for deltas.
pub fn format_delta(n: f64, decimals: usize) -> String {
    if n > 0.0 {
        format!("+{}", format_number(n, decimals))
    } else {
        format_number(n, decimals)
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
