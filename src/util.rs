// Utility helpers for parsing and basic statistics.
//
// Raw values are text. This module turns them into numbers and back into
// display strings so the derivation code can work on `Option<f64>`.
use chrono::{DateTime, FixedOffset};
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;

/// Parse a raw statistic value.
///
/// - Trims whitespace.
/// - Empty text and the `NA` sentinel (any case) mean "not reported".
/// - Anything that is not a finite float is also "not reported".
pub fn parse_value(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("na") {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Cells the generation step drops: missing, empty, or `NA`.
pub fn is_missing(s: Option<&str>) -> bool {
    match s {
        None => true,
        Some(v) => v.is_empty() || v.eq_ignore_ascii_case("na"),
    }
}

pub fn parse_year(s: &str) -> Option<i32> {
    s.trim().parse::<i32>().ok()
}

pub fn sum(values: impl IntoIterator<Item = Option<f64>>) -> f64 {
    // Missing values count as zero.
    values.into_iter().map(|v| v.unwrap_or(0.0)).sum()
}

pub fn average(values: impl IntoIterator<Item = Option<f64>>) -> f64 {
    // Missing values are left out of both sides; nothing left means 0.
    let (total, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(t, c), v| (t + v, c + 1));
    if count == 0 {
        return 0.0;
    }
    total / count as f64
}

/// Numeric year order; text that is not a year sorts after, alphabetically.
pub fn compare_years(a: &str, b: &str) -> Ordering {
    match (parse_year(a), parse_year(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Distinct years, ascending.
pub fn sorted_years<'a>(years: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for y in years {
        if !out.iter().any(|o| o == y) {
            out.push(y.to_string());
        }
    }
    out.sort_by(|a, b| compare_years(a, b));
    out
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with thousands separators, e.g. `1,234,567.89`.
    let s = format!("{:.*}", decimals, n.abs());
    // Sign only when something non-zero survives rounding.
    let neg = n.is_sign_negative() && s.bytes().any(|b| matches!(b, b'1'..=b'9'));
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

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Compact display used in tables: integers without decimals, other values
/// with up to two.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format_number(v, 0)
    } else {
        format_number(v, 2)
    }
}

pub fn format_optional(v: &Option<f64>) -> String {
    match v {
        Some(v) => format_value(*v),
        None => "N/A".to_string(),
    }
}

/// Signed percentage with two decimals, e.g. `+11.11%`.
pub fn format_signed_pct(v: f64) -> String {
    if v > 0.0 {
        format!("+{:.2}%", v)
    } else {
        format!("{:.2}%", v)
    }
}

/// Manifest timestamps are ISO 8601; anything else is shown as written.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s.trim()).ok()
}

pub fn display_timestamp(s: &str) -> String {
    match parse_timestamp(s) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M %:z").to_string(),
        None => s.to_string(),
    }
}
