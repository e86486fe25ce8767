// Utility helpers for parsing and basic statistics.
//
// All forgiving CSV cell handling lives here so the rest of the code can
// work with typed values.
use chrono::{Datelike, Month, NaiveDate};
use num_format::{Locale, ToFormattedString};

/// Parse a numeric cell into `f64`, tolerating the usual export noise.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators (`","`) and a trailing `%`.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Exports sometimes write integer columns as `2021.0`.
    s.parse::<i32>()
        .ok()
        .or_else(|| s.strip_suffix(".0").and_then(|t| t.parse::<i32>().ok()))
}

/// Non-negative whole counts that fit in `i64`. Accepts `1,234` and `1234.0`.
pub fn parse_count_safe(s: Option<&str>) -> Option<u64> {
    let v = parse_f64_safe(s)?;
    if v < 0.0 || v.fract() != 0.0 || v >= i64::MAX as f64 {
        return None;
    }
    Some(v as u64)
}

/// Recognise a month number in a `Month` cell.
///
/// Accepts month names (`March`, `mar`), bare numbers (`3`), and dates such
/// as `2021-03`, `2021-03-01`, `03/2021` or `03/01/2021`.
pub fn parse_month_ordinal(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(m) = s.parse::<Month>() {
        return Some(m.number_from_month());
    }
    if let Ok(n) = s.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let candidates = [
        (s.to_string(), "%Y-%m-%d"),
        (format!("{}-01", s), "%Y-%m-%d"),
        (s.to_string(), "%m/%d/%Y"),
        (format!("01/{}", s), "%d/%m/%Y"),
    ];
    candidates
        .iter()
        .find_map(|(text, fmt)| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|d| d.month())
}

pub fn average(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

/// Round half away from zero to two decimals.
pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
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
