// Number helpers shared by the join and the presentation layer.
//
// Every monetary cell in the three exports goes through `normalize_amount`,
// so the rest of the code can assume plain `f64` values.
use num_format::{Locale, ToFormattedString};

/// Convert a spreadsheet amount cell into `f64`.
///
/// - `None`, empty and whitespace-only cells are `0.0`.
/// - Thousands separators (`","`) are stripped before parsing.
/// - Anything that still does not parse, or parses to a non-finite value,
///   is `0.0`. This never fails.
pub fn normalize_amount(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0.0;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Trim an identifier cell, treating blank cells as absent.
pub fn clean_id(raw: Option<&str>) -> Option<String> {
    let id = raw?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus en thousands separators (e.g. `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // Values that round to zero print without a sign.
    let nonzero = s.chars().any(|c| c.is_ascii_digit() && c != '0');
    if n < 0.0 && nonzero {
        format!("-{}", res)
    } else {
        res
    }
}

/// Pounds sterling with two decimals, sign before the symbol: `-£1,234.56`.
pub fn format_currency(n: f64) -> String {
    let s = format_number(n, 2);
    match s.strip_prefix('-') {
        Some(abs) => format!("-£{}", abs),
        None => format!("£{}", s),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
