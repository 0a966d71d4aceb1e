//! Normalization of rendered chain numbers
//!
//! Balances and indices arrive as human-readable strings with thousands
//! separators (`"1,234"`), sometimes followed by a unit (`"1.2000 kDOT"`).
//! Amounts are read as the longest numeric prefix of the normalized text.

use crate::domain::errors::DecodeError;

/// Conviction stored for a vote cast without conviction
pub const NO_CONVICTION: f64 = 0.1;

/// Parse an amount whose commas are thousands separators
///
/// `"1,234"` becomes `1234.0`.
pub fn parse_grouped_amount(raw: &str) -> Result<f64, DecodeError> {
    parse_float_prefix(&raw.replace(',', ""))
        .ok_or_else(|| DecodeError::InvalidNumber(raw.to_string()))
}

/// Parse an amount whose first comma is a decimal separator
///
/// `"12,5"` becomes `12.5`.
pub fn parse_decimal_comma(raw: &str) -> Result<f64, DecodeError> {
    parse_float_prefix(&raw.replacen(',', ".", 1))
        .ok_or_else(|| DecodeError::InvalidNumber(raw.to_string()))
}

/// Parse a vote conviction such as `"Locked3x"` into its multiplier
pub fn parse_conviction(raw: &str) -> Result<f64, DecodeError> {
    if raw == "None" {
        return Ok(NO_CONVICTION);
    }
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    parse_float_prefix(&digits).ok_or_else(|| DecodeError::InvalidNumber(raw.to_string()))
}

/// Parse an on-chain index (`"1,024"` or `1024`)
pub fn parse_index(raw: &str) -> Result<i64, DecodeError> {
    raw.trim()
        .replace(',', "")
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidNumber(raw.to_string()))
}

/// Longest leading prefix of `s` that reads as a float
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
