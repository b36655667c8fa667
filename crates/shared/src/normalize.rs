//! Best-effort coercion of spreadsheet cells into domain values.
//!
//! Nothing in here fails: unusable input collapses to a default.

use serde_json::Value;

use crate::domain::ClientId;

pub const UNKNOWN_CLIENT_NAME: &str = "Unknown Client";
pub const UNKNOWN_CLIENT_ID: &str = "unknown";
pub const UNKNOWN_STATUS: &str = "unknown";

/// Coerces a raw cell into an amount. Always finite; `0.0` when nothing parses.
pub fn normalize_amount(raw: &Value) -> f64 {
    match raw {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::Null | Value::Bool(false) => 0.0,
        Value::String(text) => parse_amount_text(text),
        other => parse_amount_text(&other.to_string()),
    }
}

/// Parses the first decimal literal out of formatted text such as `"Rs. 1,250.50"`.
///
/// The number starts at the first digit. Anything but digits, `.` and `-` is
/// dropped from there on, and the literal ends at the first character that
/// cannot continue it (`"1.2.3"` is `1.2`, `"12-5"` is `12`). Before the first
/// digit at most one `-` and one `.` may appear, in that order: the `-` negates
/// and a `.` directly before the digits is a leading decimal point. A `.` that
/// closes an abbreviation such as `Rs.` is ignored unless a leading point
/// follows it. Any other run of signs (`"--5"`, `"..5"`) yields `0.0`.
pub fn parse_amount_text(text: &str) -> f64 {
    let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
        return 0.0;
    };
    let (prefix, body) = text.split_at(start);
    let leading_point = prefix
        .strip_suffix('.')
        .is_some_and(|before| !ends_with_letter(before));

    let mut marks = String::new();
    let mut previous = None;
    for c in prefix.chars() {
        let closes_abbreviation = c == '.' && previous.is_some_and(char::is_alphabetic);
        if matches!(c, '-' | '.') && (leading_point || !closes_abbreviation) {
            marks.push(c);
        }
        previous = Some(c);
    }
    let negative = match (marks.as_str(), leading_point) {
        ("", false) | (".", true) => false,
        ("-", false) | ("-.", true) => true,
        _ => return 0.0,
    };

    let kept: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();

    let literal = if leading_point {
        format!("0.{}", leading_digits(&kept))
    } else {
        let int_part = leading_digits(&kept);
        let frac_part = kept[int_part.len()..]
            .strip_prefix('.')
            .map(leading_digits)
            .unwrap_or_default();
        if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{int_part}.{frac_part}")
        }
    };

    let sign = if negative { "-" } else { "" };
    format!("{sign}{literal}")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn ends_with_letter(text: &str) -> bool {
    text.chars().next_back().is_some_and(char::is_alphabetic)
}

fn leading_digits(text: &str) -> &str {
    let len = text.bytes().take_while(u8::is_ascii_digit).count();
    &text[..len]
}

/// Trimmed text of a cell, `None` when missing or blank.
pub fn cell_text(raw: &Value) -> Option<String> {
    let text = match raw {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

pub fn client_name(raw: &Value) -> String {
    cell_text(raw).unwrap_or_else(|| UNKNOWN_CLIENT_NAME.to_string())
}

/// Slug of a client name: whitespace runs become `-`, then lowercased.
pub fn derive_client_id(name: Option<&str>) -> ClientId {
    let words: Vec<&str> = name.unwrap_or_default().split_whitespace().collect();
    if words.is_empty() {
        return ClientId::from(UNKNOWN_CLIENT_ID);
    }
    ClientId::new(words.join("-").to_lowercase())
}

pub fn normalize_status(raw: &Value) -> String {
    cell_text(raw)
        .map(|status| status.to_lowercase())
        .unwrap_or_else(|| UNKNOWN_STATUS.to_string())
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
