//! Decimal coercion and formatting with the semantics of the dashboard's
//! JavaScript providers (`Number(x)` and `x.toFixed(n)`).
//!
//! Sponsor positions arrive as decimal strings. Coercion never fails: content
//! that is not a number becomes `NaN` and flows on to the chart.

use emp_common::types::FieldValue;

/// Coerce a field value to a number.
pub fn to_number(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => parse_decimal(s),
    }
}

/// Parse a string the way `Number(string)` does.
///
/// - surrounding whitespace is ignored and an empty string is `0`
/// - `0x`/`0o`/`0b` prefixes select an unsigned integer radix
/// - `Infinity` may carry a sign
/// - anything else must be a plain decimal literal, otherwise `NaN`
pub fn parse_decimal(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix_integer(&s[2..], radix);
    }

    // Rust's float parser also accepts `inf`/`nan` spellings; restrict the
    // alphabet to decimal-literal characters first.
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix_integer(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut acc = 0.0f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => acc = acc * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    acc
}

/// Render a number with a fixed count of decimals, as `toFixed` does.
///
/// Non-finite values render as `NaN`/`Infinity`, negative zero renders
/// unsigned, and magnitudes of 1e21 and above fall back to exponent form.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.abs() >= 1e21 {
        return format!("{value:e}").replacen('e', "e+", 1);
    }

    let value = if value == 0.0 { 0.0 } else { value };
    match round_tie_away(value.abs(), digits) {
        Some(magnitude) if value < 0.0 => format!("-{magnitude}"),
        Some(magnitude) => magnitude,
        None => format!("{value:.digits$}"),
    }
}

/// Places rendered past `digits` when looking for an exact tie. One ulp away
/// from a midpoint shows up well before this.
const TIE_CHECK_DIGITS: usize = 30;

/// Round a magnitude that sits exactly halfway between two `digits`-place
/// decimals up to the larger one. `None` when the value is not a tie.
///
/// `format!` rounds such ties to even, `toFixed` never does.
fn round_tie_away(magnitude: f64, digits: usize) -> Option<String> {
    let exact = format!("{magnitude:.precision$}", precision = digits + TIE_CHECK_DIGITS);
    let (integer, fraction) = exact.split_once('.')?;
    let (kept, rest) = fraction.split_at(digits);
    if !rest.starts_with('5') || !rest[1..].bytes().all(|b| b == b'0') {
        return None;
    }

    let mut number = format!("{integer}{kept}").into_bytes();
    let mut carry = true;
    for digit in number.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        number.insert(0, b'1');
    }

    let mut text = String::from_utf8(number).ok()?;
    if digits > 0 {
        text.insert(text.len() - digits, '.');
    }
    Some(text)
}
