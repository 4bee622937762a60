//! Numeric literal canonicalization.
//!
//! Integers become the decimal text of a `u128`; floats become the shortest
//! text that reads back as the same `f64`.

/// A recognized numeric literal in canonical text form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Number {
    Integer(String),
    Float(String),
}

/// Canonicalize the raw text of a numeric literal.
///
/// Accepts `0x`, `0b`, `0o` and `0d` prefixes and `_` separators, all
/// case-insensitive. Returns `None` for bad digits, overflow, or a float
/// that is not finite.
pub fn canonicalize(raw: &str) -> Option<Number> {
    let text: String = raw
        .chars()
        .filter(|&c| c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let radix = match text.get(..2) {
        Some("0x") => Some(16),
        Some("0b") => Some(2),
        Some("0o") => Some(8),
        Some("0d") => Some(10),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_u128(&text[2..], radix).map(|v| Number::Integer(v.to_string()));
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        return parse_u128(&text, 10).map(|v| Number::Integer(v.to_string()));
    }

    if !is_float_syntax(&text) {
        return None;
    }
    let value: f64 = text.parse().ok()?;
    value.is_finite().then(|| Number::Float(format!("{value:?}")))
}

/// Checked digit accumulation. Empty input is rejected.
fn parse_u128(digits: &str, radix: u32) -> Option<u128> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0u128, |acc, c| {
        let digit = c.to_digit(radix)?;
        acc.checked_mul(u128::from(radix))?
            .checked_add(u128::from(digit))
    })
}

/// `digits [. digits] [e [+-] digits]`
fn is_float_syntax(text: &str) -> bool {
    let (mantissa, exponent) = match text.split_once('e') {
        Some((m, e)) => (m, Some(e)),
        None => (text, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => all_digits(int) && all_digits(frac),
        None => all_digits(mantissa),
    };
    let exponent_ok = exponent.map_or(true, |e| {
        all_digits(e.strip_prefix(['+', '-']).unwrap_or(e))
    });
    mantissa_ok && exponent_ok
}
