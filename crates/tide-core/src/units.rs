//! Decimal conversion between human-readable amounts and base units.
//!
//! `"1.5"` is `1_500_000_000_000_000_000` base units. Rates use the same
//! scale, so `"0.0000225"` parses to a WAD-scaled rate.

use crate::constants::{DECIMALS, UNIT};
use crate::error::UnitsError;

/// Parse a non-negative decimal string into base units.
///
/// Accepts `"12"`, `"12.5"`, `".5"`, `"12."`. Rejects signs, exponents,
/// separators and more than 18 fractional digits.
pub fn parse_units(s: &str) -> Result<u128, UnitsError> {
    let s = s.trim();
    if s.is_empty() || s == "." {
        return Err(UnitsError::Empty);
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if frac.len() > DECIMALS as usize {
        return Err(UnitsError::TooManyDecimals(frac.len()));
    }

    let whole_value = digits_to_u128(whole)?;
    let frac_value = digits_to_u128(frac)?;
    let frac_scale = 10u128.pow(DECIMALS - frac.len() as u32);

    whole_value
        .checked_mul(UNIT)
        .and_then(|w| w.checked_add(frac_value * frac_scale))
        .ok_or(UnitsError::Overflow)
}

/// Format base units as a decimal string, trimming trailing zeros.
pub fn format_units(amount: u128) -> String {
    let whole = amount / UNIT;
    let frac = amount % UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{frac:0width$}", width = DECIMALS as usize);
    format!("{whole}.{}", frac_str.trim_end_matches('0'))
}

fn digits_to_u128(digits: &str) -> Result<u128, UnitsError> {
    let mut value: u128 = 0;
    for c in digits.chars() {
        let d = c.to_digit(10).ok_or(UnitsError::InvalidDigit(c))?;
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(d as u128))
            .ok_or(UnitsError::Overflow)?;
    }
    Ok(value)
}
