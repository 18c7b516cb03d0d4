//! Conversions between human-readable decimal amounts and base units.
//!
//! `to_base_units` and `format_base_units` are exact inverses for any amount
//! that fits in a `U256`. `from_base_units` goes through `f64` and is only
//! meant for display: above 2^53 base units the result is rounded, so
//! `to_base_units(&from_base_units(x, d).to_string(), d)` is not guaranteed
//! to return `x`.

use crate::{
    constants::MAX_DECIMALS,
    error::{PlayError, PlayResult, ValidationError},
    math::{bn::U256, safe_math::SafeMath},
    validate,
};

fn invalid(amount: &str) -> PlayError {
    ValidationError::InvalidDecimal(amount.to_string()).into()
}

/// `10^decimals`, or a math error past what a `U256` holds.
pub(crate) fn scale(decimals: u8) -> PlayResult<U256> {
    validate!(
        decimals <= MAX_DECIMALS,
        PlayError::Math,
        "{} decimals exceed the range of a U256",
        decimals
    )?;
    Ok(U256::exp10(decimals as usize))
}

/// Parse a decimal string such as `"12.5"` into base units.
///
/// Fraction digits beyond `decimals` are truncated, never rounded.
pub fn to_base_units(amount: &str, decimals: u8) -> PlayResult<U256> {
    let trimmed = amount.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(invalid(amount));
    }

    let unit = scale(decimals)?;

    let whole = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| invalid(amount))?
    };

    let kept = &fraction[..fraction.len().min(decimals as usize)];
    let fraction = if kept.is_empty() {
        U256::zero()
    } else {
        let padding = decimals as usize - kept.len();
        U256::from_dec_str(kept)
            .map_err(|_| invalid(amount))?
            .safe_mul(U256::exp10(padding))?
    };

    whole
        .safe_mul(unit)
        .map_err(|_| invalid(amount))?
        .safe_add(fraction)
        .map_err(|_| invalid(amount))
}

/// Display-only conversion to a float. See the module docs for precision.
pub fn from_base_units(amount: U256, decimals: u8) -> f64 {
    amount.to_f64_lossy() / 10_f64.powi(decimals as i32)
}

/// Exact decimal rendering of a base-unit amount, trailing zeros trimmed.
pub fn format_base_units(amount: U256, decimals: u8) -> PlayResult<String> {
    let unit = scale(decimals)?;
    let (whole, remainder) = amount.div_mod(unit);

    if remainder.is_zero() {
        return Ok(whole.to_string());
    }

    let fraction = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    Ok(format!("{}.{}", whole, fraction.trim_end_matches('0')))
}
