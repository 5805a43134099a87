// leadfive/core/primitives/src/decimals.rs

//! Decimal precision handling for token amounts.
//!
//! Stable tokens on BSC ship with either 6 or 18 decimals and the native
//! token with 18. Every power-of-ten scaling in the workspace goes through
//! this module so amounts never get rescaled ad hoc.

use primitive_types::U256;

/// Largest precision accepted for any token
pub const MAX_DECIMALS: u32 = 30;

/// Rounding direction for lossy scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Truncate toward zero
    Down,
    /// Round away from zero when any remainder is left
    Up,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecimalError {
    #[error("Decimal precision {decimals} exceeds maximum of {max}")]
    DecimalMismatch { decimals: u32, max: u32 },

    #[error("Arithmetic overflow while scaling amount")]
    Overflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid decimal number '{0}'")]
    InvalidNumber(String),
}

/// Fail if a precision is outside the supported range
pub fn check_decimals(decimals: u32) -> Result<(), DecimalError> {
    if decimals > MAX_DECIMALS {
        return Err(DecimalError::DecimalMismatch {
            decimals,
            max: MAX_DECIMALS,
        });
    }
    Ok(())
}

/// 10^exp as a U256
pub fn pow10(exp: u32) -> Result<U256, DecimalError> {
    U256::from(10)
        .checked_pow(U256::from(exp))
        .ok_or(DecimalError::Overflow)
}

/// Compute `a * b / denominator` with explicit rounding
pub fn mul_div(
    a: U256,
    b: U256,
    denominator: U256,
    rounding: Rounding,
) -> Result<U256, DecimalError> {
    if denominator.is_zero() {
        return Err(DecimalError::DivisionByZero);
    }

    let product = a.checked_mul(b).ok_or(DecimalError::Overflow)?;
    let quotient = product / denominator;
    let remainder = product % denominator;

    match rounding {
        Rounding::Up if !remainder.is_zero() => {
            quotient.checked_add(U256::one()).ok_or(DecimalError::Overflow)
        }
        _ => Ok(quotient),
    }
}

/// Rescale `amount` from `from_decimals` to `to_decimals`, truncating when
/// precision is lost.
pub fn normalize_decimals(
    amount: U256,
    from_decimals: u32,
    to_decimals: u32,
) -> Result<U256, DecimalError> {
    normalize_decimals_rounded(amount, from_decimals, to_decimals, Rounding::Down)
}

/// Rescale `amount` between precisions with the given rounding
pub fn normalize_decimals_rounded(
    amount: U256,
    from_decimals: u32,
    to_decimals: u32,
    rounding: Rounding,
) -> Result<U256, DecimalError> {
    check_decimals(from_decimals)?;
    check_decimals(to_decimals)?;

    if to_decimals >= from_decimals {
        let factor = pow10(to_decimals - from_decimals)?;
        amount.checked_mul(factor).ok_or(DecimalError::Overflow)
    } else {
        let factor = pow10(from_decimals - to_decimals)?;
        mul_div(amount, U256::one(), factor, rounding)
    }
}

/// Parse a human readable amount such as `"30"` or `"0.05"` into minimal units
pub fn parse_units(text: &str, decimals: u32) -> Result<U256, DecimalError> {
    check_decimals(decimals)?;

    let trimmed = text.trim();
    let invalid = || DecimalError::InvalidNumber(text.to_string());

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > decimals as usize {
        return Err(invalid());
    }

    let whole_units = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| invalid())?
    };
    let whole_scaled = whole_units
        .checked_mul(pow10(decimals)?)
        .ok_or(DecimalError::Overflow)?;

    let fraction_units = if fraction.is_empty() {
        U256::zero()
    } else {
        let digits = U256::from_dec_str(fraction).map_err(|_| invalid())?;
        digits
            .checked_mul(pow10(decimals - fraction.len() as u32)?)
            .ok_or(DecimalError::Overflow)?
    };

    whole_scaled
        .checked_add(fraction_units)
        .ok_or(DecimalError::Overflow)
}

/// Render minimal units as a decimal string, trimming trailing zeros
pub fn format_units(amount: U256, decimals: u32) -> Result<String, DecimalError> {
    check_decimals(decimals)?;
    if decimals == 0 {
        return Ok(amount.to_string());
    }

    let factor = pow10(decimals)?;
    let whole = amount / factor;
    let fraction = amount % factor;

    if fraction.is_zero() {
        return Ok(whole.to_string());
    }

    let padded = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    Ok(format!("{}.{}", whole, padded.trim_end_matches('0')))
}
