//! User-typed amount text → ledger fixed-point string.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::constants::FIXED_POINT_SCALE;
use crate::errors::LendError;
use crate::types::FixedPointAmount;

/// Largest value representable by the ledger's UFix64 type.
pub const UFIX64_MAX: Decimal = dec!(184467440737.09551615);

/// Coerce free text into the canonical fixed-point shape.
///
/// Total and idempotent. Performs no range or sign checks: `"-3"` becomes
/// `"-3.0"` and `"abc"` becomes `"abc.0"`. See [`validate_amount`] for the
/// opt-in rejection policy.
pub fn normalize(input: &str) -> FixedPointAmount {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return FixedPointAmount::zero();
    }

    let mut value = if trimmed.starts_with('.') {
        format!("0{trimmed}")
    } else {
        trimmed.to_string()
    };
    if !value.contains('.') {
        value.push_str(".0");
    }
    if value.ends_with('.') {
        value.push('0');
    }
    FixedPointAmount::new(value)
}

/// Reject amounts the ledger would refuse anyway.
///
/// Accepts only plain positive decimals with at most [`FIXED_POINT_SCALE`]
/// fractional digits that fit in UFix64.
pub fn validate_amount(amount: &FixedPointAmount) -> Result<Decimal, LendError> {
    let text = amount.as_str();
    let invalid = |reason: String| LendError::InvalidAmount {
        input: text.to_string(),
        reason,
    };

    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = unsigned
        .split_once('.')
        .ok_or_else(|| invalid("missing decimal point".into()))?;

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid("not a decimal number".into()));
    }
    if frac_part.len() > FIXED_POINT_SCALE as usize {
        return Err(invalid(format!(
            "more than {FIXED_POINT_SCALE} fractional digits"
        )));
    }

    let value = Decimal::from_str(text).map_err(|e| invalid(e.to_string()))?;
    if value <= Decimal::ZERO {
        return Err(invalid("must be greater than zero".into()));
    }
    if value > UFIX64_MAX {
        return Err(invalid(format!("exceeds maximum of {UFIX64_MAX}")));
    }
    Ok(value)
}
