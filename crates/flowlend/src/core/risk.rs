//! Position risk math: health factor and borrowing/withdrawal limits.
//!
//! Pure functions over collateral `c` and debt `b`, both non-negative.
//! Unparseable ledger text is mapped to zero before it reaches this module.

use rust_decimal::Decimal;

use crate::constants::{COLLATERAL_FACTOR, LIQUIDATION_THRESHOLD};
use crate::types::{HealthFactor, HealthSummary, Position};

/// HF = (collateral * collateral_factor) / debt.
///
/// Returns [`HealthFactor::Infinite`] if debt is zero. A ratio too large for
/// `Decimal` saturates at [`Decimal::MAX`].
pub fn health_factor(collateral: Decimal, borrowed: Decimal) -> HealthFactor {
    if borrowed <= Decimal::ZERO {
        return HealthFactor::Infinite;
    }
    let ratio = collateral
        .checked_mul(COLLATERAL_FACTOR)
        .and_then(|weighted| weighted.checked_div(borrowed))
        .unwrap_or(Decimal::MAX);
    HealthFactor::Finite(ratio)
}

/// Additional debt that keeps HF at or above the liquidation threshold.
pub fn max_borrowable(collateral: Decimal, borrowed: Decimal) -> Decimal {
    let max_debt = collateral
        .checked_mul(COLLATERAL_FACTOR)
        .and_then(|weighted| weighted.checked_div(LIQUIDATION_THRESHOLD))
        .unwrap_or(Decimal::MAX);
    max_debt
        .checked_sub(borrowed)
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO)
}

/// Collateral that can be removed while keeping HF at or above the
/// liquidation threshold.
///
/// Debt whose required collateral overflows `Decimal` leaves nothing to
/// withdraw.
pub fn max_withdrawable(collateral: Decimal, borrowed: Decimal) -> Decimal {
    if borrowed <= Decimal::ZERO {
        return collateral.max(Decimal::ZERO);
    }
    let Some(min_collateral_needed) = borrowed
        .checked_mul(LIQUIDATION_THRESHOLD)
        .and_then(|scaled| scaled.checked_div(COLLATERAL_FACTOR))
    else {
        return Decimal::ZERO;
    };
    collateral
        .checked_sub(min_collateral_needed)
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO)
}

/// Risk figures for display. An absent position reads as zero collateral
/// and zero debt.
pub fn health_summary(position: Option<&Position>) -> HealthSummary {
    let (c, b) = position
        .map(|p| (p.collateral.to_decimal(), p.borrowed.to_decimal()))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO));

    HealthSummary {
        health_factor: health_factor(c, b),
        max_borrowable: max_borrowable(c, b),
        max_withdrawable: max_withdrawable(c, b),
    }
}
