use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::LIQUIDATION_THRESHOLD;

/// Ratio of risk-weighted collateral to debt.
///
/// Variant order matters: the derived ordering places every finite value
/// below `Infinite`, which is what a debt-free position reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthFactor {
    Finite(#[serde(with = "rust_decimal::serde::str")] Decimal),
    Infinite,
}

impl HealthFactor {
    /// `None` for an unbounded health factor.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Finite(v) => Some(*v),
            Self::Infinite => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Below the liquidation threshold.
    pub fn is_liquidatable(&self) -> bool {
        match self {
            Self::Finite(v) => *v < LIQUIDATION_THRESHOLD,
            Self::Infinite => false,
        }
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v}"),
            Self::Infinite => f.write_str("∞"),
        }
    }
}

/// Derived risk figures shown next to a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub health_factor: HealthFactor,
    #[serde(with = "rust_decimal::serde::str")]
    pub max_borrowable: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub max_withdrawable: Decimal,
}
