//! Human-readable formatting of ledger figures.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::{FixedPointAmount, HealthFactor};

fn fixed(value: Decimal, dp: u32) -> String {
    format!(
        "{:.*}",
        dp as usize,
        value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Four decimals; absent → `0.0000`.
pub fn format_amount(amount: Option<&FixedPointAmount>) -> String {
    fixed(amount.map(FixedPointAmount::to_decimal).unwrap_or_default(), 4)
}

pub fn format_decimal(value: Decimal) -> String {
    fixed(value, 4)
}

/// `∞` for a debt-free position, else three decimals.
pub fn format_health_factor(hf: HealthFactor) -> String {
    match hf {
        HealthFactor::Finite(v) => fixed(v, 3),
        HealthFactor::Infinite => "∞".to_string(),
    }
}

/// Ledger-reported health factor; absent → `—`.
pub fn format_ledger_health(value: Option<&FixedPointAmount>) -> String {
    match value {
        Some(v) => fixed(v.to_decimal(), 3),
        None => "—".to_string(),
    }
}

/// Fractional utilization as a percentage; absent → `0.00%`.
pub fn format_utilization(rate: Option<&FixedPointAmount>) -> String {
    let pct = rate.map(|r| r.to_decimal() * dec!(100)).unwrap_or_default();
    format!("{}%", fixed(pct, 2))
}

/// `0x1234…cdef`. Addresses too short to shorten are returned unchanged.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
