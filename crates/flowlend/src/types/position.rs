use serde::{Deserialize, Serialize};

use super::amount::FixedPointAmount;

/// One user's collateral and debt on the lending protocol.
///
/// Non-negative by protocol invariant; the ledger is the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub collateral: FixedPointAmount,
    pub borrowed: FixedPointAmount,
}

/// Protocol-wide snapshot, independent of any user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub total_collateral: FixedPointAmount,
    pub total_borrows: FixedPointAmount,
    /// Total borrows over total collateral, as a fraction.
    pub utilization_rate: FixedPointAmount,
}
