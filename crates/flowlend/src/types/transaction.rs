use serde::{Deserialize, Serialize};

use super::amount::FixedPointAmount;

/// User action against the lending protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Wallet vault → protocol collateral.
    Deposit,
    /// Protocol collateral → wallet vault.
    Withdraw,
    /// Protocol debt → wallet vault.
    Borrow,
    /// Wallet vault → protocol debt repayment.
    Repay,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [Self::Deposit, Self::Withdraw, Self::Borrow, Self::Repay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Borrow => "borrow",
            Self::Repay => "repay",
        }
    }
}

/// Lifecycle stage of a single user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Idle,
    Pending,
    Submitted,
    Sealed,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sealed | Self::Failed)
    }
}

/// The live record of one invoked action. Superseded by the next action;
/// no history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Local, monotonically increasing action number.
    pub action_id: u64,
    pub kind: ActionKind,
    /// Normalized amount bound into the transaction arguments.
    pub amount: FixedPointAmount,
    /// Ledger transaction identifier, once submitted.
    pub tx_id: Option<String>,
    pub status: TransactionStatus,
    /// User-facing status line.
    pub status_text: Option<String>,
}

impl TransactionRecord {
    pub fn idle(action_id: u64, kind: ActionKind, amount: FixedPointAmount) -> Self {
        Self {
            action_id,
            kind,
            amount,
            tx_id: None,
            status: TransactionStatus::Idle,
            status_text: None,
        }
    }
}

/// Terminal ledger state reported by the finality subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedResult {
    pub status_string: String,
}
