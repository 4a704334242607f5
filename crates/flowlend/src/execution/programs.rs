//! Ledger programs for the FlowLend contract.
//!
//! Read scripts and transaction templates reference contracts through import
//! placeholders (`0xFlowLend`, `0xFlowToken`, `0xFungibleToken`). [`Programs`]
//! resolves them once against the configured contract addresses.

use crate::config::ContractsConfig;
use crate::types::ActionKind;

// ---------------------------------------------------------------------------
// Read scripts
// ---------------------------------------------------------------------------

pub const USER_POSITION_SCRIPT: &str = r#"
import FlowLend from 0xFlowLend

access(all) fun main(user: Address): FlowLend.UserPosition {
    return FlowLend.getUserPosition(user: user)
}
"#;

pub const USER_HEALTH_FACTOR_SCRIPT: &str = r#"
import FlowLend from 0xFlowLend

access(all) fun main(user: Address): UFix64 {
    return FlowLend.getUserHealthFactor(user: user)
}
"#;

pub const POOL_STATE_SCRIPT: &str = r#"
import FlowLend from 0xFlowLend

access(all) fun main(): FlowLend.PoolState {
    return FlowLend.getPoolState()
}
"#;

// ---------------------------------------------------------------------------
// Transactions (each takes a single `amount: UFix64`)
// ---------------------------------------------------------------------------

pub const DEPOSIT_TRANSACTION: &str = r#"
import FungibleToken from 0xFungibleToken
import FlowToken from 0xFlowToken
import FlowLend from 0xFlowLend

transaction(amount: UFix64) {
    prepare(acct: auth(Storage) &Account) {
        let vaultRef = acct.storage
            .borrow<auth(FungibleToken.Withdraw) &FlowToken.Vault>(from: /storage/flowTokenVault)
            ?? panic("Could not borrow reference to FLOW vault")

        let payment <- vaultRef.withdraw(amount: amount) as! @FlowToken.Vault
        FlowLend.deposit(fromVault: <- payment, user: acct.address)
    }
}
"#;

pub const WITHDRAW_TRANSACTION: &str = r#"
import FlowToken from 0xFlowToken
import FlowLend from 0xFlowLend

transaction(amount: UFix64) {
    prepare(acct: auth(Storage) &Account) {
        let vaultRef = acct.storage
            .borrow<&FlowToken.Vault>(from: /storage/flowTokenVault)
            ?? panic("Could not borrow reference to FLOW vault")

        let released <- FlowLend.withdraw(amount: amount, user: acct.address)
        vaultRef.deposit(from: <- released)
    }
}
"#;

pub const BORROW_TRANSACTION: &str = r#"
import FlowToken from 0xFlowToken
import FlowLend from 0xFlowLend

transaction(amount: UFix64) {
    prepare(acct: auth(Storage) &Account) {
        let vaultRef = acct.storage
            .borrow<&FlowToken.Vault>(from: /storage/flowTokenVault)
            ?? panic("Could not borrow reference to FLOW vault")

        let loan <- FlowLend.borrow(amount: amount, user: acct.address)
        vaultRef.deposit(from: <- loan)
    }
}
"#;

pub const REPAY_TRANSACTION: &str = r#"
import FungibleToken from 0xFungibleToken
import FlowToken from 0xFlowToken
import FlowLend from 0xFlowLend

transaction(amount: UFix64) {
    prepare(acct: auth(Storage) &Account) {
        let vaultRef = acct.storage
            .borrow<auth(FungibleToken.Withdraw) &FlowToken.Vault>(from: /storage/flowTokenVault)
            ?? panic("Could not borrow reference to FLOW vault")

        let payment <- vaultRef.withdraw(amount: amount) as! @FlowToken.Vault
        FlowLend.repay(fromVault: <- payment, user: acct.address)
    }
}
"#;

/// Unresolved transaction template for an action.
pub fn transaction_template(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Deposit => DEPOSIT_TRANSACTION,
        ActionKind::Withdraw => WITHDRAW_TRANSACTION,
        ActionKind::Borrow => BORROW_TRANSACTION,
        ActionKind::Repay => REPAY_TRANSACTION,
    }
}

// ---------------------------------------------------------------------------
// Resolved program set
// ---------------------------------------------------------------------------

/// All programs with imports resolved against one contract deployment.
#[derive(Debug, Clone)]
pub struct Programs {
    pub user_position: String,
    pub user_health_factor: String,
    pub pool_state: String,
    deposit: String,
    withdraw: String,
    borrow: String,
    repay: String,
}

impl Programs {
    pub fn new(contracts: &ContractsConfig) -> Self {
        Self {
            user_position: contracts.resolve_imports(USER_POSITION_SCRIPT),
            user_health_factor: contracts.resolve_imports(USER_HEALTH_FACTOR_SCRIPT),
            pool_state: contracts.resolve_imports(POOL_STATE_SCRIPT),
            deposit: contracts.resolve_imports(DEPOSIT_TRANSACTION),
            withdraw: contracts.resolve_imports(WITHDRAW_TRANSACTION),
            borrow: contracts.resolve_imports(BORROW_TRANSACTION),
            repay: contracts.resolve_imports(REPAY_TRANSACTION),
        }
    }

    pub fn transaction(&self, kind: ActionKind) -> &str {
        match kind {
            ActionKind::Deposit => &self.deposit,
            ActionKind::Withdraw => &self.withdraw,
            ActionKind::Borrow => &self.borrow,
            ActionKind::Repay => &self.repay,
        }
    }
}
