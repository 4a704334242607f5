//! Collaborator seams to the external ledger.
//!
//! Reads, mutations, and finality are separate traits: the access node serves
//! reads and finality, while mutations need the user's wallet to sign.

use async_trait::async_trait;

use crate::errors::LendError;
use crate::types::SealedResult;

use super::cadence::CadenceValue;

/// Read-only script execution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Execute a read script and return its decoded result.
    async fn query(&self, program: &str, args: Vec<CadenceValue>)
        -> Result<CadenceValue, LendError>;
}

/// Signed transaction submission.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerMutate: Send + Sync {
    /// Submit a transaction and return its ledger identifier.
    ///
    /// Rejections carry ledger-defined free text in [`LendError::Rejected`].
    async fn mutate(
        &self,
        program: &str,
        args: Vec<CadenceValue>,
        compute_limit: u64,
    ) -> Result<String, LendError>;
}

/// Waits for a submitted transaction to reach final settlement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FinalitySubscription: Send + Sync {
    /// Resolve once the transaction is sealed, or fail if the ledger reports
    /// an execution error.
    async fn await_sealed(&self, tx_id: &str) -> Result<SealedResult, LendError>;
}
