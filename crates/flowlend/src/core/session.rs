//! Wallet session: who is signed in.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::errors::LendError;

/// Authentication provider seam.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current address, `None` when signed out.
    fn subscribe(&self) -> watch::Receiver<Option<String>>;

    async fn log_in(&self) -> Result<(), LendError>;

    async fn log_out(&self) -> Result<(), LendError>;
}

/// Session backed by a pre-authorized wallet address.
pub struct WalletSession {
    address: Option<String>,
    wallet_connect_project_id: Option<String>,
    current: watch::Sender<Option<String>>,
    bridge_initialized: AtomicBool,
}

impl WalletSession {
    pub fn new(ledger: &LedgerConfig, address: Option<String>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            address,
            wallet_connect_project_id: ledger.wallet_connect_project_id.clone(),
            current,
            bridge_initialized: AtomicBool::new(false),
        }
    }

    pub fn current_address(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// One-shot wallet bridge setup. Returns `true` on the call that performed
    /// the initialization.
    pub fn ensure_wallet_bridge(&self) -> bool {
        if self.bridge_initialized.swap(true, Ordering::AcqRel) {
            return false;
        }
        match &self.wallet_connect_project_id {
            Some(id) => info!(project_id = %id, "wallet bridge initialized"),
            None => warn!("no WalletConnect project id configured, wallet bridge disabled"),
        }
        true
    }
}

#[async_trait]
impl AuthProvider for WalletSession {
    fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }

    async fn log_in(&self) -> Result<(), LendError> {
        self.ensure_wallet_bridge();
        let address = self.address.clone().ok_or(LendError::NoSession)?;
        info!(%address, "log in");
        self.current.send_replace(Some(address));
        Ok(())
    }

    async fn log_out(&self) -> Result<(), LendError> {
        if self.current.send_replace(None).is_some() {
            info!("log out");
        }
        Ok(())
    }
}
