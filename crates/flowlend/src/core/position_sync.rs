//! Position data sync: keeps position, health factor, and pool state
//! consistent with the ledger for the signed-in address.
//!
//! Triggers:
//! - logged-out → logged-in transition (via [`PositionSync::watch_session`])
//! - explicit [`PositionSync::refresh`] / [`PositionSync::refresh_current`]
//! - a sealed transaction (driven by the transaction controller)
//!
//! The three reads run concurrently. Each field keeps its last successful
//! value when its read fails; nothing is rolled back. Overlapping syncs are
//! not coalesced.

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::LendError;
use crate::execution::cadence::CadenceValue;
use crate::execution::ledger::LedgerQuery;
use crate::execution::programs::Programs;
use crate::types::{FixedPointAmount, PoolState, Position};

// ---------------------------------------------------------------------------
// Shared dashboard state
// ---------------------------------------------------------------------------

/// Process-local view of the signed-in user's data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub address: Option<String>,
    pub position: Option<Position>,
    pub pool: Option<PoolState>,
    /// Health factor as reported by the ledger.
    pub health_factor: Option<FixedPointAmount>,
    pub loading: bool,
    /// Status text of the most recently written transaction lifecycle.
    pub tx_status: Option<String>,
}

/// Shared, async-readable dashboard state. Writers are the sync and the
/// transaction controller; the last write wins.
#[derive(Debug, Default)]
pub struct DashboardState {
    inner: RwLock<DashboardSnapshot>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn address(&self) -> Option<String> {
        self.inner.read().await.address.clone()
    }

    pub async fn set_tx_status(&self, text: impl Into<String>) {
        self.inner.write().await.tx_status = Some(text.into());
    }
}

// ---------------------------------------------------------------------------
// Sync report
// ---------------------------------------------------------------------------

/// Which fields a sync refreshed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub position: bool,
    pub health_factor: bool,
    pub pool: bool,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.position && self.health_factor && self.pool
    }

    pub fn failed_fields(&self) -> Vec<&'static str> {
        [
            (self.position, "position"),
            (self.health_factor, "health_factor"),
            (self.pool, "pool"),
        ]
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, name)| name)
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Decoding (pure)
// ---------------------------------------------------------------------------

pub fn decode_position(value: &CadenceValue) -> Result<Position, LendError> {
    Ok(Position {
        collateral: value.fixed_point_field("collateral")?,
        borrowed: value.fixed_point_field("borrowed")?,
    })
}

pub fn decode_pool_state(value: &CadenceValue) -> Result<PoolState, LendError> {
    Ok(PoolState {
        total_collateral: value.fixed_point_field("totalCollateral")?,
        total_borrows: value.fixed_point_field("totalBorrows")?,
        utilization_rate: value.fixed_point_field("utilizationRate")?,
    })
}

// ---------------------------------------------------------------------------
// PositionSync
// ---------------------------------------------------------------------------

pub struct PositionSync {
    query: Arc<dyn LedgerQuery>,
    programs: Arc<Programs>,
    state: Arc<DashboardState>,
}

impl PositionSync {
    pub fn new(
        query: Arc<dyn LedgerQuery>,
        programs: Arc<Programs>,
        state: Arc<DashboardState>,
    ) -> Self {
        Self {
            query,
            programs,
            state,
        }
    }

    pub fn state(&self) -> &Arc<DashboardState> {
        &self.state
    }

    /// Fetch position, health factor, and pool state for `address`.
    ///
    /// `address` becomes the dashboard's signed-in address, even when the
    /// dashboard was cleared; callers that only want to re-read the current
    /// session use [`Self::refresh_current`]. Switching to a different
    /// address drops the previous account's data before the reads start.
    ///
    /// All three reads are attempted. Results are applied only while
    /// `address` is still the signed-in address.
    pub async fn refresh(&self, address: &str) -> SyncReport {
        {
            let mut s = self.state.inner.write().await;
            if s.address.as_deref() != Some(address) {
                s.position = None;
                s.health_factor = None;
                s.pool = None;
            }
            s.address = Some(address.to_string());
            s.loading = true;
        }

        let (position, health_factor, pool) = tokio::join!(
            self.fetch_position(address),
            self.fetch_health_factor(address),
            self.fetch_pool_state(),
        );

        let mut report = SyncReport::default();
        let mut s = self.state.inner.write().await;

        if s.address.as_deref() != Some(address) {
            debug!(address, "session changed during sync, discarding results");
            return report;
        }

        match position {
            Ok(p) => {
                s.position = Some(p);
                report.position = true;
            }
            Err(e) => warn!(error = %e, address, "position query failed"),
        }
        match health_factor {
            Ok(hf) => {
                s.health_factor = Some(hf);
                report.health_factor = true;
            }
            Err(e) => warn!(error = %e, address, "health factor query failed"),
        }
        match pool {
            Ok(p) => {
                s.pool = Some(p);
                report.pool = true;
            }
            Err(e) => warn!(error = %e, "pool state query failed"),
        }
        s.loading = false;

        if report.is_complete() {
            info!(
                address,
                collateral = %s.position.as_ref().map(|p| p.collateral.as_str()).unwrap_or_default(),
                borrowed = %s.position.as_ref().map(|p| p.borrowed.as_str()).unwrap_or_default(),
                "position synced"
            );
        } else {
            warn!(address, failed = ?report.failed_fields(), "position sync incomplete");
        }

        report
    }

    /// Refresh for the currently signed-in address.
    pub async fn refresh_current(&self) -> Result<SyncReport, LendError> {
        let address = self.state.address().await.ok_or(LendError::NoSession)?;
        Ok(self.refresh(&address).await)
    }

    /// Drop all user and pool data. Issues no query.
    pub async fn clear(&self) {
        let mut s = self.state.inner.write().await;
        s.address = None;
        s.position = None;
        s.pool = None;
        s.health_factor = None;
        s.loading = false;
        info!("dashboard cleared");
    }

    /// Apply one session transition.
    pub async fn on_session_change(&self, previous: Option<&str>, next: Option<&str>) {
        match (previous, next) {
            (_, None) => self.clear().await,
            (None, Some(addr)) => {
                info!(address = addr, "signed in");
                self.refresh(addr).await;
            }
            (Some(prev), Some(addr)) if prev != addr => {
                info!(from = prev, to = addr, "account switched");
                self.refresh(addr).await;
            }
            (Some(_), Some(_)) => {}
        }
    }

    /// Follow a session subscription until `shutdown` is cancelled or the
    /// sender is dropped.
    pub async fn watch_session(
        &self,
        mut session: watch::Receiver<Option<String>>,
        shutdown: CancellationToken,
    ) {
        let mut current = session.borrow_and_update().clone();
        self.on_session_change(None, current.as_deref()).await;

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("session watcher shutting down");
                    break;
                }
                changed = session.changed() => {
                    if changed.is_err() {
                        debug!("session provider closed");
                        break;
                    }
                    let next = session.borrow_and_update().clone();
                    self.on_session_change(current.as_deref(), next.as_deref()).await;
                    current = next;
                }
            }
        }
    }

    async fn fetch_position(&self, address: &str) -> Result<Position, LendError> {
        let value = self
            .query
            .query(&self.programs.user_position, vec![CadenceValue::address(address)])
            .await?;
        decode_position(&value)
    }

    async fn fetch_health_factor(&self, address: &str) -> Result<FixedPointAmount, LendError> {
        self.query
            .query(&self.programs.user_health_factor, vec![CadenceValue::address(address)])
            .await?
            .as_fixed_point()
    }

    async fn fetch_pool_state(&self) -> Result<PoolState, LendError> {
        let value = self.query.query(&self.programs.pool_state, Vec::new()).await?;
        decode_pool_state(&value)
    }
}
