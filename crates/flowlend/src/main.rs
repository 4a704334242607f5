use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use flowlend::config::{self, validate::validate_address};
use flowlend::core::position_sync::{DashboardState, PositionSync};
use flowlend::core::risk::health_summary;
use flowlend::core::session::{AuthProvider, WalletSession};
use flowlend::display::{
    format_amount, format_decimal, format_health_factor, format_ledger_health,
    format_utilization, short_address,
};
use flowlend::execution::access_node::AccessNodeClient;
use flowlend::execution::programs::Programs;
use flowlend::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignore if missing).
    let _ = dotenvy::dotenv();

    let config_dir = std::env::var("FLOWLEND_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let config = config::load_config(&config_dir)?;

    // Hold the guard for the process lifetime.
    let _guard = logging::init_tracing(&config.app.logging)?;

    info!(
        network = %config.ledger.network,
        access_node = %config.ledger.access_node_api,
        app = %config.ledger.app_detail.title,
        "FlowLend monitor starting"
    );

    let user_address = init_user_address()?;

    // -----------------------------------------------------------------------
    // Component construction
    // -----------------------------------------------------------------------

    let client = Arc::new(
        AccessNodeClient::new(&config.ledger, &config.transactions)
            .context("failed to build access node client")?,
    );
    let programs = Arc::new(Programs::new(&config.ledger.contracts));
    let state = Arc::new(DashboardState::new());
    let sync = Arc::new(PositionSync::new(client, programs, state.clone()));
    let session = Arc::new(WalletSession::new(&config.ledger, user_address));

    let shutdown = CancellationToken::new();

    // -----------------------------------------------------------------------
    // Runtime tasks
    // -----------------------------------------------------------------------

    let watcher_handle = {
        let sync = sync.clone();
        let rx = session.subscribe();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { sync.watch_session(rx, shutdown).await })
    };

    if let Err(e) = session.log_in().await {
        warn!(error = %e, "not signed in, set FLOWLEND_USER_ADDRESS to monitor a position");
    }

    let refresh_handle = {
        let sync = sync.clone();
        let shutdown = shutdown.clone();
        let interval = config.sync.refresh_interval_seconds;
        tokio::spawn(async move { run_periodic_refresh(sync, interval, shutdown).await })
    };

    info!("monitor running, press Ctrl+C to shutdown");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    info!("shutdown signal received, stopping gracefully...");
    if let Err(e) = session.log_out().await {
        warn!(error = %e, "log out failed");
    }
    shutdown.cancel();

    let (watcher_res, refresh_res) = tokio::join!(watcher_handle, refresh_handle);
    if let Err(e) = watcher_res {
        error!(error = %e, "session watcher task panicked");
    }
    if let Err(e) = refresh_res {
        error!(error = %e, "refresh task panicked");
    }

    info!("shutdown complete");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read the monitored address from `FLOWLEND_USER_ADDRESS`, if set.
fn init_user_address() -> Result<Option<String>> {
    match std::env::var("FLOWLEND_USER_ADDRESS")
        .ok()
        .filter(|v| !v.is_empty())
    {
        Some(addr) => {
            validate_address(&addr)
                .map_err(|e| anyhow::anyhow!("FLOWLEND_USER_ADDRESS: {e}"))?;
            Ok(Some(addr))
        }
        None => Ok(None),
    }
}

/// Refresh every `interval_seconds` and log the dashboard. Zero disables
/// periodic refresh.
async fn run_periodic_refresh(
    sync: Arc<PositionSync>,
    interval_seconds: u64,
    shutdown: CancellationToken,
) {
    if interval_seconds == 0 {
        info!("periodic refresh disabled");
        return;
    }
    let interval = Duration::from_secs(interval_seconds);

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            () = tokio::time::sleep(interval) => {
                if sync.refresh_current().await.is_ok() {
                    log_dashboard(sync.state()).await;
                }
            }
        }
    }
}

async fn log_dashboard(state: &DashboardState) {
    let snap = state.snapshot().await;
    let Some(address) = snap.address.as_deref() else {
        return;
    };
    let summary = health_summary(snap.position.as_ref());
    let pool = snap.pool.as_ref();

    info!(
        user = %short_address(address),
        collateral = %format_amount(snap.position.as_ref().map(|p| &p.collateral)),
        borrowed = %format_amount(snap.position.as_ref().map(|p| &p.borrowed)),
        health_factor = %format_health_factor(summary.health_factor),
        ledger_health_factor = %format_ledger_health(snap.health_factor.as_ref()),
        max_borrowable = %format_decimal(summary.max_borrowable),
        max_withdrawable = %format_decimal(summary.max_withdrawable),
        liquidatable = summary.health_factor.is_liquidatable(),
        "position"
    );
    info!(
        total_collateral = %format_amount(pool.map(|p| &p.total_collateral)),
        total_borrows = %format_amount(pool.map(|p| &p.total_borrows)),
        utilization = %format_utilization(pool.map(|p| &p.utilization_rate)),
        "pool"
    );
}
