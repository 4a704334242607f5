pub mod types;
pub mod validate;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Network loaded when `FLOWLEND_NETWORK` is unset.
pub const DEFAULT_NETWORK: &str = "testnet";

/// Load and merge all config JSON files into a single [`FlowLendConfig`],
/// then apply environment variable overrides and validate.
///
/// Expected directory layout:
/// ```text
/// config/
///   app.json
///   networks/testnet.json   (one file per network)
///   transactions.json
///   sync.json
/// ```
///
/// # Environment variable overrides
///
/// | Env Var                              | Config Field                          |
/// |--------------------------------------|---------------------------------------|
/// | `FLOWLEND_NETWORK`                   | selects `networks/<name>.json`        |
/// | `FLOWLEND_ACCESS_NODE_API`           | `ledger.access_node_api`              |
/// | `FLOWLEND_WALLETCONNECT_PROJECT_ID`  | `ledger.wallet_connect_project_id`    |
/// | `FLOWLEND_COMPUTE_LIMIT`             | `transactions.compute_limit`          |
/// | `FLOWLEND_REJECT_INVALID_AMOUNTS`    | `transactions.reject_invalid_amounts` |
pub fn load_config(config_dir: &Path) -> Result<FlowLendConfig> {
    let read = |name: &str| -> Result<String> {
        let path = config_dir.join(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))
    };

    let network = env_string("FLOWLEND_NETWORK").unwrap_or_else(|| DEFAULT_NETWORK.to_string());
    let network_file = format!("networks/{network}.json");

    let app: AppConfig =
        serde_json::from_str(&read("app.json")?).context("parsing app.json")?;

    let ledger: LedgerConfig = serde_json::from_str(&read(&network_file)?)
        .with_context(|| format!("parsing {network_file}"))?;

    let transactions: TransactionConfig =
        serde_json::from_str(&read("transactions.json")?).context("parsing transactions.json")?;

    let sync: SyncConfig =
        serde_json::from_str(&read("sync.json")?).context("parsing sync.json")?;

    let mut config = FlowLendConfig {
        app,
        ledger,
        transactions,
        sync,
    };

    apply_env_overrides(&mut config);
    validate::validate_config(&config)?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides to the loaded config.
///
/// Only non-empty env vars take effect. Parse failures are skipped and the
/// JSON value remains.
fn apply_env_overrides(config: &mut FlowLendConfig) {
    if let Some(val) = env_string("FLOWLEND_ACCESS_NODE_API") {
        info!(%val, "env override: FLOWLEND_ACCESS_NODE_API");
        config.ledger.access_node_api = val;
    }

    if let Some(val) = env_string("FLOWLEND_WALLETCONNECT_PROJECT_ID") {
        info!("env override: FLOWLEND_WALLETCONNECT_PROJECT_ID");
        config.ledger.wallet_connect_project_id = Some(val);
    }

    if let Some(val) = env_parse::<u64>("FLOWLEND_COMPUTE_LIMIT") {
        info!(val, "env override: FLOWLEND_COMPUTE_LIMIT");
        config.transactions.compute_limit = val;
    }

    if let Some(val) = env_bool("FLOWLEND_REJECT_INVALID_AMOUNTS") {
        info!(val, "env override: FLOWLEND_REJECT_INVALID_AMOUNTS");
        config.transactions.reject_invalid_amounts = val;
    }
}

/// Read a non-empty env var as a `String`.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a non-empty env var as a bool (`true`, `1`, `yes` → true).
fn env_bool(key: &str) -> Option<bool> {
    env_string(key).map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}

/// Read a non-empty env var and parse it as `T`.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}
