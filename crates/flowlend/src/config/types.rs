use serde::Deserialize;

use crate::constants::{
    DEFAULT_COMPUTE_LIMIT, DEFAULT_FINALITY_POLL_INTERVAL_MS, FLOWLEND_IMPORT, FLOW_TOKEN_IMPORT,
    FUNGIBLE_TOKEN_IMPORT,
};

// ---------------------------------------------------------------------------
// Top-level aggregate
// ---------------------------------------------------------------------------

/// Process configuration, built once at start-up and passed by reference to
/// the components that need it.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowLendConfig {
    pub app: AppConfig,
    pub ledger: LedgerConfig,
    pub transactions: TransactionConfig,
    pub sync: SyncConfig,
}

// ---------------------------------------------------------------------------
// app.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
    /// Level for this crate's targets when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON on stderr as well as in the log file.
    #[serde(default)]
    pub json_stderr: bool,
}

fn default_log_file_name() -> String {
    "flowlend.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ---------------------------------------------------------------------------
// networks/<network>.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub network: String,
    /// Base URL of the access node REST API.
    pub access_node_api: String,
    pub discovery_wallet: String,
    pub app_detail: AppDetailConfig,
    pub contracts: ContractsConfig,
    /// Optional; wallets that connect over WalletConnect need it.
    #[serde(default)]
    pub wallet_connect_project_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppDetailConfig {
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    pub flow_lend: String,
    pub flow_token: String,
    pub fungible_token: String,
}

impl ContractsConfig {
    /// Replace import placeholders in a ledger program with configured addresses.
    pub fn resolve_imports(&self, program: &str) -> String {
        program
            .replace(FLOWLEND_IMPORT, &self.flow_lend)
            .replace(FLOW_TOKEN_IMPORT, &self.flow_token)
            .replace(FUNGIBLE_TOKEN_IMPORT, &self.fungible_token)
    }
}

// ---------------------------------------------------------------------------
// transactions.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionConfig {
    #[serde(default = "default_compute_limit")]
    pub compute_limit: u64,
    #[serde(default = "default_finality_poll_interval_ms")]
    pub finality_poll_interval_ms: u64,
    /// Reject negative, zero and over-precise amounts before submission.
    #[serde(default)]
    pub reject_invalid_amounts: bool,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            compute_limit: DEFAULT_COMPUTE_LIMIT,
            finality_poll_interval_ms: DEFAULT_FINALITY_POLL_INTERVAL_MS,
            reject_invalid_amounts: false,
        }
    }
}

fn default_compute_limit() -> u64 {
    DEFAULT_COMPUTE_LIMIT
}

fn default_finality_poll_interval_ms() -> u64 {
    DEFAULT_FINALITY_POLL_INTERVAL_MS
}

// ---------------------------------------------------------------------------
// sync.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Periodic refresh for the monitor binary; `0` disables it.
    pub refresh_interval_seconds: u64,
}
