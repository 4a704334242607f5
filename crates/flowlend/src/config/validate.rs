use anyhow::{bail, Result};
use tracing::warn;

use super::types::FlowLendConfig;
use crate::constants::MAX_COMPUTE_LIMIT;

/// Validate invariants across the merged config that serde alone cannot enforce.
///
/// Called automatically by [`super::load_config`]. All problems are collected
/// and reported together.
pub fn validate_config(config: &FlowLendConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_app_config(config, &mut errors);
    validate_ledger_config(config, &mut errors);
    validate_transaction_config(config, &mut errors);

    if config
        .ledger
        .wallet_connect_project_id
        .as_deref()
        .map_or(true, str::is_empty)
    {
        warn!("wallet_connect_project_id is not set; WalletConnect wallets may fail to connect");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        let msg = format!(
            "Configuration validation failed ({} error{}):\n  - {}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            errors.join("\n  - ")
        );
        bail!("{msg}");
    }
}

fn validate_app_config(config: &FlowLendConfig, errors: &mut Vec<String>) {
    if config.app.logging.log_dir.is_empty() {
        errors.push("app.logging: log_dir is empty".into());
    }
    let level = config.app.logging.level.to_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(format!(
            "app.logging: level must be one of trace, debug, info, warn, error; got {:?}",
            config.app.logging.level
        ));
    }
}

// ---------------------------------------------------------------------------
// Ledger config
// ---------------------------------------------------------------------------

fn validate_ledger_config(config: &FlowLendConfig, errors: &mut Vec<String>) {
    let ledger = &config.ledger;

    if let Err(e) = validate_url(&ledger.access_node_api) {
        errors.push(format!("ledger.access_node_api: {e}"));
    }
    if let Err(e) = validate_url(&ledger.discovery_wallet) {
        errors.push(format!("ledger.discovery_wallet: {e}"));
    }

    if ledger.app_detail.title.is_empty() {
        errors.push("ledger.app_detail: title is empty".into());
    }

    let contract_addrs = [
        ("flow_lend", &ledger.contracts.flow_lend),
        ("flow_token", &ledger.contracts.flow_token),
        ("fungible_token", &ledger.contracts.fungible_token),
    ];

    for (name, addr) in &contract_addrs {
        if let Err(e) = validate_address(addr) {
            errors.push(format!("ledger.contracts.{name}: {e}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction config
// ---------------------------------------------------------------------------

fn validate_transaction_config(config: &FlowLendConfig, errors: &mut Vec<String>) {
    let tx = &config.transactions;

    if tx.compute_limit == 0 || tx.compute_limit > MAX_COMPUTE_LIMIT {
        errors.push(format!(
            "transactions: compute_limit must be within 1..={MAX_COMPUTE_LIMIT}, got {}",
            tx.compute_limit
        ));
    }

    if tx.finality_poll_interval_ms == 0 {
        errors.push("transactions: finality_poll_interval_ms must be > 0".into());
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A ledger account address: `0x` followed by 16 hex digits.
pub fn validate_address(addr: &str) -> Result<(), String> {
    let hex = addr
        .strip_prefix("0x")
        .ok_or_else(|| format!("address must start with 0x, got {addr:?}"))?;
    if hex.len() != 16 {
        return Err(format!("address must have 16 hex digits, got {}", hex.len()));
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("address contains non-hex characters: {addr:?}"));
    }
    Ok(())
}

fn validate_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err("url is empty".into());
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(format!("url must be http(s), got {url:?}"));
    }
    Ok(())
}
