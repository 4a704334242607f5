//! Access node REST client for script reads and finality polling.
//!
//! Scripts go to `POST /v1/scripts` with base64-encoded source and
//! base64-encoded JSON-Cadence arguments; the response body is a JSON string
//! holding the base64-encoded JSON-Cadence result. Finality is observed by
//! polling `GET /v1/transaction_results/{id}` until the ledger reports
//! `Sealed`. Submission needs a wallet signature and is not handled here.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{LedgerConfig, TransactionConfig};
use crate::constants::SEALED_STATUS;
use crate::errors::LendError;
use crate::types::SealedResult;

use super::cadence::CadenceValue;
use super::ledger::{FinalitySubscription, LedgerQuery};

/// HTTP timeout for a single request to the access node.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Body of `POST /v1/scripts`.
#[derive(Debug, Serialize)]
pub struct ScriptRequest {
    pub script: String,
    pub arguments: Vec<String>,
}

/// Subset of `GET /v1/transaction_results/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResultResponse {
    pub status: String,
    #[serde(default)]
    pub status_code: u32,
    #[serde(default)]
    pub error_message: String,
}

/// Where a polled transaction stands.
#[derive(Debug)]
pub enum FinalityState {
    InFlight(String),
    Sealed(SealedResult),
    Failed(LendError),
}

/// Error body returned by the access node on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// REST client over a single access node.
pub struct AccessNodeClient {
    http: Client,
    base_url: String,
    poll_interval: Duration,
}

impl AccessNodeClient {
    /// Build from the ledger and transaction config.
    pub fn new(ledger: &LedgerConfig, transactions: &TransactionConfig) -> Result<Self, LendError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = ledger.access_node_api.trim_end_matches('/').to_string();

        info!(
            access_node = %base_url,
            network = %ledger.network,
            poll_interval_ms = transactions.finality_poll_interval_ms,
            "access node client initialized"
        );

        Ok(Self {
            http,
            base_url,
            poll_interval: Duration::from_millis(transactions.finality_poll_interval_ms),
        })
    }

    pub fn scripts_url(&self) -> String {
        format!("{}/v1/scripts?block_height=sealed", self.base_url)
    }

    pub fn transaction_result_url(&self, tx_id: &str) -> String {
        format!("{}/v1/transaction_results/{tx_id}", self.base_url)
    }

    async fn fetch_transaction_result(
        &self,
        tx_id: &str,
    ) -> Result<TransactionResultResponse, LendError> {
        let resp = self.http.get(self.transaction_result_url(tx_id)).send().await?;
        let body = read_success_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl LedgerQuery for AccessNodeClient {
    async fn query(
        &self,
        program: &str,
        args: Vec<CadenceValue>,
    ) -> Result<CadenceValue, LendError> {
        let request = encode_script_request(program, &args)?;
        let resp = self
            .http
            .post(self.scripts_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| LendError::Network {
                reason: format!("script request failed: {e}"),
            })?;

        let body = read_success_body(resp).await?;
        let value = decode_script_response(&body)?;
        debug!(result_type = value.type_name(), "script executed");
        Ok(value)
    }
}

#[async_trait]
impl FinalitySubscription for AccessNodeClient {
    /// Poll until sealed. No overall timeout: the wait is bounded only by the
    /// ledger's own expiry.
    async fn await_sealed(&self, tx_id: &str) -> Result<SealedResult, LendError> {
        let mut last_status = String::new();

        loop {
            match self.fetch_transaction_result(tx_id).await {
                Ok(result) => match interpret_transaction_result(&result) {
                    FinalityState::Sealed(sealed) => {
                        info!(tx_id, status = %sealed.status_string, "transaction sealed");
                        return Ok(sealed);
                    }
                    FinalityState::Failed(err) => {
                        warn!(tx_id, error = %err, "transaction failed on ledger");
                        return Err(err);
                    }
                    FinalityState::InFlight(status) => {
                        if status != last_status {
                            debug!(tx_id, %status, "transaction status");
                            last_status = status;
                        }
                    }
                },
                Err(e) => {
                    warn!(error = %e, tx_id, "transaction result poll error, retrying");
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Wire helpers
// ---------------------------------------------------------------------------

/// Encode a script and its arguments for `POST /v1/scripts`.
pub fn encode_script_request(
    program: &str,
    args: &[CadenceValue],
) -> Result<ScriptRequest, LendError> {
    let arguments = args
        .iter()
        .map(|arg| serde_json::to_vec(arg).map(|json| STANDARD.encode(json)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScriptRequest {
        script: STANDARD.encode(program),
        arguments,
    })
}

/// Decode the script endpoint body: a JSON string of base64 JSON-Cadence.
pub fn decode_script_response(body: &str) -> Result<CadenceValue, LendError> {
    let encoded: String = serde_json::from_str(body).map_err(|e| LendError::Decode {
        reason: format!("script response is not a JSON string: {e}"),
    })?;
    let raw = STANDARD.decode(encoded.trim())?;
    serde_json::from_slice(&raw).map_err(|e| LendError::Decode {
        reason: format!("invalid JSON-Cadence value: {e}"),
    })
}

/// Classify a polled transaction result.
pub fn interpret_transaction_result(result: &TransactionResultResponse) -> FinalityState {
    if !result.error_message.is_empty() {
        return FinalityState::Failed(LendError::Rejected {
            message: result.error_message.clone(),
        });
    }
    match result.status.as_str() {
        "Sealed" => FinalityState::Sealed(SealedResult {
            status_string: SEALED_STATUS.to_string(),
        }),
        "Expired" => FinalityState::Failed(LendError::Rejected {
            message: "transaction expired before it was sealed".to_string(),
        }),
        other => FinalityState::InFlight(other.to_string()),
    }
}

/// Return the body of a 2xx response, or a network error carrying the
/// access node's message.
async fn read_success_body(resp: reqwest::Response) -> Result<String, LendError> {
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    Err(LendError::Network {
        reason: format!("access node returned {status}: {message}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppDetailConfig, ContractsConfig};

    fn ledger_config(api: &str) -> LedgerConfig {
        LedgerConfig {
            network: "testnet".into(),
            access_node_api: api.into(),
            discovery_wallet: "https://fcl-discovery.onflow.org/testnet/authn".into(),
            app_detail: AppDetailConfig {
                title: "FlowLend".into(),
                icon: String::new(),
            },
            contracts: ContractsConfig {
                flow_lend: "0xcf265b057b710867".into(),
                flow_token: "0x7e60df042a9c0868".into(),
                fungible_token: "0x9a0766d93b6608b7".into(),
            },
            wallet_connect_project_id: None,
        }
    }

    #[test]
    fn urls_strip_trailing_slash() {
        let client = AccessNodeClient::new(
            &ledger_config("https://rest-testnet.onflow.org/"),
            &TransactionConfig::default(),
        )
        .unwrap();
        assert_eq!(
            client.scripts_url(),
            "https://rest-testnet.onflow.org/v1/scripts?block_height=sealed"
        );
        assert_eq!(
            client.transaction_result_url("abc"),
            "https://rest-testnet.onflow.org/v1/transaction_results/abc"
        );
    }

    #[test]
    fn script_request_is_base64_encoded() {
        let request = encode_script_request(
            "access(all) fun main(): Int { return 1 }",
            &[CadenceValue::address("0x01cf0e2f2f715450")],
        )
        .unwrap();

        let script = STANDARD.decode(&request.script).unwrap();
        assert_eq!(script, b"access(all) fun main(): Int { return 1 }");

        assert_eq!(request.arguments.len(), 1);
        let arg = STANDARD.decode(&request.arguments[0]).unwrap();
        assert_eq!(
            String::from_utf8(arg).unwrap(),
            r#"{"type":"Address","value":"0x01cf0e2f2f715450"}"#
        );
    }

    #[test]
    fn decodes_script_response_body() {
        let inner = r#"{"type":"UFix64","value":"1.50000000"}"#;
        let body = format!("\"{}\"\n", STANDARD.encode(inner));
        let value = decode_script_response(&body).unwrap();
        assert_eq!(value, CadenceValue::UFix64("1.50000000".into()));
    }

    #[test]
    fn non_string_script_response_is_decode_error() {
        let err = decode_script_response(r#"{"code":400}"#).unwrap_err();
        assert!(matches!(err, LendError::Decode { .. }));
    }

    #[test]
    fn sealed_result_without_error() {
        let result = TransactionResultResponse {
            status: "Sealed".into(),
            status_code: 0,
            error_message: String::new(),
        };
        match interpret_transaction_result(&result) {
            FinalityState::Sealed(sealed) => assert_eq!(sealed.status_string, "SEALED"),
            other => panic!("expected sealed, got {other:?}"),
        }
    }

    #[test]
    fn execution_error_fails_even_when_sealed() {
        let result = TransactionResultResponse {
            status: "Sealed".into(),
            status_code: 1,
            error_message: "error: pre-condition failed: would make position unhealthy".into(),
        };
        match interpret_transaction_result(&result) {
            FinalityState::Failed(LendError::Rejected { message }) => {
                assert!(message.contains("would make position unhealthy"))
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn pending_and_executed_are_in_flight() {
        for status in ["Pending", "Finalized", "Executed"] {
            let result = TransactionResultResponse {
                status: status.into(),
                status_code: 0,
                error_message: String::new(),
            };
            assert!(matches!(
                interpret_transaction_result(&result),
                FinalityState::InFlight(s) if s == status
            ));
        }
    }

    #[test]
    fn expired_is_failure() {
        let result = TransactionResultResponse {
            status: "Expired".into(),
            status_code: 0,
            error_message: String::new(),
        };
        assert!(matches!(
            interpret_transaction_result(&result),
            FinalityState::Failed(_)
        ));
    }
}
