use thiserror::Error;

/// Typed error hierarchy for the FlowLend client.
///
/// Library-internal errors use specific variants; application code wraps with
/// `anyhow::Context` for propagation.
#[derive(Error, Debug)]
pub enum LendError {
    // -- Ledger transport ---------------------------------------------------
    #[error("network error: {reason}")]
    Network { reason: String },

    /// Ledger-defined rejection text, surfaced verbatim to the error translator.
    #[error("{message}")]
    Rejected { message: String },

    #[error("failed to decode ledger response: {reason}")]
    Decode { reason: String },

    // -- Amounts ------------------------------------------------------------
    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    // -- Session ------------------------------------------------------------
    #[error("no wallet address available for log-in")]
    NoSession,

    // -- Configuration ------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),

    /// A failure that carried no error value at all.
    #[error("unknown failure")]
    Unknown,

    // -- Forwarded errors ---------------------------------------------------
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
