//! Ledger failure text → user-facing status line.
//!
//! The ledger only reports human-readable failure strings, so classification
//! is an ordered substring table: first match wins, case-sensitive.

use crate::constants::UNKNOWN_FAILURE_TEXT;
use crate::errors::LendError;

/// User-facing category of a failed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InsufficientFunds,
    UnhealthyPosition,
    /// No known pattern; the raw message is shown.
    Ledger,
}

/// Matching table, checked top to bottom.
const PATTERNS: &[(&str, ErrorCategory)] = &[
    ("Cannot withdraw tokens", ErrorCategory::InsufficientFunds),
    ("would make position unhealthy", ErrorCategory::UnhealthyPosition),
];

const INSUFFICIENT_FUNDS_TEXT: &str =
    "Not enough funds in your wallet for that amount. Lower the amount or top up.";
const UNHEALTHY_POSITION_TEXT: &str =
    "This action would push your health factor below the limit. Adjust the amount or add more collateral.";

pub fn classify(message: &str) -> ErrorCategory {
    PATTERNS
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::Ledger)
}

/// Render a raw failure message as terminal status text.
///
/// Every category carries the `Error: ` prefix, the known ones included.
pub fn translate_message(message: &str) -> String {
    let body = match classify(message) {
        ErrorCategory::InsufficientFunds => INSUFFICIENT_FUNDS_TEXT,
        ErrorCategory::UnhealthyPosition => UNHEALTHY_POSITION_TEXT,
        ErrorCategory::Ledger => message,
    };
    format!("Error: {body}")
}

/// Render any lifecycle failure as terminal status text.
pub fn translate(err: &LendError) -> String {
    match err {
        LendError::Unknown => UNKNOWN_FAILURE_TEXT.to_string(),
        other => translate_message(&other.to_string()),
    }
}
