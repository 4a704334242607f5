use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal string in the ledger's UFix64 shape (e.g. `"1.0"`, `"100.00000000"`).
///
/// Values coming from user input go through [`crate::core::amount::normalize`];
/// values coming from the ledger are already canonical and are wrapped as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedPointAmount(String);

impl FixedPointAmount {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn zero() -> Self {
        Self("0.0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a `Decimal`, treating unparseable text as zero.
    pub fn to_decimal(&self) -> Decimal {
        parse_lenient(&self.0)
    }
}

impl fmt::Display for FixedPointAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FixedPointAmount {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse decimal text, falling back to zero for anything non-numeric.
pub fn parse_lenient(value: &str) -> Decimal {
    Decimal::from_str(value.trim()).unwrap_or(Decimal::ZERO)
}
