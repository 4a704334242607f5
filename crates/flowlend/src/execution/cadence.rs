//! JSON-Cadence value encoding.
//!
//! The ledger exchanges script arguments and results as JSON objects of the
//! form `{"type": "<Type>", "value": ...}`. `CadenceValue` covers the subset
//! of types the lending scripts and transactions use.

use serde::{Deserialize, Serialize};

use crate::errors::LendError;
use crate::types::FixedPointAmount;

/// A JSON-Cadence value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CadenceValue {
    Void,
    Optional(Option<Box<CadenceValue>>),
    Bool(bool),
    String(String),
    Address(String),
    UInt64(String),
    UFix64(String),
    Fix64(String),
    Struct(Composite),
}

/// Composite payload of a `Struct` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composite {
    /// Fully qualified type id, e.g. `A.cf265b057b710867.FlowLend.UserPosition`.
    pub id: String,
    pub fields: Vec<CompositeField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeField {
    pub name: String,
    pub value: CadenceValue,
}

/// Numeric type tag for binding amount arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    UFix64,
    Fix64,
}

/// Bind a normalized fixed-point amount as a transaction argument.
///
/// Every action binds its amount through this function with the same type tag.
pub fn bind_amount(amount: &FixedPointAmount, ty: NumericType) -> CadenceValue {
    let raw = amount.as_str().to_string();
    match ty {
        NumericType::UFix64 => CadenceValue::UFix64(raw),
        NumericType::Fix64 => CadenceValue::Fix64(raw),
    }
}

impl CadenceValue {
    pub fn address(addr: impl Into<String>) -> Self {
        Self::Address(addr.into())
    }

    /// Look up a field of a `Struct` value by name.
    pub fn field(&self, name: &str) -> Option<&CadenceValue> {
        match self {
            Self::Struct(composite) => composite
                .fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| &f.value),
            _ => None,
        }
    }

    /// Extract a fixed-point number, unwrapping a present `Optional`.
    pub fn as_fixed_point(&self) -> Result<FixedPointAmount, LendError> {
        match self {
            Self::UFix64(v) | Self::Fix64(v) => Ok(FixedPointAmount::new(v.clone())),
            Self::Optional(Some(inner)) => inner.as_fixed_point(),
            other => Err(LendError::Decode {
                reason: format!("expected fixed-point value, got {}", other.type_name()),
            }),
        }
    }

    /// Fixed-point struct field, failing with a decode error when absent.
    pub fn fixed_point_field(&self, name: &str) -> Result<FixedPointAmount, LendError> {
        self.field(name)
            .ok_or_else(|| LendError::Decode {
                reason: format!("missing field `{name}` in {}", self.type_name()),
            })?
            .as_fixed_point()
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Optional(_) => "Optional",
            Self::Bool(_) => "Bool",
            Self::String(_) => "String",
            Self::Address(_) => "Address",
            Self::UInt64(_) => "UInt64",
            Self::UFix64(_) => "UFix64",
            Self::Fix64(_) => "Fix64",
            Self::Struct(_) => "Struct",
        }
    }
}
