use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Risk Parameters (process-wide, not pool- or user-specific)
// ---------------------------------------------------------------------------

/// Fraction of raw collateral counted toward borrowing power.
pub const COLLATERAL_FACTOR: Decimal = dec!(0.75);

/// Minimum acceptable health factor; below this the position can be liquidated.
pub const LIQUIDATION_THRESHOLD: Decimal = dec!(1.05);

// ---------------------------------------------------------------------------
// Ledger Numeric Format (UFix64)
// ---------------------------------------------------------------------------

/// Maximum fractional digits accepted by the ledger's fixed-point type.
pub const FIXED_POINT_SCALE: u32 = 8;

// ---------------------------------------------------------------------------
// Import Placeholders
// ---------------------------------------------------------------------------

pub const FLOWLEND_IMPORT: &str = "0xFlowLend";
pub const FLOW_TOKEN_IMPORT: &str = "0xFlowToken";
pub const FUNGIBLE_TOKEN_IMPORT: &str = "0xFungibleToken";

// ---------------------------------------------------------------------------
// Transaction Defaults
// ---------------------------------------------------------------------------

/// Computation limit attached to every mutation; also the ledger's hard maximum.
pub const DEFAULT_COMPUTE_LIMIT: u64 = 9999;
pub const MAX_COMPUTE_LIMIT: u64 = 9999;

pub const DEFAULT_FINALITY_POLL_INTERVAL_MS: u64 = 1_000;

/// Status string reported once a transaction reaches final settlement.
pub const SEALED_STATUS: &str = "SEALED";

// ---------------------------------------------------------------------------
// Status Text
// ---------------------------------------------------------------------------

pub const PENDING_STATUS_TEXT: &str = "Pending...";
pub const UNKNOWN_FAILURE_TEXT: &str = "Error: Unknown failure";
