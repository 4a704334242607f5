pub mod amount;
pub mod health;
pub mod position;
pub mod transaction;

pub use amount::FixedPointAmount;
pub use health::{HealthFactor, HealthSummary};
pub use position::{PoolState, Position};
pub use transaction::{ActionKind, SealedResult, TransactionRecord, TransactionStatus};
