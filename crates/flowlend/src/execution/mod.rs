pub mod access_node;
pub mod cadence;
pub mod ledger;
pub mod programs;
