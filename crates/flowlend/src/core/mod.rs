pub mod amount;
pub mod error_translator;
pub mod position_sync;
pub mod risk;
pub mod session;
pub mod tx_controller;
