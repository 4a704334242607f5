pub mod config;
pub mod constants;
pub mod core;
pub mod display;
pub mod errors;
pub mod execution;
pub mod logging;
pub mod types;
