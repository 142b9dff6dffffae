pub mod config;
pub mod error;
pub mod password;
pub mod provision;
pub mod tracing;
