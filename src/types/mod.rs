//! Core types for the tool server.
//!
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for server, protocol identity and logging

mod config;
mod errors;

pub use config::{Config, McpConfig, ObservabilityConfig, ServerConfig};
pub use errors::{Error, Result};
