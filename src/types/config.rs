//! Configuration structures.
//!
//! Configuration is loaded from an optional JSON file, then environment
//! variables, then command-line flags. It is immutable once the server starts.

use crate::types::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote tool-call protocol identity.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Application name shown on the status page.
    pub application_name: String,

    /// HTTP bind host.
    pub host: String,

    /// HTTP bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            application_name: "loan-mcp".to_string(),
            host: "0.0.0.0".to_string(),
            port: 9081,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Identity advertised on `initialize` and on the status page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    pub name: String,
    pub version: String,
    pub protocol: String,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            name: "loan-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            protocol: "STREAMABLE".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration: JSON file (if given) then `LOAN_MCP_*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str(&raw)?
            }
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    ///
    /// Taking the lookup as a parameter keeps tests away from process-global
    /// environment state.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("LOAN_MCP_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("LOAN_MCP_PORT") {
            self.server.port = port.parse().map_err(|_| {
                crate::types::Error::validation(format!("LOAN_MCP_PORT is not a port: {}", port))
            })?;
        }
        if let Some(level) = lookup("LOAN_MCP_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("LOAN_MCP_LOG_FORMAT") {
            self.observability.json_logs = format.eq_ignore_ascii_case("json");
        }
        Ok(())
    }
}
