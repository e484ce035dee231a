//! # loan-mcp - Tool-invocation server for loan business queries
//!
//! Providers register their tools in an explicit table. The registry is
//! scanned into a catalog that two surfaces share:
//! - a diagnostic dashboard (status page, catalog listing, manual tool tests)
//!   where every argument arrives as text and is coerced to the declared type
//! - a JSON-RPC 2.0 endpoint for remote tool calls
//!
//! ## Architecture
//!
//! ```text
//!   HTTP form / JSON-RPC ─→ Dispatcher ─→ Coercer ─→ ToolDef handler
//!                              │                         │
//!                              └── ComponentRegistry ←───┘
//!                                   (loan credit, marketing, planning)
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod http;
pub mod providers;
pub mod records;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use tools::{ComponentRegistry, Dispatcher, InvocationOutcome, ToolProvider};
pub use types::{Config, Error, Result};
