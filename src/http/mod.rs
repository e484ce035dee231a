//! HTTP surface: diagnostic dashboard, catalog, tool testing and the remote
//! tool-call protocol endpoint.

pub mod mcp;
pub mod server;
pub mod status;

pub use server::{router, AppState, HttpServer};
pub use status::{StatusPresenter, StatusView};
