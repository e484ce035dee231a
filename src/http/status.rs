//! Diagnostic presenter: status page, catalog listing and the manual
//! tool-test endpoint.

use crate::http::server::AppState;
use crate::tools::{InvocationOutcome, ParameterDescriptor, ScanReport, ToolDescriptor};
use crate::types::{Config, Result};
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Html;
use axum::{Form, Json};
use chrono::Local;
use minijinja::Environment;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;

const TEMPLATE_NAME: &str = "status.html";
const TEMPLATE_SOURCE: &str = include_str!("../../templates/status.html");

/// Form field naming the tool to probe.
pub const TOOL_NAME_FIELD: &str = "toolName";

/// Pass-through process and server metadata shown on the status page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostInfo {
    pub application_name: String,
    pub server_port: u16,
    pub current_time: String,
    pub runtime_version: String,
    pub os_name: String,
    pub os_arch: String,
    pub mcp_server_name: String,
    pub mcp_server_version: String,
    pub mcp_server_protocol: String,
}

impl HostInfo {
    pub fn collect(config: &Config) -> Self {
        Self {
            application_name: config.server.application_name.clone(),
            server_port: config.server.port,
            current_time: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            runtime_version: format!("rust {}", env!("CARGO_PKG_RUST_VERSION")),
            os_name: std::env::consts::OS.to_string(),
            os_arch: std::env::consts::ARCH.to_string(),
            mcp_server_name: config.mcp.name.clone(),
            mcp_server_version: config.mcp.version.clone(),
            mcp_server_protocol: config.mcp.protocol.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolView {
    pub name: String,
    pub description: String,
    pub signature: String,
    pub parameters: Vec<ParameterDescriptor>,
}

impl From<&ToolDescriptor> for ToolView {
    fn from(d: &ToolDescriptor) -> Self {
        Self {
            name: d.name.clone(),
            description: d.description.clone(),
            signature: d.signature(),
            parameters: d.parameters.clone(),
        }
    }
}

/// Tools declared by one component type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolGroup {
    pub provider: String,
    pub tools: Vec<ToolView>,
}

/// Everything the status page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub host: HostInfo,
    pub tool_count: usize,
    pub duplicate_count: usize,
    pub failed_components: usize,
    pub groups: Vec<ToolGroup>,
}

/// Group descriptors by unqualified component type name, in first-seen order.
pub fn group_by_provider(tools: &[ToolDescriptor]) -> Vec<ToolGroup> {
    let mut groups: Vec<ToolGroup> = Vec::new();
    for tool in tools {
        let provider = tool.component_simple_name();
        match groups.iter_mut().find(|g| g.provider == provider) {
            Some(group) => group.tools.push(ToolView::from(tool)),
            None => groups.push(ToolGroup {
                provider: provider.to_string(),
                tools: vec![ToolView::from(tool)],
            }),
        }
    }
    groups
}

/// Builds the status view and renders it through the embedded template.
pub struct StatusPresenter {
    env: Environment<'static>,
}

impl StatusPresenter {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE_SOURCE)?;
        Ok(Self { env })
    }

    pub fn present(&self, report: ScanReport, config: &Config) -> StatusView {
        StatusView {
            host: HostInfo::collect(config),
            tool_count: report.tools.len(),
            duplicate_count: report.duplicates,
            failed_components: report.failed_components,
            groups: group_by_provider(&report.tools),
        }
    }

    pub fn render(&self, view: &StatusView) -> Result<String> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        Ok(template.render(view)?)
    }
}

impl fmt::Debug for StatusPresenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusPresenter")
            .field("template", &TEMPLATE_NAME)
            .finish()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /`
pub async fn status_page(State(state): State<AppState>) -> Result<Html<String>> {
    let report = state.dispatcher.registry().scan_report();
    tracing::info!(tools = report.tools.len(), "Rendering status page");
    let view = state.presenter.present(report, &state.config);
    Ok(Html(state.presenter.render(&view)?))
}

/// `GET /tools`
pub async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    let tools = state.dispatcher.registry().scan();
    Json(json!({ "count": tools.len(), "tools": tools }))
}

/// `POST /test-tool-connection`
///
/// Every form field is a raw argument. Failures, including an unreadable
/// form, are reported in the body.
pub async fn test_tool_connection(
    State(state): State<AppState>,
    form: std::result::Result<Form<HashMap<String, String>>, FormRejection>,
) -> Json<InvocationOutcome> {
    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Rejected tool test form");
            return Json(InvocationOutcome::failed(format!(
                "invalid form submission: {}",
                rejection.body_text()
            )));
        }
    };

    let tool_name = match fields.get(TOOL_NAME_FIELD) {
        Some(name) if !name.is_empty() => name.clone(),
        _ => {
            tracing::warn!("Tool test requested without a tool name");
            return Json(InvocationOutcome::failed(format!(
                "missing form field '{}'",
                TOOL_NAME_FIELD
            )));
        }
    };

    Json(state.dispatcher.invoke(&tool_name, &fields).await)
}
