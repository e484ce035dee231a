//! Remote tool-call protocol endpoint (JSON-RPC 2.0 over `POST /mcp`).
//!
//! Arguments arrive as JSON and are reduced to the same raw string map the
//! diagnostic form produces, so both surfaces share one coercion path.

use crate::http::server::AppState;
use crate::tools::dispatch::render_result;
use crate::types::{Error, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

pub const MCP_PATH: &str = "/mcp";

/// Protocol revision offered when the client does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-03-26";

const JSONRPC_VERSION: &str = "2.0";
const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;

pub fn router() -> Router<AppState> {
    Router::new().route(MCP_PATH, post(mcp_post).get(mcp_get))
}

async fn mcp_get() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

async fn mcp_post(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting unparseable MCP payload");
            return Json(error_response(Value::Null, PARSE_ERROR, &e.to_string()))
                .into_response();
        }
    };

    match payload {
        Value::Array(batch) => {
            if batch.is_empty() {
                return Json(error_response(Value::Null, INVALID_REQUEST, "empty batch"))
                    .into_response();
            }
            let mut responses = Vec::with_capacity(batch.len());
            for message in batch {
                if let Some(response) = handle_message(&state, message).await {
                    responses.push(response);
                }
            }
            if responses.is_empty() {
                StatusCode::ACCEPTED.into_response()
            } else {
                Json(Value::Array(responses)).into_response()
            }
        }
        message => match handle_message(&state, message).await {
            Some(response) => Json(response).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        },
    }
}

/// Handle one JSON-RPC message. Notifications (no `id`) produce no response.
pub async fn handle_message(state: &AppState, message: Value) -> Option<Value> {
    let Value::Object(message) = message else {
        return Some(error_response(
            Value::Null,
            INVALID_REQUEST,
            "request must be an object",
        ));
    };

    let id = message.get("id").cloned();
    let Some(method) = message.get("method").and_then(Value::as_str) else {
        return id.map(|id| error_response(id, INVALID_REQUEST, "missing method"));
    };
    let params = message.get("params").cloned().unwrap_or(Value::Null);

    let Some(id) = id else {
        tracing::debug!(method, "MCP notification");
        return None;
    };

    tracing::debug!(method, "MCP request");
    let response = match dispatch_method(state, method, &params).await {
        Ok(result) => json!({ "jsonrpc": JSONRPC_VERSION, "id": id, "result": result }),
        Err(e) => error_response(id, e.rpc_code(), &e.to_string()),
    };
    Some(response)
}

async fn dispatch_method(state: &AppState, method: &str, params: &Value) -> Result<Value> {
    match method {
        "initialize" => Ok(initialize(state, params)),
        "ping" => Ok(json!({})),
        "tools/list" => {
            let tools: Vec<Value> = state
                .dispatcher
                .registry()
                .scan()
                .iter()
                .map(|d| d.to_mcp_tool())
                .collect();
            Ok(json!({ "tools": tools }))
        }
        "tools/call" => call_tool(state, params).await,
        other => Err(Error::not_found(format!("method not found: {}", other))),
    }
}

fn initialize(state: &AppState, params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": state.config.mcp.name,
            "version": state.config.mcp.version,
        },
    })
}

async fn call_tool(state: &AppState, params: &Value) -> Result<Value> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_argument("tools/call requires a tool name"))?;

    let raw_args = match params.get("arguments") {
        None | Some(Value::Null) => HashMap::new(),
        Some(Value::Object(arguments)) => stringify_arguments(arguments),
        Some(_) => return Err(Error::invalid_argument("arguments must be an object")),
    };

    let (text, is_error) = match state.dispatcher.call(name, &raw_args).await {
        Ok(value) => {
            tracing::info!(tool = name, success = true, "Remote tool call succeeded");
            (render_result(&value), false)
        }
        Err(e) => {
            tracing::warn!(tool = name, success = false, error = %e, "Remote tool call failed");
            (e.to_string(), true)
        }
    };

    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    }))
}

/// Reduce JSON argument values to raw text. Strings pass through, nulls are
/// dropped so the slot takes its default, everything else becomes JSON text.
pub fn stringify_arguments(arguments: &Map<String, Value>) -> HashMap<String, String> {
    arguments
        .iter()
        .filter_map(|(key, value)| {
            let raw = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), raw))
        })
        .collect()
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": { "code": code, "message": message },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stringify_arguments() {
        let arguments = json!({
            "name": "Zhang San",
            "amount": 1500000.5,
            "flag": true,
            "changes": ["a", "b"],
            "skipped": null,
        });
        let Value::Object(arguments) = arguments else {
            unreachable!()
        };

        let raw = stringify_arguments(&arguments);
        assert_eq!(raw.len(), 4);
        assert_eq!(raw["name"], "Zhang San");
        assert_eq!(raw["amount"], "1500000.5");
        assert_eq!(raw["flag"], "true");
        assert_eq!(raw["changes"], r#"["a","b"]"#);
    }

    #[test]
    fn test_error_response_shape() {
        assert_eq!(
            error_response(json!(7), -32601, "method not found: x"),
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "error": { "code": -32601, "message": "method not found: x" }
            })
        );
    }
}
