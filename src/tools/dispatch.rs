//! Invocation dispatcher: call any registered tool by name with raw string arguments.
//!
//! Used by the diagnostic test endpoint (`invoke`, never fails) and by the
//! remote tool-call protocol (`call`, typed errors).

use crate::tools::args::{ArgValue, CallArgs};
use crate::tools::catalog::{positional_name, ToolDef, ToolDescriptor};
use crate::tools::coerce;
use crate::tools::registry::{panic_text, tool_table, ComponentRegistry};
use crate::types::{Error, Result};
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationOutcome {
    pub success: bool,
    pub message: String,
}

impl InvocationOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Textual form of a tool result: bare text for strings, `null` for null, JSON otherwise.
pub fn render_result(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolves tool names against the live registry and invokes them.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ComponentRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Invoke and fold every failure into the outcome.
    pub async fn invoke(
        &self,
        tool_name: &str,
        raw_args: &HashMap<String, String>,
    ) -> InvocationOutcome {
        match self.call(tool_name, raw_args).await {
            Ok(value) => {
                let rendered = render_result(&value);
                tracing::info!(tool = tool_name, success = true, "Tool invocation succeeded");
                InvocationOutcome::ok(format!("{} invocation result: {}", tool_name, rendered))
            }
            Err(e) => {
                tracing::warn!(
                    tool = tool_name,
                    success = false,
                    error = %e,
                    "Tool invocation failed"
                );
                InvocationOutcome::failed(e.to_string())
            }
        }
    }

    /// Resolve, coerce, and invoke one tool.
    pub async fn call(&self, tool_name: &str, raw_args: &HashMap<String, String>) -> Result<Value> {
        let catalog = self.registry.scan();
        let descriptor = catalog
            .iter()
            .find(|d| d.name == tool_name)
            .ok_or_else(|| Error::not_found(format!("tool not found: {}", tool_name)))?;

        let def = self.resolve_def(descriptor)?;
        let args = if def.arity() == 0 {
            CallArgs::default()
        } else {
            assemble_args(tool_name, descriptor, &def, raw_args)?
        };

        tracing::debug!(
            tool = tool_name,
            component = %descriptor.component_id,
            arity = args.len(),
            "Invoking tool"
        );

        let future = std::panic::catch_unwind(AssertUnwindSafe(|| (def.handler)(args)))
            .map_err(|panic| Error::invocation(panic_message(panic.as_ref())))?;
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(Error::invocation(panic_message(panic.as_ref()))),
        }
    }

    /// Re-resolve the component and its tool table the same way the scan did.
    fn resolve_def(&self, descriptor: &ToolDescriptor) -> Result<ToolDef> {
        let component = self.registry.get(&descriptor.component_id).ok_or_else(|| {
            Error::not_found(format!("component not found: {}", descriptor.component_id))
        })?;

        tool_table(component.as_ref())?
            .into_iter()
            .find(|def| def.name == descriptor.name)
            .ok_or_else(|| {
                Error::not_found(format!(
                    "method not found on component {}: {}",
                    descriptor.component_id, descriptor.name
                ))
            })
    }
}

/// Build positional arguments, one slot per declared parameter.
fn assemble_args(
    tool_name: &str,
    descriptor: &ToolDescriptor,
    def: &ToolDef,
    raw_args: &HashMap<String, String>,
) -> Result<CallArgs> {
    let mut values: Vec<ArgValue> = Vec::with_capacity(def.arity());
    for (i, spec) in def.params.iter().enumerate() {
        let external = descriptor
            .parameters
            .get(i)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| positional_name(i));
        let raw = lookup_raw(tool_name, &external, i, raw_args);
        values.push(coerce::resolve(&spec.param_type, raw)?);
    }
    Ok(CallArgs::new(values))
}

fn lookup_raw<'a>(
    tool_name: &str,
    external: &str,
    index: usize,
    raw_args: &'a HashMap<String, String>,
) -> Option<&'a str> {
    let mut candidates = vec![external.to_string(), format!("{}.{}", tool_name, external)];
    let positional = positional_name(index);
    if external != positional {
        candidates.push(format!("{}.{}", tool_name, positional));
        candidates.insert(2, positional);
    }
    candidates
        .iter()
        .find_map(|key| raw_args.get(key))
        .map(String::as_str)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    format!("tool panicked: {}", panic_text(panic))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog::{ParamSpec, ParamType};
    use crate::tools::registry::ToolProvider;
    use serde_json::json;

    struct EchoProvider;

    impl ToolProvider for EchoProvider {
        fn component_id(&self) -> &str {
            "echo"
        }

        fn type_name(&self) -> &'static str {
            std::any::type_name::<Self>()
        }

        fn tools(&self) -> Result<Vec<ToolDef>> {
            Ok(vec![
                ToolDef::new("echo", "Echo a labelled value", |args| {
                    async move {
                        let label = args.text(0)?.to_string();
                        let flag = args.bool(1)?;
                        Ok(json!({"label": label, "flag": flag}))
                    }
                    .boxed()
                })
                .param(ParamSpec::new(ParamType::String).named("label"))
                .param(ParamSpec::new(ParamType::Bool)),
                ToolDef::new("nothing", "Returns null", |_| async { Ok(Value::Null) }.boxed()),
                ToolDef::new("explode", "Panics", |_| {
                    async {
                        let fail = true;
                        if fail {
                            panic!("boom");
                        }
                        Ok(Value::Null)
                    }
                    .boxed()
                }),
                ToolDef::new("detonate", "Panics before returning a future", |_| {
                    let fail = true;
                    if fail {
                        panic!("early boom");
                    }
                    async { Ok(Value::Null) }.boxed()
                }),
            ])
        }
    }

    fn dispatcher() -> Dispatcher {
        let registry = ComponentRegistry::new().with(Arc::new(EchoProvider));
        Dispatcher::new(Arc::new(registry))
    }

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_lookup_order() {
        let raw = args(&[("echo.label", "prefixed"), ("label", "direct")]);
        assert_eq!(lookup_raw("echo", "label", 0, &raw), Some("direct"));

        let raw = args(&[("echo.label", "prefixed"), ("param0", "positional")]);
        assert_eq!(lookup_raw("echo", "label", 0, &raw), Some("prefixed"));

        let raw = args(&[("param0", "positional")]);
        assert_eq!(lookup_raw("echo", "label", 0, &raw), Some("positional"));

        let raw = args(&[("echo.param1", "true")]);
        assert_eq!(lookup_raw("echo", "param1", 1, &raw), Some("true"));
        assert_eq!(lookup_raw("echo", "label", 0, &raw), None);

        let raw = args(&[("echo.param0", "prefixed"), ("param0", "positional")]);
        assert_eq!(lookup_raw("echo", "label", 0, &raw), Some("positional"));
    }

    #[tokio::test]
    async fn test_named_and_positional_arguments() {
        let d = dispatcher();
        let outcome = d
            .invoke("echo", &args(&[("label", "hi"), ("param1", "TRUE")]))
            .await;
        assert!(outcome.success);
        assert_eq!(
            outcome.message,
            r#"echo invocation result: {"flag":true,"label":"hi"}"#
        );
    }

    #[tokio::test]
    async fn test_null_result_rendering() {
        let outcome = dispatcher().invoke("nothing", &HashMap::new()).await;
        assert_eq!(outcome, InvocationOutcome::ok("nothing invocation result: null"));
    }

    #[tokio::test]
    async fn test_panicking_tool_becomes_failed_outcome() {
        let outcome = dispatcher().invoke("explode", &HashMap::new()).await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("tool panicked: boom"));
    }

    #[tokio::test]
    async fn test_handler_panicking_before_its_future_becomes_failed_outcome() {
        let outcome = dispatcher().invoke("detonate", &HashMap::new()).await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "tool invocation failed: tool panicked: early boom"
        );
    }

    #[test]
    fn test_resolve_def_reports_missing_component() {
        let mut descriptor = dispatcher().registry().scan()[0].clone();
        descriptor.component_id = "ghost".to_string();

        let err = dispatcher().resolve_def(&descriptor).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.to_string(), "not found: component not found: ghost");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = dispatcher().call("doesNotExist", &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_render_result() {
        assert_eq!(render_result(&json!("pong")), "pong");
        assert_eq!(render_result(&Value::Null), "null");
        assert_eq!(render_result(&json!(5)), "5");
        assert_eq!(render_result(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
