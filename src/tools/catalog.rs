//! Tool catalog: typed metadata for registered tools.
//!
//! A `ToolDef` is what a component hands the registry: metadata plus the
//! handler closure. A `ToolDescriptor` is the catalog entry the scanner
//! derives from it, with synthesized parameter names and descriptions.

use crate::tools::args::CallArgs;
use crate::types::Result;
use futures::future::BoxFuture;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

/// Description used when a parameter carries no metadata.
pub const NO_DESCRIPTION: &str = "no description provided";

/// Synthetic external name for a positional parameter.
pub fn positional_name(index: usize) -> String {
    format!("param{}", index)
}

// =============================================================================
// Parameter types
// =============================================================================

/// Declared semantic type of a tool parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    String,
    Int,
    Long,
    Short,
    Byte,
    Float,
    Double,
    Bool,
    Char,
    Enum(Vec<String>),
    StringList,
    /// Any other type; raw text passes through untouched.
    Other(String),
}

impl ParamType {
    /// Convenience constructor for enumerated choices.
    pub fn choice<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamType::Enum(members.into_iter().map(Into::into).collect())
    }

    /// Human-readable type name for the catalog and status page.
    pub fn display_name(&self) -> String {
        match self {
            ParamType::String => "string".to_string(),
            ParamType::Int => "integer".to_string(),
            ParamType::Long => "long".to_string(),
            ParamType::Short => "short".to_string(),
            ParamType::Byte => "byte".to_string(),
            ParamType::Float => "float".to_string(),
            ParamType::Double => "double".to_string(),
            ParamType::Bool => "boolean".to_string(),
            ParamType::Char => "char".to_string(),
            ParamType::Enum(members) => format!("enum({})", members.join("|")),
            ParamType::StringList => "string[]".to_string(),
            ParamType::Other(name) => name.clone(),
        }
    }

    /// JSON Schema fragment used in `tools/list`.
    pub fn json_schema(&self) -> Value {
        match self {
            ParamType::Int | ParamType::Long | ParamType::Short | ParamType::Byte => {
                json!({ "type": "integer" })
            }
            ParamType::Float | ParamType::Double => json!({ "type": "number" }),
            ParamType::Bool => json!({ "type": "boolean" }),
            ParamType::Enum(members) => json!({ "type": "string", "enum": members }),
            ParamType::StringList => json!({ "type": "array", "items": { "type": "string" } }),
            ParamType::Char => json!({ "type": "string", "minLength": 1, "maxLength": 1 }),
            ParamType::String | ParamType::Other(_) => json!({ "type": "string" }),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl Serialize for ParamType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display_name())
    }
}

// =============================================================================
// Tool definitions (registration side)
// =============================================================================

/// Declared metadata for one formal parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub param_type: ParamType,
    /// External name override; `None` means `param<index>`.
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ParamSpec {
    /// Parameter with no metadata at all.
    pub fn new(param_type: ParamType) -> Self {
        Self {
            param_type,
            name: None,
            description: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Future returned by a tool handler.
pub type ToolFuture = BoxFuture<'static, Result<Value>>;

/// Type-erased tool implementation captured at registration time.
pub type ToolHandler = Arc<dyn Fn(CallArgs) -> ToolFuture + Send + Sync>;

/// One tool as declared by a component.
#[derive(Clone)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub handler: ToolHandler,
}

impl ToolDef {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CallArgs) -> ToolFuture + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Append a parameter; declaration order is positional order.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for ToolDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDef")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Catalog entries (scan side)
// =============================================================================

/// Catalog entry for one formal parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    #[serde(skip)]
    pub index: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
}

impl ParameterDescriptor {
    pub fn from_spec(index: usize, spec: &ParamSpec) -> Self {
        Self {
            index,
            name: spec.name.clone().unwrap_or_else(|| positional_name(index)),
            param_type: spec.param_type.clone(),
            description: spec
                .description
                .clone()
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        }
    }
}

/// Catalog entry for one discovered tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// Registry key of the owning component.
    #[serde(rename = "component")]
    pub component_id: String,
    /// Fully qualified type path of the owning component.
    #[serde(skip)]
    pub component_type: String,
    pub parameters: Vec<ParameterDescriptor>,
}

impl ToolDescriptor {
    pub fn from_def(component_id: &str, component_type: &str, def: &ToolDef) -> Self {
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            component_id: component_id.to_string(),
            component_type: component_type.to_string(),
            parameters: def
                .params
                .iter()
                .enumerate()
                .map(|(i, spec)| ParameterDescriptor::from_spec(i, spec))
                .collect(),
        }
    }

    /// Unqualified component type name (`a::b::LoanCreditProvider` -> `LoanCreditProvider`).
    pub fn component_simple_name(&self) -> &str {
        self.component_type
            .rsplit("::")
            .next()
            .unwrap_or(&self.component_type)
    }

    /// Signature line, e.g. `add(param0: integer, param1: integer)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.param_type))
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }

    /// MCP `tools/list` entry. Every parameter is required.
    pub fn to_mcp_tool(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::with_capacity(self.parameters.len());
        for p in &self.parameters {
            let mut schema = p.param_type.json_schema();
            schema["description"] = Value::String(p.description.clone());
            properties.insert(p.name.clone(), schema);
            required.push(Value::String(p.name.clone()));
        }
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": {
                "type": "object",
                "properties": properties,
                "required": required,
            },
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use pretty_assertions::assert_eq;

    fn sample_def() -> ToolDef {
        ToolDef::new("risk_assessment", "Assess product risk", |_args| {
            async { Ok(Value::Null) }.boxed()
        })
        .param(
            ParamSpec::new(ParamType::String)
                .named("product_type")
                .described("Product type"),
        )
        .param(ParamSpec::new(ParamType::Double))
    }

    #[test]
    fn test_descriptor_synthesizes_names_and_descriptions() {
        let desc =
            ToolDescriptor::from_def("plan", "crate::providers::PlanProvider", &sample_def());

        assert_eq!(desc.parameters.len(), 2);
        assert_eq!(desc.parameters[0].name, "product_type");
        assert_eq!(desc.parameters[0].description, "Product type");
        assert_eq!(desc.parameters[1].index, 1);
        assert_eq!(desc.parameters[1].name, "param1");
        assert_eq!(desc.parameters[1].description, NO_DESCRIPTION);
    }

    #[test]
    fn test_component_simple_name() {
        let desc =
            ToolDescriptor::from_def("plan", "crate::providers::PlanProvider", &sample_def());
        assert_eq!(desc.component_simple_name(), "PlanProvider");

        let bare = ToolDescriptor::from_def("plan", "PlanProvider", &sample_def());
        assert_eq!(bare.component_simple_name(), "PlanProvider");
    }

    #[test]
    fn test_signature() {
        let desc = ToolDescriptor::from_def("plan", "PlanProvider", &sample_def());
        assert_eq!(
            desc.signature(),
            "risk_assessment(product_type: string, param1: double)"
        );
    }

    #[test]
    fn test_serialized_catalog_entry() {
        let desc = ToolDescriptor::from_def("plan", "PlanProvider", &sample_def());
        let value = serde_json::to_value(&desc).unwrap();

        assert_eq!(
            value,
            json!({
                "name": "risk_assessment",
                "description": "Assess product risk",
                "component": "plan",
                "parameters": [
                    {"name": "product_type", "type": "string", "description": "Product type"},
                    {"name": "param1", "type": "double", "description": "no description provided"},
                ],
            })
        );
    }

    #[test]
    fn test_mcp_tool_schema() {
        let desc = ToolDescriptor::from_def("plan", "PlanProvider", &sample_def());
        let tool = desc.to_mcp_tool();

        assert_eq!(tool["inputSchema"]["properties"]["param1"]["type"], "number");
        assert_eq!(tool["inputSchema"]["required"], json!(["product_type", "param1"]));
    }

    #[test]
    fn test_enum_display_and_schema() {
        let pt = ParamType::choice(["A", "B"]);
        assert_eq!(pt.display_name(), "enum(A|B)");
        assert_eq!(pt.json_schema(), json!({"type": "string", "enum": ["A", "B"]}));
    }
}
