//! Component registry and tool scanner.
//!
//! Components register once at startup. The catalog is never cached: every
//! scan walks the registry again and asks each component for its tool table.

use crate::tools::catalog::{ToolDef, ToolDescriptor};
use crate::types::{Error, Result};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A registered service component that declares zero or more tools.
pub trait ToolProvider: Send + Sync {
    /// Registry lookup key, distinct from the type name.
    fn component_id(&self) -> &str;

    /// Fully qualified type path; the status page groups by its last segment.
    fn type_name(&self) -> &'static str;

    /// Build this component's tool table.
    fn tools(&self) -> Result<Vec<ToolDef>>;
}

/// Ordered, read-only set of components.
#[derive(Default)]
pub struct ComponentRegistry {
    components: Vec<Arc<dyn ToolProvider>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Builder-style registration used while wiring the server.
    pub fn with(mut self, component: Arc<dyn ToolProvider>) -> Self {
        self.register(component);
        self
    }

    /// Add a component. A component whose id is already taken is logged and
    /// dropped; returns whether it was added.
    pub fn register(&mut self, component: Arc<dyn ToolProvider>) -> bool {
        let component_id = component.component_id();
        if self.get(component_id).is_some() {
            tracing::warn!(
                component = component_id,
                skipped_type = component.type_name(),
                "Component id already registered, skipping"
            );
            return false;
        }
        self.components.push(component);
        true
    }

    /// Resolve a component by id.
    pub fn get(&self, component_id: &str) -> Option<&Arc<dyn ToolProvider>> {
        self.components
            .iter()
            .find(|c| c.component_id() == component_id)
    }

    pub fn components(&self) -> &[Arc<dyn ToolProvider>] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Build the catalog from the live registry.
    ///
    /// A component whose tool table fails is logged and skipped. A tool whose
    /// name was already claimed by an earlier component is logged and skipped.
    pub fn scan(&self) -> Vec<ToolDescriptor> {
        self.scan_report().tools
    }

    /// Same as [`scan`](Self::scan), with skip counts for diagnostics.
    pub fn scan_report(&self) -> ScanReport {
        let mut report = ScanReport::default();
        let mut owners: HashMap<String, String> = HashMap::new();

        for component in &self.components {
            let component_id = component.component_id();
            let defs = match tool_table(component.as_ref()) {
                Ok(defs) => defs,
                Err(e) => {
                    tracing::warn!(
                        component = component_id,
                        error = %e,
                        "Skipping component during tool scan"
                    );
                    report.failed_components += 1;
                    continue;
                }
            };

            for def in &defs {
                if let Some(owner) = owners.get(&def.name) {
                    tracing::warn!(
                        tool = %def.name,
                        kept = %owner,
                        skipped = component_id,
                        "Duplicate tool name, keeping first registration"
                    );
                    report.duplicates += 1;
                    continue;
                }
                owners.insert(def.name.clone(), component_id.to_string());
                report.tools.push(ToolDescriptor::from_def(
                    component_id,
                    component.type_name(),
                    def,
                ));
            }
        }

        tracing::debug!(
            tools = report.tools.len(),
            components = self.components.len(),
            "Tool scan complete"
        );
        report
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.components.iter().map(|c| c.component_id()).collect();
        f.debug_struct("ComponentRegistry")
            .field("components", &ids)
            .finish()
    }
}

/// Ask a component for its tool table. A panic is reported as a scan failure.
pub(crate) fn tool_table(component: &dyn ToolProvider) -> Result<Vec<ToolDef>> {
    catch_unwind(AssertUnwindSafe(|| component.tools())).unwrap_or_else(|panic| {
        Err(Error::scan(format!(
            "tool table of {} panicked: {}",
            component.component_id(),
            panic_text(panic.as_ref())
        )))
    })
}

/// Payload text of a caught panic.
pub(crate) fn panic_text(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Result of one scan.
#[derive(Debug, Default, Clone)]
pub struct ScanReport {
    pub tools: Vec<ToolDescriptor>,
    pub failed_components: usize,
    pub duplicates: usize,
}

// =============================================================================
// Tests
// =============================================================================
