//! Built-in tool providers.
//!
//! Each provider is a cheap-to-clone handle that publishes its tools through
//! [`ToolProvider::tools`]. Handlers capture a clone of the provider.

pub mod loan_credit;
pub mod loan_plan;
pub mod marketing;

pub use loan_credit::LoanCreditProvider;
pub use loan_plan::{LoanProductPlanProvider, PlanningRules};
pub use marketing::MarketingProvider;

use crate::records::LoanRecords;
use crate::tools::{CallArgs, ComponentRegistry, ParamSpec, ParamType, ToolFuture};
use crate::types::Result;
use futures::FutureExt;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;

/// Registry holding every built-in provider, in registration order.
pub fn default_registry(
    records: Arc<dyn LoanRecords>,
    rules: Arc<PlanningRules>,
) -> ComponentRegistry {
    ComponentRegistry::new()
        .with(Arc::new(LoanCreditProvider::new(records)))
        .with(Arc::new(MarketingProvider::new()))
        .with(Arc::new(LoanProductPlanProvider::new(rules)))
}

/// Bind an async tool body to a provider clone.
pub(crate) fn bind<P, F, Fut>(
    provider: &P,
    body: F,
) -> impl Fn(CallArgs) -> ToolFuture + Send + Sync + 'static
where
    P: Clone + Send + Sync + 'static,
    F: Fn(P, CallArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    let provider = provider.clone();
    move |args| body(provider.clone(), args).boxed()
}

/// Named string parameter with a description.
pub(crate) fn text(name: &str, description: &str) -> ParamSpec {
    ParamSpec::new(ParamType::String)
        .named(name)
        .described(description)
}

/// Business-level failure payload. Tools report lookup misses this way
/// instead of failing the invocation.
pub(crate) fn failure(message: impl Into<String>) -> Value {
    json!({ "success": false, "message": message.into() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::InMemoryRecords;

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry(
            Arc::new(InMemoryRecords::seeded()),
            Arc::new(PlanningRules::default()),
        );
        let ids: Vec<&str> = registry.components().iter().map(|c| c.component_id()).collect();
        assert_eq!(
            ids,
            vec!["loan_credit_provider", "marketing_provider", "loan_product_plan_provider"]
        );
    }

    #[test]
    fn test_default_registry_has_no_duplicate_tools() {
        let registry = default_registry(
            Arc::new(InMemoryRecords::seeded()),
            Arc::new(PlanningRules::default()),
        );
        let report = registry.scan_report();
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.failed_components, 0);
        assert_eq!(report.tools.len(), 5 + 8 + 5);
    }

    #[test]
    fn test_failure_payload() {
        assert_eq!(
            failure("customer not found"),
            json!({"success": false, "message": "customer not found"})
        );
    }
}
