//! Runs in its own test binary: `init_tracing` installs the process-global
//! subscriber, which would collide with `#[traced_test]` in the lib tests.

use loan_mcp::observability::init_tracing;
use loan_mcp::types::ObservabilityConfig;

#[test]
fn init_tracing_is_idempotent() {
    let config = ObservabilityConfig::default();
    init_tracing(&config);
    init_tracing(&ObservabilityConfig {
        log_level: "debug".to_string(),
        json_logs: true,
    });
}
