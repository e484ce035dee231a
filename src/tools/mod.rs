//! Tool infrastructure: catalog metadata, registry scanning, argument
//! coercion and invocation dispatch.

pub mod args;
pub mod catalog;
pub mod coerce;
pub mod dispatch;
pub mod registry;

pub use args::{ArgValue, CallArgs};
pub use catalog::{
    ParamSpec, ParamType, ParameterDescriptor, ToolDef, ToolDescriptor, ToolFuture, ToolHandler,
};
pub use dispatch::{Dispatcher, InvocationOutcome};
pub use registry::{ComponentRegistry, ScanReport, ToolProvider};
