//! Virtualization platform: per-phase operation registries, the plugin
//! facade, and host-side dispatch of encoded operation requests.

pub mod config;
pub mod discovery;
pub mod error;
pub mod host;
pub mod linked;
pub mod operation;
pub mod plugin;
pub mod registry;
pub mod service;
pub mod telemetry;
pub mod virtualization;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, HostConfig};
pub use discovery::DiscoveryOperations;
pub use error::PluginError;
pub use host::PluginHost;
pub use linked::LinkedOperations;
pub use operation::{
    operation_names, slot_names, Operation, OperationDescriptor, OperationGroup,
    OperationResponse, Requirement, OPERATIONS,
};
pub use plugin::{Plugin, PluginManifest};
pub use registry::OperationSlot;
pub use service::{build_operation_pipeline, MetricsLayer, PluginService};
pub use telemetry::init_tracing;
pub use virtualization::VirtualizationOperations;
