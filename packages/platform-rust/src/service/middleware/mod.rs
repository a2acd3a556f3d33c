//! Tower middleware layers for the operation pipeline.
//!
//! - [`metrics`]: Operation timing and counting via `tracing` spans and the
//!   `metrics` facade
//! - [`pipeline`]: Composes the layers around a [`PluginService`](super::PluginService)

pub mod metrics;
pub mod pipeline;

pub use metrics::{describe_metrics, MetricsLayer, MetricsService};
pub use pipeline::build_operation_pipeline;
