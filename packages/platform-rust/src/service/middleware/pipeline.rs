//! Pipeline composition: wraps a [`PluginService`] in the middleware stack.

use std::sync::Arc;

use dvp_core::Schema;
use tower::ServiceBuilder;

use super::metrics::MetricsLayer;
use crate::error::PluginError;
use crate::operation::{Operation, OperationResponse};
use crate::plugin::Plugin;
use crate::service::PluginService;

/// Build the operation pipeline for a fully registered plugin.
///
/// The plugin is frozen behind the `Arc`; the returned service is cheap to
/// clone and every clone dispatches against the same registries.
#[must_use]
pub fn build_operation_pipeline<S: Schema>(
    plugin: Arc<Plugin<S>>,
) -> impl tower::Service<Operation, Response = OperationResponse, Error = PluginError> + Clone + Send
{
    ServiceBuilder::new()
        .layer(MetricsLayer)
        .service(PluginService::new(plugin))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
