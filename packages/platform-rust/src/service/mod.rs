//! Tower integration for a registered plugin.
//!
//! 1. **Service** ([`PluginService`]): `Operation` -> `OperationResponse` over a
//!    frozen [`Plugin`]
//! 2. **Middleware** (`middleware`): Tower layers (metrics) and pipeline
//!    composition

pub mod middleware;

use std::future::{ready, Ready};
use std::sync::Arc;
use std::task::{Context, Poll};

use dvp_core::Schema;
use tower::Service;

use crate::error::PluginError;
use crate::operation::{Operation, OperationResponse};
use crate::plugin::Plugin;

pub use middleware::{build_operation_pipeline, describe_metrics, MetricsLayer, MetricsService};

// ---------------------------------------------------------------------------
// PluginService
// ---------------------------------------------------------------------------

/// A `tower::Service<Operation>` that dispatches into a shared plugin.
///
/// Dispatch is synchronous; the returned future is always ready.
pub struct PluginService<S: Schema> {
    plugin: Arc<Plugin<S>>,
}

impl<S: Schema> PluginService<S> {
    #[must_use]
    pub fn new(plugin: Arc<Plugin<S>>) -> Self {
        Self { plugin }
    }

    #[must_use]
    pub fn plugin(&self) -> &Arc<Plugin<S>> {
        &self.plugin
    }
}

impl<S: Schema> Clone for PluginService<S> {
    fn clone(&self) -> Self {
        Self {
            plugin: Arc::clone(&self.plugin),
        }
    }
}

impl<S: Schema> std::fmt::Debug for PluginService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginService")
            .field("plugin", &self.plugin)
            .finish()
    }
}

impl<S: Schema> Service<Operation> for PluginService<S> {
    type Response = OperationResponse;
    type Error = PluginError;
    type Future = Ready<Result<OperationResponse, PluginError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        ready(self.plugin.dispatch(op))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
