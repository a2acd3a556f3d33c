//! Byte-level entry point the host runtime calls into.
//!
//! The host names an operation and hands over its encoded request; the
//! plugin answers with an encoded response. Dispatch failures (an unset
//! required operation, a bad payload, a callback error) are answered with the
//! schema's `{"error": {...}}` shape. Only failures of the envelope itself,
//! an unknown operation name or an undecodable request, are returned as `Err`.

use std::sync::Arc;

use dvp_core::messages::PluginErrorResult;
use dvp_core::Schema;
use tower::ServiceExt;
use tracing::debug;

use crate::config::HostConfig;
use crate::error::PluginError;
use crate::operation::{Operation, OperationResponse};
use crate::plugin::{Plugin, PluginManifest};
use crate::service::build_operation_pipeline;

/// A frozen plugin plus the host configuration it is served with.
pub struct PluginHost<S: Schema> {
    plugin: Arc<Plugin<S>>,
    config: HostConfig,
}

impl<S: Schema> PluginHost<S> {
    /// Freeze `plugin`; no callbacks can be registered after this point.
    #[must_use]
    pub fn new(plugin: Plugin<S>, config: HostConfig) -> Self {
        Self {
            plugin: Arc::new(plugin),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    #[must_use]
    pub fn plugin(&self) -> &Arc<Plugin<S>> {
        &self.plugin
    }

    #[must_use]
    pub fn manifest(&self) -> PluginManifest {
        self.plugin.manifest()
    }

    /// Decode, dispatch and encode one operation.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownOperation`] for an unknown `name`, or
    /// [`PluginError::Codec`] if the request cannot be decoded or the
    /// response cannot be encoded.
    pub async fn handle(&self, name: &str, bytes: &[u8]) -> Result<Vec<u8>, PluginError> {
        let format = self.config.wire_format;
        debug!(operation = name, %format, len = bytes.len(), "handling request");

        let operation = Operation::from_wire(name, bytes, format)?;
        let response = self.respond(operation).await?;
        Ok(response.encode(format)?)
    }

    /// Dispatch a decoded operation, folding dispatch failures into an
    /// error-shaped response.
    ///
    /// # Errors
    ///
    /// Only fails if `operation` has no response variant, which cannot
    /// happen for an [`Operation`] built from the table.
    pub async fn respond(&self, operation: Operation) -> Result<OperationResponse, PluginError> {
        let name = operation.name();
        match build_operation_pipeline(Arc::clone(&self.plugin))
            .oneshot(operation)
            .await
        {
            Ok(response) => Ok(response),
            Err(err) => {
                debug!(operation = name, kind = err.kind(), "folding failure into error response");
                OperationResponse::from_error(name, PluginErrorResult::from(&err))
            }
        }
    }
}

impl<S: Schema> std::fmt::Debug for PluginHost<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHost")
            .field("plugin", &self.plugin)
            .field("config", &self.config)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
