//! Errors raised by registration and dispatch.

use dvp_core::messages::PluginErrorResult;
use dvp_core::{CodecError, DefinitionError};

/// Errors raised while registering callbacks or dispatching an operation.
///
/// Failures returned by a plugin callback travel through
/// [`PluginError::Callback`] untouched: its `Display` and source chain are the
/// callback's own, and `downcast_ref` on the inner [`anyhow::Error`] recovers
/// the original error type.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("an implementation for the {operation}() operation has already been defined")]
    DuplicateRegistration { operation: &'static str },
    #[error("an implementation for the {operation}() operation has not been defined")]
    UnimplementedOperation { operation: &'static str },
    #[error("{operation} must return {expected} mount(s), found {found}")]
    MountCardinality {
        operation: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("{operation} does not support a shared path on the staged mount")]
    SharedPathNotSupported { operation: &'static str },
    #[error("unknown operation: {name}")]
    UnknownOperation { name: String },
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

impl PluginError {
    /// Stable identifier for the failure class, used in [`PluginErrorResult::kind`].
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateRegistration { .. } => "duplicate_registration",
            Self::UnimplementedOperation { .. } => "unimplemented_operation",
            Self::MountCardinality { .. } => "mount_cardinality",
            Self::SharedPathNotSupported { .. } => "shared_path_not_supported",
            Self::UnknownOperation { .. } => "unknown_operation",
            Self::Definition(_) => "definition",
            Self::Codec(_) => "codec",
            Self::Callback(_) => "callback",
        }
    }
}

impl From<&PluginError> for PluginErrorResult {
    fn from(err: &PluginError) -> Self {
        let message = match err {
            // Include the callback's context chain, not just its outermost message.
            PluginError::Callback(inner) => format!("{inner:#}"),
            other => other.to_string(),
        };
        Self {
            kind: err.kind().to_string(),
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("replica lag too high")]
    struct LagError;

    #[test]
    fn messages_name_the_operation() {
        let err = PluginError::DuplicateRegistration {
            operation: "virtual.configure",
        };
        assert_eq!(
            err.to_string(),
            "an implementation for the virtual.configure() operation has already been defined"
        );

        let err = PluginError::MountCardinality {
            operation: "linked.mount_specification",
            expected: "exactly 1",
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "linked.mount_specification must return exactly 1 mount(s), found 2"
        );
    }

    #[test]
    fn callback_error_is_transparent() {
        let err = PluginError::from(anyhow::Error::new(LagError));
        assert_eq!(err.to_string(), "replica lag too high");
        match &err {
            PluginError::Callback(inner) => assert!(inner.downcast_ref::<LagError>().is_some()),
            other => panic!("expected Callback, got {other:?}"),
        }
    }

    #[test]
    fn error_result_carries_kind_and_context_chain() {
        let inner: anyhow::Result<()> = Err(anyhow::Error::new(LagError));
        let err = PluginError::from(inner.context("pre-snapshot failed").unwrap_err());
        let result = PluginErrorResult::from(&err);
        assert_eq!(result.kind, "callback");
        assert_eq!(result.message, "pre-snapshot failed: replica lag too high");

        let result = PluginErrorResult::from(&PluginError::UnimplementedOperation {
            operation: "virtual.initialize",
        });
        assert_eq!(result.kind, "unimplemented_operation");
    }
}
