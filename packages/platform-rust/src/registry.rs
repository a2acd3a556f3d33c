//! The single-registration slot shared by every operation registry.

use std::fmt;

use tracing::{debug, warn};

use crate::error::PluginError;
use crate::operation::OperationDescriptor;

// ---------------------------------------------------------------------------
// OperationSlot
// ---------------------------------------------------------------------------

/// A named slot holding at most one callback.
///
/// A slot starts unset and may be bound exactly once. Binding an already
/// bound slot fails and leaves the original callback in place.
pub struct OperationSlot<F: ?Sized> {
    name: &'static str,
    callback: Option<Box<F>>,
}

impl<F: ?Sized> OperationSlot<F> {
    /// Creates an unset slot.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            callback: None,
        }
    }

    /// Registration name of this slot.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.callback.is_some()
    }

    /// Bind `callback` to this slot.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if a callback is already
    /// bound.
    pub fn bind(&mut self, callback: Box<F>) -> Result<(), PluginError> {
        if self.callback.is_some() {
            warn!(operation = self.name, "rejected duplicate registration");
            return Err(PluginError::DuplicateRegistration {
                operation: self.name,
            });
        }
        debug!(operation = self.name, "registered operation");
        self.callback = Some(callback);
        Ok(())
    }

    /// The bound callback, if any.
    #[must_use]
    pub fn get(&self) -> Option<&F> {
        self.callback.as_deref()
    }

    /// Run `invoke` against the bound callback for `operation`.
    ///
    /// With no callback bound, an optional operation returns `R::default()`
    /// without calling `invoke`, so its request is never decoded. A required
    /// operation fails with [`PluginError::UnimplementedOperation`].
    ///
    /// # Errors
    ///
    /// Returns whatever `invoke` returns, or
    /// [`PluginError::UnimplementedOperation`] as above.
    pub fn dispatch<R, I>(&self, operation: &'static str, invoke: I) -> Result<R, PluginError>
    where
        R: Default,
        I: FnOnce(&F) -> Result<R, PluginError>,
    {
        debug!(operation, slot = self.name, "dispatching operation");
        match self.get() {
            Some(callback) => invoke(callback),
            None if OperationDescriptor::requirement_of(operation).is_optional() => {
                debug!(operation, "operation not implemented, returning default");
                Ok(R::default())
            }
            None => Err(PluginError::UnimplementedOperation {
                operation: self.name,
            }),
        }
    }
}

impl<F: ?Sized> fmt::Debug for OperationSlot<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationSlot")
            .field("name", &self.name)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Names of the bound slots among `slots`, in the order given.
pub(crate) fn bound_names(slots: &[(&'static str, bool)]) -> Vec<&'static str> {
    slots
        .iter()
        .filter(|(_, bound)| *bound)
        .map(|(name, _)| *name)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
