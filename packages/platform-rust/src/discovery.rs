//! Discovery-phase operations: repository and source-config enumeration.

use std::fmt;

use dvp_core::messages::{
    PluginResponse, RemoteConnection, Repository, RepositoryDiscoveryRequest,
    RepositoryDiscoveryResponse, RepositoryDiscoveryResult, SourceConfig,
    SourceConfigDiscoveryRequest, SourceConfigDiscoveryResponse, SourceConfigDiscoveryResult,
};
use dvp_core::Schema;

use crate::error::PluginError;
use crate::operation::{operation_names, slot_names};
use crate::registry::{bound_names, OperationSlot};

/// `repository(source_connection)`
pub type RepositoryDiscoveryFn<S> = dyn Fn(RemoteConnection) -> anyhow::Result<Vec<<S as Schema>::Repository>>
    + Send
    + Sync;

/// `source_config(source_connection, repository)`
pub type SourceConfigDiscoveryFn<S> = dyn Fn(
        RemoteConnection,
        <S as Schema>::Repository,
    ) -> anyhow::Result<Vec<<S as Schema>::SourceConfig>>
    + Send
    + Sync;

/// Registry for the two discovery operations. Both are required.
pub struct DiscoveryOperations<S: Schema> {
    repository: OperationSlot<RepositoryDiscoveryFn<S>>,
    source_config: OperationSlot<SourceConfigDiscoveryFn<S>>,
}

impl<S: Schema> DiscoveryOperations<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            repository: OperationSlot::new(slot_names::REPOSITORY),
            source_config: OperationSlot::new(slot_names::SOURCE_CONFIG),
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register the repository discovery callback.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn repository<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(RemoteConnection) -> anyhow::Result<Vec<S::Repository>> + Send + Sync + 'static,
    {
        self.repository.bind(Box::new(callback))
    }

    /// Register the source-config discovery callback.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn source_config<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(RemoteConnection, S::Repository) -> anyhow::Result<Vec<S::SourceConfig>>
            + Send
            + Sync
            + 'static,
    {
        self.source_config.bind(Box::new(callback))
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Enumerate the repositories on the request's environment.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnimplementedOperation`] if no callback is bound,
    /// a payload error, or the callback's own error.
    pub fn handle_repository(
        &self,
        request: RepositoryDiscoveryRequest,
    ) -> Result<RepositoryDiscoveryResponse, PluginError> {
        let result = self
            .repository
            .dispatch(operation_names::REPOSITORY_DISCOVERY, |callback| {
                let repositories = callback(request.source_connection)?
                    .iter()
                    .map(Repository::from_definition)
                    .collect::<Result<_, _>>()?;
                Ok(RepositoryDiscoveryResult { repositories })
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Enumerate the source configs inside the request's repository.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnimplementedOperation`] if no callback is bound,
    /// a payload error, or the callback's own error.
    pub fn handle_source_config(
        &self,
        request: SourceConfigDiscoveryRequest,
    ) -> Result<SourceConfigDiscoveryResponse, PluginError> {
        let result = self
            .source_config
            .dispatch(operation_names::SOURCE_CONFIG_DISCOVERY, |callback| {
                let repository = request.repository.to_definition::<S::Repository>()?;
                let source_configs = callback(request.source_connection, repository)?
                    .iter()
                    .map(SourceConfig::from_definition)
                    .collect::<Result<_, _>>()?;
                Ok(SourceConfigDiscoveryResult { source_configs })
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Registration names of the bound slots.
    #[must_use]
    pub fn bound_operations(&self) -> Vec<&'static str> {
        bound_names(&[
            (self.repository.name(), self.repository.is_bound()),
            (self.source_config.name(), self.source_config.is_bound()),
        ])
    }

    pub(crate) fn has_repository(&self) -> bool {
        self.repository.is_bound()
    }

    pub(crate) fn has_source_config(&self) -> bool {
        self.source_config.is_bound()
    }
}

impl<S: Schema> Default for DiscoveryOperations<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema> fmt::Debug for DiscoveryOperations<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryOperations")
            .field("bound", &self.bound_operations())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use dvp_core::messages::PluginDefinedObject;
    use dvp_core::Dict;
    use serde_json::json;

    use super::*;
    use crate::testing::{dict, TestSchema};

    #[test]
    fn repository_discovery_encodes_each_definition() {
        let mut discovery = DiscoveryOperations::<TestSchema>::new();
        discovery
            .repository(|connection| {
                Ok(vec![
                    dict(json!({ "host": connection.environment.host.name, "version": "15" })),
                    dict(json!({ "version": "16" })),
                ])
            })
            .unwrap();

        let mut request = RepositoryDiscoveryRequest::default();
        request.source_connection.environment.host.name = "db01".into();

        let response = discovery.handle_repository(request).unwrap();
        let repositories = &response.return_value().unwrap().repositories;
        assert_eq!(repositories.len(), 2);
        assert_eq!(
            repositories[0].to_definition::<Dict>().unwrap(),
            dict(json!({ "host": "db01", "version": "15" }))
        );
    }

    #[test]
    fn source_config_discovery_receives_decoded_repository() {
        let mut discovery = DiscoveryOperations::<TestSchema>::new();
        discovery
            .source_config(|_, repository| Ok(vec![repository]))
            .unwrap();

        let request = SourceConfigDiscoveryRequest {
            source_connection: RemoteConnection::default(),
            repository: Repository {
                parameters: PluginDefinedObject {
                    json: r#"{"name":"pg15"}"#.into(),
                },
            },
        };
        let response = discovery.handle_source_config(request).unwrap();
        let configs = response.into_return_value().unwrap().source_configs;
        assert_eq!(configs[0].parameters.json, r#"{"name":"pg15"}"#);
    }

    #[test]
    fn discovery_operations_are_required() {
        let discovery = DiscoveryOperations::<TestSchema>::new();
        let err = discovery
            .handle_repository(RepositoryDiscoveryRequest::default())
            .unwrap_err();
        assert!(matches!(err, PluginError::UnimplementedOperation { .. }));

        let err = discovery
            .handle_source_config(SourceConfigDiscoveryRequest::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PluginError::UnimplementedOperation {
                operation: "discovery.source_config"
            }
        ));
    }

    #[test]
    fn bound_operations_lists_registered_slots() {
        let mut discovery = DiscoveryOperations::<TestSchema>::new();
        assert!(discovery.bound_operations().is_empty());
        discovery.repository(|_| Ok(vec![])).unwrap();
        assert_eq!(discovery.bound_operations(), vec!["discovery.repository"]);
        assert!(discovery.repository(|_| Ok(vec![])).is_err());
    }

    #[test]
    fn every_slot_rejects_a_second_registration() {
        let mut discovery = DiscoveryOperations::<TestSchema>::new();
        discovery
            .repository(|_| Ok(vec![dict(json!({ "version": "15" }))]))
            .unwrap();
        discovery
            .source_config(|_, repository| Ok(vec![repository]))
            .unwrap();

        let err = discovery.repository(|_| Ok(vec![])).unwrap_err();
        assert!(matches!(
            err,
            PluginError::DuplicateRegistration {
                operation: "discovery.repository"
            }
        ));
        let err = discovery.source_config(|_, _| Ok(vec![])).unwrap_err();
        assert!(matches!(
            err,
            PluginError::DuplicateRegistration {
                operation: "discovery.source_config"
            }
        ));

        // The first callbacks stay bound.
        let response = discovery
            .handle_repository(RepositoryDiscoveryRequest::default())
            .unwrap();
        assert_eq!(response.into_return_value().unwrap().repositories.len(), 1);
        let response = discovery
            .handle_source_config(SourceConfigDiscoveryRequest {
                source_connection: RemoteConnection::default(),
                repository: Repository {
                    parameters: PluginDefinedObject {
                        json: r#"{"name":"pg15"}"#.into(),
                    },
                },
            })
            .unwrap();
        assert_eq!(response.into_return_value().unwrap().source_configs.len(), 1);
    }
}
