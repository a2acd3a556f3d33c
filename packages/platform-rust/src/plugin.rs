//! The plugin facade: the one object a plugin author builds and the host
//! dispatches into.

use dvp_core::Schema;
use serde::{Deserialize, Serialize};

use crate::discovery::DiscoveryOperations;
use crate::error::PluginError;
use crate::linked::LinkedOperations;
use crate::operation::{Operation, OperationResponse};
use crate::virtualization::VirtualizationOperations;

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Aggregates the discovery, linked and virtualization registries.
///
/// Callbacks are registered through the `*_mut` accessors during setup. Once
/// setup is done the plugin is typically frozen behind an `Arc` (see
/// [`PluginService`](crate::service::PluginService)) and only read from, so
/// dispatch never contends with registration.
///
/// ```
/// use dvp_core::{Dict, Schema};
/// use dvp_platform::Plugin;
///
/// struct Postgres;
///
/// impl Schema for Postgres {
///     type Repository = Dict;
///     type SourceConfig = Dict;
///     type Snapshot = Dict;
///     type LinkedSource = Dict;
///     type VirtualSource = Dict;
/// }
///
/// let mut plugin = Plugin::<Postgres>::new();
/// plugin
///     .discovery_mut()
///     .repository(|_connection| Ok(Vec::new()))
///     .unwrap();
/// assert!(plugin.manifest().has_repository_discovery);
/// ```
pub struct Plugin<S: Schema> {
    discovery: DiscoveryOperations<S>,
    linked: LinkedOperations<S>,
    virtualization: VirtualizationOperations<S>,
}

impl<S: Schema> Plugin<S> {
    /// Creates a plugin with every operation slot unset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            discovery: DiscoveryOperations::new(),
            linked: LinkedOperations::new(),
            virtualization: VirtualizationOperations::new(),
        }
    }

    #[must_use]
    pub fn discovery(&self) -> &DiscoveryOperations<S> {
        &self.discovery
    }

    pub fn discovery_mut(&mut self) -> &mut DiscoveryOperations<S> {
        &mut self.discovery
    }

    #[must_use]
    pub fn linked(&self) -> &LinkedOperations<S> {
        &self.linked
    }

    pub fn linked_mut(&mut self) -> &mut LinkedOperations<S> {
        &mut self.linked
    }

    #[must_use]
    pub fn virtualization(&self) -> &VirtualizationOperations<S> {
        &self.virtualization
    }

    pub fn virtualization_mut(&mut self) -> &mut VirtualizationOperations<S> {
        &mut self.virtualization
    }

    /// Which operation slots have a callback bound.
    #[must_use]
    pub fn manifest(&self) -> PluginManifest {
        let [
            linked_pre_snapshot,
            linked_post_snapshot,
            linked_start_staging,
            linked_stop_staging,
            linked_status,
            linked_worker,
            linked_mount_specification,
        ] = self.linked.slots().map(|(_, bound)| bound);
        let [
            virtual_configure,
            virtual_unconfigure,
            virtual_reconfigure,
            virtual_start,
            virtual_stop,
            virtual_pre_snapshot,
            virtual_post_snapshot,
            virtual_status,
            virtual_initialize,
            virtual_mount_specification,
        ] = self.virtualization.slots().map(|(_, bound)| bound);

        PluginManifest {
            has_repository_discovery: self.discovery.has_repository(),
            has_source_config_discovery: self.discovery.has_source_config(),
            has_linked_pre_snapshot: linked_pre_snapshot,
            has_linked_post_snapshot: linked_post_snapshot,
            has_linked_start_staging: linked_start_staging,
            has_linked_stop_staging: linked_stop_staging,
            has_linked_status: linked_status,
            has_linked_worker: linked_worker,
            has_linked_mount_specification: linked_mount_specification,
            has_virtual_configure: virtual_configure,
            has_virtual_unconfigure: virtual_unconfigure,
            has_virtual_reconfigure: virtual_reconfigure,
            has_virtual_start: virtual_start,
            has_virtual_stop: virtual_stop,
            has_virtual_pre_snapshot: virtual_pre_snapshot,
            has_virtual_post_snapshot: virtual_post_snapshot,
            has_virtual_status: virtual_status,
            has_virtual_initialize: virtual_initialize,
            has_virtual_mount_specification: virtual_mount_specification,
        }
    }

    /// Route `operation` to the registry that owns it.
    ///
    /// # Errors
    ///
    /// Returns the owning registry's error: an unset required operation, a
    /// payload or mount-cardinality failure, or the callback's own error.
    pub fn dispatch(&self, operation: Operation) -> Result<OperationResponse, PluginError> {
        let discovery = &self.discovery;
        let linked = &self.linked;
        let virtualization = &self.virtualization;

        Ok(match operation {
            Operation::RepositoryDiscovery(req) => {
                OperationResponse::RepositoryDiscovery(discovery.handle_repository(req)?)
            }
            Operation::SourceConfigDiscovery(req) => {
                OperationResponse::SourceConfigDiscovery(discovery.handle_source_config(req)?)
            }

            Operation::DirectPreSnapshot(req) => {
                OperationResponse::DirectPreSnapshot(linked.handle_direct_pre_snapshot(req)?)
            }
            Operation::DirectPostSnapshot(req) => {
                OperationResponse::DirectPostSnapshot(linked.handle_direct_post_snapshot(req)?)
            }
            Operation::StagedPreSnapshot(req) => {
                OperationResponse::StagedPreSnapshot(linked.handle_staged_pre_snapshot(req)?)
            }
            Operation::StagedPostSnapshot(req) => {
                OperationResponse::StagedPostSnapshot(linked.handle_staged_post_snapshot(req)?)
            }
            Operation::StartStaging(req) => {
                OperationResponse::StartStaging(linked.handle_start_staging(req)?)
            }
            Operation::StopStaging(req) => {
                OperationResponse::StopStaging(linked.handle_stop_staging(req)?)
            }
            Operation::StagedStatus(req) => {
                OperationResponse::StagedStatus(linked.handle_status(req)?)
            }
            Operation::StagedWorker(req) => {
                OperationResponse::StagedWorker(linked.handle_worker(req)?)
            }
            Operation::StagedMountSpecification(req) => {
                OperationResponse::StagedMountSpecification(linked.handle_mount_specification(req)?)
            }

            Operation::Configure(req) => {
                OperationResponse::Configure(virtualization.handle_configure(req)?)
            }
            Operation::Unconfigure(req) => {
                OperationResponse::Unconfigure(virtualization.handle_unconfigure(req)?)
            }
            Operation::Reconfigure(req) => {
                OperationResponse::Reconfigure(virtualization.handle_reconfigure(req)?)
            }
            Operation::Start(req) => OperationResponse::Start(virtualization.handle_start(req)?),
            Operation::Stop(req) => OperationResponse::Stop(virtualization.handle_stop(req)?),
            Operation::VirtualPreSnapshot(req) => {
                OperationResponse::VirtualPreSnapshot(virtualization.handle_pre_snapshot(req)?)
            }
            Operation::VirtualPostSnapshot(req) => {
                OperationResponse::VirtualPostSnapshot(virtualization.handle_post_snapshot(req)?)
            }
            Operation::VirtualStatus(req) => {
                OperationResponse::VirtualStatus(virtualization.handle_status(req)?)
            }
            Operation::Initialize(req) => {
                OperationResponse::Initialize(virtualization.handle_initialize(req)?)
            }
            Operation::VirtualMountSpecification(req) => OperationResponse::VirtualMountSpecification(
                virtualization.handle_mount_specification(req)?,
            ),
        })
    }
}

impl<S: Schema> Default for Plugin<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema> std::fmt::Debug for Plugin<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("discovery", &self.discovery)
            .field("linked", &self.linked)
            .field("virtualization", &self.virtualization)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// PluginManifest
// ---------------------------------------------------------------------------

/// Which operations a plugin implements, as reported to the host.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    pub has_repository_discovery: bool,
    pub has_source_config_discovery: bool,
    pub has_linked_pre_snapshot: bool,
    pub has_linked_post_snapshot: bool,
    pub has_linked_start_staging: bool,
    pub has_linked_stop_staging: bool,
    pub has_linked_status: bool,
    pub has_linked_worker: bool,
    pub has_linked_mount_specification: bool,
    pub has_virtual_configure: bool,
    pub has_virtual_unconfigure: bool,
    pub has_virtual_reconfigure: bool,
    pub has_virtual_start: bool,
    pub has_virtual_stop: bool,
    pub has_virtual_pre_snapshot: bool,
    pub has_virtual_post_snapshot: bool,
    pub has_virtual_status: bool,
    pub has_virtual_initialize: bool,
    pub has_virtual_mount_specification: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use dvp_core::messages::{
        ConfigureRequest, PluginResponse, StagedStatusRequest, StartRequest,
    };
    use dvp_core::{Dict, Status};
    use serde_json::json;

    use super::*;
    use crate::testing::{repository, snapshot, virtual_source, TestSchema};

    #[test]
    fn empty_plugin_manifest_is_all_false() {
        let plugin = Plugin::<TestSchema>::new();
        assert_eq!(plugin.manifest(), PluginManifest::default());
    }

    #[test]
    fn manifest_reflects_registrations() {
        let mut plugin = Plugin::<TestSchema>::new();
        plugin
            .linked_mut()
            .worker(|_, _, _| Ok(()))
            .unwrap();
        plugin
            .virtualization_mut()
            .initialize(|_, _, _| Ok(()))
            .unwrap();

        let manifest = plugin.manifest();
        assert!(manifest.has_linked_worker);
        assert!(manifest.has_virtual_initialize);
        assert!(!manifest.has_linked_status);
        assert!(!manifest.has_virtual_configure);
    }

    #[test]
    fn manifest_serializes_camel_case() {
        let mut plugin = Plugin::<TestSchema>::new();
        plugin
            .discovery_mut()
            .source_config(|_, _| Ok(Vec::new()))
            .unwrap();
        let value = serde_json::to_value(plugin.manifest()).unwrap();
        assert_eq!(value["hasSourceConfigDiscovery"], json!(true));
        assert_eq!(value["hasVirtualMountSpecification"], json!(false));
        assert_eq!(value.as_object().unwrap().len(), 19);
    }

    #[test]
    fn dispatch_routes_to_owning_registry() {
        let mut plugin = Plugin::<TestSchema>::new();
        plugin
            .virtualization_mut()
            .configure(|_, _, _| Ok(Dict::new()))
            .unwrap();

        let response = plugin
            .dispatch(Operation::Configure(ConfigureRequest {
                virtual_source: virtual_source("vdb-1"),
                repository: repository("{}"),
                snapshot: snapshot("{}"),
            }))
            .unwrap();
        assert!(matches!(response, OperationResponse::Configure(_)));

        let response = plugin
            .dispatch(Operation::StagedStatus(StagedStatusRequest::default()))
            .unwrap();
        match response {
            OperationResponse::StagedStatus(PluginResponse::ReturnValue(result)) => {
                assert_eq!(result.status, Status::Active);
            }
            other => panic!("unexpected response {other:?}"),
        }

        assert!(plugin
            .dispatch(Operation::Start(StartRequest::default()))
            .is_ok());
    }

    #[test]
    fn dispatch_surfaces_unimplemented() {
        let plugin = Plugin::<TestSchema>::new();
        let err = plugin
            .dispatch(Operation::Configure(ConfigureRequest::default()))
            .unwrap_err();
        assert!(matches!(
            err,
            PluginError::UnimplementedOperation {
                operation: "virtual.configure"
            }
        ));
    }

    #[test]
    fn plugin_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Plugin<TestSchema>>();
    }
}
