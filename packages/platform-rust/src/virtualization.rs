//! Virtualization-phase operations for a provisioned virtual copy.

use std::fmt;

use dvp_core::messages::{
    self, ConfigureRequest, ConfigureResponse, ConfigureResult, InitializeRequest,
    InitializeResponse, InitializeResult, PluginResponse, ReconfigureRequest, ReconfigureResponse,
    ReconfigureResult, SingleSubsetMount, StartRequest, StartResponse, StartResult, StopRequest,
    StopResponse, StopResult, UnconfigureRequest, UnconfigureResponse, UnconfigureResult,
    VirtualMountSpecRequest, VirtualMountSpecResponse, VirtualMountSpecResult,
    VirtualPostSnapshotRequest, VirtualPostSnapshotResponse, VirtualPostSnapshotResult,
    VirtualPreSnapshotRequest, VirtualPreSnapshotResponse, VirtualPreSnapshotResult,
    VirtualStatusRequest, VirtualStatusResponse, VirtualStatusResult,
};
use dvp_core::{MountSpecification, Schema, Status, VirtualSource};

use crate::error::PluginError;
use crate::operation::{operation_names, slot_names};
use crate::registry::{bound_names, OperationSlot};

type Virtual<S> = VirtualSource<<S as Schema>::VirtualSource>;

/// `configure(virtual_source, repository, snapshot)`
pub type ConfigureFn<S> = dyn Fn(
        Virtual<S>,
        <S as Schema>::Repository,
        <S as Schema>::Snapshot,
    ) -> anyhow::Result<<S as Schema>::SourceConfig>
    + Send
    + Sync;

/// `reconfigure(snapshot, source_config, virtual_source)`
pub type ReconfigureFn<S> = dyn Fn(
        <S as Schema>::Snapshot,
        <S as Schema>::SourceConfig,
        Virtual<S>,
    ) -> anyhow::Result<<S as Schema>::SourceConfig>
    + Send
    + Sync;

/// `unconfigure`, `start`, `stop`, `pre_snapshot` and `initialize`:
/// `(repository, source_config, virtual_source)`
pub type LifecycleFn<S> = dyn Fn(<S as Schema>::Repository, <S as Schema>::SourceConfig, Virtual<S>) -> anyhow::Result<()>
    + Send
    + Sync;

/// `post_snapshot(repository, source_config, virtual_source)`
pub type VirtualPostSnapshotFn<S> = dyn Fn(
        <S as Schema>::Repository,
        <S as Schema>::SourceConfig,
        Virtual<S>,
    ) -> anyhow::Result<<S as Schema>::Snapshot>
    + Send
    + Sync;

/// `status(repository, source_config, virtual_source)`
pub type VirtualStatusFn<S> = dyn Fn(<S as Schema>::Repository, <S as Schema>::SourceConfig, Virtual<S>) -> anyhow::Result<Status>
    + Send
    + Sync;

/// `mount_specification(repository, virtual_source)`
pub type VirtualMountSpecificationFn<S> = dyn Fn(<S as Schema>::Repository, Virtual<S>) -> anyhow::Result<MountSpecification>
    + Send
    + Sync;

/// Registry for the ten virtualization operations.
///
/// `configure`, `reconfigure`, `post_snapshot`, `initialize` and
/// `mount_specification` are required. The rest default to an empty result,
/// or [`Status::Active`] for `status`.
pub struct VirtualizationOperations<S: Schema> {
    configure: OperationSlot<ConfigureFn<S>>,
    unconfigure: OperationSlot<LifecycleFn<S>>,
    reconfigure: OperationSlot<ReconfigureFn<S>>,
    start: OperationSlot<LifecycleFn<S>>,
    stop: OperationSlot<LifecycleFn<S>>,
    pre_snapshot: OperationSlot<LifecycleFn<S>>,
    post_snapshot: OperationSlot<VirtualPostSnapshotFn<S>>,
    status: OperationSlot<VirtualStatusFn<S>>,
    initialize: OperationSlot<LifecycleFn<S>>,
    mount_specification: OperationSlot<VirtualMountSpecificationFn<S>>,
}

/// Generates the registration methods that take a [`LifecycleFn`].
macro_rules! lifecycle_registration {
    ($( $(#[$doc:meta])* $method:ident; )*) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
            pub fn $method<F>(&mut self, callback: F) -> Result<(), PluginError>
            where
                F: Fn(S::Repository, S::SourceConfig, Virtual<S>) -> anyhow::Result<()>
                    + Send
                    + Sync
                    + 'static,
            {
                self.$method.bind(Box::new(callback))
            }
        )*
    };
}

impl<S: Schema> VirtualizationOperations<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            configure: OperationSlot::new(slot_names::CONFIGURE),
            unconfigure: OperationSlot::new(slot_names::UNCONFIGURE),
            reconfigure: OperationSlot::new(slot_names::RECONFIGURE),
            start: OperationSlot::new(slot_names::START),
            stop: OperationSlot::new(slot_names::STOP),
            pre_snapshot: OperationSlot::new(slot_names::VIRTUAL_PRE_SNAPSHOT),
            post_snapshot: OperationSlot::new(slot_names::VIRTUAL_POST_SNAPSHOT),
            status: OperationSlot::new(slot_names::VIRTUAL_STATUS),
            initialize: OperationSlot::new(slot_names::INITIALIZE),
            mount_specification: OperationSlot::new(slot_names::VIRTUAL_MOUNT_SPECIFICATION),
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register the callback that configures a freshly provisioned copy and
    /// returns its source config.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn configure<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(Virtual<S>, S::Repository, S::Snapshot) -> anyhow::Result<S::SourceConfig>
            + Send
            + Sync
            + 'static,
    {
        self.configure.bind(Box::new(callback))
    }

    /// Register the callback that reconfigures a copy after a refresh or
    /// rewind and returns its new source config.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn reconfigure<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(S::Snapshot, S::SourceConfig, Virtual<S>) -> anyhow::Result<S::SourceConfig>
            + Send
            + Sync
            + 'static,
    {
        self.reconfigure.bind(Box::new(callback))
    }

    lifecycle_registration! {
        unconfigure;
        start;
        stop;
        /// Runs before a snapshot of the virtual copy is taken.
        pre_snapshot;
        initialize;
    }

    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn post_snapshot<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(S::Repository, S::SourceConfig, Virtual<S>) -> anyhow::Result<S::Snapshot>
            + Send
            + Sync
            + 'static,
    {
        self.post_snapshot.bind(Box::new(callback))
    }

    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn status<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(S::Repository, S::SourceConfig, Virtual<S>) -> anyhow::Result<Status>
            + Send
            + Sync
            + 'static,
    {
        self.status.bind(Box::new(callback))
    }

    /// Register the mount-specification callback. It must return at least
    /// one mount.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn mount_specification<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(S::Repository, Virtual<S>) -> anyhow::Result<MountSpecification>
            + Send
            + Sync
            + 'static,
    {
        self.mount_specification.bind(Box::new(callback))
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Fails if the callback is unset or fails, or a payload does not
    /// decode or encode.
    pub fn handle_configure(
        &self,
        request: ConfigureRequest,
    ) -> Result<ConfigureResponse, PluginError> {
        let result = self
            .configure
            .dispatch(operation_names::CONFIGURE, |callback| {
                let virtual_source = VirtualSource::from_wire(request.virtual_source)?;
                let repository = request.repository.to_definition::<S::Repository>()?;
                let snapshot = request.snapshot.to_definition::<S::Snapshot>()?;
                let source_config = callback(virtual_source, repository, snapshot)?;
                Ok(ConfigureResult {
                    source_config: messages::SourceConfig::from_definition(&source_config)?,
                })
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Optional: an unset callback yields an empty result.
    ///
    /// # Errors
    ///
    /// Fails if a payload does not decode or the callback fails.
    pub fn handle_unconfigure(
        &self,
        request: UnconfigureRequest,
    ) -> Result<UnconfigureResponse, PluginError> {
        let result = self
            .unconfigure
            .dispatch(operation_names::UNCONFIGURE, |callback| {
                let (repository, source_config, virtual_source) = decode_lifecycle::<S>(
                    &request.repository,
                    &request.source_config,
                    request.virtual_source,
                )?;
                callback(repository, source_config, virtual_source)?;
                Ok(UnconfigureResult {})
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// # Errors
    ///
    /// Fails if the callback is unset or fails, or a payload does not
    /// decode or encode.
    pub fn handle_reconfigure(
        &self,
        request: ReconfigureRequest,
    ) -> Result<ReconfigureResponse, PluginError> {
        let result = self
            .reconfigure
            .dispatch(operation_names::RECONFIGURE, |callback| {
                let snapshot = request.snapshot.to_definition::<S::Snapshot>()?;
                let source_config = request.source_config.to_definition::<S::SourceConfig>()?;
                let virtual_source = VirtualSource::from_wire(request.virtual_source)?;
                let source_config = callback(snapshot, source_config, virtual_source)?;
                Ok(ReconfigureResult {
                    source_config: messages::SourceConfig::from_definition(&source_config)?,
                })
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Optional: an unset callback yields an empty result.
    ///
    /// # Errors
    ///
    /// Fails if a payload does not decode or the callback fails.
    pub fn handle_start(&self, request: StartRequest) -> Result<StartResponse, PluginError> {
        let result = self.start.dispatch(operation_names::START, |callback| {
            let (repository, source_config, virtual_source) = decode_lifecycle::<S>(
                &request.repository,
                &request.source_config,
                request.virtual_source,
            )?;
            callback(repository, source_config, virtual_source)?;
            Ok(StartResult {})
        })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Optional: an unset callback yields an empty result.
    ///
    /// # Errors
    ///
    /// Fails if a payload does not decode or the callback fails.
    pub fn handle_stop(&self, request: StopRequest) -> Result<StopResponse, PluginError> {
        let result = self.stop.dispatch(operation_names::STOP, |callback| {
            let (repository, source_config, virtual_source) = decode_lifecycle::<S>(
                &request.repository,
                &request.source_config,
                request.virtual_source,
            )?;
            callback(repository, source_config, virtual_source)?;
            Ok(StopResult {})
        })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Optional: an unset callback yields an empty result.
    ///
    /// # Errors
    ///
    /// Fails if a payload does not decode or the callback fails.
    pub fn handle_pre_snapshot(
        &self,
        request: VirtualPreSnapshotRequest,
    ) -> Result<VirtualPreSnapshotResponse, PluginError> {
        let result = self
            .pre_snapshot
            .dispatch(operation_names::VIRTUAL_PRE_SNAPSHOT, |callback| {
                let (repository, source_config, virtual_source) = decode_lifecycle::<S>(
                    &request.repository,
                    &request.source_config,
                    request.virtual_source,
                )?;
                callback(repository, source_config, virtual_source)?;
                Ok(VirtualPreSnapshotResult {})
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// # Errors
    ///
    /// Fails if the callback is unset or fails, or a payload does not
    /// decode or encode.
    pub fn handle_post_snapshot(
        &self,
        request: VirtualPostSnapshotRequest,
    ) -> Result<VirtualPostSnapshotResponse, PluginError> {
        let result = self
            .post_snapshot
            .dispatch(operation_names::VIRTUAL_POST_SNAPSHOT, |callback| {
                let (repository, source_config, virtual_source) = decode_lifecycle::<S>(
                    &request.repository,
                    &request.source_config,
                    request.virtual_source,
                )?;
                let snapshot = callback(repository, source_config, virtual_source)?;
                Ok(VirtualPostSnapshotResult {
                    snapshot: messages::Snapshot::from_definition(&snapshot)?,
                })
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Optional: an unset callback reports [`Status::Active`].
    ///
    /// # Errors
    ///
    /// Fails if a payload does not decode or the callback fails.
    pub fn handle_status(
        &self,
        request: VirtualStatusRequest,
    ) -> Result<VirtualStatusResponse, PluginError> {
        let result = self
            .status
            .dispatch(operation_names::VIRTUAL_STATUS, |callback| {
                let (repository, source_config, virtual_source) = decode_lifecycle::<S>(
                    &request.repository,
                    &request.source_config,
                    request.virtual_source,
                )?;
                let status = callback(repository, source_config, virtual_source)?;
                Ok(VirtualStatusResult { status })
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// # Errors
    ///
    /// Fails if the callback is unset or fails, or a payload does not decode.
    pub fn handle_initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializeResponse, PluginError> {
        let result = self
            .initialize
            .dispatch(operation_names::INITIALIZE, |callback| {
                let (repository, source_config, virtual_source) = decode_lifecycle::<S>(
                    &request.repository,
                    &request.source_config,
                    request.virtual_source,
                )?;
                callback(repository, source_config, virtual_source)?;
                Ok(InitializeResult {})
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Mounts are returned in callback order, each with its full
    /// environment and host descriptor.
    ///
    /// # Errors
    ///
    /// Fails if the callback is unset or fails, a payload does not decode, or
    /// the callback returns no mounts ([`PluginError::MountCardinality`]).
    pub fn handle_mount_specification(
        &self,
        request: VirtualMountSpecRequest,
    ) -> Result<VirtualMountSpecResponse, PluginError> {
        let result = self.mount_specification.dispatch(
            operation_names::VIRTUAL_MOUNT_SPECIFICATION,
            |callback| {
                let repository = request.repository.to_definition::<S::Repository>()?;
                let virtual_source = VirtualSource::from_wire(request.virtual_source)?;
                let specification = callback(repository, virtual_source)?;
                if specification.mounts.is_empty() {
                    return Err(PluginError::MountCardinality {
                        operation: operation_names::VIRTUAL_MOUNT_SPECIFICATION,
                        expected: "at least 1",
                        found: 0,
                    });
                }
                Ok(VirtualMountSpecResult {
                    ownership_spec: specification.ownership_specification.map(Into::into),
                    mounts: specification
                        .mounts
                        .into_iter()
                        .map(SingleSubsetMount::from)
                        .collect(),
                })
            },
        )?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Registration names of the bound slots.
    #[must_use]
    pub fn bound_operations(&self) -> Vec<&'static str> {
        bound_names(&self.slots())
    }

    pub(crate) fn slots(&self) -> [(&'static str, bool); 10] {
        [
            (self.configure.name(), self.configure.is_bound()),
            (self.unconfigure.name(), self.unconfigure.is_bound()),
            (self.reconfigure.name(), self.reconfigure.is_bound()),
            (self.start.name(), self.start.is_bound()),
            (self.stop.name(), self.stop.is_bound()),
            (self.pre_snapshot.name(), self.pre_snapshot.is_bound()),
            (self.post_snapshot.name(), self.post_snapshot.is_bound()),
            (self.status.name(), self.status.is_bound()),
            (self.initialize.name(), self.initialize.is_bound()),
            (
                self.mount_specification.name(),
                self.mount_specification.is_bound(),
            ),
        ]
    }
}

impl<S: Schema> Default for VirtualizationOperations<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema> fmt::Debug for VirtualizationOperations<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualizationOperations")
            .field("bound", &self.bound_operations())
            .finish()
    }
}

fn decode_lifecycle<S: Schema>(
    repository: &messages::Repository,
    source_config: &messages::SourceConfig,
    virtual_source: messages::VirtualSource,
) -> Result<(S::Repository, S::SourceConfig, Virtual<S>), PluginError> {
    Ok((
        repository.to_definition()?,
        source_config.to_definition()?,
        VirtualSource::from_wire(virtual_source)?,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
