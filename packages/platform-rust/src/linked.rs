//! Linking-phase operations for direct and staged linked sources.
//!
//! The pre/post snapshot slots serve both linking variants: a callback
//! receives a [`LinkedSource`] and can match on it when the variants need
//! different handling. The remaining slots are staged-only.

use std::fmt;

use dvp_core::messages::{
    self, DirectPostSnapshotRequest, DirectPostSnapshotResponse, DirectPostSnapshotResult,
    DirectPreSnapshotRequest, DirectPreSnapshotResponse, DirectPreSnapshotResult, PluginResponse,
    SingleEntireMount, StagedMountSpecRequest, StagedMountSpecResponse, StagedMountSpecResult,
    StagedPostSnapshotRequest, StagedPostSnapshotResponse, StagedPostSnapshotResult,
    StagedPreSnapshotRequest, StagedPreSnapshotResponse, StagedPreSnapshotResult,
    StagedStatusRequest, StagedStatusResponse, StagedStatusResult, StagedWorkerRequest,
    StagedWorkerResponse, StagedWorkerResult, StartStagingRequest, StartStagingResponse,
    StartStagingResult, StopStagingRequest, StopStagingResponse, StopStagingResult,
};
use dvp_core::{DirectSource, LinkedSource, Mount, MountSpecification, Schema, StagedSource, Status};

use crate::error::PluginError;
use crate::operation::{operation_names, slot_names};
use crate::registry::{bound_names, OperationSlot};

type Linked<S> = LinkedSource<<S as Schema>::LinkedSource>;
type Staged<S> = StagedSource<<S as Schema>::LinkedSource>;

/// `pre_snapshot(source, repository, source_config)`
pub type LinkedPreSnapshotFn<S> = dyn Fn(Linked<S>, <S as Schema>::Repository, <S as Schema>::SourceConfig) -> anyhow::Result<()>
    + Send
    + Sync;

/// `post_snapshot(source, repository, source_config)`
pub type LinkedPostSnapshotFn<S> = dyn Fn(
        Linked<S>,
        <S as Schema>::Repository,
        <S as Schema>::SourceConfig,
    ) -> anyhow::Result<<S as Schema>::Snapshot>
    + Send
    + Sync;

/// `start_staging`, `stop_staging` and `worker`: `(source, repository, source_config)`
pub type StagingFn<S> = dyn Fn(Staged<S>, <S as Schema>::Repository, <S as Schema>::SourceConfig) -> anyhow::Result<()>
    + Send
    + Sync;

/// `status(source, repository, source_config)`
pub type LinkedStatusFn<S> = dyn Fn(Staged<S>, <S as Schema>::Repository, <S as Schema>::SourceConfig) -> anyhow::Result<Status>
    + Send
    + Sync;

/// `mount_specification(source, repository)`
pub type LinkedMountSpecificationFn<S> = dyn Fn(Staged<S>, <S as Schema>::Repository) -> anyhow::Result<MountSpecification>
    + Send
    + Sync;

/// Registry for the seven linking operations.
pub struct LinkedOperations<S: Schema> {
    pre_snapshot: OperationSlot<LinkedPreSnapshotFn<S>>,
    post_snapshot: OperationSlot<LinkedPostSnapshotFn<S>>,
    start_staging: OperationSlot<StagingFn<S>>,
    stop_staging: OperationSlot<StagingFn<S>>,
    status: OperationSlot<LinkedStatusFn<S>>,
    worker: OperationSlot<StagingFn<S>>,
    mount_specification: OperationSlot<LinkedMountSpecificationFn<S>>,
}

impl<S: Schema> LinkedOperations<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pre_snapshot: OperationSlot::new(slot_names::LINKED_PRE_SNAPSHOT),
            post_snapshot: OperationSlot::new(slot_names::LINKED_POST_SNAPSHOT),
            start_staging: OperationSlot::new(slot_names::START_STAGING),
            stop_staging: OperationSlot::new(slot_names::STOP_STAGING),
            status: OperationSlot::new(slot_names::LINKED_STATUS),
            worker: OperationSlot::new(slot_names::WORKER),
            mount_specification: OperationSlot::new(slot_names::LINKED_MOUNT_SPECIFICATION),
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register the pre-snapshot callback for both linking variants.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn pre_snapshot<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(Linked<S>, S::Repository, S::SourceConfig) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.pre_snapshot.bind(Box::new(callback))
    }

    /// Register the post-snapshot callback for both linking variants.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn post_snapshot<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(Linked<S>, S::Repository, S::SourceConfig) -> anyhow::Result<S::Snapshot>
            + Send
            + Sync
            + 'static,
    {
        self.post_snapshot.bind(Box::new(callback))
    }

    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn start_staging<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(Staged<S>, S::Repository, S::SourceConfig) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.start_staging.bind(Box::new(callback))
    }

    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn stop_staging<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(Staged<S>, S::Repository, S::SourceConfig) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.stop_staging.bind(Box::new(callback))
    }

    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn status<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(Staged<S>, S::Repository, S::SourceConfig) -> anyhow::Result<Status>
            + Send
            + Sync
            + 'static,
    {
        self.status.bind(Box::new(callback))
    }

    /// Register the validated-sync worker callback.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn worker<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(Staged<S>, S::Repository, S::SourceConfig) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.worker.bind(Box::new(callback))
    }

    /// Register the staged mount-specification callback. It must return
    /// exactly one mount, without a shared path.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateRegistration`] if one is already registered.
    pub fn mount_specification<F>(&mut self, callback: F) -> Result<(), PluginError>
    where
        F: Fn(Staged<S>, S::Repository) -> anyhow::Result<MountSpecification>
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
    /// Fails if the pre-snapshot callback is unset, a payload does not decode,
    /// or the callback fails.
    pub fn handle_direct_pre_snapshot(
        &self,
        request: DirectPreSnapshotRequest,
    ) -> Result<DirectPreSnapshotResponse, PluginError> {
        let result = self
            .pre_snapshot
            .dispatch(operation_names::DIRECT_PRE_SNAPSHOT, |callback| {
                let source = LinkedSource::Direct(DirectSource::from_wire(request.direct_source)?);
                let (repository, source_config) =
                    decode_context::<S>(&request.repository, &request.source_config)?;
                callback(source, repository, source_config)?;
                Ok(DirectPreSnapshotResult {})
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// # Errors
    ///
    /// Fails if the post-snapshot callback is unset, a payload does not
    /// decode or encode, or the callback fails.
    pub fn handle_direct_post_snapshot(
        &self,
        request: DirectPostSnapshotRequest,
    ) -> Result<DirectPostSnapshotResponse, PluginError> {
        let result = self
            .post_snapshot
            .dispatch(operation_names::DIRECT_POST_SNAPSHOT, |callback| {
                let source = LinkedSource::Direct(DirectSource::from_wire(request.direct_source)?);
                let (repository, source_config) =
                    decode_context::<S>(&request.repository, &request.source_config)?;
                let snapshot = callback(source, repository, source_config)?;
                Ok(DirectPostSnapshotResult {
                    snapshot: messages::Snapshot::from_definition(&snapshot)?,
                })
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Optional: an unset pre-snapshot callback yields an empty result.
    ///
    /// # Errors
    ///
    /// Fails if a payload does not decode or the callback fails.
    pub fn handle_staged_pre_snapshot(
        &self,
        request: StagedPreSnapshotRequest,
    ) -> Result<StagedPreSnapshotResponse, PluginError> {
        let result = self
            .pre_snapshot
            .dispatch(operation_names::STAGED_PRE_SNAPSHOT, |callback| {
                let source = LinkedSource::Staged(StagedSource::from_wire(request.staged_source)?);
                let (repository, source_config) =
                    decode_context::<S>(&request.repository, &request.source_config)?;
                callback(source, repository, source_config)?;
                Ok(StagedPreSnapshotResult {})
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// # Errors
    ///
    /// Fails if the post-snapshot callback is unset, a payload does not
    /// decode or encode, or the callback fails.
    pub fn handle_staged_post_snapshot(
        &self,
        request: StagedPostSnapshotRequest,
    ) -> Result<StagedPostSnapshotResponse, PluginError> {
        let result = self
            .post_snapshot
            .dispatch(operation_names::STAGED_POST_SNAPSHOT, |callback| {
                let source = LinkedSource::Staged(StagedSource::from_wire(request.staged_source)?);
                let (repository, source_config) =
                    decode_context::<S>(&request.repository, &request.source_config)?;
                let snapshot = callback(source, repository, source_config)?;
                Ok(StagedPostSnapshotResult {
                    snapshot: messages::Snapshot::from_definition(&snapshot)?,
                })
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Optional: an unset callback yields an empty result.
    ///
    /// # Errors
    ///
    /// Fails if a payload does not decode or the callback fails.
    pub fn handle_start_staging(
        &self,
        request: StartStagingRequest,
    ) -> Result<StartStagingResponse, PluginError> {
        let result = self
            .start_staging
            .dispatch(operation_names::START_STAGING, |callback| {
                let (source, repository, source_config) = decode_staged::<S>(
                    request.staged_source,
                    &request.repository,
                    &request.source_config,
                )?;
                callback(source, repository, source_config)?;
                Ok(StartStagingResult {})
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Optional: an unset callback yields an empty result.
    ///
    /// # Errors
    ///
    /// Fails if a payload does not decode or the callback fails.
    pub fn handle_stop_staging(
        &self,
        request: StopStagingRequest,
    ) -> Result<StopStagingResponse, PluginError> {
        let result = self
            .stop_staging
            .dispatch(operation_names::STOP_STAGING, |callback| {
                let (source, repository, source_config) = decode_staged::<S>(
                    request.staged_source,
                    &request.repository,
                    &request.source_config,
                )?;
                callback(source, repository, source_config)?;
                Ok(StopStagingResult {})
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
        request: StagedStatusRequest,
    ) -> Result<StagedStatusResponse, PluginError> {
        let result = self
            .status
            .dispatch(operation_names::STAGED_STATUS, |callback| {
                let (source, repository, source_config) = decode_staged::<S>(
                    request.staged_source,
                    &request.repository,
                    &request.source_config,
                )?;
                let status = callback(source, repository, source_config)?;
                Ok(StagedStatusResult { status })
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Optional: an unset callback yields an empty result.
    ///
    /// # Errors
    ///
    /// Fails if a payload does not decode or the callback fails.
    pub fn handle_worker(
        &self,
        request: StagedWorkerRequest,
    ) -> Result<StagedWorkerResponse, PluginError> {
        let result = self
            .worker
            .dispatch(operation_names::STAGED_WORKER, |callback| {
                let (source, repository, source_config) = decode_staged::<S>(
                    request.staged_source,
                    &request.repository,
                    &request.source_config,
                )?;
                callback(source, repository, source_config)?;
                Ok(StagedWorkerResult {})
            })?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// # Errors
    ///
    /// Fails if the callback is unset or fails, a payload does not decode,
    /// the callback returns other than exactly one mount
    /// ([`PluginError::MountCardinality`]), or that mount sets a shared path
    /// ([`PluginError::SharedPathNotSupported`]).
    pub fn handle_mount_specification(
        &self,
        request: StagedMountSpecRequest,
    ) -> Result<StagedMountSpecResponse, PluginError> {
        let result = self.mount_specification.dispatch(
            operation_names::STAGED_MOUNT_SPECIFICATION,
            |callback| {
                let source = StagedSource::from_wire(request.staged_source)?;
                let repository = request.repository.to_definition::<S::Repository>()?;
                let specification = callback(source, repository)?;
                staged_mount_result(specification)
            },
        )?;
        Ok(PluginResponse::ReturnValue(result))
    }

    /// Registration names of the bound slots.
    #[must_use]
    pub fn bound_operations(&self) -> Vec<&'static str> {
        bound_names(&self.slots())
    }

    pub(crate) fn slots(&self) -> [(&'static str, bool); 7] {
        [
            (self.pre_snapshot.name(), self.pre_snapshot.is_bound()),
            (self.post_snapshot.name(), self.post_snapshot.is_bound()),
            (self.start_staging.name(), self.start_staging.is_bound()),
            (self.stop_staging.name(), self.stop_staging.is_bound()),
            (self.status.name(), self.status.is_bound()),
            (self.worker.name(), self.worker.is_bound()),
            (
                self.mount_specification.name(),
                self.mount_specification.is_bound(),
            ),
        ]
    }
}

impl<S: Schema> Default for LinkedOperations<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema> fmt::Debug for LinkedOperations<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedOperations")
            .field("bound", &self.bound_operations())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn decode_context<S: Schema>(
    repository: &messages::Repository,
    source_config: &messages::SourceConfig,
) -> Result<(S::Repository, S::SourceConfig), PluginError> {
    Ok((repository.to_definition()?, source_config.to_definition()?))
}

fn decode_staged<S: Schema>(
    source: messages::StagedSource,
    repository: &messages::Repository,
    source_config: &messages::SourceConfig,
) -> Result<(Staged<S>, S::Repository, S::SourceConfig), PluginError> {
    let source = StagedSource::from_wire(source)?;
    let (repository, source_config) = decode_context::<S>(repository, source_config)?;
    Ok((source, repository, source_config))
}

fn staged_mount_result(
    specification: MountSpecification,
) -> Result<StagedMountSpecResult, PluginError> {
    let operation = operation_names::STAGED_MOUNT_SPECIFICATION;
    let found = specification.mounts.len();
    let [mount]: [Mount; 1] =
        specification
            .mounts
            .try_into()
            .map_err(|_| PluginError::MountCardinality {
                operation,
                expected: "exactly 1",
                found,
            })?;
    if mount.has_shared_path() {
        return Err(PluginError::SharedPathNotSupported { operation });
    }
    Ok(StagedMountSpecResult {
        staged_mount: SingleEntireMount {
            remote_environment: mount.remote_environment,
            mount_path: mount.mount_path,
            shared_path: None,
        },
        ownership_spec: specification.ownership_specification.map(Into::into),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
