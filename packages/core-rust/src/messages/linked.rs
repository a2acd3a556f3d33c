//! Linking requests and responses, for both direct and staged sources.
//!
//! Direct and staged operations share names on the plugin side but travel as
//! distinct messages: a direct request carries a `direct_source`, a staged one
//! a `staged_source` with its staging mount.

use serde::{Deserialize, Serialize};

use super::common::{
    DirectSource, OwnershipSpec, Repository, SingleEntireMount, Snapshot, SourceConfig,
    StagedSource,
};
use super::PluginResponse;
use crate::types::Status;

/// Declares a result with no fields, acknowledged by `{}` on the wire.
macro_rules! empty_result {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
        pub struct $name {}
    };
}

pub(crate) use empty_result;

// ---------------------------------------------------------------------------
// Direct
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectPreSnapshotRequest {
    pub direct_source: DirectSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

empty_result!(DirectPreSnapshotResult);

pub type DirectPreSnapshotResponse = PluginResponse<DirectPreSnapshotResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectPostSnapshotRequest {
    pub direct_source: DirectSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectPostSnapshotResult {
    pub snapshot: Snapshot,
}

pub type DirectPostSnapshotResponse = PluginResponse<DirectPostSnapshotResult>;

// ---------------------------------------------------------------------------
// Staged
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedPreSnapshotRequest {
    pub staged_source: StagedSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

empty_result!(StagedPreSnapshotResult);

pub type StagedPreSnapshotResponse = PluginResponse<StagedPreSnapshotResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedPostSnapshotRequest {
    pub staged_source: StagedSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedPostSnapshotResult {
    pub snapshot: Snapshot,
}

pub type StagedPostSnapshotResponse = PluginResponse<StagedPostSnapshotResult>;

/// Start the staging source as part of enabling it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartStagingRequest {
    pub staged_source: StagedSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

empty_result!(StartStagingResult);

pub type StartStagingResponse = PluginResponse<StartStagingResult>;

/// Stop the staging source as part of disabling it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StopStagingRequest {
    pub staged_source: StagedSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

empty_result!(StopStagingResult);

pub type StopStagingResponse = PluginResponse<StopStagingResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedStatusRequest {
    pub staged_source: StagedSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

/// `Default` reports [`Status::Active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedStatusResult {
    pub status: Status,
}

pub type StagedStatusResponse = PluginResponse<StagedStatusResult>;

/// Sync the staging source during validated sync.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedWorkerRequest {
    pub staged_source: StagedSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

empty_result!(StagedWorkerResult);

pub type StagedWorkerResponse = PluginResponse<StagedWorkerResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedMountSpecRequest {
    pub staged_source: StagedSource,
    pub repository: Repository,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedMountSpecResult {
    pub staged_mount: SingleEntireMount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership_spec: Option<OwnershipSpec>,
}

pub type StagedMountSpecResponse = PluginResponse<StagedMountSpecResult>;
