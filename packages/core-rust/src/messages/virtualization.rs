//! Virtual source requests and responses.

use serde::{Deserialize, Serialize};

use super::common::{
    OwnershipSpec, Repository, SingleSubsetMount, Snapshot, SourceConfig, VirtualSource,
};
use super::linked::empty_result;
use super::PluginResponse;
use crate::types::Status;

/// Configure freshly provisioned data on the target environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigureRequest {
    pub virtual_source: VirtualSource,
    pub repository: Repository,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigureResult {
    pub source_config: SourceConfig,
}

pub type ConfigureResponse = PluginResponse<ConfigureResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnconfigureRequest {
    pub virtual_source: VirtualSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

empty_result!(UnconfigureResult);

pub type UnconfigureResponse = PluginResponse<UnconfigureResult>;

/// Re-attach a virtual source while enabling it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconfigureRequest {
    pub virtual_source: VirtualSource,
    pub snapshot: Snapshot,
    pub source_config: SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconfigureResult {
    pub source_config: SourceConfig,
}

pub type ReconfigureResponse = PluginResponse<ReconfigureResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartRequest {
    pub virtual_source: VirtualSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

empty_result!(StartResult);

pub type StartResponse = PluginResponse<StartResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StopRequest {
    pub virtual_source: VirtualSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

empty_result!(StopResult);

pub type StopResponse = PluginResponse<StopResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualPreSnapshotRequest {
    pub virtual_source: VirtualSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

empty_result!(VirtualPreSnapshotResult);

pub type VirtualPreSnapshotResponse = PluginResponse<VirtualPreSnapshotResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualPostSnapshotRequest {
    pub virtual_source: VirtualSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualPostSnapshotResult {
    pub snapshot: Snapshot,
}

pub type VirtualPostSnapshotResponse = PluginResponse<VirtualPostSnapshotResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualStatusRequest {
    pub virtual_source: VirtualSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

/// `Default` reports [`Status::Active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualStatusResult {
    pub status: Status,
}

pub type VirtualStatusResponse = PluginResponse<VirtualStatusResult>;

/// Initialize an empty virtual source after it is mounted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InitializeRequest {
    pub virtual_source: VirtualSource,
    pub repository: Repository,
    pub source_config: SourceConfig,
}

empty_result!(InitializeResult);

pub type InitializeResponse = PluginResponse<InitializeResult>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualMountSpecRequest {
    pub virtual_source: VirtualSource,
    pub repository: Repository,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualMountSpecResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership_spec: Option<OwnershipSpec>,
    pub mounts: Vec<SingleSubsetMount>,
}

pub type VirtualMountSpecResponse = PluginResponse<VirtualMountSpecResult>;
