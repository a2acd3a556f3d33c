//! Wire-compatible request and response messages for every plugin operation.
//!
//! Each operation has a `<Operation>Request` and a `<Operation>Response`.
//! Field names reproduce the host schema exactly. A response is the schema's
//! `oneof`: either `{"return_value": ...}` or `{"error": ...}`, modelled by
//! [`PluginResponse`].

pub mod common;

pub mod discovery;
pub mod linked;
pub mod virtualization;

use serde::{Deserialize, Serialize};

pub use common::{
    DirectSource, LinkedSource, OwnershipSpec, PluginDefinedObject, PluginErrorResult,
    RemoteConnection, RemoteEnvironment, RemoteHost, RemoteUser, Repository, SingleEntireMount,
    SingleSubsetMount, Snapshot, SourceConfig, StagedSource, VirtualSource,
};

pub use discovery::{
    RepositoryDiscoveryRequest, RepositoryDiscoveryResponse, RepositoryDiscoveryResult,
    SourceConfigDiscoveryRequest, SourceConfigDiscoveryResponse, SourceConfigDiscoveryResult,
};

pub use linked::{
    DirectPostSnapshotRequest, DirectPostSnapshotResponse, DirectPostSnapshotResult,
    DirectPreSnapshotRequest, DirectPreSnapshotResponse, DirectPreSnapshotResult,
    StagedMountSpecRequest, StagedMountSpecResponse, StagedMountSpecResult,
    StagedPostSnapshotRequest, StagedPostSnapshotResponse, StagedPostSnapshotResult,
    StagedPreSnapshotRequest, StagedPreSnapshotResponse, StagedPreSnapshotResult,
    StagedStatusRequest, StagedStatusResponse, StagedStatusResult, StagedWorkerRequest,
    StagedWorkerResponse, StagedWorkerResult, StartStagingRequest, StartStagingResponse,
    StartStagingResult, StopStagingRequest, StopStagingResponse, StopStagingResult,
};

pub use virtualization::{
    ConfigureRequest, ConfigureResponse, ConfigureResult, InitializeRequest, InitializeResponse,
    InitializeResult, ReconfigureRequest, ReconfigureResponse, ReconfigureResult, StartRequest,
    StartResponse, StartResult, StopRequest, StopResponse, StopResult, UnconfigureRequest,
    UnconfigureResponse, UnconfigureResult, VirtualMountSpecRequest, VirtualMountSpecResponse,
    VirtualMountSpecResult, VirtualPostSnapshotRequest, VirtualPostSnapshotResponse,
    VirtualPostSnapshotResult, VirtualPreSnapshotRequest, VirtualPreSnapshotResponse,
    VirtualPreSnapshotResult, VirtualStatusRequest, VirtualStatusResponse, VirtualStatusResult,
};

// ---------------------------------------------------------------------------
// PluginResponse
// ---------------------------------------------------------------------------

/// Outcome of one operation as the host reads it.
///
/// Serializes externally tagged in snake_case, so a success is
/// `{"return_value": {...}}` and a failure is `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginResponse<T> {
    ReturnValue(T),
    Error(PluginErrorResult),
}

impl<T> PluginResponse<T> {
    /// Borrow the success value, if any.
    #[must_use]
    pub fn return_value(&self) -> Option<&T> {
        match self {
            Self::ReturnValue(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Take the success value, if any.
    #[must_use]
    pub fn into_return_value(self) -> Option<T> {
        match self {
            Self::ReturnValue(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Borrow the error result, if any.
    #[must_use]
    pub fn error(&self) -> Option<&PluginErrorResult> {
        match self {
            Self::ReturnValue(_) => None,
            Self::Error(error) => Some(error),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Status;

    #[test]
    fn return_value_is_tagged_snake_case() {
        let response: StagedStatusResponse =
            PluginResponse::ReturnValue(StagedStatusResult { status: Status::Inactive });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "return_value": { "status": "INACTIVE" } }));
    }

    #[test]
    fn error_is_tagged_error() {
        let response: StartResponse = PluginResponse::Error(PluginErrorResult {
            kind: "callback".into(),
            message: "database refused to start".into(),
        });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({ "error": { "kind": "callback", "message": "database refused to start" } })
        );
        assert!(response.is_error());
        assert!(response.return_value().is_none());
        assert_eq!(response.error().unwrap().kind, "callback");
    }

    #[test]
    fn empty_result_serializes_as_empty_object() {
        let response: StartStagingResponse = PluginResponse::ReturnValue(StartStagingResult {});
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "return_value": {} }));
    }

    #[test]
    fn response_survives_named_msgpack() {
        let response: VirtualMountSpecResponse =
            PluginResponse::ReturnValue(VirtualMountSpecResult {
                ownership_spec: Some(OwnershipSpec { uid: 1000, gid: 1000 }),
                mounts: vec![SingleSubsetMount {
                    remote_environment: RemoteEnvironment {
                        name: "target".into(),
                        reference: "ENV-2".into(),
                        host: RemoteHost::default(),
                    },
                    mount_path: "/mnt/vdb".into(),
                    shared_path: Some("data".into()),
                }],
            });

        let bytes = rmp_serde::to_vec_named(&response).expect("serialize mount spec");
        let decoded: VirtualMountSpecResponse =
            rmp_serde::from_slice(&bytes).expect("deserialize mount spec");
        assert_eq!(decoded, response);
    }

    #[test]
    fn request_decodes_from_host_json() {
        let request: ConfigureRequest = serde_json::from_value(json!({
            "virtual_source": {
                "guid": "vdb-7",
                "connection": { "environment": { "name": "target" } },
                "parameters": { "json": "{\"port\": 5432}" }
            },
            "repository": { "parameters": { "json": "{\"name\": \"pg15\"}" } },
            "snapshot": { "parameters": { "json": "{}" } }
        }))
        .unwrap();

        assert_eq!(request.virtual_source.guid, "vdb-7");
        assert_eq!(request.virtual_source.connection.environment.name, "target");
        assert_eq!(request.repository.parameters.json, "{\"name\": \"pg15\"}");
    }
}
