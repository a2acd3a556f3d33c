//! Operation table and the typed operation/response envelopes.
//!
//! [`OPERATIONS`] is the single source of truth for which operations exist,
//! which registry owns them, and whether an unset callback is an error or a
//! default response. [`Operation`] and [`OperationResponse`] carry one typed
//! request or response per table entry.

use dvp_core::messages::{
    ConfigureRequest, ConfigureResponse, DirectPostSnapshotRequest, DirectPostSnapshotResponse,
    DirectPreSnapshotRequest, DirectPreSnapshotResponse, InitializeRequest, InitializeResponse,
    PluginErrorResult, PluginResponse, ReconfigureRequest, ReconfigureResponse,
    RepositoryDiscoveryRequest, RepositoryDiscoveryResponse, SourceConfigDiscoveryRequest,
    SourceConfigDiscoveryResponse, StagedMountSpecRequest, StagedMountSpecResponse,
    StagedPostSnapshotRequest, StagedPostSnapshotResponse, StagedPreSnapshotRequest,
    StagedPreSnapshotResponse, StagedStatusRequest, StagedStatusResponse, StagedWorkerRequest,
    StagedWorkerResponse, StartRequest, StartResponse, StartStagingRequest, StartStagingResponse,
    StopRequest, StopResponse, StopStagingRequest, StopStagingResponse, UnconfigureRequest,
    UnconfigureResponse, VirtualMountSpecRequest, VirtualMountSpecResponse,
    VirtualPostSnapshotRequest, VirtualPostSnapshotResponse, VirtualPreSnapshotRequest,
    VirtualPreSnapshotResponse, VirtualStatusRequest, VirtualStatusResponse,
};
use dvp_core::{CodecError, WireFormat};

use crate::error::PluginError;

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Host identifiers of every dispatchable operation.
pub mod operation_names {
    pub const REPOSITORY_DISCOVERY: &str = "discovery.repository";
    pub const SOURCE_CONFIG_DISCOVERY: &str = "discovery.source_config";

    pub const DIRECT_PRE_SNAPSHOT: &str = "linked.direct_pre_snapshot";
    pub const DIRECT_POST_SNAPSHOT: &str = "linked.direct_post_snapshot";
    pub const STAGED_PRE_SNAPSHOT: &str = "linked.staged_pre_snapshot";
    pub const STAGED_POST_SNAPSHOT: &str = "linked.staged_post_snapshot";
    pub const START_STAGING: &str = "linked.start_staging";
    pub const STOP_STAGING: &str = "linked.stop_staging";
    pub const STAGED_STATUS: &str = "linked.status";
    pub const STAGED_WORKER: &str = "linked.worker";
    pub const STAGED_MOUNT_SPECIFICATION: &str = "linked.mount_specification";

    pub const CONFIGURE: &str = "virtual.configure";
    pub const UNCONFIGURE: &str = "virtual.unconfigure";
    pub const RECONFIGURE: &str = "virtual.reconfigure";
    pub const START: &str = "virtual.start";
    pub const STOP: &str = "virtual.stop";
    pub const VIRTUAL_PRE_SNAPSHOT: &str = "virtual.pre_snapshot";
    pub const VIRTUAL_POST_SNAPSHOT: &str = "virtual.post_snapshot";
    pub const VIRTUAL_STATUS: &str = "virtual.status";
    pub const INITIALIZE: &str = "virtual.initialize";
    pub const VIRTUAL_MOUNT_SPECIFICATION: &str = "virtual.mount_specification";
}

/// Names of the registration slots. A slot may serve more than one operation:
/// the linked pre/post snapshot slots serve both the direct and staged shapes.
pub mod slot_names {
    pub const REPOSITORY: &str = "discovery.repository";
    pub const SOURCE_CONFIG: &str = "discovery.source_config";

    pub const LINKED_PRE_SNAPSHOT: &str = "linked.pre_snapshot";
    pub const LINKED_POST_SNAPSHOT: &str = "linked.post_snapshot";
    pub const START_STAGING: &str = "linked.start_staging";
    pub const STOP_STAGING: &str = "linked.stop_staging";
    pub const LINKED_STATUS: &str = "linked.status";
    pub const WORKER: &str = "linked.worker";
    pub const LINKED_MOUNT_SPECIFICATION: &str = "linked.mount_specification";

    pub const CONFIGURE: &str = "virtual.configure";
    pub const UNCONFIGURE: &str = "virtual.unconfigure";
    pub const RECONFIGURE: &str = "virtual.reconfigure";
    pub const START: &str = "virtual.start";
    pub const STOP: &str = "virtual.stop";
    pub const VIRTUAL_PRE_SNAPSHOT: &str = "virtual.pre_snapshot";
    pub const VIRTUAL_POST_SNAPSHOT: &str = "virtual.post_snapshot";
    pub const VIRTUAL_STATUS: &str = "virtual.status";
    pub const INITIALIZE: &str = "virtual.initialize";
    pub const VIRTUAL_MOUNT_SPECIFICATION: &str = "virtual.mount_specification";
}

// ---------------------------------------------------------------------------
// Operation table
// ---------------------------------------------------------------------------

/// The registry that owns an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationGroup {
    Discovery,
    Linked,
    Virtual,
}

/// What dispatch does when the operation's slot is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// Fail with [`PluginError::UnimplementedOperation`].
    Required,
    /// Return the result type's default (an empty result, or `ACTIVE` status).
    Optional,
}

impl Requirement {
    #[must_use]
    pub fn is_optional(self) -> bool {
        self == Self::Optional
    }
}

/// One row of the operation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub group: OperationGroup,
    pub requirement: Requirement,
}

impl OperationDescriptor {
    const fn new(name: &'static str, group: OperationGroup, requirement: Requirement) -> Self {
        Self {
            name,
            group,
            requirement,
        }
    }

    /// Look up an operation by its host identifier.
    #[must_use]
    pub fn find(name: &str) -> Option<&'static OperationDescriptor> {
        OPERATIONS.iter().find(|descriptor| descriptor.name == name)
    }

    /// Requirement of `name`; operations missing from the table are required.
    #[must_use]
    pub fn requirement_of(name: &str) -> Requirement {
        Self::find(name).map_or(Requirement::Required, |descriptor| descriptor.requirement)
    }
}

/// Every dispatchable operation, with its owning registry and default policy.
pub static OPERATIONS: &[OperationDescriptor] = {
    use operation_names as op;
    use OperationGroup::{Discovery, Linked, Virtual};
    use Requirement::{Optional, Required};
    &[
        OperationDescriptor::new(op::REPOSITORY_DISCOVERY, Discovery, Required),
        OperationDescriptor::new(op::SOURCE_CONFIG_DISCOVERY, Discovery, Required),
        OperationDescriptor::new(op::DIRECT_PRE_SNAPSHOT, Linked, Required),
        OperationDescriptor::new(op::DIRECT_POST_SNAPSHOT, Linked, Required),
        OperationDescriptor::new(op::STAGED_PRE_SNAPSHOT, Linked, Optional),
        OperationDescriptor::new(op::STAGED_POST_SNAPSHOT, Linked, Required),
        OperationDescriptor::new(op::START_STAGING, Linked, Optional),
        OperationDescriptor::new(op::STOP_STAGING, Linked, Optional),
        OperationDescriptor::new(op::STAGED_STATUS, Linked, Optional),
        OperationDescriptor::new(op::STAGED_WORKER, Linked, Optional),
        OperationDescriptor::new(op::STAGED_MOUNT_SPECIFICATION, Linked, Required),
        OperationDescriptor::new(op::CONFIGURE, Virtual, Required),
        OperationDescriptor::new(op::UNCONFIGURE, Virtual, Optional),
        OperationDescriptor::new(op::RECONFIGURE, Virtual, Required),
        OperationDescriptor::new(op::START, Virtual, Optional),
        OperationDescriptor::new(op::STOP, Virtual, Optional),
        OperationDescriptor::new(op::VIRTUAL_PRE_SNAPSHOT, Virtual, Optional),
        OperationDescriptor::new(op::VIRTUAL_POST_SNAPSHOT, Virtual, Required),
        OperationDescriptor::new(op::VIRTUAL_STATUS, Virtual, Optional),
        OperationDescriptor::new(op::INITIALIZE, Virtual, Required),
        OperationDescriptor::new(op::VIRTUAL_MOUNT_SPECIFICATION, Virtual, Required),
    ]
};

// ---------------------------------------------------------------------------
// Operation / OperationResponse
// ---------------------------------------------------------------------------

/// Generates the request and response envelopes from one list of
/// `Variant => name, Request, Response` rows.
macro_rules! operations {
    ($( $variant:ident => $name:expr, $request:ty, $response:ty; )*) => {
        /// A decoded request for one operation.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Operation {
            $( $variant($request), )*
        }

        /// The response to one [`Operation`].
        #[derive(Debug, Clone, PartialEq)]
        pub enum OperationResponse {
            $( $variant($response), )*
        }

        impl Operation {
            /// Host identifier of this operation.
            #[must_use]
            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => $name, )*
                }
            }

            /// Decode the request for the operation called `name`.
            ///
            /// # Errors
            ///
            /// Returns [`PluginError::UnknownOperation`] for a name missing
            /// from the table, or [`PluginError::Codec`] if the bytes do not
            /// decode into that operation's request.
            pub fn from_wire(
                name: &str,
                bytes: &[u8],
                format: WireFormat,
            ) -> Result<Self, PluginError> {
                $(
                    if name == $name {
                        return Ok(Self::$variant(format.decode(bytes)?));
                    }
                )*
                Err(PluginError::UnknownOperation { name: name.to_string() })
            }
        }

        impl OperationResponse {
            /// Host identifier of the operation this responds to.
            #[must_use]
            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => $name, )*
                }
            }

            /// Build the error-shaped response for the operation called `name`.
            ///
            /// # Errors
            ///
            /// Returns [`PluginError::UnknownOperation`] for a name missing
            /// from the table.
            pub fn from_error(name: &str, error: PluginErrorResult) -> Result<Self, PluginError> {
                $(
                    if name == $name {
                        return Ok(Self::$variant(PluginResponse::Error(error)));
                    }
                )*
                Err(PluginError::UnknownOperation { name: name.to_string() })
            }

            /// True when the response carries an error result.
            #[must_use]
            pub fn is_error(&self) -> bool {
                match self {
                    $( Self::$variant(response) => response.is_error(), )*
                }
            }

            /// Encode the response for the host.
            ///
            /// # Errors
            ///
            /// Returns [`CodecError`] if serialization fails.
            pub fn encode(&self, format: WireFormat) -> Result<Vec<u8>, CodecError> {
                match self {
                    $( Self::$variant(response) => format.encode(response), )*
                }
            }
        }
    };
}

operations! {
    RepositoryDiscovery => operation_names::REPOSITORY_DISCOVERY,
        RepositoryDiscoveryRequest, RepositoryDiscoveryResponse;
    SourceConfigDiscovery => operation_names::SOURCE_CONFIG_DISCOVERY,
        SourceConfigDiscoveryRequest, SourceConfigDiscoveryResponse;
    DirectPreSnapshot => operation_names::DIRECT_PRE_SNAPSHOT,
        DirectPreSnapshotRequest, DirectPreSnapshotResponse;
    DirectPostSnapshot => operation_names::DIRECT_POST_SNAPSHOT,
        DirectPostSnapshotRequest, DirectPostSnapshotResponse;
    StagedPreSnapshot => operation_names::STAGED_PRE_SNAPSHOT,
        StagedPreSnapshotRequest, StagedPreSnapshotResponse;
    StagedPostSnapshot => operation_names::STAGED_POST_SNAPSHOT,
        StagedPostSnapshotRequest, StagedPostSnapshotResponse;
    StartStaging => operation_names::START_STAGING,
        StartStagingRequest, StartStagingResponse;
    StopStaging => operation_names::STOP_STAGING,
        StopStagingRequest, StopStagingResponse;
    StagedStatus => operation_names::STAGED_STATUS,
        StagedStatusRequest, StagedStatusResponse;
    StagedWorker => operation_names::STAGED_WORKER,
        StagedWorkerRequest, StagedWorkerResponse;
    StagedMountSpecification => operation_names::STAGED_MOUNT_SPECIFICATION,
        StagedMountSpecRequest, StagedMountSpecResponse;
    Configure => operation_names::CONFIGURE,
        ConfigureRequest, ConfigureResponse;
    Unconfigure => operation_names::UNCONFIGURE,
        UnconfigureRequest, UnconfigureResponse;
    Reconfigure => operation_names::RECONFIGURE,
        ReconfigureRequest, ReconfigureResponse;
    Start => operation_names::START,
        StartRequest, StartResponse;
    Stop => operation_names::STOP,
        StopRequest, StopResponse;
    VirtualPreSnapshot => operation_names::VIRTUAL_PRE_SNAPSHOT,
        VirtualPreSnapshotRequest, VirtualPreSnapshotResponse;
    VirtualPostSnapshot => operation_names::VIRTUAL_POST_SNAPSHOT,
        VirtualPostSnapshotRequest, VirtualPostSnapshotResponse;
    VirtualStatus => operation_names::VIRTUAL_STATUS,
        VirtualStatusRequest, VirtualStatusResponse;
    Initialize => operation_names::INITIALIZE,
        InitializeRequest, InitializeResponse;
    VirtualMountSpecification => operation_names::VIRTUAL_MOUNT_SPECIFICATION,
        VirtualMountSpecRequest, VirtualMountSpecResponse;
}

impl Operation {
    /// The table row for this operation.
    #[must_use]
    pub fn descriptor(&self) -> Option<&'static OperationDescriptor> {
        OperationDescriptor::find(self.name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use dvp_core::messages::{StagedStatusResult, StartResult};
    use dvp_core::Status;

    use super::*;

    #[test]
    fn table_names_are_unique() {
        let names: HashSet<_> = OPERATIONS.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), OPERATIONS.len());
        assert_eq!(OPERATIONS.len(), 21);
    }

    #[test]
    fn group_sizes_match_registries() {
        let count = |group| OPERATIONS.iter().filter(|d| d.group == group).count();
        assert_eq!(count(OperationGroup::Discovery), 2);
        assert_eq!(count(OperationGroup::Linked), 9);
        assert_eq!(count(OperationGroup::Virtual), 10);
    }

    #[test]
    fn requirement_matrix() {
        let required = [
            operation_names::REPOSITORY_DISCOVERY,
            operation_names::SOURCE_CONFIG_DISCOVERY,
            operation_names::DIRECT_PRE_SNAPSHOT,
            operation_names::DIRECT_POST_SNAPSHOT,
            operation_names::STAGED_POST_SNAPSHOT,
            operation_names::STAGED_MOUNT_SPECIFICATION,
            operation_names::CONFIGURE,
            operation_names::RECONFIGURE,
            operation_names::VIRTUAL_POST_SNAPSHOT,
            operation_names::INITIALIZE,
            operation_names::VIRTUAL_MOUNT_SPECIFICATION,
        ];
        for descriptor in OPERATIONS {
            let expected = if required.contains(&descriptor.name) {
                Requirement::Required
            } else {
                Requirement::Optional
            };
            assert_eq!(descriptor.requirement, expected, "{}", descriptor.name);
        }
    }

    #[test]
    fn unknown_names_are_required() {
        assert!(OperationDescriptor::find("virtual.teleport").is_none());
        assert_eq!(
            OperationDescriptor::requirement_of("virtual.teleport"),
            Requirement::Required
        );
        assert!(OperationDescriptor::requirement_of(operation_names::START).is_optional());
    }

    #[test]
    fn from_wire_selects_variant_by_name() {
        let bytes = WireFormat::Json
            .encode(&StartRequest::default())
            .unwrap();
        let op = Operation::from_wire(operation_names::START, &bytes, WireFormat::Json).unwrap();
        assert!(matches!(op, Operation::Start(_)));
        assert_eq!(op.name(), "virtual.start");
        assert_eq!(op.descriptor().unwrap().group, OperationGroup::Virtual);
    }

    #[test]
    fn from_wire_rejects_unknown_name() {
        let err = Operation::from_wire("linked.teleport", b"{}", WireFormat::Json).unwrap_err();
        assert!(matches!(err, PluginError::UnknownOperation { name } if name == "linked.teleport"));
    }

    #[test]
    fn from_wire_surfaces_codec_errors() {
        let err =
            Operation::from_wire(operation_names::STOP, b"{oops", WireFormat::Json).unwrap_err();
        assert!(matches!(err, PluginError::Codec(_)));
    }

    #[test]
    fn error_response_matches_operation() {
        let response = OperationResponse::from_error(
            operation_names::STAGED_STATUS,
            PluginErrorResult {
                kind: "callback".into(),
                message: "boom".into(),
            },
        )
        .unwrap();
        assert_eq!(response.name(), operation_names::STAGED_STATUS);
        assert!(response.is_error());

        let ok = OperationResponse::StagedStatus(PluginResponse::ReturnValue(
            StagedStatusResult {
                status: Status::Active,
            },
        ));
        assert!(!ok.is_error());
    }

    #[test]
    fn response_encodes_host_shape() {
        let response = OperationResponse::Start(PluginResponse::ReturnValue(StartResult {}));
        let bytes = response.encode(WireFormat::Json).unwrap();
        assert_eq!(bytes, br#"{"return_value":{}}"#);
    }
}
