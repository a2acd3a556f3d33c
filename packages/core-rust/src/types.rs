//! Request-scoped views handed to plugin callbacks.
//!
//! A view pairs the identifiers and descriptors of a wire record with the
//! plugin's own typed definition, decoded from the record's
//! [`PluginDefinedObject`](crate::messages::PluginDefinedObject). Views are
//! built fresh for every dispatch and owned by the callback that receives them.

use serde::{Deserialize, Serialize};

use crate::definition::{Definition, DefinitionError};
use crate::messages::common::{
    self, OwnershipSpec, RemoteConnection, RemoteEnvironment, SingleEntireMount, SingleSubsetMount,
};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Whether a staged or virtual source is running.
///
/// Variant names are `SCREAMING_CASE` on the wire to match the host enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Reported when a plugin does not implement a status operation.
    #[default]
    Active,
    Inactive,
}

// ---------------------------------------------------------------------------
// Mounts
// ---------------------------------------------------------------------------

/// A filesystem mount on a remote environment.
///
/// Equality is by field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub remote_environment: RemoteEnvironment,
    pub mount_path: String,
    pub shared_path: Option<String>,
}

impl Mount {
    #[must_use]
    pub fn new(remote_environment: RemoteEnvironment, mount_path: impl Into<String>) -> Self {
        Self {
            remote_environment,
            mount_path: mount_path.into(),
            shared_path: None,
        }
    }

    /// Mount only `shared_path` inside the dataset rather than all of it.
    #[must_use]
    pub fn with_shared_path(mut self, shared_path: impl Into<String>) -> Self {
        self.shared_path = Some(shared_path.into());
        self
    }

    /// True when a non-empty shared path is set. The wire treats `""` as unset.
    #[must_use]
    pub fn has_shared_path(&self) -> bool {
        self.shared_path.as_deref().is_some_and(|path| !path.is_empty())
    }
}

impl From<SingleEntireMount> for Mount {
    fn from(mount: SingleEntireMount) -> Self {
        Self {
            remote_environment: mount.remote_environment,
            mount_path: mount.mount_path,
            shared_path: mount.shared_path,
        }
    }
}

impl From<Mount> for SingleEntireMount {
    fn from(mount: Mount) -> Self {
        Self {
            remote_environment: mount.remote_environment,
            mount_path: mount.mount_path,
            shared_path: mount.shared_path,
        }
    }
}

impl From<Mount> for SingleSubsetMount {
    /// Rebuilds the environment and host descriptor field by field; the
    /// shared path is only carried when non-empty.
    fn from(mount: Mount) -> Self {
        let shared_path = if mount.has_shared_path() {
            mount.shared_path
        } else {
            None
        };
        let environment = mount.remote_environment;
        Self {
            remote_environment: RemoteEnvironment {
                name: environment.name,
                reference: environment.reference,
                host: common::RemoteHost {
                    name: environment.host.name,
                    reference: environment.host.reference,
                    binary_path: environment.host.binary_path,
                    scratch_path: environment.host.scratch_path,
                },
            },
            mount_path: mount.mount_path,
            shared_path,
        }
    }
}

/// Owner (uid, gid) applied to mounted files. Equality is by field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnershipSpecification {
    pub uid: i32,
    pub gid: i32,
}

impl OwnershipSpecification {
    #[must_use]
    pub fn new(uid: i32, gid: i32) -> Self {
        Self { uid, gid }
    }
}

impl From<OwnershipSpecification> for OwnershipSpec {
    fn from(spec: OwnershipSpecification) -> Self {
        Self {
            uid: spec.uid,
            gid: spec.gid,
        }
    }
}

/// Mounts (and optional ownership) returned by a mount-specification callback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MountSpecification {
    pub mounts: Vec<Mount>,
    pub ownership_specification: Option<OwnershipSpecification>,
}

impl MountSpecification {
    #[must_use]
    pub fn new(mounts: Vec<Mount>) -> Self {
        Self {
            mounts,
            ownership_specification: None,
        }
    }

    #[must_use]
    pub fn with_ownership(mut self, ownership: OwnershipSpecification) -> Self {
        self.ownership_specification = Some(ownership);
        self
    }
}

// ---------------------------------------------------------------------------
// Source views
// ---------------------------------------------------------------------------

/// A directly connected linked source with its decoded parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectSource<L> {
    pub guid: String,
    pub connection: RemoteConnection,
    pub parameters: L,
}

impl<L: Definition> DirectSource<L> {
    /// Build the view from its wire record.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the linked source parameters do not
    /// decode into `L`.
    pub fn from_wire(source: common::DirectSource) -> Result<Self, DefinitionError> {
        Ok(Self {
            parameters: source.linked_source.parameters.decode()?,
            guid: source.linked_source.guid,
            connection: source.connection,
        })
    }
}

/// A staged linked source with its decoded parameters and staging mount.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedSource<L> {
    pub guid: String,
    pub connection: RemoteConnection,
    pub parameters: L,
    pub mount: Mount,
}

impl<L: Definition> StagedSource<L> {
    /// Build the view from its wire record.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the linked source parameters do not
    /// decode into `L`.
    pub fn from_wire(source: common::StagedSource) -> Result<Self, DefinitionError> {
        Ok(Self {
            parameters: source.linked_source.parameters.decode()?,
            guid: source.linked_source.guid,
            connection: source.connection,
            mount: source.staged_mount.into(),
        })
    }
}

/// Either linking variant, as seen by the shared pre/post snapshot callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkedSource<L> {
    Direct(DirectSource<L>),
    Staged(StagedSource<L>),
}

impl<L> LinkedSource<L> {
    #[must_use]
    pub fn guid(&self) -> &str {
        match self {
            Self::Direct(source) => &source.guid,
            Self::Staged(source) => &source.guid,
        }
    }

    #[must_use]
    pub fn connection(&self) -> &RemoteConnection {
        match self {
            Self::Direct(source) => &source.connection,
            Self::Staged(source) => &source.connection,
        }
    }

    #[must_use]
    pub fn parameters(&self) -> &L {
        match self {
            Self::Direct(source) => &source.parameters,
            Self::Staged(source) => &source.parameters,
        }
    }

    /// The staging mount; `None` for a direct source.
    #[must_use]
    pub fn mount(&self) -> Option<&Mount> {
        match self {
            Self::Direct(_) => None,
            Self::Staged(source) => Some(&source.mount),
        }
    }
}

/// A provisioned virtual copy with its decoded parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualSource<V> {
    pub guid: String,
    pub connection: RemoteConnection,
    pub parameters: V,
}

impl<V: Definition> VirtualSource<V> {
    /// Build the view from its wire record.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the virtual source parameters do not
    /// decode into `V`.
    pub fn from_wire(source: common::VirtualSource) -> Result<Self, DefinitionError> {
        Ok(Self {
            parameters: source.parameters.decode()?,
            guid: source.guid,
            connection: source.connection,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::messages::common::{LinkedSource as WireLinkedSource, PluginDefinedObject, RemoteHost};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Params {
        port: u16,
    }

    fn environment() -> RemoteEnvironment {
        RemoteEnvironment {
            name: "staging".into(),
            reference: "ENV-1".into(),
            host: RemoteHost {
                name: "db01".into(),
                reference: "HOST-1".into(),
                binary_path: "/opt/bin".into(),
                scratch_path: "/var/scratch".into(),
            },
        }
    }

    fn wire_linked(json: &str) -> WireLinkedSource {
        WireLinkedSource {
            guid: "ls-1".into(),
            parameters: PluginDefinedObject { json: json.into() },
        }
    }

    #[test]
    fn staged_source_from_wire_copies_mount() {
        let wire = common::StagedSource {
            linked_source: wire_linked(r#"{"port": 5432}"#),
            connection: RemoteConnection::default(),
            staged_mount: SingleEntireMount {
                remote_environment: environment(),
                mount_path: "/mnt/staging".into(),
                shared_path: None,
            },
        };

        let source = StagedSource::<Params>::from_wire(wire).unwrap();
        assert_eq!(source.guid, "ls-1");
        assert_eq!(source.parameters, Params { port: 5432 });
        assert_eq!(source.mount, Mount::new(environment(), "/mnt/staging"));
    }

    #[test]
    fn direct_source_rejects_malformed_parameters() {
        let wire = common::DirectSource {
            connection: RemoteConnection::default(),
            linked_source: wire_linked("not json"),
        };
        assert!(DirectSource::<Params>::from_wire(wire).is_err());
    }

    #[test]
    fn linked_source_accessors() {
        let direct = LinkedSource::Direct(DirectSource {
            guid: "d".into(),
            connection: RemoteConnection::default(),
            parameters: Params { port: 1 },
        });
        assert_eq!(direct.guid(), "d");
        assert_eq!(direct.parameters().port, 1);
        assert!(direct.mount().is_none());

        let staged = LinkedSource::Staged(StagedSource {
            guid: "s".into(),
            connection: RemoteConnection::default(),
            parameters: Params { port: 2 },
            mount: Mount::new(environment(), "/mnt"),
        });
        assert_eq!(staged.mount().unwrap().mount_path, "/mnt");
    }

    #[test]
    fn subset_mount_keeps_full_host_descriptor() {
        let mount = Mount::new(environment(), "/mnt/vdb").with_shared_path("data");
        let wire = SingleSubsetMount::from(mount);
        assert_eq!(wire.remote_environment, environment());
        assert_eq!(wire.remote_environment.host.scratch_path, "/var/scratch");
        assert_eq!(wire.shared_path.as_deref(), Some("data"));
    }

    #[test]
    fn empty_shared_path_is_dropped_on_subset_mount() {
        let mount = Mount::new(environment(), "/mnt/vdb").with_shared_path("");
        assert!(!mount.has_shared_path());
        assert!(SingleSubsetMount::from(mount).shared_path.is_none());
    }

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(Status::default(), Status::Active);
        assert_eq!(serde_json::to_string(&Status::Active).unwrap(), "\"ACTIVE\"");
    }

    #[test]
    fn ownership_converts_to_wire() {
        let wire = OwnershipSpec::from(OwnershipSpecification::new(1001, 1002));
        assert_eq!(wire, OwnershipSpec { uid: 1001, gid: 1002 });
    }
}
