//! Records shared by every operation's request and response.
//!
//! Field names follow the host schema exactly (snake_case). Every struct is
//! `#[serde(default)]` so a request that omits a field decodes to the same
//! empty value the host's schema would supply.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Plugin-defined payloads
// ---------------------------------------------------------------------------

/// A plugin-defined object carried as a JSON-object-shaped string.
///
/// The platform never looks inside `json`; the plugin's own definition types
/// give it meaning (see [`crate::definition`]).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginDefinedObject {
    pub json: String,
}

/// A discovered repository (an installation of the data platform on a host).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub parameters: PluginDefinedObject,
}

/// A source config (one data source inside a repository).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub parameters: PluginDefinedObject,
}

/// Snapshot metadata produced after a snapshot is taken.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub parameters: PluginDefinedObject,
}

// ---------------------------------------------------------------------------
// Environment descriptors (passed through verbatim)
// ---------------------------------------------------------------------------

/// A host inside a remote environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteHost {
    pub name: String,
    pub reference: String,
    pub binary_path: String,
    pub scratch_path: String,
}

/// An environment registered with the platform.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteEnvironment {
    pub name: String,
    pub reference: String,
    pub host: RemoteHost,
}

/// An environment user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteUser {
    pub name: String,
    pub reference: String,
}

/// Environment plus the user commands run as.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConnection {
    pub environment: RemoteEnvironment,
    pub user: RemoteUser,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Identity and parameters of a linked (dSource) source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedSource {
    pub guid: String,
    pub parameters: PluginDefinedObject,
}

/// A linked source that is reached over a direct connection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectSource {
    pub connection: RemoteConnection,
    pub linked_source: LinkedSource,
}

/// A linked source that is ingested through a staging mount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedSource {
    pub linked_source: LinkedSource,
    pub connection: RemoteConnection,
    pub staged_mount: SingleEntireMount,
}

/// A provisioned virtual copy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualSource {
    pub guid: String,
    pub connection: RemoteConnection,
    pub parameters: PluginDefinedObject,
}

// ---------------------------------------------------------------------------
// Mounts
// ---------------------------------------------------------------------------

/// A mount of an entire dataset, used by staged linked sources.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleEntireMount {
    pub remote_environment: RemoteEnvironment,
    pub mount_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_path: Option<String>,
}

/// A mount of a dataset or a subset of it, used by virtual sources.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleSubsetMount {
    pub remote_environment: RemoteEnvironment,
    pub mount_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_path: Option<String>,
}

/// Owner applied to mounted files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnershipSpec {
    pub uid: i32,
    pub gid: i32,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error result returned in place of an operation's `return_value`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginErrorResult {
    /// Stable identifier of the failure class (e.g. `"unimplemented_operation"`).
    pub kind: String,
    /// Human-readable description.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
