//! Discovery requests and responses.

use serde::{Deserialize, Serialize};

use super::common::{RemoteConnection, Repository, SourceConfig};
use super::PluginResponse;

/// Enumerate the repositories installed on an environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryDiscoveryRequest {
    pub source_connection: RemoteConnection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryDiscoveryResult {
    pub repositories: Vec<Repository>,
}

pub type RepositoryDiscoveryResponse = PluginResponse<RepositoryDiscoveryResult>;

/// Enumerate the source configs inside one discovered repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfigDiscoveryRequest {
    pub source_connection: RemoteConnection,
    pub repository: Repository,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfigDiscoveryResult {
    pub source_configs: Vec<SourceConfig>,
}

pub type SourceConfigDiscoveryResponse = PluginResponse<SourceConfigDiscoveryResult>;
