// File: src/core/api.rs
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::cluster::{ShellCluster, ShellNode};
use crate::core::watch::Watcher;

/// Node state as reported by the management endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombinedStatus {
    Stopped,
    Starting,
    /// Running but not a member of any cluster.
    Started,
    Joining,
    Servicing,
    Leaving,
    Stopping,
}

impl CombinedStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CombinedStatus::Stopped => "STOPPED",
            CombinedStatus::Starting => "STARTING",
            CombinedStatus::Started => "STARTED",
            CombinedStatus::Joining => "JOINING",
            CombinedStatus::Servicing => "SERVICING",
            CombinedStatus::Leaving => "LEAVING",
            CombinedStatus::Stopping => "STOPPING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub status: CombinedStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub os_password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryLanguage {
    Sql,
    Tql,
}

#[derive(Debug, Clone)]
pub struct QueryRequest<'a> {
    pub cluster: &'a ShellCluster,
    pub database: &'a str,
    pub language: QueryLanguage,
    pub container: Option<&'a str>,
    pub text: &'a str,
    pub count: bool,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Node is unreachable: {0}")]
    Unreachable(String),

    #[error("Node {node} cannot {operation} while {status}")]
    InvalidState {
        node: String,
        operation: &'static str,
        status: &'static str,
    },

    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// The cluster-management endpoint the shell orchestrates.
///
/// Mutations return the watchers that tell when the requested state is
/// reached; `None` means there is nothing to wait for.
pub trait ClusterApi: Send + Sync {
    fn get_status(&self, node: &ShellNode) -> Result<StatusSnapshot, ApiError>;

    fn start_node(&self, node: &ShellNode, creds: &Credentials) -> Result<Box<dyn Watcher>, ApiError>;

    fn stop_node(&self, node: &ShellNode, creds: &Credentials, force: bool) -> Result<Box<dyn Watcher>, ApiError>;

    fn start_cluster(&self, cluster: &ShellCluster, creds: &Credentials) -> Result<Vec<Box<dyn Watcher>>, ApiError>;

    fn stop_cluster(&self, cluster: &ShellCluster, creds: &Credentials) -> Result<Vec<Box<dyn Watcher>>, ApiError>;

    fn join_cluster(
        &self,
        cluster: &ShellCluster,
        node: &ShellNode,
        creds: &Credentials,
    ) -> Result<Option<Box<dyn Watcher>>, ApiError>;

    fn leave_cluster(
        &self,
        node: &ShellNode,
        creds: &Credentials,
        force: bool,
    ) -> Result<Option<Box<dyn Watcher>>, ApiError>;

    fn append_cluster(
        &self,
        cluster: &ShellCluster,
        node: &ShellNode,
        creds: &Credentials,
    ) -> Result<Box<dyn Watcher>, ApiError>;

    fn stat(&self, node: &ShellNode, creds: &Credentials) -> Result<serde_json::Value, ApiError>;

    fn config(&self, node: &ShellNode, creds: &Credentials) -> Result<serde_json::Value, ApiError>;

    fn execute_query(&self, request: &QueryRequest<'_>, creds: &Credentials) -> Result<serde_json::Value, ApiError>;
}
