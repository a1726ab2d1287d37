// File: src/core/local.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::core::api::{
    ApiError, ClusterApi, CombinedStatus, Credentials, QueryRequest, StatusSnapshot,
};
use crate::core::cluster::{ShellCluster, ShellNode};
use crate::core::watch::{status_watcher, Watcher};

/// In-process cluster backend.
///
/// Every mutation moves the node into a transitional status and schedules
/// the final one `settle` later, so waits behave like they do against real
/// nodes. Nodes are keyed by `address:port`.
#[derive(Clone)]
pub struct LocalCluster {
    nodes: Arc<Mutex<HashMap<String, NodeState>>>,
    settle: Duration,
    poll_interval: Duration,
}

#[derive(Debug, Clone)]
struct NodeState {
    status: CombinedStatus,
    cluster: Option<String>,
    pending: Option<Transition>,
    unreachable: bool,
    started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct Transition {
    to: CombinedStatus,
    cluster: Option<String>,
    ready_at: Instant,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            status: CombinedStatus::Stopped,
            cluster: None,
            pending: None,
            unreachable: false,
            started_at: None,
        }
    }
}

impl NodeState {
    fn settle(&mut self) {
        let due = matches!(self.pending, Some(ref t) if t.ready_at <= Instant::now());
        if !due {
            return;
        }
        if let Some(transition) = self.pending.take() {
            if transition.to == CombinedStatus::Started && self.status == CombinedStatus::Starting {
                self.started_at = Some(Utc::now());
            }
            if transition.to == CombinedStatus::Stopped {
                self.started_at = None;
            }
            self.status = transition.to;
            self.cluster = transition.cluster;
        }
    }

    fn begin(&mut self, via: CombinedStatus, to: CombinedStatus, cluster: Option<String>, settle: Duration) {
        self.status = via;
        self.pending = Some(Transition {
            to,
            cluster,
            ready_at: Instant::now() + settle,
        });
    }

    fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            cluster_name: self.cluster.clone(),
        }
    }
}

fn invalid(node: &ShellNode, operation: &'static str, status: CombinedStatus) -> ApiError {
    ApiError::InvalidState {
        node: node.key(),
        operation,
        status: status.label(),
    }
}

impl LocalCluster {
    pub fn new(settle: Duration, poll_interval: Duration) -> Self {
        Self {
            nodes: Arc::new(Mutex::new(HashMap::new())),
            settle,
            poll_interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, NodeState>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_node<R>(
        &self,
        node: &ShellNode,
        f: impl FnOnce(&mut NodeState) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let mut nodes = self.lock();
        let state = nodes.entry(node.key()).or_default();
        if state.unreachable {
            return Err(ApiError::Unreachable(node.key()));
        }
        state.settle();
        f(state)
    }

    fn watch(&self, node: &ShellNode, targets: Vec<CombinedStatus>) -> Box<dyn Watcher> {
        status_watcher(Arc::new(self.clone()), node.clone(), targets, self.poll_interval)
    }

    /// Make a node fail every request until cleared.
    pub fn set_unreachable(&self, key: &str, unreachable: bool) {
        self.lock().entry(key.to_string()).or_default().unreachable = unreachable;
    }

    /// Put a node straight into `status`, bypassing transitions.
    pub fn force_status(&self, node: &ShellNode, status: CombinedStatus, cluster: Option<&str>) {
        let mut nodes = self.lock();
        let state = nodes.entry(node.key()).or_default();
        state.status = status;
        state.cluster = cluster.map(str::to_string);
        state.pending = None;
    }

    fn servicing_members(&self, cluster: &ShellCluster) -> usize {
        cluster
            .nodes
            .iter()
            .filter(|node| {
                matches!(
                    self.get_status(node),
                    Ok(StatusSnapshot { status: CombinedStatus::Servicing, cluster_name: Some(ref name) })
                        if *name == cluster.name
                )
            })
            .count()
    }
}

impl ClusterApi for LocalCluster {
    fn get_status(&self, node: &ShellNode) -> Result<StatusSnapshot, ApiError> {
        self.with_node(node, |state| Ok(state.snapshot()))
    }

    fn start_node(&self, node: &ShellNode, _creds: &Credentials) -> Result<Box<dyn Watcher>, ApiError> {
        let settle = self.settle;
        self.with_node(node, |state| match state.status {
            CombinedStatus::Stopped => {
                state.begin(CombinedStatus::Starting, CombinedStatus::Started, None, settle);
                Ok(())
            }
            CombinedStatus::Starting => Ok(()),
            other => Err(invalid(node, "start", other)),
        })?;
        log::debug!("starting {}", node.key());
        Ok(self.watch(node, vec![CombinedStatus::Started, CombinedStatus::Servicing]))
    }

    fn stop_node(&self, node: &ShellNode, _creds: &Credentials, force: bool) -> Result<Box<dyn Watcher>, ApiError> {
        let settle = self.settle;
        self.with_node(node, |state| match state.status {
            CombinedStatus::Stopped | CombinedStatus::Stopping => Ok(()),
            CombinedStatus::Servicing | CombinedStatus::Joining if !force => {
                Err(invalid(node, "stop", state.status))
            }
            _ => {
                state.begin(CombinedStatus::Stopping, CombinedStatus::Stopped, None, settle);
                Ok(())
            }
        })?;
        log::debug!("stopping {} (force={})", node.key(), force);
        Ok(self.watch(node, vec![CombinedStatus::Stopped]))
    }

    fn start_cluster(&self, cluster: &ShellCluster, _creds: &Credentials) -> Result<Vec<Box<dyn Watcher>>, ApiError> {
        for node in &cluster.nodes {
            let snapshot = self.get_status(node)?;
            match snapshot.status {
                CombinedStatus::Started => {}
                CombinedStatus::Servicing if snapshot.cluster_name.as_deref() == Some(cluster.name.as_str()) => {}
                CombinedStatus::Servicing => {
                    return Err(ApiError::Rejected(format!(
                        "{} already belongs to cluster {}",
                        node.key(),
                        snapshot.cluster_name.unwrap_or_default()
                    )))
                }
                other => {
                    return Err(ApiError::Rejected(format!(
                        "{} is {}; start every node before starting the cluster",
                        node.key(),
                        other.label()
                    )))
                }
            }
        }

        let settle = self.settle;
        let mut watchers = Vec::with_capacity(cluster.nodes.len());
        for node in &cluster.nodes {
            let name = cluster.name.clone();
            self.with_node(node, |state| {
                if state.status == CombinedStatus::Started {
                    state.begin(CombinedStatus::Joining, CombinedStatus::Servicing, Some(name), settle);
                }
                Ok(())
            })?;
            watchers.push(self.watch(node, vec![CombinedStatus::Servicing]));
        }
        Ok(watchers)
    }

    fn stop_cluster(&self, cluster: &ShellCluster, _creds: &Credentials) -> Result<Vec<Box<dyn Watcher>>, ApiError> {
        let settle = self.settle;
        let mut watchers = Vec::with_capacity(cluster.nodes.len());
        for node in &cluster.nodes {
            self.with_node(node, |state| {
                if state.status == CombinedStatus::Servicing {
                    state.begin(CombinedStatus::Leaving, CombinedStatus::Started, None, settle);
                }
                Ok(())
            })?;
            watchers.push(self.watch(node, vec![CombinedStatus::Started, CombinedStatus::Stopped]));
        }
        Ok(watchers)
    }

    fn join_cluster(
        &self,
        cluster: &ShellCluster,
        node: &ShellNode,
        _creds: &Credentials,
    ) -> Result<Option<Box<dyn Watcher>>, ApiError> {
        let settle = self.settle;
        let joining = self.with_node(node, |state| match state.status {
            CombinedStatus::Servicing if state.cluster.as_deref() == Some(cluster.name.as_str()) => Ok(false),
            CombinedStatus::Servicing => Err(ApiError::Rejected(format!(
                "{} already belongs to cluster {}",
                node.key(),
                state.cluster.clone().unwrap_or_default()
            ))),
            CombinedStatus::Started => {
                state.begin(
                    CombinedStatus::Joining,
                    CombinedStatus::Servicing,
                    Some(cluster.name.clone()),
                    settle,
                );
                Ok(true)
            }
            CombinedStatus::Joining => Ok(true),
            other => Err(invalid(node, "join", other)),
        })?;

        Ok(joining.then(|| self.watch(node, vec![CombinedStatus::Servicing])))
    }

    fn leave_cluster(
        &self,
        node: &ShellNode,
        _creds: &Credentials,
        force: bool,
    ) -> Result<Option<Box<dyn Watcher>>, ApiError> {
        let snapshot = self.get_status(node)?;
        if snapshot.status == CombinedStatus::Started {
            return Ok(None);
        }
        if !force && snapshot.status == CombinedStatus::Servicing {
            let mut remaining = 0;
            for state in self.lock().values_mut() {
                state.settle();
                if state.status == CombinedStatus::Servicing && state.cluster == snapshot.cluster_name {
                    remaining += 1;
                }
            }
            if remaining <= 1 {
                return Err(ApiError::Rejected(format!(
                    "{} is the last member of cluster {}; use the force variant to leave anyway",
                    node.key(),
                    snapshot.cluster_name.unwrap_or_default()
                )));
            }
        }

        let settle = self.settle;
        self.with_node(node, |state| match state.status {
            CombinedStatus::Servicing | CombinedStatus::Joining => {
                state.begin(CombinedStatus::Leaving, CombinedStatus::Started, None, settle);
                Ok(())
            }
            CombinedStatus::Leaving => Ok(()),
            other => Err(invalid(node, "leave", other)),
        })?;
        Ok(Some(self.watch(node, vec![CombinedStatus::Started])))
    }

    fn append_cluster(
        &self,
        cluster: &ShellCluster,
        node: &ShellNode,
        _creds: &Credentials,
    ) -> Result<Box<dyn Watcher>, ApiError> {
        if self.servicing_members(cluster) == 0 {
            return Err(ApiError::Rejected(format!("cluster {} is not running", cluster.name)));
        }
        let settle = self.settle;
        self.with_node(node, |state| match state.status {
            CombinedStatus::Started => {
                state.begin(
                    CombinedStatus::Joining,
                    CombinedStatus::Servicing,
                    Some(cluster.name.clone()),
                    settle,
                );
                Ok(())
            }
            other => Err(invalid(node, "be appended", other)),
        })?;
        Ok(self.watch(node, vec![CombinedStatus::Servicing]))
    }

    fn stat(&self, node: &ShellNode, _creds: &Credentials) -> Result<serde_json::Value, ApiError> {
        self.with_node(node, |state| {
            Ok(json!({
                "address": node.address,
                "port": node.port,
                "status": state.status.label(),
                "clusterName": state.cluster,
                "startedAt": state.started_at.map(|t| t.to_rfc3339()),
                "checkedAt": Utc::now().to_rfc3339(),
            }))
        })
    }

    fn config(&self, node: &ShellNode, _creds: &Credentials) -> Result<serde_json::Value, ApiError> {
        self.with_node(node, |_| {
            Ok(json!({
                "address": node.address,
                "port": node.port,
                "sshPort": node.ssh_port,
            }))
        })
    }

    fn execute_query(&self, request: &QueryRequest<'_>, _creds: &Credentials) -> Result<serde_json::Value, ApiError> {
        if self.servicing_members(request.cluster) == 0 {
            return Err(ApiError::Rejected(format!(
                "cluster {} is not running",
                request.cluster.name
            )));
        }
        let mut result = json!({
            "database": request.database,
            "language": request.language,
            "query": request.text,
            "rows": [],
        });
        if let Some(container) = request.container {
            result["container"] = json!(container);
        }
        if request.count {
            result["count"] = json!(0);
        }
        Ok(result)
    }
}
