// File: src/core/cluster.rs
use std::collections::HashSet;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::env::VariableStore;
use crate::core::error::ShellError;
use crate::core::types::Value;

pub const DEFAULT_SSH_PORT: u16 = 22;

/// One addressable member of the managed cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellNode {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub ssh_port: u16,
}

impl ShellNode {
    pub fn new(name: &str, address: &str, port: u16, ssh_port: Option<u16>) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            port,
            ssh_port: ssh_port.unwrap_or(DEFAULT_SSH_PORT),
        }
    }

    /// `address:port`, the identity the cluster API knows the node by.
    pub fn key(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl fmt::Display for ShellNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node[{}:{},ssh={}]", self.address, self.port, self.ssh_port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationMode {
    Multicast,
    FixedList,
    Provider,
}

impl NotificationMode {
    /// `FIXED_LIST` and `PROVIDER` are keywords; anything else is a multicast address.
    pub fn from_keyword(value: &str) -> Self {
        if value.eq_ignore_ascii_case("FIXED_LIST") {
            NotificationMode::FixedList
        } else if value.eq_ignore_ascii_case("PROVIDER") {
            NotificationMode::Provider
        } else {
            NotificationMode::Multicast
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            NotificationMode::Multicast => "MULTICAST",
            NotificationMode::FixedList => "FIXED_LIST",
            NotificationMode::Provider => "PROVIDER",
        }
    }
}

/// Where clients connect: a multicast address/port, a fixed member list or a provider URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Endpoint {
    Address { address: String, port: u16 },
    Member(String),
    Provider(String),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Address { address, port } => write!(f, "{}:{}", address, port),
            Endpoint::Member(member) => write!(f, "{}", member),
            Endpoint::Provider(url) => write!(f, "{}", url),
        }
    }
}

/// A named collection of nodes held under one session variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellCluster {
    pub variable: String,
    pub name: String,
    pub mode: NotificationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<Endpoint>,
    pub nodes: Vec<ShellNode>,
}

impl ShellCluster {
    pub fn new(variable: &str, name: &str, mode: NotificationMode) -> Self {
        Self {
            variable: variable.to_string(),
            name: name.to_string(),
            mode,
            transaction: None,
            sql: None,
            nodes: Vec::new(),
        }
    }

    /// Build the endpoint for `mode` from the two positional values of
    /// `setcluster`/`setclustersql`.
    pub fn endpoint(mode: NotificationMode, value1: &str, value2: &str) -> Result<Endpoint, ShellError> {
        match mode {
            NotificationMode::FixedList => Ok(Endpoint::Member(value2.to_string())),
            NotificationMode::Provider => Ok(Endpoint::Provider(value2.to_string())),
            NotificationMode::Multicast => {
                let port = value2.parse::<u16>()
                    .map_err(|_| ShellError::handler(format!("Port must be numeric: port=[{}]", value2)))?;
                Ok(Endpoint::Address { address: value1.to_string(), port })
            }
        }
    }

    /// No two members may share an address and port.
    pub fn check_nodes(&self) -> Result<(), ShellError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.key()) {
                return Err(ShellError::InvalidCluster {
                    cluster: self.variable.clone(),
                    reason: format!("node {} is defined more than once", node.key()),
                });
            }
        }
        Ok(())
    }

    /// Re-resolve every member against the current node variables.
    pub fn refresh_nodes(&self, vars: &VariableStore, check: bool) -> Result<ShellCluster, ShellError> {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            match vars.get(&node.name) {
                Some(Value::Node(current)) => nodes.push(current.clone()),
                _ => {
                    return Err(ShellError::InvalidCluster {
                        cluster: self.variable.clone(),
                        reason: format!("${} is not defined as a node variable", node.name),
                    });
                }
            }
        }

        let refreshed = ShellCluster { nodes, ..self.clone() };
        if check {
            refreshed.check_nodes()?;
        }
        Ok(refreshed)
    }

    pub fn contains(&self, node: &ShellNode) -> bool {
        self.nodes.iter().any(|n| n.key() == node.key())
    }
}

impl fmt::Display for ShellCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cluster[name={},mode={}", self.name, self.mode.keyword())?;
        if let Some(ref transaction) = self.transaction {
            write!(f, ",transaction={}", transaction)?;
        }
        if let Some(ref sql) = self.sql {
            write!(f, ",sql={}", sql)?;
        }
        let names: Vec<String> = self.nodes.iter().map(|n| format!("${}", n.name)).collect();
        write!(f, ",nodes=({})]", names.join(","))
    }
}
