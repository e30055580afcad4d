/// Node handle types
///
/// A node is any provisioned machine (container or VM) that can run a command.
/// Backends implement [`Node`]; this crate never creates or deletes nodes.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::command::CommandSpec;

/// Role a node plays in the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    /// Hosts the API server, controller manager, scheduler and etcd
    ControlPlane,
    /// Runs ordinary workloads
    Worker,
    /// Fronts the API servers of a multi control-plane cluster
    ExternalLoadBalancer,
}

impl NodeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::ControlPlane => "control-plane",
            NodeRole::Worker => "worker",
            NodeRole::ExternalLoadBalancer => "external-load-balancer",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node lifecycle is owned elsewhere; the bootstrap only needs identity, role and exec
#[async_trait]
pub trait Node: Send + Sync {
    /// Stable node name, used for addressing and for bootstrap node ordering
    fn name(&self) -> &str;

    /// Role of this node
    fn role(&self) -> NodeRole;

    /// Execute a command on the node, optionally feeding `stdin`.
    ///
    /// Returns `Err` only when the process could not be launched or the
    /// transport broke; a non-zero exit is reported through [`ExecResult`].
    async fn exec(&self, command: &CommandSpec, stdin: Option<&[u8]>)
        -> Result<ExecResult, NodeError>;
}

/// Shared node handle as handed over by the provisioner
pub type NodeRef = Arc<dyn Node>;

/// Execution result from a node command
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Exit code
    pub exit_code: i32,

    /// Standard output
    pub stdout: Vec<u8>,

    /// Standard error
    pub stderr: Vec<u8>,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Combined output as lines: stdout first, then stderr
    pub fn combined_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.stdout)
            .lines()
            .chain(String::from_utf8_lossy(&self.stderr).lines())
            .map(str::to_string)
            .collect()
    }
}

/// Transport-level node error
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("Node unreachable: {0}")]
    Unreachable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
