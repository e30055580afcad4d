/// Node selection - picks the bootstrap control-plane node and its secondaries
use crate::node::{NodeRef, NodeRole};

/// No node in the set carries the control-plane role
#[derive(Debug, Clone, thiserror::Error)]
#[error("expected at least one control-plane node, found none among {total} nodes")]
pub struct NoControlPlaneNode {
    pub total: usize,
}

/// Result of node selection for one bootstrap run
#[derive(Clone)]
pub struct ControlPlaneSelection {
    /// Node that runs `kubeadm init`
    pub bootstrap: NodeRef,
    /// Remaining control-plane nodes, in name order
    pub secondaries: Vec<NodeRef>,
}

impl ControlPlaneSelection {
    pub fn bootstrap_name(&self) -> &str {
        self.bootstrap.name()
    }

    pub fn secondary_names(&self) -> Vec<String> {
        self.secondaries.iter().map(|n| n.name().to_string()).collect()
    }
}

impl std::fmt::Debug for ControlPlaneSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPlaneSelection")
            .field("bootstrap", &self.bootstrap_name())
            .field("secondaries", &self.secondary_names())
            .finish()
    }
}

/// All control-plane nodes, sorted by name
pub fn control_plane_nodes(nodes: &[NodeRef]) -> Vec<NodeRef> {
    let mut control_planes: Vec<NodeRef> = nodes
        .iter()
        .filter(|n| n.role() == NodeRole::ControlPlane)
        .cloned()
        .collect();
    control_planes.sort_by(|a, b| a.name().cmp(b.name()));
    control_planes
}

/// Select the bootstrap node (first control-plane node by name) and the secondaries.
///
/// Pure function of the node set: the same set always yields the same bootstrap node,
/// whatever order the provisioner handed the nodes over in.
pub fn select_control_plane(nodes: &[NodeRef]) -> Result<ControlPlaneSelection, NoControlPlaneNode> {
    let mut control_planes = control_plane_nodes(nodes).into_iter();
    let bootstrap = control_planes
        .next()
        .ok_or(NoControlPlaneNode { total: nodes.len() })?;

    Ok(ControlPlaneSelection {
        bootstrap,
        secondaries: control_planes.collect(),
    })
}
