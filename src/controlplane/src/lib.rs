//! Control-plane bootstrap
//!
//! Runs `kubeadm init` on the bootstrap control-plane node of an already provisioned
//! cluster, copies the generated credentials to the other control-plane nodes and
//! removes the control-plane taint on single-node clusters.
//! Node creation and the command transport are provided by the caller through [`Node`].

pub mod action;
pub mod command;
pub mod config;
pub mod error;
pub mod kubeadm_init;
pub mod node;
pub mod propagate;
pub mod select;
pub mod status;

pub use action::{Action, ActionContext};
pub use command::{exec_checked, run_command, CommandError, CommandOutput, CommandSpec};
pub use config::{ConfigError, KubeadmInitConfig};
pub use error::{BootstrapError, ErrorKind};
pub use kubeadm_init::{
    kubeadm_init_command, taint_removal_command, BootstrapPhase, BootstrapReport,
    KubeadmInitAction, ADMIN_KUBECONFIG_PATH, KUBEADM_CONFIG_PATH,
};
pub use node::{ExecResult, Node, NodeError, NodeRef, NodeRole};
pub use propagate::{copy_node_to_node, propagate_artifacts, CopyError, CopyStage, ARTIFACT_FILES};
pub use select::{control_plane_nodes, select_control_plane, ControlPlaneSelection, NoControlPlaneNode};
pub use status::{ChannelStatusReporter, LogStatusReporter, StatusEvent, StatusGuard, StatusReporter};
