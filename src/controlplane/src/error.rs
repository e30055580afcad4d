//! Bootstrap error types
use crate::command::CommandError;
use crate::config::ConfigError;
use crate::kubeadm_init::BootstrapPhase;
use crate::propagate::CopyError;
use crate::select::NoControlPlaneNode;
use thiserror::Error;

/// Which orchestration step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    NoControlPlaneNode,
    InitFailed,
    PropagationFailed,
    TaintRemovalFailed,
    Cancelled,
}

/// Terminal error of a bootstrap run. Every variant is fatal; nothing is retried.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    NoControlPlaneNode(#[from] NoControlPlaneNode),

    #[error("failed to init node with kubeadm")]
    InitFailed(#[source] CommandError),

    #[error("failed to copy {path} to control-plane node {node}")]
    PropagationFailed {
        node: String,
        path: String,
        #[source]
        cause: CopyError,
    },

    #[error("failed to remove control-plane taint")]
    TaintRemovalFailed(#[source] CommandError),

    #[error("control-plane bootstrap cancelled while {phase}")]
    Cancelled { phase: BootstrapPhase },
}

impl BootstrapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BootstrapError::Config(_) => ErrorKind::Config,
            BootstrapError::NoControlPlaneNode(_) => ErrorKind::NoControlPlaneNode,
            BootstrapError::InitFailed(_) => ErrorKind::InitFailed,
            BootstrapError::PropagationFailed { .. } => ErrorKind::PropagationFailed,
            BootstrapError::TaintRemovalFailed(_) => ErrorKind::TaintRemovalFailed,
            BootstrapError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }
}

impl From<CopyError> for BootstrapError {
    fn from(cause: CopyError) -> Self {
        BootstrapError::PropagationFailed {
            node: cause.destination.clone(),
            path: cause.path.clone(),
            cause,
        }
    }
}
