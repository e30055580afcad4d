/// Action seam - lets an external pipeline sequence the bootstrap among other actions
use crate::error::BootstrapError;
use crate::kubeadm_init::BootstrapPhase;
use crate::node::NodeRef;
use crate::status::{LogStatusReporter, StatusReporter};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One step of cluster creation
#[async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, ctx: &ActionContext) -> Result<(), BootstrapError>;
}

/// Everything one run needs: the node set, a status sink and an optional cancellation boundary
pub struct ActionContext {
    nodes: Vec<NodeRef>,
    status: Arc<dyn StatusReporter>,
    cancel: Option<CancellationToken>,
}

impl ActionContext {
    pub fn new(nodes: Vec<NodeRef>) -> Self {
        Self {
            nodes,
            status: Arc::new(LogStatusReporter),
            cancel: None,
        }
    }

    pub fn with_status(mut self, status: Arc<dyn StatusReporter>) -> Self {
        self.status = status;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn status(&self) -> &dyn StatusReporter {
        self.status.as_ref()
    }

    /// Await `fut` unless the run is cancelled first
    pub async fn until_cancelled<F>(
        &self,
        phase: BootstrapPhase,
        fut: F,
    ) -> Result<F::Output, BootstrapError>
    where
        F: Future,
    {
        let Some(token) = &self.cancel else {
            return Ok(fut.await);
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(BootstrapError::Cancelled { phase }),
            output = fut => Ok(output),
        }
    }
}
