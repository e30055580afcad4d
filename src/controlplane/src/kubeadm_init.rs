/// kubeadm init action - bootstraps the control plane on the first control-plane node,
/// hands its credentials to the other control-plane nodes and untaints single-node clusters.
use crate::action::{Action, ActionContext};
use crate::command::{run_command, CommandSpec};
use crate::config::KubeadmInitConfig;
use crate::error::BootstrapError;
use crate::propagate::{propagate_artifacts, ARTIFACT_FILES};
use crate::select::select_control_plane;
use crate::status::StatusGuard;
use async_trait::async_trait;
use std::fmt;

/// kubeadm config written by the config generation step
pub const KUBEADM_CONFIG_PATH: &str = "/kind/kubeadm.conf";

/// Admin kubeconfig produced by `kubeadm init`
pub const ADMIN_KUBECONFIG_PATH: &str = "/etc/kubernetes/admin.conf";

/// Orchestration state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    Init,
    Initializing,
    Propagating,
    PostAdjusting,
    Done,
    Aborted,
}

impl fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BootstrapPhase::Init => "selecting nodes",
            BootstrapPhase::Initializing => "running kubeadm init",
            BootstrapPhase::Propagating => "propagating control-plane artifacts",
            BootstrapPhase::PostAdjusting => "removing control-plane taint",
            BootstrapPhase::Done => "done",
            BootstrapPhase::Aborted => "aborted",
        })
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub bootstrap_node: String,
    pub secondary_nodes: Vec<String>,
    pub artifacts_copied: usize,
    pub taint_removed: bool,
}

/// `kubeadm init` with the fixed argument set
pub fn kubeadm_init_command() -> CommandSpec {
    CommandSpec::new("kubeadm")
        .arg("init")
        // preflight checks have side effects and say nothing useful on managed nodes
        .arg("--skip-phases=preflight")
        .arg(format!("--config={}", KUBEADM_CONFIG_PATH))
        .arg("--skip-token-print")
        .arg("--v=6")
}

/// `kubectl taint nodes --all <taint>-` for each taint, using the admin kubeconfig
pub fn taint_removal_command(taints: &[String]) -> CommandSpec {
    CommandSpec::new("kubectl")
        .arg(format!("--kubeconfig={}", ADMIN_KUBECONFIG_PATH))
        .args(["taint", "nodes", "--all"])
        .args(taints.iter().map(|t| format!("{}-", t)))
}

fn log_failure_output(lines: &[String]) {
    if !lines.is_empty() {
        tracing::error!("{}", lines.join("\n"));
    }
}

struct PhaseTracker {
    phase: BootstrapPhase,
}

impl PhaseTracker {
    fn advance(&mut self, next: BootstrapPhase) {
        tracing::debug!("[KubeadmInit] {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

/// The control-plane bootstrap action
#[derive(Debug, Clone, Default)]
pub struct KubeadmInitAction {
    config: KubeadmInitConfig,
}

impl KubeadmInitAction {
    pub fn new(config: KubeadmInitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KubeadmInitConfig {
        &self.config
    }

    /// Run the bootstrap protocol once against `ctx.nodes()`.
    ///
    /// An invalid config is rejected before any command or status signal is issued.
    /// Fail-fast: the first failing step aborts the run and nothing is rolled back.
    /// The status reporter sees exactly one `start` and one `end`.
    pub async fn run(&self, ctx: &ActionContext) -> Result<BootstrapReport, BootstrapError> {
        // reject a bad config before kubeadm init makes the run irreversible
        self.config.validate()?;

        let status = StatusGuard::start(ctx.status(), &self.config.status_message);
        let mut tracker = PhaseTracker {
            phase: BootstrapPhase::Init,
        };

        let start = std::time::Instant::now();
        let result = self.bootstrap(ctx, &mut tracker).await;

        match &result {
            Ok(report) => {
                tracing::info!(
                    "[TIMING] Control plane on {} ready in {}ms",
                    report.bootstrap_node,
                    start.elapsed().as_millis()
                );
                status.succeed();
            }
            Err(e) => {
                tracing::error!(
                    "[KubeadmInit] Aborted while {} after {}ms: {}",
                    tracker.phase,
                    start.elapsed().as_millis(),
                    e
                );
                tracker.advance(BootstrapPhase::Aborted);
            }
        }

        result
    }

    async fn bootstrap(
        &self,
        ctx: &ActionContext,
        tracker: &mut PhaseTracker,
    ) -> Result<BootstrapReport, BootstrapError> {
        let nodes = ctx.nodes();
        let selection = select_control_plane(nodes)?;
        let bootstrap = selection.bootstrap.as_ref();

        tracing::info!(
            "[KubeadmInit] Bootstrap node {}, {} secondary control-plane node(s), {} node(s) total",
            bootstrap.name(),
            selection.secondaries.len(),
            nodes.len()
        );

        tracker.advance(BootstrapPhase::Initializing);
        let init = kubeadm_init_command();
        match ctx
            .until_cancelled(tracker.phase, run_command(bootstrap, &init))
            .await?
        {
            Ok(output) => {
                tracing::debug!("{}", output.lines.join("\n"));
            }
            Err(e) => {
                log_failure_output(e.output());
                return Err(BootstrapError::InitFailed(e));
            }
        }

        tracker.advance(BootstrapPhase::Propagating);
        let artifacts_copied = match ctx
            .until_cancelled(
                tracker.phase,
                propagate_artifacts(bootstrap, &selection.secondaries, ARTIFACT_FILES),
            )
            .await?
        {
            Ok(copied) => copied,
            Err(e) => {
                log_failure_output(e.cause.output());
                return Err(e.into());
            }
        };

        tracker.advance(BootstrapPhase::PostAdjusting);
        // only a lone node has to schedule workloads on the control plane
        let taint_removed = if nodes.len() == 1 {
            let untaint = taint_removal_command(&self.config.control_plane_taints);
            ctx.until_cancelled(tracker.phase, run_command(bootstrap, &untaint))
                .await?
                .map_err(|e| {
                    log_failure_output(e.output());
                    BootstrapError::TaintRemovalFailed(e)
                })?;
            true
        } else {
            false
        };

        tracker.advance(BootstrapPhase::Done);
        Ok(BootstrapReport {
            bootstrap_node: bootstrap.name().to_string(),
            secondary_nodes: selection.secondary_names(),
            artifacts_copied,
            taint_removed,
        })
    }
}

#[async_trait]
impl Action for KubeadmInitAction {
    fn name(&self) -> &str {
        "kubeadm-init"
    }

    async fn execute(&self, ctx: &ActionContext) -> Result<(), BootstrapError> {
        self.run(ctx).await.map(|_| ())
    }
}
