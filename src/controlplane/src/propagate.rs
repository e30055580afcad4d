/// Artifact propagation - copies credentials produced by `kubeadm init` from the
/// bootstrap node to the secondary control-plane nodes.
use crate::command::{exec_checked, CommandError, CommandSpec};
use crate::node::{Node, NodeRef};
use std::fmt;
use std::path::Path;

/// Files every secondary control-plane node needs before it can join, in copy order
pub const ARTIFACT_FILES: &[&str] = &[
    // admin kubeconfig so any control plane can hand it out later
    "/etc/kubernetes/admin.conf",
    "/etc/kubernetes/pki/ca.crt",
    "/etc/kubernetes/pki/ca.key",
    "/etc/kubernetes/pki/front-proxy-ca.crt",
    "/etc/kubernetes/pki/front-proxy-ca.key",
    "/etc/kubernetes/pki/sa.pub",
    "/etc/kubernetes/pki/sa.key",
    // stacked etcd only
    "/etc/kubernetes/pki/etcd/ca.crt",
    "/etc/kubernetes/pki/etcd/ca.key",
];

/// Step of a node-to-node copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStage {
    /// `mkdir -p` of the parent directory on the destination
    CreateDirectory,
    /// `cat` of the file on the source
    ReadSource,
    /// `cp /dev/stdin` on the destination
    WriteDestination,
}

impl fmt::Display for CopyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CopyStage::CreateDirectory => "create destination directory",
            CopyStage::ReadSource => "read source file",
            CopyStage::WriteDestination => "write destination file",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to copy {path} from {source_node} to {destination}: could not {stage}")]
pub struct CopyError {
    pub source_node: String,
    pub destination: String,
    pub path: String,
    pub stage: CopyStage,
    #[source]
    pub cause: CommandError,
}

/// Copy `path` from `source` to the same path on `destination`
pub async fn copy_node_to_node(
    source: &dyn Node,
    destination: &dyn Node,
    path: &str,
) -> Result<(), CopyError> {
    let fail = move |stage: CopyStage| {
        move |cause: CommandError| CopyError {
            source_node: source.name().to_string(),
            destination: destination.name().to_string(),
            path: path.to_string(),
            stage,
            cause,
        }
    };

    let dir = Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "/".to_string());

    exec_checked(
        destination,
        &CommandSpec::new("mkdir").args(["-p", dir.as_str()]),
        None,
    )
    .await
    .map_err(fail(CopyStage::CreateDirectory))?;

    // files are small (certs and a kubeconfig); buffer rather than stream
    let contents = exec_checked(source, &CommandSpec::new("cat").arg(path), None)
        .await
        .map_err(fail(CopyStage::ReadSource))?
        .stdout;

    exec_checked(
        destination,
        &CommandSpec::new("cp").args(["/dev/stdin", path]),
        Some(contents.as_slice()),
    )
    .await
    .map_err(fail(CopyStage::WriteDestination))?;

    tracing::debug!(
        "[Propagate] Copied {} ({} bytes) {} -> {}",
        path,
        contents.len(),
        source.name(),
        destination.name()
    );

    Ok(())
}

/// Copy every file in `files` to every secondary, secondaries outer and files inner.
///
/// Stops at the first failure; the destination keeps whatever prefix was already copied.
/// Returns the number of files copied.
pub async fn propagate_artifacts(
    bootstrap: &dyn Node,
    secondaries: &[NodeRef],
    files: &[&str],
) -> Result<usize, CopyError> {
    let mut copied = 0;
    for secondary in secondaries {
        tracing::info!(
            "[Propagate] Copying {} artifacts {} -> {}",
            files.len(),
            bootstrap.name(),
            secondary.name()
        );
        for file in files {
            copy_node_to_node(bootstrap, secondary.as_ref(), file).await?;
            copied += 1;
        }
    }
    Ok(copied)
}
