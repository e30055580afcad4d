/// Command runner - executes a single command on a node and captures its output
use crate::node::{ExecResult, Node, NodeError};
use std::fmt;

/// A program plus its ordered arguments, built per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Full argv, program first
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Output of a successful command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    /// Combined output, stdout lines followed by stderr lines
    pub lines: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command `{command}` could not be launched on node {node}: {source}")]
    Launch {
        node: String,
        command: String,
        #[source]
        source: NodeError,
    },

    #[error("command `{command}` failed on node {node} with exit code {exit_code}")]
    Failed {
        node: String,
        command: String,
        exit_code: i32,
        output: Vec<String>,
    },
}

impl CommandError {
    /// Captured output lines, empty when the process never started
    pub fn output(&self) -> &[String] {
        match self {
            CommandError::Launch { .. } => &[],
            CommandError::Failed { output, .. } => output,
        }
    }

    pub fn node(&self) -> &str {
        match self {
            CommandError::Launch { node, .. } | CommandError::Failed { node, .. } => node,
        }
    }
}

/// Execute `command` on `node` and fail on a non-zero exit, keeping raw output
pub async fn exec_checked(
    node: &dyn Node,
    command: &CommandSpec,
    stdin: Option<&[u8]>,
) -> Result<ExecResult, CommandError> {
    tracing::debug!("[CommandRunner] {} $ {}", node.name(), command);

    let result = node
        .exec(command, stdin)
        .await
        .map_err(|source| CommandError::Launch {
            node: node.name().to_string(),
            command: command.to_string(),
            source,
        })?;

    if !result.success() {
        return Err(CommandError::Failed {
            node: node.name().to_string(),
            command: command.to_string(),
            exit_code: result.exit_code,
            output: result.combined_lines(),
        });
    }

    Ok(result)
}

/// Run `command` once on `node`, capturing combined output lines.
///
/// No retries; a failed command surfaces its output through [`CommandError::output`].
pub async fn run_command(
    node: &dyn Node,
    command: &CommandSpec,
) -> Result<CommandOutput, CommandError> {
    let start = std::time::Instant::now();
    let result = exec_checked(node, command, None).await;
    let elapsed = start.elapsed();

    match result {
        Ok(result) => {
            tracing::debug!(
                "[TIMING] `{}` on {} completed in {}ms",
                command.program,
                node.name(),
                elapsed.as_millis()
            );
            Ok(CommandOutput {
                exit_code: result.exit_code,
                lines: result.combined_lines(),
            })
        }
        Err(e) => {
            tracing::warn!(
                "[TIMING] `{}` on {} failed after {}ms",
                command.program,
                node.name(),
                elapsed.as_millis()
            );
            Err(e)
        }
    }
}
