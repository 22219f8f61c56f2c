use std::path::Path;
use std::process::Stdio;

use crate::tool::ToolError;

/// Exit status and captured output of one external tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Abstraction over external tool execution for testability.
///
/// Implementations report the exit status instead of failing on a nonzero
/// one; only a tool that cannot be launched is an `Err`. Production code
/// uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ToolExecutor: Send + Sync {
    /// Run `program` in `cwd` and capture stdout and stderr.
    async fn exec(&self, program: &str, args: &[String], cwd: &Path)
    -> Result<ToolOutput, ToolError>;

    /// Run `program` in `cwd`, streaming its output to the terminal.
    ///
    /// The returned `stdout`/`stderr` are empty.
    async fn exec_streaming(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<ToolOutput, ToolError>;
}

/// Executor that spawns real processes.
pub struct RealExecutor;

impl ToolExecutor for RealExecutor {
    async fn exec(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<ToolOutput, ToolError> {
        tracing::debug!(program, ?args, cwd = %cwd.display(), "exec");

        let output = tokio::process::Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ToolError::Launch {
                program: program.to_owned(),
                source: e,
            })?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn exec_streaming(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<ToolOutput, ToolError> {
        tracing::debug!(program, ?args, cwd = %cwd.display(), "exec (streaming)");

        let status = tokio::process::Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ToolError::Launch {
                program: program.to_owned(),
                source: e,
            })?;

        Ok(ToolOutput {
            code: status.code(),
            ..ToolOutput::default()
        })
    }
}
