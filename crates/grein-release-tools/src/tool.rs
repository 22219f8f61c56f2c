use crate::executor::ToolOutput;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to launch `{program}`: is it installed and on PATH?")]
    Launch {
        program: String,
        source: std::io::Error,
    },

    /// `stderr` is only filled when output was captured; it is logged, not
    /// part of the message.
    #[error("`{program} {}` {}", args.join(" "), exit_label(*code))]
    Failed {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },
}

impl ToolError {
    /// Turn a finished run into `Ok` on exit code 0, `Failed` otherwise.
    pub fn check(program: &str, args: &[String], output: ToolOutput) -> Result<ToolOutput, Self> {
        if output.success() {
            Ok(output)
        } else {
            let stderr = output.stderr.trim();
            if !stderr.is_empty() {
                tracing::error!(program, code = ?output.code, stderr, "tool output");
            }
            Err(Self::Failed {
                program: program.to_owned(),
                args: args.to_vec(),
                code: output.code,
                stderr: output.stderr,
            })
        }
    }

    /// Exit code of a tool that ran and failed.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { code, .. } => *code,
            Self::Launch { .. } => None,
        }
    }
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exited with status {c}"),
        None => "was terminated by a signal".to_owned(),
    }
}
