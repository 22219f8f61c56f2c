use std::fmt;
use std::path::Path;

use crate::executor::{RealExecutor, ToolExecutor, ToolOutput};
use crate::tool::ToolError;
use grein_release_core::{ImageRef, ReleaseConfig, ReleasePaths};

/// Packaging and container operations, parameterized over the executor for testability.
pub struct ToolClient<E: ToolExecutor = RealExecutor> {
    executor: E,
    capture: bool,
}

impl ToolClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
            capture: false,
        }
    }
}

impl Default for ToolClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ToolExecutor> ToolClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self {
            executor,
            capture: false,
        }
    }

    /// Capture tool output instead of streaming it to the terminal.
    ///
    /// Captured stderr of a failing step is logged at error level.
    pub fn capturing(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ToolOutput, ToolError> {
        let output = if self.capture {
            self.executor.exec(program, args, cwd).await?
        } else {
            self.executor.exec_streaming(program, args, cwd).await?
        };
        tracing::debug!(program, code = ?output.code, "tool finished");
        ToolError::check(program, args, output)
    }

    // ── Packaging ──

    /// Run the packaging tool against the source tree.
    pub async fn build_artifact(
        &self,
        config: &ReleaseConfig,
        paths: &ReleasePaths,
    ) -> Result<ToolOutput, ArtifactBuildError> {
        let args = config.artifact.expanded_args(&paths.build_output_dir);
        self.run(&config.artifact.program, &args, &paths.source_dir)
            .await
            .map_err(|e| ArtifactBuildError::Package { source: e })
    }

    // ── Image ──

    /// `<program> build -t <image> <context>`
    pub async fn build_image(
        &self,
        program: &str,
        image: &ImageRef,
        context_dir: &Path,
    ) -> Result<ToolOutput, ImageBuildError> {
        let context = context_dir
            .to_str()
            .ok_or_else(|| ImageBuildError::InvalidPath(context_dir.to_path_buf()))?;

        self.run(
            program,
            &args(["build", "-t", &image.to_string(), context]),
            context_dir,
        )
        .await
        .map_err(|e| ImageBuildError::Build { source: e })
    }

    /// `<program> push <image>`
    pub async fn push_image(
        &self,
        program: &str,
        image: &ImageRef,
        cwd: &Path,
    ) -> Result<ToolOutput, PushError> {
        self.run(program, &args(["push", &image.to_string()]), cwd)
            .await
            .map_err(|e| PushError::Push { source: e })
    }

    // ── Doctor ──

    /// Check that every configured tool can be launched.
    ///
    /// Runs all checks without early return.
    pub async fn doctor(&self, config: &ReleaseConfig, cwd: &Path) -> DoctorReport {
        DoctorReport {
            packaging_tool: self.tool_version(&config.artifact.program, cwd).await,
            image_tool: self.tool_version(&config.image.program, cwd).await,
            ..DoctorReport::default()
        }
    }

    async fn tool_version(&self, program: &str, cwd: &Path) -> CheckResult {
        match self.executor.exec(program, &args(["--version"]), cwd).await {
            Ok(out) if out.success() => {
                // `python3 --version` prints to stdout, older pythons to stderr
                let text = if out.stdout.trim().is_empty() {
                    &out.stderr
                } else {
                    &out.stdout
                };
                let first = text.lines().next().unwrap_or(program).trim();
                CheckResult::ok(&format!("{program}: {first}"))
            }
            Ok(out) => CheckResult::fail(&format!(
                "{program} --version exited with {}",
                out.code.map_or_else(|| "signal".to_owned(), |c| c.to_string())
            )),
            Err(e) => CheckResult::fail(&e.to_string()),
        }
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Doctor types ──

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub packaging_tool: CheckResult,
    pub image_tool: CheckResult,
    pub data_file: CheckResult,
    pub config_file: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.packaging_tool.passed
            && self.image_tool.passed
            && self.data_file.passed
            && self.config_file.passed
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("Packaging tool", &self.packaging_tool),
            ("Image tool", &self.image_tool),
            ("Data file", &self.data_file),
            ("release.toml", &self.config_file),
        ];
        for (label, check) in rows {
            writeln!(f, "[{}] {label:<15} {}", check.icon(), check.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum ArtifactBuildError {
    #[error("packaging tool failed")]
    Package { source: ToolError },
}

#[derive(Debug, thiserror::Error)]
pub enum ImageBuildError {
    #[error("build context path is not valid UTF-8: {0}")]
    InvalidPath(std::path::PathBuf),

    #[error("image build failed")]
    Build { source: ToolError },
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("image push failed")]
    Push { source: ToolError },
}
