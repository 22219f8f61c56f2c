use std::path::{Path, PathBuf};

use grein_release::{
    PromptError, Prompter, PublishOutcome, PushMode, ReleaseError, ReleasePipeline,
    ScriptedPrompter, Stage,
};
use grein_release_core::{ImageRef, ReleaseConfig, ReleasePaths};
use grein_release_tools::executor::{ToolExecutor, ToolOutput};
use grein_release_tools::tool::ToolError;
use grein_release_tools::ToolClient;
use mockall::mock;
use tempfile::TempDir;

mock! {
    Executor {}

    impl ToolExecutor for Executor {
        async fn exec(
            &self,
            program: &str,
            args: &[String],
            cwd: &Path,
        ) -> Result<ToolOutput, ToolError>;
        async fn exec_streaming(
            &self,
            program: &str,
            args: &[String],
            cwd: &Path,
        ) -> Result<ToolOutput, ToolError>;
    }
}

const WHEEL: &str = "grein_proxy-0.1.0-py3-none-any.whl";

fn exited(code: i32) -> ToolOutput {
    ToolOutput {
        code: Some(code),
        ..ToolOutput::default()
    }
}

/// A project directory with the default layout.
struct Fixture {
    _tmp: TempDir,
    config: ReleaseConfig,
    paths: ReleasePaths,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(ReleaseConfig::default())
    }

    fn with_config(config: ReleaseConfig) -> Self {
        let tmp = TempDir::new().unwrap();
        let paths = ReleasePaths::resolve(tmp.path(), &config, None).unwrap();
        Self {
            _tmp: tmp,
            config,
            paths,
        }
    }

    fn with_data(self) -> Self {
        std::fs::create_dir_all(self.paths.data_source.parent().unwrap()).unwrap();
        std::fs::write(&self.paths.data_source, "sqlite-bytes").unwrap();
        self
    }

    fn pipeline(&self, mock: MockExecutor) -> ReleasePipeline<'_, MockExecutor> {
        ReleasePipeline::new(&self.config, &self.paths, ToolClient::with_executor(mock))
    }

    fn staged_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.paths.staging_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn is_packaging(program: &str) -> bool {
    program == "python3"
}

fn is_docker(program: &str, verb: &str, args: &[String]) -> bool {
    program == "docker" && args.first().map(String::as_str) == Some(verb)
}

/// Packaging succeeds and writes one wheel into the `--outdir` argument.
fn expect_packaging_ok(mock: &mut MockExecutor) {
    mock.expect_exec_streaming()
        .withf(|program, _, _| is_packaging(program))
        .times(1)
        .returning(|_, args, _| {
            let outdir = PathBuf::from(args.last().unwrap());
            std::fs::create_dir_all(&outdir).unwrap();
            std::fs::write(outdir.join(WHEEL), "wheel-bytes").unwrap();
            Ok(exited(0))
        });
}

fn expect_image_build(mock: &mut MockExecutor, expected_ref: &'static str, code: i32) {
    mock.expect_exec_streaming()
        .withf(move |program, args, _| is_docker(program, "build", args) && args[2] == expected_ref)
        .times(1)
        .returning(move |_, _, _| Ok(exited(code)));
}

fn expect_no_image_build(mock: &mut MockExecutor) {
    mock.expect_exec_streaming()
        .withf(|program, args, _| is_docker(program, "build", args))
        .never();
}

fn expect_push(mock: &mut MockExecutor, expected_ref: &'static str, code: i32) {
    mock.expect_exec_streaming()
        .withf(move |program, args, _| is_docker(program, "push", args) && args[1] == expected_ref)
        .times(1)
        .returning(move |_, _, _| Ok(exited(code)));
}

fn expect_no_push(mock: &mut MockExecutor) {
    mock.expect_exec_streaming()
        .withf(|program, args, _| is_docker(program, "push", args))
        .never();
}

/// Records what the pipeline asked.
struct RecordingPrompter {
    tag: String,
    publish: bool,
    publish_questions: Vec<(String, String)>,
}

impl RecordingPrompter {
    fn new(tag: &str, publish: bool) -> Self {
        Self {
            tag: tag.to_owned(),
            publish,
            publish_questions: Vec::new(),
        }
    }
}

impl Prompter for RecordingPrompter {
    fn release_tag(&mut self) -> Result<String, PromptError> {
        Ok(self.tag.clone())
    }

    fn confirm_publish(&mut self, registry: &str, image: &ImageRef) -> Result<bool, PromptError> {
        self.publish_questions
            .push((registry.to_owned(), image.to_string()));
        Ok(self.publish)
    }
}

// ── End-to-end scenarios ──

#[tokio::test]
async fn release_then_decline_publish() {
    let fx = Fixture::new().with_data();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:v1.2.3", 0);
    expect_no_push(&mut mock);

    let mut prompter = RecordingPrompter::new("v1.2.3", false);
    let outcome = fx.pipeline(mock).run(&mut prompter).await.unwrap();

    assert_eq!(outcome.publish, PublishOutcome::Declined);
    assert_eq!(outcome.image.to_string(), "grein_proxy:v1.2.3");
    assert_eq!(fx.staged_names(), vec!["Dockerfile", "grein_proxy.db", WHEEL]);
    assert_eq!(
        std::fs::read_to_string(fx.paths.staging_dir.join("grein_proxy.db")).unwrap(),
        "sqlite-bytes"
    );
    assert_eq!(
        prompter.publish_questions,
        vec![("docker.io".to_owned(), "grein_proxy:v1.2.3".to_owned())]
    );
}

#[tokio::test]
async fn missing_data_file_aborts_before_image_build() {
    let fx = Fixture::new();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_no_image_build(&mut mock);
    expect_no_push(&mut mock);

    let mut prompter = RecordingPrompter::new("v1.2.3", true);
    let err = fx.pipeline(mock).run(&mut prompter).await.unwrap_err();

    assert!(matches!(err, ReleaseError::StagingFailure { stage: Stage::StageData, .. }));
    assert_eq!(err.to_string(), "stage auxiliary data failed");
    assert!(prompter.publish_questions.is_empty());
    // The artifact staged before the failure is left in place
    assert_eq!(fx.staged_names(), vec![WHEEL]);
}

#[tokio::test]
async fn confirmed_publish_pushes_exactly_once() {
    let fx = Fixture::new().with_data();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:v2.0.0", 0);
    expect_push(&mut mock, "grein_proxy:v2.0.0", 0);

    let outcome = fx
        .pipeline(mock)
        .run(&mut ScriptedPrompter::new("v2.0.0", true))
        .await
        .unwrap();

    assert_eq!(outcome.publish, PublishOutcome::Published);
    assert_eq!(outcome.staged.len(), 3);
}

// ── Short-circuit ──

#[tokio::test]
async fn packaging_failure_runs_no_later_step() {
    let fx = Fixture::new().with_data();
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming()
        .withf(|program, _, _| is_packaging(program))
        .times(1)
        .returning(|_, _, _| Ok(exited(1)));
    expect_no_image_build(&mut mock);
    expect_no_push(&mut mock);

    let err = fx
        .pipeline(mock)
        .run(&mut ScriptedPrompter::new("v1", true))
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::BuildFailure { .. }), "got: {err:?}");
    assert_eq!(err.stage(), Stage::BuildArtifact);
    assert!(fx.staged_names().is_empty());
}

#[tokio::test]
async fn packaging_tool_missing_is_build_failure() {
    let fx = Fixture::new().with_data();
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming()
        .withf(|program, _, _| is_packaging(program))
        .returning(|program, _, _| {
            Err(ToolError::Launch {
                program: program.to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        });
    expect_no_image_build(&mut mock);

    let err = fx
        .pipeline(mock)
        .run(&mut ScriptedPrompter::new("v1", false))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::BuildArtifact);
}

#[tokio::test]
async fn packaging_without_output_is_staging_failure() {
    let fx = Fixture::new().with_data();
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming()
        .withf(|program, _, _| is_packaging(program))
        .returning(|_, _, _| Ok(exited(0)));
    expect_no_image_build(&mut mock);

    let err = fx
        .pipeline(mock)
        .run(&mut ScriptedPrompter::new("v1", false))
        .await
        .unwrap_err();

    assert!(
        matches!(err, ReleaseError::StagingFailure { stage: Stage::StageArtifact, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn image_build_failure_skips_publish_question() {
    let fx = Fixture::new().with_data();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:v1", 1);
    expect_no_push(&mut mock);

    let mut prompter = RecordingPrompter::new("v1", true);
    let err = fx.pipeline(mock).run(&mut prompter).await.unwrap_err();

    assert!(matches!(err, ReleaseError::ImageBuildFailure { .. }), "got: {err:?}");
    assert_eq!(err.to_string(), "build container image failed");
    assert!(prompter.publish_questions.is_empty());
}

// ── Tag handling ──

#[tokio::test]
async fn invalid_tag_aborts_before_touching_files() {
    let fx = Fixture::new().with_data();
    std::fs::create_dir_all(&fx.paths.staging_dir).unwrap();
    std::fs::write(fx.paths.staging_dir.join("stale.whl"), "old").unwrap();
    // No expectations: any tool call fails the test
    let mock = MockExecutor::new();

    let err = fx
        .pipeline(mock)
        .run(&mut ScriptedPrompter::new("v1; rm -rf /", false))
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::InvalidTag { .. }), "got: {err:?}");
    assert_eq!(err.stage(), Stage::CollectTag);
    assert_eq!(fx.staged_names(), vec!["stale.whl"]);
}

#[tokio::test]
async fn empty_tag_rejected_by_default() {
    let fx = Fixture::new().with_data();

    let err = fx
        .pipeline(MockExecutor::new())
        .run(&mut ScriptedPrompter::new("", false))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::CollectTag);
}

#[tokio::test]
async fn lenient_tag_passes_metacharacters_to_image_tool_verbatim() {
    let fx = Fixture::new().with_data();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:$(whoami)", 1);

    let err = fx
        .pipeline(mock)
        .lenient_tag(true)
        .run(&mut ScriptedPrompter::new("$(whoami)", false))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::BuildImage);
}

// ── Clean ──

#[tokio::test]
async fn stale_staging_files_are_removed() {
    let fx = Fixture::new().with_data();
    std::fs::create_dir_all(&fx.paths.staging_dir).unwrap();
    std::fs::write(fx.paths.staging_dir.join("grein_proxy-0.0.1-py3-none-any.whl"), "old").unwrap();
    std::fs::write(fx.paths.staging_dir.join("notes.txt"), "old").unwrap();
    std::fs::create_dir_all(&fx.paths.build_output_dir).unwrap();
    std::fs::write(fx.paths.build_output_dir.join("old-0.0.1-py3-none-any.whl"), "old").unwrap();

    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:v1", 0);

    fx.pipeline(mock)
        .run(&mut ScriptedPrompter::new("v1", false))
        .await
        .unwrap();

    assert_eq!(fx.staged_names(), vec!["Dockerfile", "grein_proxy.db", WHEEL]);
}

// ── Dockerfile ──

#[tokio::test]
async fn generated_dockerfile_installs_the_built_wheel() {
    let fx = Fixture::new().with_data();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:v1", 0);

    fx.pipeline(mock)
        .run(&mut ScriptedPrompter::new("v1", false))
        .await
        .unwrap();

    let dockerfile = std::fs::read_to_string(fx.paths.staging_dir.join("Dockerfile")).unwrap();
    assert!(dockerfile.contains(&format!("pip install --no-cache-dir {WHEEL}")));
    assert!(dockerfile.contains("ENV GREIN_DB=/data/grein_proxy.db"));
}

#[tokio::test]
async fn custom_dockerfile_is_staged_verbatim() {
    let mut config = ReleaseConfig::default();
    config.image.dockerfile = Some(PathBuf::from("deploy/Dockerfile"));
    let fx = Fixture::with_config(config).with_data();
    let custom = fx.paths.dockerfile.clone().unwrap();
    std::fs::create_dir_all(custom.parent().unwrap()).unwrap();
    std::fs::write(&custom, "FROM python:3.11\nCOPY . /app\n").unwrap();

    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:v1", 0);

    fx.pipeline(mock)
        .run(&mut ScriptedPrompter::new("v1", false))
        .await
        .unwrap();

    let staged = std::fs::read_to_string(fx.paths.staging_dir.join("Dockerfile")).unwrap();
    assert_eq!(staged, "FROM python:3.11\nCOPY . /app\n");
}

#[tokio::test]
async fn missing_custom_dockerfile_is_staging_failure() {
    let mut config = ReleaseConfig::default();
    config.image.dockerfile = Some(PathBuf::from("deploy/Dockerfile"));
    let fx = Fixture::with_config(config).with_data();

    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_no_image_build(&mut mock);

    let err = fx
        .pipeline(mock)
        .run(&mut ScriptedPrompter::new("v1", false))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::StageDockerfile);
}

// ── Publish ──

#[tokio::test]
async fn push_failure_fails_release_when_checked() {
    let fx = Fixture::new().with_data();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:v1", 0);
    expect_push(&mut mock, "grein_proxy:v1", 1);

    let err = fx
        .pipeline(mock)
        .run(&mut ScriptedPrompter::new("v1", true))
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::PublishFailure { .. }), "got: {err:?}");
    assert_eq!(err.stage(), Stage::Publish);
}

#[tokio::test]
async fn push_failure_ignored_in_fire_and_forget_mode() {
    let fx = Fixture::new().with_data();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:v1", 0);
    expect_push(&mut mock, "grein_proxy:v1", 1);

    let outcome = fx
        .pipeline(mock)
        .push_mode(PushMode::FireAndForget)
        .run(&mut ScriptedPrompter::new("v1", true))
        .await
        .unwrap();

    assert_eq!(outcome.publish, PublishOutcome::PushFailedIgnored);
}

#[tokio::test]
async fn unchecked_config_selects_fire_and_forget() {
    let mut config = ReleaseConfig::default();
    config.publish.unchecked = true;
    let fx = Fixture::with_config(config).with_data();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:v1", 0);
    expect_push(&mut mock, "grein_proxy:v1", 2);

    let outcome = fx
        .pipeline(mock)
        .run(&mut ScriptedPrompter::new("v1", true))
        .await
        .unwrap();

    assert_eq!(outcome.publish, PublishOutcome::PushFailedIgnored);
}

#[tokio::test]
async fn publish_prompt_uses_repository_registry_or_override() {
    let mut config = ReleaseConfig::default();
    config.image.repository = "quay.io/lab/grein_proxy".to_owned();
    let fx = Fixture::with_config(config).with_data();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "quay.io/lab/grein_proxy:v1", 0);

    let mut prompter = RecordingPrompter::new("v1", false);
    fx.pipeline(mock).run(&mut prompter).await.unwrap();
    assert_eq!(prompter.publish_questions[0].0, "quay.io");

    let mut config = ReleaseConfig::default();
    config.publish.registry = Some("Lab registry".to_owned());
    let fx = Fixture::with_config(config).with_data();
    let mut mock = MockExecutor::new();
    expect_packaging_ok(&mut mock);
    expect_image_build(&mut mock, "grein_proxy:v1", 0);

    let mut prompter = RecordingPrompter::new("v1", false);
    fx.pipeline(mock).run(&mut prompter).await.unwrap();
    assert_eq!(prompter.publish_questions[0].0, "Lab registry");
}

// ── Property: a run never continues past a failure ──

mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Tools all succeed; only the tag decides the outcome.
    fn run_with_tag(tag: &str) -> Result<grein_release::ReleaseOutcome, ReleaseError> {
        let fx = Fixture::new().with_data();
        let mut mock = MockExecutor::new();
        mock.expect_exec_streaming().returning(|program, args, _| {
            if is_packaging(program) {
                let outdir = PathBuf::from(args.last().unwrap());
                std::fs::create_dir_all(&outdir).unwrap();
                std::fs::write(outdir.join(WHEEL), "wheel").unwrap();
            }
            Ok(exited(0))
        });

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(fx.pipeline(mock).run(&mut ScriptedPrompter::new(tag, false)))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn any_tag_completes_or_aborts_at_tag_stage(tag in ".{0,40}") {
            match run_with_tag(&tag) {
                Ok(outcome) => {
                    prop_assert_eq!(outcome.publish, PublishOutcome::Declined);
                    prop_assert_eq!(outcome.image.tag.as_str(), tag.trim());
                }
                Err(e) => prop_assert_eq!(e.stage(), Stage::CollectTag),
            }
        }
    }
}
