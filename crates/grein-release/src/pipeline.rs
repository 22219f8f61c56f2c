use std::path::PathBuf;

use grein_release_build::dockerfile::DockerfileGenerator;
use grein_release_build::staging::{self, StagingError};
use grein_release_core::{ImageRef, ReleaseConfig, ReleasePaths, ReleaseTag};
use grein_release_tools::{RealExecutor, ToolClient, ToolExecutor};

use crate::error::ReleaseError;
use crate::prompt::Prompter;
use crate::stage::Stage;

/// What happens when the image push fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushMode {
    /// A failed push fails the release.
    #[default]
    Checked,
    /// A failed push is logged and the release still succeeds.
    FireAndForget,
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Declined,
    Published,
    /// Push failed under [`PushMode::FireAndForget`].
    PushFailedIgnored,
}

/// Result of a release run that reached its end state.
#[derive(Debug)]
pub struct ReleaseOutcome {
    pub image: ImageRef,
    /// Files placed in the staging directory, in staging order
    pub staged: Vec<PathBuf>,
    pub publish: PublishOutcome,
}

/// The release run: tag → clean → build → stage → image → publish.
///
/// ```text
/// Start → TagCollected → Cleaned → Built → Staged(artifact) → Staged(data)
///       → ImageBuilt → {PublishDeclined | Published} → End
/// ```
///
/// Every step before the publish decision aborts the run on failure. Nothing
/// is rolled back; outputs of earlier steps stay on disk.
pub struct ReleasePipeline<'a, E: ToolExecutor = RealExecutor> {
    config: &'a ReleaseConfig,
    paths: &'a ReleasePaths,
    tools: ToolClient<E>,
    push_mode: PushMode,
    lenient_tag: bool,
}

impl<'a, E: ToolExecutor> ReleasePipeline<'a, E> {
    /// Push mode and tag leniency start from `config`.
    pub fn new(config: &'a ReleaseConfig, paths: &'a ReleasePaths, tools: ToolClient<E>) -> Self {
        Self {
            config,
            paths,
            tools,
            push_mode: if config.publish.unchecked {
                PushMode::FireAndForget
            } else {
                PushMode::Checked
            },
            lenient_tag: config.release.lenient_tag,
        }
    }

    pub fn push_mode(mut self, mode: PushMode) -> Self {
        self.push_mode = mode;
        self
    }

    pub fn lenient_tag(mut self, lenient: bool) -> Self {
        self.lenient_tag = lenient;
        self
    }

    pub async fn run<P: Prompter>(&self, prompter: &mut P) -> Result<ReleaseOutcome, ReleaseError> {
        let image = self.collect_tag(prompter)?;
        tracing::info!(image = %image, "release started");

        // Clean
        tracing::info!(staging = %self.paths.staging_dir.display(), "cleaning staging area");
        staging::clean(self.paths).map_err(|e| ReleaseError::CleanFailure { source: e })?;

        // Build
        tracing::info!(program = %self.config.artifact.program, "building artifact");
        self.tools
            .build_artifact(self.config, self.paths)
            .await
            .map_err(|e| ReleaseError::BuildFailure { source: e })?;

        // Stage
        let staged = self.stage()?;

        // Image
        tracing::info!(image = %image, "building image");
        self.tools
            .build_image(&self.config.image.program, &image, &self.paths.staging_dir)
            .await
            .map_err(|e| ReleaseError::ImageBuildFailure { source: e })?;

        // Publish
        let registry = self
            .config
            .publish
            .registry
            .as_deref()
            .unwrap_or_else(|| image.registry())
            .to_owned();
        let confirmed = prompter
            .confirm_publish(&registry, &image)
            .map_err(|e| ReleaseError::Prompt {
                stage: Stage::ConfirmPublish,
                source: e,
            })?;

        let publish = if confirmed {
            self.publish(&image).await?
        } else {
            tracing::info!(image = %image, "publish declined");
            PublishOutcome::Declined
        };

        Ok(ReleaseOutcome {
            image,
            staged,
            publish,
        })
    }

    fn collect_tag<P: Prompter>(&self, prompter: &mut P) -> Result<ImageRef, ReleaseError> {
        let raw = prompter.release_tag().map_err(|e| ReleaseError::Prompt {
            stage: Stage::CollectTag,
            source: e,
        })?;

        let tag = if self.lenient_tag {
            ReleaseTag::lenient(&raw)
        } else {
            ReleaseTag::parse(&raw).map_err(|e| ReleaseError::InvalidTag { source: e })?
        };

        Ok(ImageRef::new(&self.config.image.repository, tag))
    }

    fn stage(&self) -> Result<Vec<PathBuf>, ReleaseError> {
        let staging_dir = &self.paths.staging_dir;
        let failed =
            |stage: Stage| move |e: StagingError| ReleaseError::StagingFailure { stage, source: e };

        let artifacts = staging::find_artifacts(
            &self.paths.build_output_dir,
            &self.config.artifact.extension,
        )
        .map_err(failed(Stage::StageArtifact))?;
        let mut staged = staging::stage_artifacts(&artifacts, staging_dir)
            .map_err(failed(Stage::StageArtifact))?;
        tracing::info!(count = staged.len(), "artifacts staged");

        let data = staging::stage_data(
            &self.paths.data_source,
            staging_dir,
            &self.config.data.target_name,
        )
        .map_err(failed(Stage::StageData))?;
        staged.push(data);

        let dockerfile = match &self.paths.dockerfile {
            Some(custom) => {
                tracing::info!(path = %custom.display(), "using custom Dockerfile");
                staging::copy_dockerfile(custom, staging_dir)
            }
            None => {
                let wheels = artifacts
                    .iter()
                    .filter_map(|a| a.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect();
                let content = DockerfileGenerator::new(self.config, wheels).render();
                staging::write_dockerfile(staging_dir, &content)
            }
        }
        .map_err(failed(Stage::StageDockerfile))?;
        staged.push(dockerfile);

        Ok(staged)
    }

    async fn publish(&self, image: &ImageRef) -> Result<PublishOutcome, ReleaseError> {
        tracing::info!(image = %image, "pushing image");
        match self
            .tools
            .push_image(&self.config.image.program, image, &self.paths.source_dir)
            .await
        {
            Ok(_) => Ok(PublishOutcome::Published),
            Err(e) if self.push_mode == PushMode::FireAndForget => {
                tracing::warn!(image = %image, error = %e, "push failed; ignored (unchecked push)");
                Ok(PublishOutcome::PushFailedIgnored)
            }
            Err(e) => Err(ReleaseError::PublishFailure { source: e }),
        }
    }
}
