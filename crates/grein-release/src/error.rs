use grein_release_build::StagingError;
use grein_release_tools::{ArtifactBuildError, ImageBuildError, PushError};

use crate::prompt::PromptError;
use crate::stage::Stage;

/// Why a release run stopped. Each variant names the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("{stage} failed")]
    Prompt { stage: Stage, source: PromptError },

    #[error("{} failed", Stage::CollectTag)]
    InvalidTag { source: grein_release_core::Error },

    #[error("{} failed", Stage::Clean)]
    CleanFailure { source: StagingError },

    #[error("{} failed", Stage::BuildArtifact)]
    BuildFailure { source: ArtifactBuildError },

    #[error("{stage} failed")]
    StagingFailure { stage: Stage, source: StagingError },

    #[error("{} failed", Stage::BuildImage)]
    ImageBuildFailure { source: ImageBuildError },

    #[error("{} failed", Stage::Publish)]
    PublishFailure { source: PushError },
}

impl ReleaseError {
    /// The stage the run aborted in.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Prompt { stage, .. } | Self::StagingFailure { stage, .. } => *stage,
            Self::InvalidTag { .. } => Stage::CollectTag,
            Self::CleanFailure { .. } => Stage::Clean,
            Self::BuildFailure { .. } => Stage::BuildArtifact,
            Self::ImageBuildFailure { .. } => Stage::BuildImage,
            Self::PublishFailure { .. } => Stage::Publish,
        }
    }
}
