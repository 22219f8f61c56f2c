use std::fmt;

/// One step of a release run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    CollectTag,
    Clean,
    BuildArtifact,
    StageArtifact,
    StageData,
    StageDockerfile,
    BuildImage,
    ConfirmPublish,
    Publish,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::CollectTag,
        Stage::Clean,
        Stage::BuildArtifact,
        Stage::StageArtifact,
        Stage::StageData,
        Stage::StageDockerfile,
        Stage::BuildImage,
        Stage::ConfirmPublish,
        Stage::Publish,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::CollectTag => "collect release tag",
            Stage::Clean => "clean staging area",
            Stage::BuildArtifact => "build distributable artifact",
            Stage::StageArtifact => "stage artifact",
            Stage::StageData => "stage auxiliary data",
            Stage::StageDockerfile => "stage Dockerfile",
            Stage::BuildImage => "build container image",
            Stage::ConfirmPublish => "confirm publish",
            Stage::Publish => "publish image",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
