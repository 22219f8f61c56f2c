use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the configuration file looked up in the project directory.
pub const CONFIG_FILE: &str = "release.toml";

/// File name of the image build recipe inside the staging directory.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Placeholder in `[artifact].args` replaced by the absolute build output directory.
pub const OUTDIR_PLACEHOLDER: &str = "{outdir}";

/// release.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub artifact: ArtifactConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub release: ReleaseSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Source tree root, working directory of the packaging tool
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Where the packaging tool writes its artifacts (cleared on every run)
    #[serde(default = "default_build_output_dir")]
    pub build_output_dir: PathBuf,
    /// Image build context (cleared on every run)
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Packaging tool executable
    #[serde(default = "default_artifact_program")]
    pub program: String,
    /// Arguments; `{outdir}` expands to the build output directory
    #[serde(default = "default_artifact_args")]
    pub args: Vec<String>,
    /// File extension of the produced artifacts (without the dot)
    #[serde(default = "default_artifact_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Auxiliary data file copied into the image
    #[serde(default = "default_data_source")]
    pub source: PathBuf,
    /// File name the data file gets inside the staging directory
    #[serde(default = "default_data_target")]
    pub target_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image repository, combined with the release tag as `repository:tag`
    #[serde(default = "default_repository")]
    pub repository: String,
    /// Container CLI used for `build` and `push`
    #[serde(default = "default_image_program")]
    pub program: String,
    /// Base image of the generated Dockerfile
    #[serde(default = "default_base_image")]
    pub base_image: String,
    /// Custom Dockerfile used instead of the generated one
    #[serde(default)]
    pub dockerfile: Option<PathBuf>,
    /// Static environment variables baked into the image.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// How the packaged application is started inside the image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_entrypoint")]
    pub entrypoint: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Environment variable the application reads the database location from
    #[serde(default = "default_database_env")]
    pub database_env: String,
    /// Directory inside the image holding the data file
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Registry name shown in the push prompt (derived from the repository when unset)
    #[serde(default)]
    pub registry: Option<String>,
    /// Ignore a failing push, reporting success regardless
    #[serde(default)]
    pub unchecked: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseSettings {
    /// Accept any tag string without validation
    #[serde(default)]
    pub lenient_tag: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            build_output_dir: default_build_output_dir(),
            staging_dir: default_staging_dir(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            program: default_artifact_program(),
            args: default_artifact_args(),
            extension: default_artifact_extension(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_data_source(),
            target_name: default_data_target(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            program: default_image_program(),
            base_image: default_base_image(),
            dockerfile: None,
            env: HashMap::new(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            entrypoint: default_entrypoint(),
            port: default_port(),
            database_env: default_database_env(),
            data_dir: default_data_dir(),
        }
    }
}

impl ArtifactConfig {
    /// Packaging tool arguments with `{outdir}` expanded.
    pub fn expanded_args(&self, outdir: &Path) -> Vec<String> {
        let outdir = outdir.display().to_string();
        self.args
            .iter()
            .map(|a| a.replace(OUTDIR_PLACEHOLDER, &outdir))
            .collect()
    }
}

impl RuntimeConfig {
    /// Path of the data file inside the image.
    pub fn database_path(&self, target_name: &str) -> String {
        format!("{}/{target_name}", self.data_dir.trim_end_matches('/'))
    }
}

impl ReleaseConfig {
    /// Load from release.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        let config: Self = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a release run meaningless or unsafe.
    pub fn validate(&self) -> crate::Result<()> {
        require_non_empty("artifact.program", &self.artifact.program)?;
        require_non_empty("artifact.extension", &self.artifact.extension)?;
        require_non_empty("image.program", &self.image.program)?;
        require_non_empty("image.repository", &self.image.repository)?;
        require_non_empty("runtime.entrypoint", &self.runtime.entrypoint)?;
        require_non_empty("runtime.database_env", &self.runtime.database_env)?;

        if self.artifact.extension.starts_with('.') {
            return Err(crate::Error::InvalidConfig {
                field: "artifact.extension",
                reason: "give the extension without the leading dot".to_owned(),
            });
        }

        if self.image.repository.contains(char::is_whitespace) {
            return Err(crate::Error::InvalidConfig {
                field: "image.repository",
                reason: "must not contain whitespace".to_owned(),
            });
        }

        let target = &self.data.target_name;
        if target.is_empty()
            || target == "."
            || target == ".."
            || target.contains('/')
            || target.contains('\\')
        {
            return Err(crate::Error::InvalidConfig {
                field: "data.target_name",
                reason: format!("{target:?} must be a plain file name"),
            });
        }
        if target == DOCKERFILE_NAME {
            return Err(crate::Error::InvalidConfig {
                field: "data.target_name",
                reason: format!("{DOCKERFILE_NAME:?} is reserved for the staged build recipe"),
            });
        }

        Ok(())
    }
}

fn require_non_empty(field: &'static str, value: &str) -> crate::Result<()> {
    if value.trim().is_empty() {
        return Err(crate::Error::InvalidConfig {
            field,
            reason: "must not be empty".to_owned(),
        });
    }
    Ok(())
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_build_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("docker")
}

fn default_artifact_program() -> String {
    "python3".to_owned()
}

fn default_artifact_args() -> Vec<String> {
    ["-m", "build", "--wheel", "--outdir", OUTDIR_PLACEHOLDER]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

fn default_artifact_extension() -> String {
    "whl".to_owned()
}

fn default_data_source() -> PathBuf {
    PathBuf::from("tests/grein_proxy.db")
}

fn default_data_target() -> String {
    "grein_proxy.db".to_owned()
}

fn default_repository() -> String {
    "grein_proxy".to_owned()
}

fn default_image_program() -> String {
    "docker".to_owned()
}

fn default_base_image() -> String {
    "python:3.11-slim".to_owned()
}

fn default_entrypoint() -> String {
    "grein_proxy".to_owned()
}

fn default_port() -> u16 {
    80
}

fn default_database_env() -> String {
    "GREIN_DB".to_owned()
}

fn default_data_dir() -> String {
    "/data".to_owned()
}
