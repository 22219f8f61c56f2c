//! Release parameters: the tag, the image reference built from it, and the
//! resolved filesystem layout of one release run.
//!
//! All of these are constructed once at the start of a run and never
//! mutated afterwards.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::ReleaseConfig;

/// Longest tag a container registry accepts.
pub const MAX_TAG_LEN: usize = 128;

/// Registry assumed for repositories without an explicit registry host.
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// An operator-supplied release identifier.
///
/// # Examples
///
/// ```
/// use grein_release_core::ReleaseTag;
///
/// let tag = ReleaseTag::parse("v1.2.3").unwrap();
/// assert_eq!(tag.as_str(), "v1.2.3");
///
/// assert!(ReleaseTag::parse("not a tag").is_err());
/// assert_eq!(ReleaseTag::lenient("not a tag").as_str(), "not a tag");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag(String);

impl ReleaseTag {
    /// Parse a tag, enforcing `[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}`.
    ///
    /// Surrounding whitespace (e.g. the newline of a line read) is trimmed first.
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let tag = raw.trim();
        if let Some(reason) = tag_violation(tag) {
            return Err(crate::Error::InvalidTag {
                tag: tag.to_owned(),
                reason,
            });
        }
        Ok(Self(tag.to_owned()))
    }

    /// Accept any tag unchanged apart from trimming.
    pub fn lenient(raw: &str) -> Self {
        Self(raw.trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn tag_violation(tag: &str) -> Option<&'static str> {
    let mut chars = tag.chars();
    let first = match chars.next() {
        None => return Some("tag is empty"),
        Some(c) => c,
    };
    if tag.len() > MAX_TAG_LEN {
        return Some("tag is longer than 128 characters");
    }
    if !(first.is_ascii_alphanumeric() || first == '_') {
        return Some("tag must start with a letter, digit, or underscore");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return Some("tag may only contain letters, digits, '_', '.', and '-'");
    }
    None
}

/// Fully qualified image reference `repository:tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub repository: String,
    pub tag: ReleaseTag,
}

impl ImageRef {
    pub fn new(repository: &str, tag: ReleaseTag) -> Self {
        Self {
            repository: repository.to_owned(),
            tag,
        }
    }

    /// Registry host of the repository.
    ///
    /// The first path segment names a registry when it contains `.` or `:`
    /// or is `localhost`; otherwise the image lives on Docker Hub.
    pub fn registry(&self) -> &str {
        match self.repository.split_once('/') {
            Some((host, _))
                if host.contains('.') || host.contains(':') || host == "localhost" =>
            {
                host
            }
            _ => DEFAULT_REGISTRY,
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Absolute paths of everything a release run reads or writes.
///
/// Steps receive these explicitly and never change the process working
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePaths {
    pub source_dir: PathBuf,
    pub build_output_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub data_source: PathBuf,
    /// Custom Dockerfile, if configured or ejected
    pub dockerfile: Option<PathBuf>,
}

impl ReleasePaths {
    /// Resolve the configured layout against `project_dir`.
    ///
    /// `ejected` is the ejected Dockerfile location, used when no custom
    /// Dockerfile is configured and the file exists.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::ProjectDirResolve`] if `project_dir` does not exist
    /// - [`crate::Error::UnsafePath`] if a directory that gets cleared would
    ///   contain the source tree, or the custom Dockerfile sits in staging
    pub fn resolve(
        project_dir: &Path,
        config: &ReleaseConfig,
        ejected: Option<&Path>,
    ) -> crate::Result<Self> {
        let root = project_dir
            .canonicalize()
            .map_err(|e| crate::Error::ProjectDirResolve {
                path: project_dir.to_path_buf(),
                source: e,
            })?;

        let source_dir = normalize(&root.join(&config.project.source_dir));
        let build_output_dir = normalize(&source_dir.join(&config.project.build_output_dir));
        let staging_dir = normalize(&root.join(&config.project.staging_dir));
        let data_source = normalize(&root.join(&config.data.source));
        let dockerfile = match &config.image.dockerfile {
            Some(p) => Some(normalize(&root.join(p))),
            None => ejected
                .map(|p| normalize(&root.join(p)))
                .filter(|p| p.is_file()),
        };

        for (role, dir) in [
            ("build output", &build_output_dir),
            ("staging", &staging_dir),
        ] {
            if source_dir.starts_with(dir) || root.starts_with(dir) {
                return Err(crate::Error::UnsafePath {
                    role,
                    path: dir.clone(),
                    reason: "directory is cleared on every run and must not contain the project",
                });
            }
        }

        if staging_dir.starts_with(&build_output_dir) || build_output_dir.starts_with(&staging_dir) {
            return Err(crate::Error::UnsafePath {
                role: "build output",
                path: build_output_dir.clone(),
                reason: "build output and staging directories must not overlap",
            });
        }

        if let Some(df) = &dockerfile
            && df.starts_with(&staging_dir)
        {
            return Err(crate::Error::UnsafePath {
                role: "dockerfile",
                path: df.clone(),
                reason: "custom Dockerfile must live outside the staging directory",
            });
        }

        if data_source.starts_with(&staging_dir) || data_source.starts_with(&build_output_dir) {
            return Err(crate::Error::UnsafePath {
                role: "data source",
                path: data_source.clone(),
                reason: "data file must live outside the directories cleared on every run",
            });
        }

        tracing::debug!(
            source = %source_dir.display(),
            build_output = %build_output_dir.display(),
            staging = %staging_dir.display(),
            data = %data_source.display(),
            "release paths resolved"
        );

        Ok(Self {
            source_dir,
            build_output_dir,
            staging_dir,
            data_source,
            dockerfile,
        })
    }
}

/// Lexically remove `.` and `..` components; the path need not exist.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
