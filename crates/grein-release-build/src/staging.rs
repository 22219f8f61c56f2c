use std::path::{Path, PathBuf};

use grein_release_core::ReleasePaths;

pub use grein_release_core::config::DOCKERFILE_NAME;

/// Directories removed by [`clean`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
}

/// Clears the build output and staging directories, then recreates the
/// staging directory empty.
///
/// Directories that do not exist are skipped silently.
pub fn clean(paths: &ReleasePaths) -> Result<CleanReport, StagingError> {
    let mut report = CleanReport::default();

    for dir in [&paths.build_output_dir, &paths.staging_dir] {
        if remove_dir_if_exists(dir)? {
            tracing::debug!(path = %dir.display(), "removed");
            report.removed.push(dir.clone());
        }
    }

    std::fs::create_dir_all(&paths.staging_dir).map_err(|e| StagingError::Create {
        path: paths.staging_dir.clone(),
        source: e,
    })?;

    Ok(report)
}

fn remove_dir_if_exists(dir: &Path) -> Result<bool, StagingError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StagingError::Cleanup {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

/// Lists the files in `build_output_dir` with the given extension, sorted by name.
pub fn find_artifacts(build_output_dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StagingError> {
    let entries = match std::fs::read_dir(build_output_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StagingError::NoArtifact {
                dir: build_output_dir.to_path_buf(),
                extension: extension.to_owned(),
            });
        }
        Err(e) => {
            return Err(StagingError::ReadDir {
                path: build_output_dir.to_path_buf(),
                source: e,
            });
        }
    };

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StagingError::ReadDir {
            path: build_output_dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            artifacts.push(path);
        }
    }

    if artifacts.is_empty() {
        return Err(StagingError::NoArtifact {
            dir: build_output_dir.to_path_buf(),
            extension: extension.to_owned(),
        });
    }

    artifacts.sort();
    Ok(artifacts)
}

/// Copies each artifact into `staging_dir`, keeping its file name.
///
/// Returns the staged paths in the same order.
pub fn stage_artifacts(artifacts: &[PathBuf], staging_dir: &Path) -> Result<Vec<PathBuf>, StagingError> {
    artifacts
        .iter()
        .map(|src| {
            let name = src.file_name().ok_or_else(|| StagingError::NoFileName(src.clone()))?;
            copy_into(src, &staging_dir.join(name))
        })
        .collect()
}

/// Copies the auxiliary data file into `staging_dir` as `target_name`.
pub fn stage_data(source: &Path, staging_dir: &Path, target_name: &str) -> Result<PathBuf, StagingError> {
    if !source.is_file() {
        return Err(StagingError::MissingData(source.to_path_buf()));
    }
    copy_into(source, &staging_dir.join(target_name))
}

/// Writes generated Dockerfile content into `staging_dir`.
pub fn write_dockerfile(staging_dir: &Path, content: &str) -> Result<PathBuf, StagingError> {
    let path = staging_dir.join(DOCKERFILE_NAME);
    std::fs::write(&path, content).map_err(|e| StagingError::WriteDockerfile {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

/// Copies a custom Dockerfile into `staging_dir`.
pub fn copy_dockerfile(source: &Path, staging_dir: &Path) -> Result<PathBuf, StagingError> {
    if !source.is_file() {
        return Err(StagingError::MissingDockerfile(source.to_path_buf()));
    }
    copy_into(source, &staging_dir.join(DOCKERFILE_NAME))
}

fn copy_into(src: &Path, dst: &Path) -> Result<PathBuf, StagingError> {
    std::fs::copy(src, dst).map_err(|e| StagingError::CopyFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(from = %src.display(), to = %dst.display(), "staged");
    Ok(dst.to_path_buf())
}

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("failed to clean up {path}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create directory {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no .{extension} artifact found in {dir}")]
    NoArtifact { dir: PathBuf, extension: String },
    #[error("artifact path has no file name: {0}")]
    NoFileName(PathBuf),
    #[error("data file not found at {0}")]
    MissingData(PathBuf),
    #[error("Dockerfile not found at {0}")]
    MissingDockerfile(PathBuf),
    #[error("failed to copy {from} to {to}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write Dockerfile at {path}")]
    WriteDockerfile {
        path: PathBuf,
        source: std::io::Error,
    },
}
