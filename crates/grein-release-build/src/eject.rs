use std::path::{Path, PathBuf};

/// Directory holding ejected build configuration.
pub const EJECT_DIR: &str = ".grein-release";

/// Location of the ejected Dockerfile, relative to the project directory.
pub fn ejected_dockerfile_path() -> PathBuf {
    Path::new(EJECT_DIR).join("Dockerfile")
}

/// Ejects the Dockerfile into the project directory.
///
/// After ejecting, `grein-release` stages `.grein-release/Dockerfile`
/// instead of generating one.
pub fn eject(project_dir: &Path, dockerfile_content: &str) -> Result<PathBuf, EjectError> {
    let eject_dir = project_dir.join(EJECT_DIR);
    std::fs::create_dir_all(&eject_dir).map_err(|e| EjectError::CreateDir {
        path: eject_dir.clone(),
        source: e,
    })?;

    let dockerfile_path = project_dir.join(ejected_dockerfile_path());
    if dockerfile_path.exists() {
        return Err(EjectError::AlreadyEjected(dockerfile_path));
    }

    std::fs::write(&dockerfile_path, dockerfile_content).map_err(|e| EjectError::Write {
        path: dockerfile_path.clone(),
        source: e,
    })?;

    Ok(dockerfile_path)
}

/// Check if the project has an ejected Dockerfile.
pub fn is_ejected(project_dir: &Path) -> bool {
    project_dir.join(ejected_dockerfile_path()).is_file()
}

#[derive(Debug, thiserror::Error)]
pub enum EjectError {
    #[error("failed to create .grein-release directory at {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Dockerfile already ejected at {0}: edit it directly or delete it to re-eject")]
    AlreadyEjected(PathBuf),
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
