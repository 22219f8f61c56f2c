use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    // ── Release parameters ──
    #[error("failed to resolve project directory {path}")]
    ProjectDirResolve {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid release tag {tag:?}: {reason}")]
    InvalidTag { tag: String, reason: &'static str },

    #[error("unsafe {role} path {path}: {reason}")]
    UnsafePath {
        role: &'static str,
        path: PathBuf,
        reason: &'static str,
    },
}
