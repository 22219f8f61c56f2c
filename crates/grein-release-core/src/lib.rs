//! Core types and configuration for grein-release.
//!
//! This crate defines the `release.toml` schema ([`ReleaseConfig`]), the
//! per-run release parameters ([`ReleaseTag`], [`ImageRef`],
//! [`ReleasePaths`]), and shared error types.

pub mod config;
pub mod error;
pub mod release;

pub use config::{
    ArtifactConfig, DataConfig, ImageConfig, ProjectConfig, PublishConfig, ReleaseConfig,
    ReleaseSettings, RuntimeConfig,
};
pub use error::{Error, Result};
pub use release::{ImageRef, ReleasePaths, ReleaseTag};
