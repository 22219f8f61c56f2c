//! Staging-area management, Dockerfile generation, and eject for grein-release.
//!
//! # Staging layout
//!
//! ```text
//! <staging dir>/
//!   grein_proxy-<version>-py3-none-any.whl   ── copied from the build output dir
//!   grein_proxy.db                           ── auxiliary data, renamed
//!   Dockerfile                               ── generated, ejected, or custom
//! ```
//!
//! The staging directory is the image build context. [`staging::clean`]
//! recreates it empty on every run, so after staging it holds exactly
//! the files of the current release.

pub mod dockerfile;
pub mod eject;
pub mod staging;

pub use dockerfile::DockerfileGenerator;
pub use staging::StagingError;
