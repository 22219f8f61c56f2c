//! External tool invocations for grein-release.
//!
//! Every tool (packaging, image build, image push) goes through the
//! [`ToolExecutor`] capability: run a program with arguments in a
//! directory, get back its exit status and captured output.
//! [`ToolClient`] turns nonzero exits into typed, step-specific errors.

pub mod client;
pub mod executor;
pub mod tool;

pub use client::{
    ArtifactBuildError, CheckResult, DoctorReport, ImageBuildError, PushError, ToolClient,
};
pub use executor::{RealExecutor, ToolExecutor, ToolOutput};
pub use tool::ToolError;
