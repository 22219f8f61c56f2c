//! Release pipeline for the GREIN proxy.
//!
//! Packages the proxy into a wheel, stages it with its data file in an image
//! build context, builds a container image tagged `repository:tag`, and
//! pushes it after explicit confirmation.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use grein_release::{ReleasePipeline, TerminalPrompter};
//! use grein_release_core::{ReleaseConfig, ReleasePaths};
//! use grein_release_tools::ToolClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ReleaseConfig::load(Path::new("."))?;
//! let paths = ReleasePaths::resolve(Path::new("."), &config, None)?;
//! let pipeline = ReleasePipeline::new(&config, &paths, ToolClient::new());
//! let outcome = pipeline.run(&mut TerminalPrompter::stdio()).await?;
//! println!("{}", outcome.image);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod stage;

pub use error::ReleaseError;
pub use pipeline::{PublishOutcome, PushMode, ReleaseOutcome, ReleasePipeline};
pub use prompt::{PromptError, Prompter, ScriptedPrompter, TerminalPrompter, AFFIRMATIVE};
pub use stage::Stage;
