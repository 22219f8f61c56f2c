use std::path::Path;

use grein_release::{PublishOutcome, PushMode, ReleasePipeline, TerminalPrompter};
use grein_release_build::eject::ejected_dockerfile_path;
use grein_release_core::{ReleaseConfig, ReleasePaths};
use grein_release_tools::ToolClient;

/// Command-line overrides for a release run.
pub struct ReleaseOptions {
    pub tag: Option<String>,
    /// `Some` skips the publish prompt
    pub publish: Option<bool>,
    pub lenient_tag: bool,
    pub unchecked_push: bool,
    pub capture_output: bool,
}

pub async fn release(project_dir: &Path, options: ReleaseOptions) -> anyhow::Result<()> {
    let config = ReleaseConfig::load(project_dir)?;
    let paths = ReleasePaths::resolve(project_dir, &config, Some(&ejected_dockerfile_path()))?;

    let tools = ToolClient::new().capturing(options.capture_output);
    let mut pipeline = ReleasePipeline::new(&config, &paths, tools);
    if options.lenient_tag {
        pipeline = pipeline.lenient_tag(true);
    }
    if options.unchecked_push {
        pipeline = pipeline.push_mode(PushMode::FireAndForget);
    }

    let mut prompter = TerminalPrompter::stdio()
        .with_tag(options.tag)
        .with_publish(options.publish);

    let outcome = pipeline.run(&mut prompter).await?;

    println!();
    println!("Built {}", outcome.image);
    for file in &outcome.staged {
        println!("  staged {}", file.display());
    }
    match outcome.publish {
        PublishOutcome::Declined => println!("Not pushed."),
        PublishOutcome::Published => println!("Pushed {}", outcome.image),
        PublishOutcome::PushFailedIgnored => {
            println!("Push of {} failed (ignored, unchecked push)", outcome.image)
        }
    }

    Ok(())
}
