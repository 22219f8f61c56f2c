mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "grein-release",
    about = "Package, containerize and publish the GREIN proxy"
)]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Project directory holding release.toml and the source tree
    #[arg(long, global = true, default_value = ".", env = "GREIN_RELEASE_PROJECT_DIR")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Options for `release` when no subcommand is given
    #[command(flatten)]
    release: ReleaseArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the artifact, stage it, build the image and optionally push it (default)
    Release(ReleaseArgs),
    /// Clear the build output and staging directories
    Clean,
    /// Eject the generated Dockerfile for manual customization
    Eject,
    /// Check that the packaging and image tools are available
    Doctor,
}

#[derive(Args, Default)]
struct ReleaseArgs {
    /// Release tag; prompts for one when omitted
    #[arg(long, env = "GREIN_RELEASE_TAG")]
    tag: Option<String>,

    /// Push without asking (`--push=false` declines without asking)
    #[arg(
        long,
        short = 'y',
        visible_alias = "yes",
        env = "GREIN_RELEASE_PUSH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    push: Option<bool>,

    /// Decline the push without asking
    #[arg(long)]
    no_push: bool,

    /// Accept any tag text instead of the image tag grammar
    #[arg(long)]
    lenient_tag: bool,

    /// Report success even when the push fails
    #[arg(long)]
    unchecked_push: bool,

    /// Capture tool output and show it only when a step fails
    #[arg(long)]
    capture_output: bool,
}

impl ReleaseArgs {
    fn into_options(self) -> commands::ReleaseOptions {
        commands::ReleaseOptions {
            tag: self.tag,
            publish: if self.no_push { Some(false) } else { self.push },
            lenient_tag: self.lenient_tag,
            unchecked_push: self.unchecked_push,
            capture_output: self.capture_output,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenv
        && !e.not_found()
    {
        tracing::warn!(error = %e, "failed to load .env");
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let project_dir = cli.project_dir.as_path();

    match cli.command {
        None => commands::release(project_dir, cli.release.into_options()).await?,
        Some(Commands::Release(args)) => {
            commands::release(project_dir, args.into_options()).await?
        }
        Some(Commands::Clean) => commands::clean(project_dir)?,
        Some(Commands::Eject) => commands::eject(project_dir)?,
        Some(Commands::Doctor) => commands::doctor(project_dir).await?,
    }

    Ok(())
}
