use std::path::Path;

use grein_release_build::eject::ejected_dockerfile_path;
use grein_release_build::staging;
use grein_release_core::{ReleaseConfig, ReleasePaths};

pub fn clean(project_dir: &Path) -> anyhow::Result<()> {
    let config = ReleaseConfig::load(project_dir)?;
    let paths = ReleasePaths::resolve(project_dir, &config, Some(&ejected_dockerfile_path()))?;

    let report = staging::clean(&paths)?;

    if report.removed.is_empty() {
        println!("Nothing to clean.");
    }
    for dir in &report.removed {
        println!("Removed {}", dir.display());
    }
    println!("Staging area ready at {}", paths.staging_dir.display());
    Ok(())
}
