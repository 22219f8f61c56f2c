use std::path::Path;

use grein_release_build::dockerfile::DockerfileGenerator;
use grein_release_core::ReleaseConfig;

pub fn eject(project_dir: &Path) -> anyhow::Result<()> {
    let config = ReleaseConfig::load(project_dir)?;
    let dockerfile = DockerfileGenerator::with_wildcard(&config).render();

    let path = grein_release_build::eject::eject(project_dir, &dockerfile)?;

    println!("Ejected Dockerfile to {}", path.display());
    println!("You can now edit it directly. grein-release will stage this file.");
    Ok(())
}
