use std::path::Path;

use grein_release_build::eject::ejected_dockerfile_path;
use grein_release_core::config::CONFIG_FILE;
use grein_release_core::{ReleaseConfig, ReleasePaths};
use grein_release_tools::{CheckResult, ToolClient};

pub async fn doctor(project_dir: &Path) -> anyhow::Result<()> {
    let loaded = ReleaseConfig::load(project_dir);
    let config = loaded
        .as_ref()
        // arch-lint: allow(no-silent-result-drop) reason="doctor must report diagnostics even when release.toml is invalid"
        .ok()
        .cloned()
        .unwrap_or_default();

    let client = ToolClient::new();
    let mut report = client.doctor(&config, project_dir).await;

    // Config file check
    report.config_file = match &loaded {
        Err(e) => CheckResult::fail(&format!("{e}")),
        Ok(_) if project_dir.join(CONFIG_FILE).exists() => CheckResult::ok("Found"),
        Ok(_) => CheckResult::ok("Not found, using defaults"),
    };

    // Data file check
    report.data_file =
        match ReleasePaths::resolve(project_dir, &config, Some(&ejected_dockerfile_path())) {
            Ok(paths) if paths.data_source.is_file() => {
                CheckResult::ok(&paths.data_source.display().to_string())
            }
            Ok(paths) => {
                CheckResult::fail(&format!("{} not found", paths.data_source.display()))
            }
            Err(e) => CheckResult::fail(&e.to_string()),
        };

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed, see above for details");
    }

    Ok(())
}
