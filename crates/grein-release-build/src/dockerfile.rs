use grein_release_core::ReleaseConfig;

/// Generates the runtime image Dockerfile for the packaged proxy.
///
/// `wheels` are file names (or shell patterns) relative to the staging
/// directory.
pub struct DockerfileGenerator<'a> {
    config: &'a ReleaseConfig,
    wheels: Vec<String>,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(config: &'a ReleaseConfig, wheels: Vec<String>) -> Self {
        Self { config, wheels }
    }

    /// Generator that installs whatever artifacts end up in the staging directory.
    pub fn with_wildcard(config: &'a ReleaseConfig) -> Self {
        let pattern = format!("*.{}", config.artifact.extension);
        Self::new(config, vec![pattern])
    }

    pub fn render(&self) -> String {
        let image = &self.config.image;
        let runtime = &self.config.runtime;
        let data_target = &self.config.data.target_name;
        let db_path = runtime.database_path(data_target);
        let wheels = self.wheels.join(" ");

        let mut env_pairs: Vec<_> = image.env.iter().collect();
        env_pairs.sort_by_key(|(k, _)| k.as_str());
        let env_lines: String = env_pairs
            .iter()
            .map(|(k, v)| format!("ENV {k}=\"{}\"\n", escape_env_value(v)))
            .collect();

        format!(
            r#"# === Runtime: packaged proxy ===
FROM {base}
WORKDIR /app

# === Application wheel ===
COPY {wheels} ./
RUN pip install --no-cache-dir {wheels} && rm -f {wheels}

# === Data ===
COPY {data_target} {db_path}
{env_lines}ENV {db_env}={db_path}

EXPOSE {port}
ENTRYPOINT ["{entrypoint}"]
CMD ["--port", "{port}", "--database", "{db_path}"]
"#,
            base = image.base_image,
            db_env = runtime.database_env,
            port = runtime.port,
            entrypoint = runtime.entrypoint,
        )
    }
}

/// Escape a value for a double-quoted `ENV` directive.
fn escape_env_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
