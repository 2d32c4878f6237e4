// Configuration source loading
//
// Priority order:
// 1. Environment variables (CWLOGS2HTTP_* prefix)
// 2. Explicit path (CLI --config) or CWLOGS2HTTP_CONFIG
// 3. Inline config content from CWLOGS2HTTP_CONFIG_CONTENT
// 4. Default config files (./config.toml, ./.cwlogs2http.toml)
// 5. Platform defaults (based on Platform)

use crate::env_overrides::{self, EnvSource};
use crate::platform::Platform;
use crate::RuntimeConfig;
use anyhow::{Context, Result};
use std::path::Path;

const DEFAULT_CONFIG_PATHS: &[&str] = &["./config.toml", "./.cwlogs2http.toml"];

/// Layer platform defaults, the first config file found, and env overrides
pub(crate) fn load_config<E: EnvSource>(
    platform: Platform,
    explicit_path: Option<&Path>,
    env: &E,
) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::from_platform_defaults(platform);

    if let Some(file_config) = load_from_file(explicit_path, env)? {
        config.merge(file_config);
    }

    env_overrides::apply_env_overrides(&mut config, env)?;
    Ok(config)
}

fn load_from_file<E: EnvSource>(
    explicit_path: Option<&Path>,
    env: &E,
) -> Result<Option<RuntimeConfig>> {
    if let Some(path) = explicit_path {
        return read_config_file(path).map(Some);
    }

    if let Some(path) = env.get("CONFIG") {
        return read_config_file(Path::new(&path)).map(Some);
    }

    if let Some(content) = env.get("CONFIG_CONTENT") {
        return parse_toml(&content, "inline config from CWLOGS2HTTP_CONFIG_CONTENT").map(Some);
    }

    for path in DEFAULT_CONFIG_PATHS {
        let path = Path::new(path);
        if path.exists() {
            return read_config_file(path).map(Some);
        }
    }

    Ok(None)
}

fn read_config_file(path: &Path) -> Result<RuntimeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_toml(&content, &format!("config file {}", path.display()))
}

fn parse_toml(content: &str, origin: &str) -> Result<RuntimeConfig> {
    toml::from_str(content).with_context(|| format!("Failed to parse {}", origin))
}
