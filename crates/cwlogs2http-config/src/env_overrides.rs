use super::{LogFormat, LoggingConfig, RuntimeConfig};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "CWLOGS2HTTP_";

/// Abstraction over environment-variable lookups so tests (and embedders)
/// can supply their own source of overrides.
pub trait EnvSource {
    /// Look up `key` (without the CWLOGS2HTTP_ prefix)
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Destination
    if let Some(url) = env.get("INGESTION_URL") {
        config.destination.ingestion_url = url;
    }
    if let Some(token) = env.get("SOURCE_TOKEN") {
        config.destination.source_token = token;
    }
    if let Some(val) = get_env_u64(env, "TIMEOUT_SECS")? {
        config.destination.timeout_secs = val;
    }
    if let Some(val) = get_env_bool(env, "FAIL_ON_DELIVERY_ERROR")? {
        config.destination.fail_on_delivery_error = val;
    }

    // Source identity
    if let Some(name) = env.get("SOURCE_NAME") {
        config.source.name = name;
    }
    if let Some(field) = env.get("SOURCE_FIELD") {
        config.source.field = field;
    }

    // Transform
    if let Some(patterns) = env.get("SKIP_PATTERNS") {
        config.transform.skip_patterns = split_list(&patterns);
    }
    if let Some(val) = get_env_bool(env, "INCLUDE_METADATA")? {
        config.transform.include_metadata = val;
    }

    // Request
    if let Some(val) = get_env_usize(env, "MAX_DECOMPRESSED_BYTES")? {
        config.request.max_decompressed_bytes = val;
    }

    // Logging (level/format)
    if let Some(level) = env.get("LOG_LEVEL") {
        ensure_logging(config).level = level;
    }
    if let Some(format) = env.get("LOG_FORMAT") {
        ensure_logging(config).format = format
            .parse::<LogFormat>()
            .context("Invalid CWLOGS2HTTP_LOG_FORMAT value")?;
    }

    Ok(())
}

fn ensure_logging(config: &mut RuntimeConfig) -> &mut LoggingConfig {
    config.logging.get_or_insert_with(LoggingConfig::default)
}

/// Comma separated list; blank entries are dropped so "" disables the list
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_env_usize<E: EnvSource>(env: &E, key: &str) -> Result<Option<usize>> {
    match env.get(key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<usize>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_u64<E: EnvSource>(env: &E, key: &str) -> Result<Option<u64>> {
    match env.get(key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match env.get(key) {
        Some(val) => {
            let parsed = match val.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(anyhow!(
                        "Failed to parse {}{} (expected bool): {}",
                        ENV_PREFIX,
                        key,
                        other
                    ))
                }
            };
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Platform;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvSource for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    fn env(pairs: &[(&'static str, &'static str)]) -> MapEnv {
        MapEnv(pairs.iter().copied().collect())
    }

    #[test]
    fn test_all_overrides() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Local);
        apply_env_overrides(
            &mut config,
            &env(&[
                ("INGESTION_URL", "https://in.logs.example.com"),
                ("SOURCE_TOKEN", "secret"),
                ("TIMEOUT_SECS", "3"),
                ("FAIL_ON_DELIVERY_ERROR", "yes"),
                ("SOURCE_NAME", "Client-API-01"),
                ("SOURCE_FIELD", "service"),
                ("SKIP_PATTERNS", "RequestId:, healthcheck ,"),
                ("INCLUDE_METADATA", "1"),
                ("MAX_DECOMPRESSED_BYTES", "1024"),
                ("LOG_LEVEL", "debug"),
                ("LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(
            config.destination.ingestion_url,
            "https://in.logs.example.com"
        );
        assert_eq!(config.destination.source_token, "secret");
        assert_eq!(config.destination.timeout_secs, 3);
        assert!(config.destination.fail_on_delivery_error);
        assert_eq!(config.source.name, "Client-API-01");
        assert_eq!(config.source.field, "service");
        assert_eq!(
            config.transform.skip_patterns,
            vec!["RequestId:".to_string(), "healthcheck".to_string()]
        );
        assert!(config.transform.include_metadata);
        assert_eq!(config.request.max_decompressed_bytes, 1024);
        assert_eq!(config.logging().level, "debug");
        assert_eq!(config.logging().format, LogFormat::Json);
    }

    #[test]
    fn test_empty_skip_patterns_disable_filtering() {
        let mut config = RuntimeConfig::default();
        apply_env_overrides(&mut config, &env(&[("SKIP_PATTERNS", "")])).unwrap();
        assert!(config.transform.skip_patterns.is_empty());
    }

    #[test]
    fn test_invalid_numbers_and_bools() {
        let mut config = RuntimeConfig::default();
        let err = apply_env_overrides(&mut config, &env(&[("TIMEOUT_SECS", "ten")])).unwrap_err();
        assert!(err.to_string().contains("CWLOGS2HTTP_TIMEOUT_SECS"));

        let err = apply_env_overrides(&mut config, &env(&[("INCLUDE_METADATA", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("expected bool"));

        assert!(apply_env_overrides(&mut config, &env(&[("LOG_FORMAT", "xml")])).is_err());
    }
}
