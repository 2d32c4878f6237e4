// cwlogs2http-config - Unified configuration for all runtimes
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from CWLOGS2HTTP_CONFIG env var (or an explicit CLI path)
// 3. Config file contents from CWLOGS2HTTP_CONFIG_CONTENT env var
// 4. Default config file locations (./config.toml, ./.cwlogs2http.toml)
// 5. Platform-specific defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod env_overrides;
mod platform;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, StdEnvSource, ENV_PREFIX};
pub use platform::Platform;

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub destination: DestinationConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub transform: TransformConfig,

    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Where records are delivered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    #[serde(default)]
    pub ingestion_url: String,
    #[serde(default)]
    pub source_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Fail the invocation when the endpoint rejects or cannot be reached
    #[serde(default)]
    pub fail_on_delivery_error: bool,
}

fn default_timeout_secs() -> u64 {
    10
}

impl DestinationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            ingestion_url: String::new(),
            source_token: String::new(),
            timeout_secs: default_timeout_secs(),
            fail_on_delivery_error: false,
        }
    }
}

/// Identity stamped onto every forwarded record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_source_field")]
    pub field: String,
}

fn default_source_field() -> String {
    "api_name".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            field: default_source_field(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default = "default_skip_patterns")]
    pub skip_patterns: Vec<String>,
    #[serde(default)]
    pub include_metadata: bool,
}

fn default_skip_patterns() -> Vec<String> {
    vec!["RequestId:".to_string()]
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            skip_patterns: default_skip_patterns(),
            include_metadata: false,
        }
    }
}

/// Inbound payload handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_max_decompressed_bytes")]
    pub max_decompressed_bytes: usize,
}

fn default_max_decompressed_bytes() -> usize {
    64 * 1024 * 1024
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            max_decompressed_bytes: default_max_decompressed_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority, then validate it
    pub fn load() -> Result<Self> {
        let config = sources::load_config(Platform::detect(), None, &StdEnvSource)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer defaults, file and environment without validating.
    /// Callers choose between `validate` and `validate_transform`.
    pub fn load_layered<E: EnvSource>(
        platform: Platform,
        path: Option<&Path>,
        env: &E,
    ) -> Result<Self> {
        sources::load_config(platform, path, env)
    }

    /// Construct a config that contains only platform defaults (no env or files)
    pub fn from_platform_defaults(platform: Platform) -> Self {
        let defaults = platform.defaults();
        RuntimeConfig {
            logging: Some(LoggingConfig {
                level: "info".to_string(),
                format: defaults.log_format,
            }),
            ..Default::default()
        }
    }

    /// Merge another config into this one (used for TOML layering)
    pub fn merge(&mut self, other: RuntimeConfig) {
        self.destination = other.destination;
        self.source = other.source;
        self.transform = other.transform;
        self.request = other.request;

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Logging settings, falling back to defaults when none were configured
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Validate everything needed to decode, transform and deliver
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Validate only what the offline transform path needs
    pub fn validate_transform(&self) -> Result<()> {
        validation::validate_transform_config(self)
    }
}
