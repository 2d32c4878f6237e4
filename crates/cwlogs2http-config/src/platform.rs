// Platform detection based on environment variables
//
// Auto-detects runtime environment:
// - AWS Lambda: AWS_LAMBDA_FUNCTION_NAME env var present
// - Local: anything else (CLI replay, development)

use crate::LogFormat;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Local,
    Lambda,
}

impl Platform {
    /// Auto-detect the current platform based on environment variables
    pub fn detect() -> Self {
        if env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
            Platform::Lambda
        } else {
            Platform::Local
        }
    }

    /// Get platform-specific defaults
    pub fn defaults(&self) -> PlatformDefaults {
        match self {
            Platform::Lambda => PlatformDefaults {
                log_format: LogFormat::Json,
            },
            Platform::Local => PlatformDefaults {
                log_format: LogFormat::Text,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformDefaults {
    pub log_format: LogFormat,
}
