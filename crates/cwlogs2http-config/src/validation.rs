// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_transform_config(config)?;
    validate_destination_config(&config.destination)?;
    Ok(())
}

/// Checks for the decode/transform path only (no delivery settings)
pub fn validate_transform_config(config: &RuntimeConfig) -> Result<()> {
    validate_source_config(&config.source)?;
    validate_request_config(&config.request)?;
    Ok(())
}

fn validate_destination_config(config: &DestinationConfig) -> Result<()> {
    let url = config.ingestion_url.trim();
    if url.is_empty() {
        bail!("destination.ingestion_url is required (or set CWLOGS2HTTP_INGESTION_URL)");
    }

    if !(url.starts_with("https://") || url.starts_with("http://")) {
        bail!("destination.ingestion_url must start with http:// or https://");
    }

    if url.starts_with("http://") {
        warn!(
            ingestion_url = url,
            "destination.ingestion_url is not TLS; the source token will be sent in clear text"
        );
    }

    if config.source_token.trim().is_empty() {
        bail!("destination.source_token is required (or set CWLOGS2HTTP_SOURCE_TOKEN)");
    }

    if config.timeout_secs == 0 {
        bail!("destination.timeout_secs must be greater than 0");
    }

    Ok(())
}

fn validate_source_config(config: &SourceConfig) -> Result<()> {
    if config.name.trim().is_empty() {
        bail!("source.name is required (or set CWLOGS2HTTP_SOURCE_NAME)");
    }

    if config.field.trim().is_empty() {
        bail!("source.field must not be empty");
    }

    Ok(())
}

fn validate_request_config(config: &RequestConfig) -> Result<()> {
    if config.max_decompressed_bytes == 0 {
        bail!("request.max_decompressed_bytes must be greater than 0");
    }

    if config.max_decompressed_bytes > 1024 * 1024 * 1024 {
        // 1 GB
        warn!(
            max_decompressed_bytes = config.max_decompressed_bytes,
            "request.max_decompressed_bytes is very large; may cause memory issues"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> RuntimeConfig {
        RuntimeConfig {
            destination: DestinationConfig {
                ingestion_url: "https://in.logs.betterstack.com".to_string(),
                source_token: "token".to_string(),
                ..Default::default()
            },
            source: SourceConfig {
                name: "Client-API-01".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_destination_config() {
        let mut config = valid_config();
        config.destination.ingestion_url = String::new();
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.destination.ingestion_url = "ftp://logs.example.com".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.destination.source_token = "  ".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.destination.timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.destination.ingestion_url = "http://localhost:8080".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_source_config() {
        let mut config = valid_config();
        config.source.name = String::new();
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.source.field = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_transform_validation_ignores_destination() {
        let mut config = valid_config();
        config.destination = DestinationConfig::default();
        assert!(validate_transform_config(&config).is_ok());
        assert!(validate_config(&config).is_err());

        config.request.max_decompressed_bytes = 0;
        assert!(validate_transform_config(&config).is_err());
    }
}
