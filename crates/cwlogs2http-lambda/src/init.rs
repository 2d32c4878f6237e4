// Logging/tracing setup for the Lambda runtime

use cwlogs2http_config::{LogFormat, RuntimeConfig};

/// Initialize tracing/logging from RuntimeConfig
pub(crate) fn init_tracing(config: &RuntimeConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logging = config.logging();
    let env_filter =
        EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // CloudWatch adds its own timestamp and does not render ANSI colors.
    // Ignore the error if a subscriber is already set (idempotent).
    let _ = match logging.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_ansi(false).without_time()),
        ),
        LogFormat::Text => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_ansi(false).without_time()),
        ),
    };
}
