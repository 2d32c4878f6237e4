// Local CLI for cwlogs2http
//
// Runs the same pipeline the Lambda uses against a captured subscription
// event, either for real (`replay`) or offline (`inspect`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cwlogs2http_config::{Platform, RuntimeConfig, StdEnvSource};
use cwlogs2http_core::{SubscriptionEvent, TransformSummary};
use cwlogs2http_forward::{
    decode_limits, prepare, transform_options, Outcome, Pipeline, Prepared,
};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

mod init;

pub use init::init_tracing;

#[derive(Debug, Parser)]
#[command(
    name = "cwlogs2http",
    version,
    about = "Forward CloudWatch Logs subscription payloads to an HTTP log ingestion endpoint"
)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a subscription event and forward it to the ingestion endpoint
    Replay {
        /// Event JSON file (`-` for stdin)
        event: String,
    },
    /// Decode and transform a subscription event, printing the records instead of sending them
    Inspect {
        /// Event JSON file (`-` for stdin)
        event: String,
    },
}

/// Resolve configuration from defaults, the optional file and the environment
pub fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    RuntimeConfig::load_layered(Platform::detect(), path, &StdEnvSource)
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    match cli.command {
        Command::Replay { event } => {
            config.validate()?;
            let event = read_event(&event)?;
            let outcome = replay(&event, &config).await?;
            println!("{}", describe(&outcome));
            Ok(())
        }
        Command::Inspect { event } => {
            config.validate_transform()?;
            let event = read_event(&event)?;
            let stdout = std::io::stdout();
            inspect(&event, &config, &mut stdout.lock())
        }
    }
}

/// Run the full pipeline once
pub async fn replay(event: &SubscriptionEvent, config: &RuntimeConfig) -> Result<Outcome> {
    let pipeline = Pipeline::from_config(config)?;
    let outcome = pipeline.run(event).await?;
    info!(
        forwarded = outcome.records_forwarded(),
        dropped = outcome.dropped(),
        "Replay finished"
    );
    Ok(outcome)
}

/// Write the records that would be sent as a pretty JSON array
pub fn inspect<W: Write>(
    event: &SubscriptionEvent,
    config: &RuntimeConfig,
    out: &mut W,
) -> Result<()> {
    let summary = match prepare(event, &decode_limits(config), &transform_options(config)) {
        Prepared::Ready(summary) => summary,
        Prepared::Done(Outcome::Skipped(reason)) => {
            anyhow::bail!("Event produced no records: {}", reason.as_str())
        }
        Prepared::Done(_) => TransformSummary::default(),
    };

    serde_json::to_writer_pretty(&mut *out, &summary.records)
        .context("Failed to write records")?;
    writeln!(out)?;
    Ok(())
}

pub fn read_event(source: &str) -> Result<SubscriptionEvent> {
    let mut raw = String::new();
    if source == "-" {
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read event from stdin")?;
    } else {
        raw = std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read event file: {}", source))?;
    }
    parse_event(&raw)
}

pub fn parse_event(raw: &str) -> Result<SubscriptionEvent> {
    serde_json::from_str(raw).context("Event is not a JSON object")
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Skipped(reason) => format!("skipped ({})", reason.as_str()),
        Outcome::Empty { dropped } => format!("nothing to send ({} filtered)", dropped),
        Outcome::Delivered { report, dropped } => format!(
            "forwarded {} records, HTTP {} ({} filtered)",
            report.records, report.status, dropped
        ),
    }
}
