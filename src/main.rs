// CLI entry point
//
// The Lambda binary lives in crates/cwlogs2http-lambda (`bootstrap`).

use clap::Parser;
use cwlogs2http::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cwlogs2http::run(Cli::parse()).await
}
