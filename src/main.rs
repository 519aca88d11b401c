//! CLI entry point for fff.

use anyhow::Result;
use clap::Parser;
use fff_core::{Dispatcher, HttpClient, spawn_output_writer};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_level()));

    // stdout carries the per-URL summary lines; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = args.into_settings().into_config();
    let client = HttpClient::new(&config.client)?;
    let dispatcher = Dispatcher::new(config, client)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = spawn_output_writer(rx, tokio::io::stdout(), tokio::io::stderr());

    let input = BufReader::new(tokio::io::stdin());
    let result = dispatcher.run(input, tx).await;

    // All senders are gone once run() returns, so the printer drains and exits.
    printer.await??;
    let stats = result?;

    info!(
        saved = stats.saved(),
        reported = stats.reported(),
        failed = stats.failed(),
        ignored = stats.ignored(),
        "fff finished"
    );

    Ok(())
}
