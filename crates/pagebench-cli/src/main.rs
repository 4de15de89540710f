#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use std::process;

use anyhow::Context;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "pagebench_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "pagebench_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "pagebench_cli::config";
pub const TRACING_TARGET_CONNECTION: &str = "pagebench_cli::connection";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();
    cli.validate().context("invalid configuration")?;

    match cli.command {
        Command::Query(args) => command::run_query(args).await,
        Command::Seed(args) => command::run_seed(args).await,
    }
}
