//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! └── command: Command
//!     ├── Query(QueryArgs)
//!     │   ├── elasticsearch: ElasticsearchConfig  # URL, credentials, TLS, timeout
//!     │   ├── paginator: PaginatorConfig          # Strategy, page size, keep-alive
//!     │   ├── fan_out: FanOutConfig               # Chunk size, failure policy
//!     │   └── scenario: ScenarioConfig            # Indices, predicate, fields
//!     └── Seed(SeedArgs)
//!         ├── elasticsearch: ElasticsearchConfig
//!         └── seed: SeedConfig                    # Volumes, batching, seed
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod query;
mod seed;

use std::process;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub use self::query::QueryArgs;
pub use self::seed::SeedArgs;
use crate::TRACING_TARGET_STARTUP;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "pagebench")]
#[command(about = "Elasticsearch deep-pagination benchmark")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Run query 1 and query 2 and compare their durations.
    Query(QueryArgs),
    /// Populate the account and position indices with synthetic data.
    Seed(SeedArgs),
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so variables it
    /// defines act as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Query(args) => args.validate(),
            Command::Seed(args) => args.validate(),
        }
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        match &self.command {
            Command::Query(args) => args.log(),
            Command::Seed(args) => args.log(),
        }
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pagebench_fetch::{FailurePolicy, Strategy};

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pagebench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn query_defaults() {
        let Command::Query(args) = parse(&["query"]).command else {
            panic!("expected the query command");
        };

        assert_eq!(args.paginator.strategy, Strategy::PointInTime);
        assert_eq!(args.paginator.page_size, 10_000);
        assert_eq!(args.fan_out.chunk_size, 10_000);
        assert_eq!(args.fan_out.failure_policy, FailurePolicy::Abort);
        assert_eq!(args.scenario.predicate, "system_822");
        assert!(!args.json);
    }

    #[test]
    fn query_overrides() {
        let cli = parse(&[
            "query",
            "--strategy",
            "scroll",
            "--page-size",
            "500",
            "--chunk-size",
            "1000",
            "--failure-policy",
            "skip-chunk",
            "--keep-alive",
            "5m",
            "--max-pages",
            "3",
            "--predicate",
            "system_1",
            "--json",
        ]);
        let Command::Query(args) = &cli.command else {
            panic!("expected the query command");
        };

        assert_eq!(args.paginator.strategy, Strategy::Scroll);
        assert_eq!(args.paginator.page_size, 500);
        assert_eq!(args.paginator.keep_alive.to_string(), "5m");
        assert_eq!(args.paginator.max_pages, Some(3));
        assert_eq!(args.fan_out.chunk_size, 1000);
        assert_eq!(args.fan_out.failure_policy, FailurePolicy::SkipChunk);
        assert_eq!(args.scenario.predicate, "system_1");
        assert!(args.json);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn seed_arguments() {
        let cli = parse(&[
            "seed",
            "--total-docs",
            "1000",
            "--batch-size",
            "100",
            "--max-concurrent-batches",
            "2",
            "--seed",
            "42",
        ]);
        let Command::Seed(args) = &cli.command else {
            panic!("expected the seed command");
        };

        assert_eq!(args.seed.total_docs, 1000);
        assert_eq!(args.seed.batch_size, 100);
        assert_eq!(args.seed.max_concurrent_batches, 2);
        assert_eq!(args.seed.seed, Some(42));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn invalid_settings_fail_validation() {
        let cli = parse(&["query", "--page-size", "0"]);
        assert!(cli.validate().is_err());

        let cli = parse(&["seed", "--batch-size", "0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let result = Cli::try_parse_from(["pagebench", "query", "--strategy", "offset"]);
        assert!(result.is_err());
    }
}
