//! Arguments of the `seed` subcommand.

use anyhow::Context;
use clap::Args;
use pagebench_search::elasticsearch::ElasticsearchConfig;
use pagebench_seed::SeedConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Seeding run configuration.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct SeedArgs {
    /// Cluster connection.
    #[clap(flatten)]
    pub elasticsearch: ElasticsearchConfig,

    /// Data volumes and bulk batching.
    #[clap(flatten)]
    pub seed: SeedConfig,

    /// Print the report to stdout as JSON
    #[arg(long)]
    #[serde(default)]
    pub json: bool,
}

impl SeedArgs {
    /// Validates every configuration group.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.elasticsearch
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid Elasticsearch configuration")?;
        self.seed
            .validate()
            .context("invalid seed configuration")?;
        Ok(())
    }

    /// Logs the run configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            es_url = %self.elasticsearch.es_url,
            account_index = %self.seed.account_index,
            position_index = %self.seed.position_index,
            total_docs = self.seed.total_docs,
            num_accounts = self.seed.num_accounts,
            batch_size = self.seed.batch_size,
            max_concurrent_batches = self.seed.max_concurrent_batches,
            seed = ?self.seed.seed,
            "Seed configuration"
        );
    }
}
