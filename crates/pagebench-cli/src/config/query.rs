//! Arguments of the `query` subcommand.

use anyhow::Context;
use clap::Args;
use pagebench_fetch::scenario::ScenarioConfig;
use pagebench_fetch::{FanOutConfig, PaginatorConfig};
use pagebench_search::elasticsearch::ElasticsearchConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Benchmark run configuration.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct QueryArgs {
    /// Cluster connection.
    #[clap(flatten)]
    pub elasticsearch: ElasticsearchConfig,

    /// Pagination strategy and page settings.
    #[clap(flatten)]
    pub paginator: PaginatorConfig,

    /// Identifier chunking for query 2.2.
    #[clap(flatten)]
    pub fan_out: FanOutConfig,

    /// Indices, predicate and fields.
    #[clap(flatten)]
    pub scenario: ScenarioConfig,

    /// Print the report to stdout as JSON
    #[arg(long)]
    #[serde(default)]
    pub json: bool,
}

impl QueryArgs {
    /// Validates every configuration group.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.elasticsearch
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid Elasticsearch configuration")?;
        self.paginator
            .validate()
            .context("invalid pagination configuration")?;
        self.fan_out
            .validate()
            .context("invalid fan-out configuration")?;
        self.scenario
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid scenario configuration")?;
        Ok(())
    }

    /// Logs the run configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            es_url = %self.elasticsearch.es_url,
            strategy = %self.paginator.strategy,
            page_size = self.paginator.page_size,
            keep_alive = %self.paginator.keep_alive,
            max_pages = ?self.paginator.max_pages,
            chunk_size = self.fan_out.chunk_size,
            failure_policy = %self.fan_out.failure_policy,
            account_index = %self.scenario.account_index,
            position_index = %self.scenario.position_index,
            predicate = %self.scenario.predicate,
            "Benchmark configuration"
        );
    }
}
