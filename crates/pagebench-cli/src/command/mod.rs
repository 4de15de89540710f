//! Subcommand execution.

mod query;
mod seed;

use anyhow::Context;
use pagebench_search::SearchService;
use pagebench_search::elasticsearch::{ElasticsearchClient, ElasticsearchConfig};

pub use self::query::run_query;
pub use self::seed::run_seed;
use crate::TRACING_TARGET_CONNECTION;

/// Connects to the cluster and verifies it can serve requests.
async fn connect(config: &ElasticsearchConfig) -> anyhow::Result<SearchService> {
    let service = ElasticsearchClient::new(config.clone())
        .context("failed to create Elasticsearch client")?
        .into_service();

    let health = service
        .health_check()
        .await
        .context("cluster health check failed")?;

    tracing::info!(
        target: TRACING_TARGET_CONNECTION,
        status = ?health.status,
        message = health.message.as_deref().unwrap_or_default(),
        response = ?health.response,
        "Connected to cluster"
    );

    if !health.is_usable() {
        anyhow::bail!(
            "cluster is unhealthy: {}",
            health.message.unwrap_or_else(|| "no details".to_owned())
        );
    }

    Ok(service)
}

/// Writes a report to stdout as pretty-printed JSON.
fn print_json<T: serde::Serialize>(report: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}
