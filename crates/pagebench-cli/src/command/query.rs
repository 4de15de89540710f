use anyhow::Context;
use pagebench_fetch::scenario::Benchmark;

use super::{connect, print_json};
use crate::config::QueryArgs;

/// Runs both benchmark queries and reports their durations.
pub async fn run_query(args: QueryArgs) -> anyhow::Result<()> {
    let service = connect(&args.elasticsearch).await?;

    let benchmark = Benchmark::new(service, args.paginator, args.fan_out, args.scenario)
        .context("invalid benchmark configuration")?;
    let report = benchmark.run().await.context("benchmark failed")?;

    if args.json {
        print_json(&report)?;
    }

    Ok(())
}
