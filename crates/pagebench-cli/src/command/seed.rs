use anyhow::Context;
use pagebench_seed::Seeder;

use super::{connect, print_json};
use crate::config::SeedArgs;

/// Seeds both indices and reports what was written.
pub async fn run_seed(args: SeedArgs) -> anyhow::Result<()> {
    let service = connect(&args.elasticsearch).await?;

    let seeder = Seeder::new(service, args.seed).context("invalid seed configuration")?;
    let report = seeder.run().await.context("seeding failed")?;

    if args.json {
        print_json(&report)?;
    }

    Ok(())
}
