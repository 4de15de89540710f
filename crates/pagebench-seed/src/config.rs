//! Generator and submission settings.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Result, SeedError};

/// Settings for a seeding run.
///
/// Defaults reproduce the large benchmark data set: one million positions
/// spread over ten thousand accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
pub struct SeedConfig {
    /// Account-domain index written to
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PAGEBENCH_ACCOUNT_INDEX", default_value = "1lg_benchmark-accounts-domain")
    )]
    pub account_index: String,

    /// Position superindex written to
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PAGEBENCH_POSITION_INDEX", default_value = "1lg_benchmark_supidx_position")
    )]
    pub position_index: String,

    /// Stop after this many positions
    #[cfg_attr(feature = "config", arg(long, default_value_t = 1_000_000))]
    pub total_docs: usize,

    /// Number of accounts to generate
    #[cfg_attr(feature = "config", arg(long, default_value_t = 10_000))]
    pub num_accounts: usize,

    /// Number of distinct position ids
    #[cfg_attr(feature = "config", arg(long, default_value_t = 15_000))]
    pub num_positions: usize,

    /// Number of distinct dates drawn from 2020-01-01..=2023-12-31
    #[cfg_attr(feature = "config", arg(long, default_value_t = 365))]
    pub num_dates: usize,

    /// Number of distinct instruments
    #[cfg_attr(feature = "config", arg(long, default_value_t = 100))]
    pub num_instruments: usize,

    /// Fewest positions per account
    #[cfg_attr(feature = "config", arg(long, default_value_t = 2_000))]
    pub min_positions: usize,

    /// Most positions per account
    #[cfg_attr(feature = "config", arg(long, default_value_t = 5_000))]
    pub max_positions: usize,

    /// Documents per bulk request
    #[cfg_attr(feature = "config", arg(long, default_value_t = 2_000))]
    pub batch_size: usize,

    /// Bulk requests submitted concurrently
    #[cfg_attr(feature = "config", arg(long, default_value_t = 5))]
    pub max_concurrent_batches: usize,

    /// Random seed for reproducible data
    #[cfg_attr(feature = "config", arg(long, env = "PAGEBENCH_SEED"))]
    pub seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            account_index: "1lg_benchmark-accounts-domain".to_owned(),
            position_index: "1lg_benchmark_supidx_position".to_owned(),
            total_docs: 1_000_000,
            num_accounts: 10_000,
            num_positions: 15_000,
            num_dates: 365,
            num_instruments: 100,
            min_positions: 2_000,
            max_positions: 5_000,
            batch_size: 2_000,
            max_concurrent_batches: 5,
            seed: None,
        }
    }
}

impl SeedConfig {
    /// Sets the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the index names.
    #[must_use]
    pub fn with_indices(
        mut self,
        account_index: impl Into<String>,
        position_index: impl Into<String>,
    ) -> Self {
        self.account_index = account_index.into();
        self.position_index = position_index.into();
        self
    }

    /// Sets the account count and positions-per-account range.
    #[must_use]
    pub fn with_accounts(mut self, accounts: usize, min_positions: usize, max_positions: usize) -> Self {
        self.num_accounts = accounts;
        self.min_positions = min_positions;
        self.max_positions = max_positions;
        self
    }

    /// Sets the position cap.
    #[must_use]
    pub fn with_total_docs(mut self, total_docs: usize) -> Self {
        self.total_docs = total_docs;
        self
    }

    /// Sets the batch size and submission concurrency.
    #[must_use]
    pub fn with_batching(mut self, batch_size: usize, max_concurrent_batches: usize) -> Self {
        self.batch_size = batch_size;
        self.max_concurrent_batches = max_concurrent_batches;
        self
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("num_positions", self.num_positions),
            ("num_dates", self.num_dates),
            ("num_instruments", self.num_instruments),
            ("batch_size", self.batch_size),
            ("max_concurrent_batches", self.max_concurrent_batches),
        ];

        for (name, value) in positive {
            if value == 0 {
                return Err(SeedError::Config(format!("{name} must be positive")));
            }
        }

        if self.min_positions > self.max_positions {
            return Err(SeedError::Config(format!(
                "min_positions ({}) exceeds max_positions ({})",
                self.min_positions, self.max_positions
            )));
        }

        if self.account_index.is_empty() || self.position_index.is_empty() {
            return Err(SeedError::Config("index names cannot be empty".into()));
        }

        if self.account_index == self.position_index {
            return Err(SeedError::Config(
                "account and position indices must differ".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SeedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_docs, 1_000_000);
        assert_eq!(config.batch_size, 2_000);
    }

    #[test]
    fn test_invalid_ranges() {
        let inverted = SeedConfig::default().with_accounts(10, 5, 2);
        assert!(matches!(inverted.validate(), Err(SeedError::Config(_))));

        let no_batches = SeedConfig::default().with_batching(0, 5);
        assert!(no_batches.validate().is_err());

        let same_index = SeedConfig::default().with_indices("a", "a");
        assert!(same_index.validate().is_err());
    }
}
