//! Benchmark scenario settings.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default account-domain index.
pub const DEFAULT_ACCOUNT_INDEX: &str = "1lg_benchmark-accounts-domain";

/// Default position superindex.
pub const DEFAULT_POSITION_INDEX: &str = "1lg_benchmark_supidx_position";

/// Default business-system code to resolve.
pub const DEFAULT_PREDICATE: &str = "system_822";

/// Indices, fields and the predicate value the benchmark queries use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ScenarioConfig {
    /// Account-domain index
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PAGEBENCH_ACCOUNT_INDEX", default_value = DEFAULT_ACCOUNT_INDEX)
    )]
    pub account_index: String,

    /// Position superindex
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PAGEBENCH_POSITION_INDEX", default_value = DEFAULT_POSITION_INDEX)
    )]
    pub position_index: String,

    /// Business-system code accounts are resolved by
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PAGEBENCH_PREDICATE", default_value = DEFAULT_PREDICATE)
    )]
    pub predicate: String,

    /// Field the predicate is matched against
    #[cfg_attr(
        feature = "config",
        arg(long, default_value = "Account.businessSystemCode")
    )]
    pub predicate_field: String,

    /// Account identifier field
    #[cfg_attr(feature = "config", arg(long, default_value = "Account.accountId"))]
    pub account_id_field: String,

    /// Foreign key on position documents referencing the account
    #[cfg_attr(feature = "config", arg(long, default_value = "Position.accountId"))]
    pub position_account_field: String,

    /// Position fields returned by the dependent fetch
    #[cfg_attr(
        feature = "config",
        arg(
            long,
            value_delimiter = ',',
            default_value = "Position.positionId,Position.accountId"
        )
    )]
    pub position_fields: Vec<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            account_index: DEFAULT_ACCOUNT_INDEX.to_owned(),
            position_index: DEFAULT_POSITION_INDEX.to_owned(),
            predicate: DEFAULT_PREDICATE.to_owned(),
            predicate_field: "Account.businessSystemCode".to_owned(),
            account_id_field: "Account.accountId".to_owned(),
            position_account_field: "Position.accountId".to_owned(),
            position_fields: vec![
                "Position.positionId".to_owned(),
                "Position.accountId".to_owned(),
            ],
        }
    }
}

impl ScenarioConfig {
    /// Sets the predicate value.
    #[must_use]
    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = predicate.into();
        self
    }

    /// Sets both index names.
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

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("account index", &self.account_index),
            ("position index", &self.position_index),
            ("predicate", &self.predicate),
            ("predicate field", &self.predicate_field),
            ("account id field", &self.account_id_field),
            ("position account field", &self.position_account_field),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{name} cannot be empty"));
            }
        }

        Ok(())
    }
}
