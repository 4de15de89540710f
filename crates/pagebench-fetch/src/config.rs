//! Pagination and fan-out settings.

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use pagebench_search::{KeepAlive, MAX_RESULT_WINDOW, MAX_TERMS_COUNT};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{FetchError, Result};

/// Default number of documents requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

/// Default number of identifiers per fan-out chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// How consecutive pages are addressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Strategy {
    /// Server-held scroll cursor, refreshed on every page.
    Scroll,
    /// Point-in-time snapshot walked with `search_after` in `_doc` order.
    #[default]
    PointInTime,
}

/// What a fan-out does when one chunk fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FailurePolicy {
    /// Fail the whole fan-out.
    #[default]
    Abort,
    /// Log the failure, record the chunk and continue.
    SkipChunk,
}

/// Settings for [`Paginator`].
///
/// [`Paginator`]: crate::Paginator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct PaginatorConfig {
    /// Pagination strategy
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PAGEBENCH_STRATEGY", value_enum, default_value_t = Strategy::PointInTime)
    )]
    #[serde(default)]
    pub strategy: Strategy,

    /// Documents requested per page
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PAGEBENCH_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)
    )]
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Keep-alive granted to scroll cursors and snapshots (e.g. 2m, 30s)
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PAGEBENCH_KEEP_ALIVE", default_value = "2m")
    )]
    #[serde(default)]
    pub keep_alive: KeepAlive,

    /// Stop after this many pages per query and mark the result truncated
    #[cfg_attr(feature = "config", arg(long, env = "PAGEBENCH_MAX_PAGES"))]
    #[serde(default)]
    pub max_pages: Option<usize>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            keep_alive: KeepAlive::DEFAULT,
            max_pages: None,
        }
    }
}

impl PaginatorConfig {
    /// Creates a configuration for the given strategy with default limits.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the keep-alive.
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: KeepAlive) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Sets the page ceiling.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_RESULT_WINDOW {
            return Err(FetchError::Config(format!(
                "page size must be between 1 and {MAX_RESULT_WINDOW}, got {}",
                self.page_size
            )));
        }

        if self.keep_alive.is_zero() {
            return Err(FetchError::Config("keep-alive cannot be zero".into()));
        }

        if self.max_pages == Some(0) {
            return Err(FetchError::Config("max pages cannot be zero".into()));
        }

        Ok(())
    }
}

/// Settings for [`FanOut`].
///
/// [`FanOut`]: crate::FanOut
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct FanOutConfig {
    /// Identifiers per dependent query
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PAGEBENCH_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)
    )]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// What to do when a chunk fails
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PAGEBENCH_FAILURE_POLICY", value_enum, default_value_t = FailurePolicy::Abort)
    )]
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl FanOutConfig {
    /// Creates a configuration with the given chunk size.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_TERMS_COUNT {
            return Err(FetchError::Config(format!(
                "chunk size must be between 1 and {MAX_TERMS_COUNT}, got {}",
                self.chunk_size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PaginatorConfig::default().validate().is_ok());
        assert!(FanOutConfig::default().validate().is_ok());
        assert_eq!(PaginatorConfig::default().keep_alive.to_string(), "2m");
    }

    #[test]
    fn test_page_size_bounds() {
        let too_large = PaginatorConfig::default().with_page_size(MAX_RESULT_WINDOW + 1);
        assert!(matches!(too_large.validate(), Err(FetchError::Config(_))));
        assert!(PaginatorConfig::default().with_page_size(0).validate().is_err());
        assert!(PaginatorConfig::default().with_max_pages(0).validate().is_err());
        assert!(
            PaginatorConfig::default()
                .with_keep_alive(KeepAlive::from_secs(0))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_chunk_size_bounds() {
        assert!(FanOutConfig::new(0).validate().is_err());
        assert!(FanOutConfig::new(MAX_TERMS_COUNT).validate().is_ok());
        assert!(FanOutConfig::new(MAX_TERMS_COUNT + 1).validate().is_err());
    }

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(Strategy::PointInTime.to_string(), "point-in-time");
        assert_eq!("scroll".parse::<Strategy>().unwrap(), Strategy::Scroll);
        assert_eq!(
            "skip-chunk".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::SkipChunk
        );
    }
}
