#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod fanout;
mod outcome;
mod paginator;
mod query;

pub mod scenario;

pub use config::{FailurePolicy, FanOutConfig, PaginatorConfig, Strategy};
pub use error::{FetchError, Progress, Result};
pub use fanout::{DependentQuery, FanOut, FanOutOutcome};
pub use outcome::{FetchOutcome, IdentifierSet};
pub use paginator::Paginator;
pub use query::Query;

/// Tracing target for page-by-page retrieval.
pub const TRACING_TARGET_PAGINATOR: &str = "pagebench_fetch::paginator";

/// Tracing target for chunked dependent queries.
pub const TRACING_TARGET_FANOUT: &str = "pagebench_fetch::fanout";

/// Tracing target for benchmark runs.
pub const TRACING_TARGET_SCENARIO: &str = "pagebench_fetch::scenario";
