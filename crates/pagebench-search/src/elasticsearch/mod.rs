//! Reqwest-based Elasticsearch REST client.
//!
//! This module provides an implementation of the [`SearchProvider`] trait
//! against the Elasticsearch (or OpenSearch-compatible) REST API.
//!
//! # Example
//!
//! ```rust,ignore
//! use pagebench_search::elasticsearch::{ElasticsearchClient, ElasticsearchConfig};
//!
//! let config = ElasticsearchConfig::new("https://localhost:9200")
//!     .with_credentials("elastic", "changeme")
//!     .with_invalid_certs_accepted();
//!
//! // Convert to a service for dependency injection
//! let service = ElasticsearchClient::new(config)?.into_service();
//! ```
//!
//! [`SearchProvider`]: crate::SearchProvider

mod client;
mod config;
mod error;
mod wire;

pub use client::ElasticsearchClient;
pub use config::{DEFAULT_TIMEOUT_SECS, DEFAULT_URL, ElasticsearchConfig};
pub use error::{Error, Result};

/// Tracing target for Elasticsearch client operations.
pub const TRACING_TARGET: &str = "pagebench_search::elasticsearch";
