#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod health;
mod service;

pub mod types;

#[cfg(feature = "elasticsearch")]
#[cfg_attr(docsrs, doc(cfg(feature = "elasticsearch")))]
pub mod elasticsearch;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};
pub use service::SearchService;
pub use types::{
    BulkOperation, BulkRequest, BulkResponse, Hit, KeepAlive, MAX_RESULT_WINDOW, MAX_TERMS_COUNT,
    PointInTime, PointInTimeId, Predicate, Projection, ScrollId, SearchRequest, SearchResponse,
    SortField, SortKey, SortOrder, TotalHits, TotalHitsRelation, lookup_path,
};

/// Tracing target for search service operations.
pub const TRACING_TARGET: &str = "pagebench_search";

/// Core trait for search engine backends.
///
/// Every method maps to exactly one request against the engine; no method
/// retries on its own.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Executes a search request.
    ///
    /// A request carrying a scroll keep-alive opens a scroll cursor and the
    /// response carries its id. A request bound to a point-in-time searches
    /// that snapshot instead of a named index.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Fetches the next page of an open scroll cursor and refreshes its keep-alive.
    async fn scroll(&self, scroll_id: &ScrollId, keep_alive: KeepAlive) -> Result<SearchResponse>;

    /// Releases a scroll cursor.
    async fn clear_scroll(&self, scroll_id: &ScrollId) -> Result<()>;

    /// Opens a point-in-time snapshot over an index.
    async fn open_point_in_time(&self, index: &str, keep_alive: KeepAlive)
    -> Result<PointInTimeId>;

    /// Releases a point-in-time snapshot.
    async fn close_point_in_time(&self, id: &PointInTimeId) -> Result<()>;

    /// Writes a batch of documents.
    async fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse>;

    /// Performs a health check on the backend.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
