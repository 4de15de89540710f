//! Search service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    BulkRequest, BulkResponse, KeepAlive, PointInTimeId, Result, ScrollId, SearchProvider,
    SearchRequest, SearchResponse, ServiceHealth, TRACING_TARGET,
};

/// Search service wrapper with observability.
///
/// This wrapper adds structured logging to any [`SearchProvider`] and is the
/// handle passed down to paginators and seeders. The provider is wrapped in
/// `Arc` for cheap cloning.
#[derive(Clone)]
pub struct SearchService {
    inner: Arc<dyn SearchProvider>,
}

impl fmt::Debug for SearchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchService").finish_non_exhaustive()
    }
}

impl SearchService {
    /// Create a new search service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: SearchProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Executes a search request after validating its shape.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        request.validate()?;
        let started_at = Instant::now();

        tracing::trace!(
            target: TRACING_TARGET,
            index = ?request.index,
            size = request.size,
            scroll = request.scroll.is_some(),
            point_in_time = request.point_in_time.is_some(),
            resumed = request.search_after.is_some(),
            members = request.predicate.member_count(),
            "Executing search"
        );

        let result = self.inner.search(request).await;
        log_page("search", &result, started_at);
        result
    }

    /// Fetches the next page of a scroll cursor.
    pub async fn scroll(
        &self,
        scroll_id: &ScrollId,
        keep_alive: KeepAlive,
    ) -> Result<SearchResponse> {
        let started_at = Instant::now();
        let result = self.inner.scroll(scroll_id, keep_alive).await;
        log_page("scroll", &result, started_at);
        result
    }

    /// Releases a scroll cursor.
    pub async fn clear_scroll(&self, scroll_id: &ScrollId) -> Result<()> {
        let started_at = Instant::now();
        let result = self.inner.clear_scroll(scroll_id).await;

        tracing::debug!(
            target: TRACING_TARGET,
            success = result.is_ok(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Scroll cleared"
        );

        result
    }

    /// Opens a point-in-time snapshot.
    pub async fn open_point_in_time(
        &self,
        index: &str,
        keep_alive: KeepAlive,
    ) -> Result<PointInTimeId> {
        let started_at = Instant::now();
        let result = self.inner.open_point_in_time(index, keep_alive).await;

        match &result {
            Ok(_) => tracing::debug!(
                target: TRACING_TARGET,
                index,
                keep_alive = %keep_alive,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Point-in-time opened"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                index,
                error = %error,
                "Failed to open point-in-time"
            ),
        }

        result
    }

    /// Releases a point-in-time snapshot.
    pub async fn close_point_in_time(&self, id: &PointInTimeId) -> Result<()> {
        let started_at = Instant::now();
        let result = self.inner.close_point_in_time(id).await;

        tracing::debug!(
            target: TRACING_TARGET,
            success = result.is_ok(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Point-in-time closed"
        );

        result
    }

    /// Writes a batch of documents.
    pub async fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse> {
        let started_at = Instant::now();
        let result = self.inner.bulk(request).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(response) if response.errors => tracing::warn!(
                target: TRACING_TARGET,
                operations = request.len(),
                failed_items = response.failed_items,
                elapsed_ms = elapsed.as_millis(),
                "Bulk write completed with item errors"
            ),
            Ok(response) => tracing::debug!(
                target: TRACING_TARGET,
                operations = request.len(),
                items = response.items,
                elapsed_ms = elapsed.as_millis(),
                "Bulk write completed"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                operations = request.len(),
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Bulk write failed"
            ),
        }

        result
    }

    /// Performs a health check on the backend.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.inner.health_check().await
    }
}

fn log_page(operation: &'static str, result: &Result<SearchResponse>, started_at: Instant) {
    let elapsed = started_at.elapsed();
    match result {
        Ok(response) => tracing::trace!(
            target: TRACING_TARGET,
            operation,
            hits = response.len(),
            total = ?response.total.map(|t| t.value),
            took_ms = ?response.took_ms,
            elapsed_ms = elapsed.as_millis(),
            "Page received"
        ),
        Err(error) => tracing::warn!(
            target: TRACING_TARGET,
            operation,
            error = %error,
            elapsed_ms = elapsed.as_millis(),
            "Page request failed"
        ),
    }
}
