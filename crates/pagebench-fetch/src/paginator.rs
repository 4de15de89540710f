//! Cursor-based pagination over scroll cursors and point-in-time snapshots.

use std::time::Instant;

use pagebench_search::{
    PointInTime, PointInTimeId, ScrollId, SearchResponse, SearchService, SortField, TotalHits,
};
use serde_json::Value;

use crate::{
    FetchError, FetchOutcome, PaginatorConfig, Progress, Query, Result, Strategy,
    TRACING_TARGET_PAGINATOR,
};

/// Drains every page of a query.
///
/// Requests are strictly sequential. The cursor or snapshot is released on
/// every exit path for which the engine handed out a handle; release
/// failures are logged and never override the query's own result.
#[derive(Debug, Clone)]
pub struct Paginator {
    service: SearchService,
    config: PaginatorConfig,
}

/// An open point-in-time snapshot, tracking the newest id the engine returned.
#[derive(Debug)]
pub(crate) struct Snapshot {
    id: PointInTimeId,
    phase: String,
}

impl Paginator {
    /// Creates a paginator after validating its settings.
    pub fn new(service: SearchService, config: PaginatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { service, config })
    }

    /// Returns the paginator settings.
    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    /// Returns the search service pages are fetched through.
    pub fn service(&self) -> &SearchService {
        &self.service
    }

    /// Fetches all documents matching `query` with the configured strategy.
    ///
    /// On failure nothing collected so far is returned; the error carries
    /// the progress counters instead.
    pub async fn fetch(&self, query: &Query) -> Result<FetchOutcome> {
        let started_at = Instant::now();

        let mut outcome = match self.config.strategy {
            Strategy::Scroll => self.fetch_scroll(query).await?,
            Strategy::PointInTime => {
                let mut snapshot = self.open_snapshot(&query.index, &query.phase).await?;
                let result = self.fetch_in_snapshot(&mut snapshot, query).await;
                self.release_snapshot(snapshot).await;
                result?
            }
        };

        outcome.elapsed = started_at.elapsed();
        tracing::debug!(
            target: TRACING_TARGET_PAGINATOR,
            phase = %query.phase,
            strategy = %self.config.strategy,
            documents = outcome.len(),
            pages = outcome.pages,
            truncated = outcome.truncated,
            elapsed_ms = outcome.elapsed.as_millis(),
            "Query drained"
        );

        Ok(outcome)
    }

    /// Opens a point-in-time snapshot over `index`.
    pub(crate) async fn open_snapshot(&self, index: &str, phase: &str) -> Result<Snapshot> {
        let id = self
            .service
            .open_point_in_time(index, self.config.keep_alive)
            .await
            .map_err(|source| FetchError::Snapshot {
                phase: phase.to_owned(),
                source,
            })?;

        Ok(Snapshot {
            id,
            phase: phase.to_owned(),
        })
    }

    /// Closes a snapshot using the newest id seen.
    pub(crate) async fn release_snapshot(&self, snapshot: Snapshot) {
        if let Err(error) = self.service.close_point_in_time(&snapshot.id).await {
            tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                phase = %snapshot.phase,
                error = %error,
                "Failed to close point-in-time snapshot"
            );
        }
    }

    /// Walks every page of `query` inside an already open snapshot.
    ///
    /// The walk always starts from the beginning of the snapshot, so one
    /// snapshot can serve several queries in turn.
    pub(crate) async fn fetch_in_snapshot(
        &self,
        snapshot: &mut Snapshot,
        query: &Query,
    ) -> Result<FetchOutcome> {
        let mut pages = Accumulator::new(&query.phase);
        let mut search_after = None;

        loop {
            if pages.reached(self.config.max_pages) {
                return Ok(pages.finish(true));
            }

            let request = query
                .page_request(self.config.page_size)
                .within(PointInTime::new(
                    snapshot.id.clone(),
                    self.config.keep_alive,
                ))
                .with_sort(SortField::doc_order())
                .with_search_after(search_after.take());

            let page = match self.service.search(&request).await {
                Ok(page) => page,
                Err(source) => return Err(pages.fail(source)),
            };

            if let Some(id) = &page.point_in_time_id {
                snapshot.id = id.clone();
            }
            if page.is_empty() {
                return Ok(pages.finish(false));
            }

            let Some(last) = page.last_sort_key().cloned() else {
                let source = pagebench_search::Error::serialization()
                    .with_message("point-in-time page carried no sort values");
                return Err(pages.fail(source));
            };
            search_after = Some(last);
            pages.push(page);
        }
    }

    /// Drains `query` with a scroll cursor and clears it afterwards.
    pub(crate) async fn fetch_scroll(&self, query: &Query) -> Result<FetchOutcome> {
        let mut pages = Accumulator::new(&query.phase);
        let request = query
            .page_request(self.config.page_size)
            .on_index(&query.index)
            .with_scroll(self.config.keep_alive);

        // No cursor exists if the opening request fails.
        let first = match self.service.search(&request).await {
            Ok(first) => first,
            Err(source) => return Err(pages.fail(source)),
        };

        let mut scroll_id = first.scroll_id.clone();
        let drained = self.drain_scroll(first, &mut scroll_id, &mut pages).await;

        if let Some(scroll_id) = &scroll_id {
            self.release_scroll(scroll_id, &query.phase).await;
        }

        match drained {
            Ok(truncated) => Ok(pages.finish(truncated)),
            Err(source) => Err(pages.fail(source)),
        }
    }

    /// Consumes pages until an empty page or the page ceiling.
    ///
    /// Returns true if the ceiling stopped the scroll. `scroll_id` always
    /// holds the latest cursor id so the caller can clear it.
    async fn drain_scroll(
        &self,
        first: SearchResponse,
        scroll_id: &mut Option<ScrollId>,
        pages: &mut Accumulator<'_>,
    ) -> pagebench_search::Result<bool> {
        let mut page = first;

        loop {
            if let Some(id) = page.scroll_id.take() {
                *scroll_id = Some(id);
            }
            if page.is_empty() {
                return Ok(false);
            }

            pages.push(page);
            if pages.reached(self.config.max_pages) {
                return Ok(true);
            }

            let Some(id) = scroll_id.as_ref() else {
                return Err(pagebench_search::Error::serialization()
                    .with_message("scroll page carried no scroll id"));
            };
            page = self.service.scroll(id, self.config.keep_alive).await?;
        }
    }

    async fn release_scroll(&self, scroll_id: &ScrollId, phase: &str) {
        if let Err(error) = self.service.clear_scroll(scroll_id).await {
            tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                phase,
                error = %error,
                "Failed to clear scroll cursor"
            );
        }
    }
}

/// Collects pages of one query and reports progress.
struct Accumulator<'a> {
    phase: &'a str,
    started_at: Instant,
    documents: Vec<Value>,
    total_hits: Option<TotalHits>,
    pages: usize,
}

impl<'a> Accumulator<'a> {
    fn new(phase: &'a str) -> Self {
        Self {
            phase,
            started_at: Instant::now(),
            documents: Vec::new(),
            total_hits: None,
            pages: 0,
        }
    }

    fn push(&mut self, page: SearchResponse) {
        if self.pages == 0 {
            self.total_hits = page.total;
        }

        self.pages += 1;
        self.documents
            .extend(page.hits.into_iter().map(|hit| hit.source));

        tracing::trace!(
            target: TRACING_TARGET_PAGINATOR,
            phase = self.phase,
            page = self.pages,
            documents = self.documents.len(),
            total = ?self.total_hits.map(|t| t.value),
            "Page consumed"
        );
    }

    fn reached(&self, max_pages: Option<usize>) -> bool {
        max_pages.is_some_and(|max| self.pages >= max)
    }

    fn progress(&self) -> Progress {
        Progress {
            pages: self.pages,
            documents: self.documents.len(),
        }
    }

    fn finish(self, truncated: bool) -> FetchOutcome {
        if truncated {
            tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                phase = self.phase,
                pages = self.pages,
                documents = self.documents.len(),
                total = ?self.total_hits.map(|t| t.value),
                "Page ceiling reached, result truncated"
            );
        }

        FetchOutcome {
            documents: self.documents,
            total_hits: self.total_hits,
            pages: self.pages,
            elapsed: self.started_at.elapsed(),
            truncated,
        }
    }

    fn fail(self, source: pagebench_search::Error) -> FetchError {
        let progress = self.progress();
        tracing::warn!(
            target: TRACING_TARGET_PAGINATOR,
            phase = self.phase,
            pages = progress.pages,
            documents = progress.documents,
            error = %source,
            "Query failed, discarding collected documents"
        );

        FetchError::Page {
            phase: self.phase.to_owned(),
            progress,
            source,
        }
    }
}
