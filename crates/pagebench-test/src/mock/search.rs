//! In-memory search provider for testing.

use std::collections::HashMap;
use std::sync::Arc;

use pagebench_search::{
    BulkRequest, BulkResponse, Error, ErrorKind, Hit, KeepAlive, PointInTimeId, Result, ScrollId,
    SearchProvider, SearchRequest, SearchResponse, ServiceHealth, SortKey, TotalHits, lookup_path,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::projection::project;

/// Configuration for the in-memory search provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockSearchConfig {
    /// Hand out a fresh point-in-time id with every page; the previous id
    /// stops working.
    #[serde(default)]
    pub rotate_point_in_time_ids: bool,
}

/// Number of calls the provider received, per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub search: usize,
    pub scroll: usize,
    pub clear_scroll: usize,
    pub open_point_in_time: usize,
    pub close_point_in_time: usize,
    pub bulk: usize,
}

impl CallCounts {
    /// Page requests of any kind.
    pub fn page_requests(&self) -> usize {
        self.search + self.scroll
    }
}

#[derive(Debug)]
struct Cursor {
    hits: Vec<Hit>,
    position: usize,
    page_size: usize,
}

#[derive(Debug)]
struct Snapshot {
    documents: Vec<Value>,
}

#[derive(Debug, Default)]
struct State {
    indices: HashMap<String, Vec<Value>>,
    scrolls: HashMap<String, Cursor>,
    snapshots: HashMap<String, Snapshot>,
    next_handle: u64,

    calls: CallCounts,
    searches: Vec<SearchRequest>,

    page_faults: HashMap<usize, ErrorKind>,
    open_fault: Option<ErrorKind>,
    failing_releases: bool,
    failing_bulks: usize,
}

impl State {
    fn next_handle(&mut self, prefix: &str) -> String {
        self.next_handle += 1;
        format!("{prefix}-{}", self.next_handle)
    }

    /// Consumes the fault registered for the current page request, if any.
    fn take_page_fault(&mut self) -> Option<Error> {
        let request = self.calls.page_requests();
        self.page_faults
            .remove(&request)
            .map(|kind| Error::new(kind).with_message(format!("injected fault on page request {request}")))
    }
}

/// In-memory search provider for testing.
///
/// Documents are kept per index in insertion order, which doubles as the
/// `_doc` order used for point-in-time sort keys. Scroll cursors hold the
/// full match list taken at open time; snapshots hold a copy of the index.
#[derive(Clone, Default, Debug)]
pub struct InMemorySearchProvider {
    config: MockSearchConfig,
    state: Arc<Mutex<State>>,
}

impl InMemorySearchProvider {
    /// Creates a new in-memory provider with the given configuration.
    pub fn new(config: MockSearchConfig) -> Self {
        Self {
            config,
            state: Arc::default(),
        }
    }

    /// Appends documents to an index, creating it if needed.
    pub async fn index_documents<I>(&self, index: &str, documents: I)
    where
        I: IntoIterator<Item = Value>,
    {
        let mut state = self.state.lock().await;
        state
            .indices
            .entry(index.to_owned())
            .or_default()
            .extend(documents);
    }

    /// Creates an empty index.
    pub async fn create_index(&self, index: &str) {
        self.index_documents(index, []).await;
    }

    /// Returns the documents stored in an index.
    pub async fn documents(&self, index: &str) -> Vec<Value> {
        let state = self.state.lock().await;
        state.indices.get(index).cloned().unwrap_or_default()
    }

    /// Makes the n-th page request from now fail with the given kind.
    ///
    /// Page requests are searches and scroll continuations; `n` starts at 1.
    pub async fn fail_page_request(&self, n: usize, kind: ErrorKind) {
        let mut state = self.state.lock().await;
        let at = state.calls.page_requests() + n;
        state.page_faults.insert(at, kind);
    }

    /// Makes the next point-in-time open fail with the given kind.
    pub async fn fail_next_open(&self, kind: ErrorKind) {
        self.state.lock().await.open_fault = Some(kind);
    }

    /// Makes every scroll clear and snapshot close fail.
    pub async fn fail_releases(&self) {
        self.state.lock().await.failing_releases = true;
    }

    /// Makes the next `count` bulk writes fail.
    pub async fn fail_bulk_requests(&self, count: usize) {
        self.state.lock().await.failing_bulks = count;
    }

    /// Drops every open scroll cursor and snapshot, as if they timed out.
    pub async fn expire_cursors(&self) {
        let mut state = self.state.lock().await;
        state.scrolls.clear();
        state.snapshots.clear();
    }

    /// Returns how many calls each operation received.
    pub async fn calls(&self) -> CallCounts {
        self.state.lock().await.calls
    }

    /// Returns every search request received, in order.
    pub async fn searches(&self) -> Vec<SearchRequest> {
        self.state.lock().await.searches.clone()
    }

    /// Returns the number of scroll cursors and snapshots still open.
    pub async fn open_handles(&self) -> usize {
        let state = self.state.lock().await;
        state.scrolls.len() + state.snapshots.len()
    }

    fn search_snapshot(
        &self,
        state: &mut State,
        request: &SearchRequest,
        id: &PointInTimeId,
    ) -> Result<SearchResponse> {
        let snapshot = state
            .snapshots
            .remove(id.as_str())
            .ok_or_else(|| {
                Error::cursor_expired().with_message(format!("no point-in-time with id [{id}]"))
            })?;

        let after = request
            .search_after
            .as_ref()
            .and_then(|key| key.values().first())
            .and_then(Value::as_u64);

        let matched: Vec<(usize, &Value)> = snapshot
            .documents
            .iter()
            .enumerate()
            .filter(|(_, document)| matches(request, document))
            .collect();
        let total = matched.len() as u64;

        let hits = matched
            .into_iter()
            .filter(|(position, _)| after.is_none_or(|after| *position as u64 > after))
            .take(request.size as usize)
            .map(|(position, document)| {
                Hit::new(project(document, &request.projection))
                    .with_sort(SortKey::new(vec![json!(position)]))
            })
            .collect();

        let id = if self.config.rotate_point_in_time_ids {
            state.next_handle("pit")
        } else {
            id.as_str().to_owned()
        };
        state.snapshots.insert(id.clone(), snapshot);

        Ok(SearchResponse {
            point_in_time_id: Some(PointInTimeId::new(id)),
            total: Some(TotalHits::exact(total)),
            hits,
            ..Default::default()
        })
    }

    fn search_index(
        &self,
        state: &mut State,
        request: &SearchRequest,
        index: &str,
    ) -> Result<SearchResponse> {
        let documents = state.indices.get(index).ok_or_else(|| {
            Error::not_found()
                .with_message(format!("no such index [{index}]"))
                .with_context("index_not_found_exception")
        })?;

        let hits: Vec<Hit> = documents
            .iter()
            .filter(|document| matches(request, document))
            .map(|document| Hit::new(project(document, &request.projection)))
            .collect();
        let total = Some(TotalHits::exact(hits.len() as u64));
        let page_size = request.size as usize;

        if request.scroll.is_none() {
            return Ok(SearchResponse {
                total,
                hits: hits.into_iter().take(page_size).collect(),
                ..Default::default()
            });
        }

        let mut cursor = Cursor {
            hits,
            position: 0,
            page_size,
        };
        let page = cursor.next_page();
        let scroll_id = state.next_handle("scroll");
        state.scrolls.insert(scroll_id.clone(), cursor);

        Ok(SearchResponse {
            scroll_id: Some(ScrollId::new(scroll_id)),
            total,
            hits: page,
            ..Default::default()
        })
    }
}

impl Cursor {
    fn next_page(&mut self) -> Vec<Hit> {
        let end = (self.position + self.page_size).min(self.hits.len());
        let page = self.hits[self.position..end].to_vec();
        self.position = end;
        page
    }
}

fn matches(request: &SearchRequest, document: &Value) -> bool {
    lookup_path(document, request.predicate.field())
        .is_some_and(|value| request.predicate.accepts(value))
}

#[async_trait::async_trait]
impl SearchProvider for InMemorySearchProvider {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let mut state = self.state.lock().await;
        state.calls.search += 1;
        state.searches.push(request.clone());

        if let Some(error) = state.take_page_fault() {
            if error.kind == ErrorKind::CursorExpired
                && let Some(pit) = &request.point_in_time
            {
                state.snapshots.remove(pit.id.as_str());
            }
            return Err(error);
        }

        match (&request.point_in_time, &request.index) {
            (Some(pit), _) => self.search_snapshot(&mut state, request, &pit.id),
            (None, Some(index)) => self.search_index(&mut state, request, index),
            (None, None) => {
                Err(Error::query_rejected().with_message("search needs an index or a point-in-time"))
            }
        }
    }

    async fn scroll(&self, scroll_id: &ScrollId, _keep_alive: KeepAlive) -> Result<SearchResponse> {
        let mut state = self.state.lock().await;
        state.calls.scroll += 1;

        if let Some(error) = state.take_page_fault() {
            if error.kind == ErrorKind::CursorExpired {
                state.scrolls.remove(scroll_id.as_str());
            }
            return Err(error);
        }

        let cursor = state.scrolls.get_mut(scroll_id.as_str()).ok_or_else(|| {
            Error::cursor_expired()
                .with_message(format!("No search context found for id [{scroll_id}]"))
                .with_context("search_context_missing_exception")
        })?;

        let total = Some(TotalHits::exact(cursor.hits.len() as u64));
        let hits = cursor.next_page();

        Ok(SearchResponse {
            scroll_id: Some(scroll_id.clone()),
            total,
            hits,
            ..Default::default()
        })
    }

    async fn clear_scroll(&self, scroll_id: &ScrollId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.clear_scroll += 1;

        if state.failing_releases {
            return Err(Error::transport().with_message("injected release failure"));
        }

        state.scrolls.remove(scroll_id.as_str());
        Ok(())
    }

    async fn open_point_in_time(&self, index: &str, _keep_alive: KeepAlive) -> Result<PointInTimeId> {
        let mut state = self.state.lock().await;
        state.calls.open_point_in_time += 1;

        if let Some(kind) = state.open_fault.take() {
            return Err(Error::new(kind).with_message("injected open failure"));
        }

        let documents = state.indices.get(index).cloned().ok_or_else(|| {
            Error::not_found()
                .with_message(format!("no such index [{index}]"))
                .with_context("index_not_found_exception")
        })?;

        let id = state.next_handle("pit");
        state.snapshots.insert(id.clone(), Snapshot { documents });
        Ok(PointInTimeId::new(id))
    }

    async fn close_point_in_time(&self, id: &PointInTimeId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.close_point_in_time += 1;

        if state.failing_releases {
            return Err(Error::transport().with_message("injected release failure"));
        }

        state.snapshots.remove(id.as_str());
        Ok(())
    }

    async fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse> {
        let mut state = self.state.lock().await;
        state.calls.bulk += 1;

        if state.failing_bulks > 0 {
            state.failing_bulks -= 1;
            return Err(Error::transport().with_message("injected bulk failure"));
        }

        for operation in request.operations() {
            state
                .indices
                .entry(operation.index.clone())
                .or_default()
                .push(operation.document.clone());
        }

        Ok(BulkResponse {
            errors: false,
            items: request.len(),
            failed_items: 0,
            took_ms: Some(0),
        })
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(ServiceHealth::healthy())
    }
}

#[cfg(test)]
mod tests {
    use pagebench_search::{
        BulkOperation, PointInTime, Predicate, Projection, SearchService, SortField,
    };

    use super::*;

    fn account(id: usize, system: &str) -> Value {
        json!({ "Account": { "accountId": format!("account_{id}"), "businessSystemCode": system } })
    }

    async fn seeded() -> (SearchService, InMemorySearchProvider) {
        let provider = InMemorySearchProvider::default();
        provider
            .index_documents(
                "accounts",
                (0..7).map(|i| account(i, if i % 2 == 0 { "system_1" } else { "system_2" })),
            )
            .await;
        (SearchService::new(provider.clone()), provider)
    }

    fn by_system(size: u32) -> SearchRequest {
        SearchRequest::new(
            Predicate::term("Account.businessSystemCode", "system_1"),
            Projection::new(["Account.accountId"]),
            size,
        )
    }

    #[tokio::test]
    async fn test_scroll_pages_through_matches() {
        let (service, provider) = seeded().await;
        let request = by_system(3).on_index("accounts").with_scroll(KeepAlive::DEFAULT);

        let first = service.search(&request).await.unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first.total, Some(TotalHits::exact(4)));
        assert_eq!(
            first.hits[0].source,
            json!({ "Account": { "accountId": "account_0" } })
        );

        let scroll_id = first.scroll_id.unwrap();
        let second = service.scroll(&scroll_id, KeepAlive::DEFAULT).await.unwrap();
        assert_eq!(second.len(), 1);
        let third = service.scroll(&scroll_id, KeepAlive::DEFAULT).await.unwrap();
        assert!(third.is_empty());

        assert_eq!(provider.open_handles().await, 1);
        service.clear_scroll(&scroll_id).await.unwrap();
        assert_eq!(provider.open_handles().await, 0);
    }

    #[tokio::test]
    async fn test_snapshot_ignores_later_writes() {
        let (service, provider) = seeded().await;
        let id = service
            .open_point_in_time("accounts", KeepAlive::DEFAULT)
            .await
            .unwrap();

        provider
            .index_documents("accounts", [account(100, "system_1")])
            .await;

        let request = by_system(10)
            .within(PointInTime::new(id.clone(), KeepAlive::DEFAULT))
            .with_sort(SortField::doc_order());
        let page = service.search(&request).await.unwrap();
        assert_eq!(page.len(), 4);

        let resumed = request.with_search_after(page.last_sort_key().cloned());
        assert!(service.search(&resumed).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rotated_snapshot_ids() {
        let provider = InMemorySearchProvider::new(MockSearchConfig {
            rotate_point_in_time_ids: true,
        });
        provider.index_documents("accounts", [account(0, "system_1")]).await;
        let service = SearchService::new(provider.clone());

        let id = service
            .open_point_in_time("accounts", KeepAlive::DEFAULT)
            .await
            .unwrap();
        let request = by_system(10)
            .within(PointInTime::new(id.clone(), KeepAlive::DEFAULT))
            .with_sort(SortField::doc_order());
        let page = service.search(&request).await.unwrap();

        let rotated = page.point_in_time_id.unwrap();
        assert_ne!(rotated, id);
        let stale = service.search(&request).await.unwrap_err();
        assert_eq!(stale.kind, ErrorKind::CursorExpired);
    }

    #[tokio::test]
    async fn test_injected_page_fault() {
        let (service, provider) = seeded().await;
        provider.fail_page_request(2, ErrorKind::CursorExpired).await;

        let request = by_system(2).on_index("accounts").with_scroll(KeepAlive::DEFAULT);
        let first = service.search(&request).await.unwrap();
        let error = service
            .scroll(first.scroll_id.as_ref().unwrap(), KeepAlive::DEFAULT)
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::CursorExpired);
        assert_eq!(provider.open_handles().await, 0);
        assert_eq!(provider.calls().await.page_requests(), 2);
    }

    #[tokio::test]
    async fn test_missing_index() {
        let (service, _) = seeded().await;
        let error = service
            .search(&by_system(10).on_index("missing"))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_expired_cursors() {
        let (service, provider) = crate::create_mock_service();
        provider
            .index_documents("accounts", (0..4).map(|i| account(i, "system_1")))
            .await;

        let first = service
            .search(&by_system(2).on_index("accounts").with_scroll(KeepAlive::DEFAULT))
            .await
            .unwrap();
        let id = service
            .open_point_in_time("accounts", KeepAlive::DEFAULT)
            .await
            .unwrap();
        assert_eq!(provider.open_handles().await, 2);

        provider.expire_cursors().await;

        let error = service
            .scroll(first.scroll_id.as_ref().unwrap(), KeepAlive::DEFAULT)
            .await
            .unwrap_err();
        assert!(error.is_cursor_expired());

        let request = by_system(2)
            .within(PointInTime::new(id, KeepAlive::DEFAULT))
            .with_sort(SortField::doc_order());
        assert!(service.search(&request).await.unwrap_err().is_cursor_expired());
    }

    #[tokio::test]
    async fn test_bulk_writes_and_failures() {
        let (service, provider) = seeded().await;
        provider.fail_bulk_requests(1).await;

        let request: BulkRequest = (0..3)
            .map(|i| BulkOperation::index("positions", json!({ "n": i })))
            .collect();

        assert!(service.bulk(&request).await.is_err());
        let response = service.bulk(&request).await.unwrap();
        assert_eq!(response.items, 3);
        assert_eq!(provider.documents("positions").await.len(), 3);
        assert_eq!(provider.calls().await.bulk, 2);
    }
}
