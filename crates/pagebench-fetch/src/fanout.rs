//! Chunked dependent queries over a large identifier set.

use std::time::{Duration, Instant};

use pagebench_search::{Predicate, Projection};
use serde_json::Value;

use crate::paginator::Snapshot;
use crate::{
    FailurePolicy, FanOutConfig, FetchError, FetchOutcome, Paginator, Query, Result, Strategy,
    TRACING_TARGET_FANOUT,
};

/// Records of `index` whose `field` references one of a set of identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentQuery {
    /// Index holding the dependent records.
    pub index: String,
    /// Foreign-key field matched against the identifiers.
    pub field: String,
    /// Source fields to return.
    pub projection: Projection,
    /// Label attached to logs and errors.
    pub phase: String,
}

impl DependentQuery {
    /// Creates a dependent query; the phase label defaults to the index name.
    pub fn new(
        index: impl Into<String>,
        field: impl Into<String>,
        projection: Projection,
    ) -> Self {
        let index = index.into();
        Self {
            phase: index.clone(),
            index,
            field: field.into(),
            projection,
        }
    }

    /// Sets the phase label.
    #[must_use]
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    fn chunk_query(&self, chunk: usize, ids: &[String]) -> Result<Query> {
        let predicate =
            Predicate::terms(&self.field, ids.iter().cloned()).map_err(FetchError::Query)?;
        Ok(
            Query::new(&self.index, predicate, self.projection.clone())
                .with_phase(format!("{} chunk {chunk}", self.phase)),
        )
    }
}

/// Combined result of every chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FanOutOutcome {
    /// Documents of all successful chunks, in chunk order.
    pub documents: Vec<Value>,
    /// Number of chunks the identifier set was split into.
    pub chunks: usize,
    /// Indices of chunks that failed and were skipped.
    pub skipped_chunks: Vec<usize>,
    /// Pages consumed across all chunks.
    pub pages: usize,
    /// Wall-clock time spent, snapshot handling included.
    pub elapsed: Duration,
    /// True if any chunk hit the page ceiling.
    pub truncated: bool,
}

impl FanOutOutcome {
    /// Returns the number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no document was found.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns true if every chunk ran to completion.
    pub fn is_complete(&self) -> bool {
        self.skipped_chunks.is_empty() && !self.truncated
    }

    fn absorb(&mut self, outcome: FetchOutcome) {
        self.documents.extend(outcome.documents);
        self.pages += outcome.pages;
        self.truncated |= outcome.truncated;
    }
}

/// Runs one paginated `terms` query per chunk of identifiers.
///
/// With [`Strategy::PointInTime`] a single snapshot serves every chunk and
/// is closed once at the end. With [`Strategy::Scroll`] each chunk opens and
/// clears its own cursor.
#[derive(Debug, Clone)]
pub struct FanOut {
    paginator: Paginator,
    config: FanOutConfig,
}

impl FanOut {
    /// Creates a fan-out after validating its settings.
    pub fn new(paginator: Paginator, config: FanOutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { paginator, config })
    }

    /// Returns the fan-out settings.
    pub fn config(&self) -> &FanOutConfig {
        &self.config
    }

    /// Fetches every record of `query` referencing one of `ids`.
    ///
    /// Results are concatenated in chunk order without deduplication. An
    /// empty identifier set returns immediately without any request.
    pub async fn fetch(&self, ids: &[String], query: &DependentQuery) -> Result<FanOutOutcome> {
        if ids.is_empty() {
            tracing::debug!(
                target: TRACING_TARGET_FANOUT,
                phase = %query.phase,
                "No identifiers, skipping fan-out"
            );
            return Ok(FanOutOutcome::default());
        }

        let started_at = Instant::now();
        let chunks: Vec<&[String]> = ids.chunks(self.config.chunk_size).collect();

        tracing::debug!(
            target: TRACING_TARGET_FANOUT,
            phase = %query.phase,
            identifiers = ids.len(),
            chunks = chunks.len(),
            chunk_size = self.config.chunk_size,
            "Starting fan-out"
        );

        let mut outcome = match self.paginator.config().strategy {
            Strategy::Scroll => self.run_chunks(&chunks, query, None).await?,
            Strategy::PointInTime => {
                let mut snapshot = self
                    .paginator
                    .open_snapshot(&query.index, &query.phase)
                    .await?;
                let result = self.run_chunks(&chunks, query, Some(&mut snapshot)).await;
                self.paginator.release_snapshot(snapshot).await;
                result?
            }
        };

        outcome.elapsed = started_at.elapsed();
        tracing::debug!(
            target: TRACING_TARGET_FANOUT,
            phase = %query.phase,
            documents = outcome.len(),
            chunks = outcome.chunks,
            skipped = outcome.skipped_chunks.len(),
            pages = outcome.pages,
            elapsed_ms = outcome.elapsed.as_millis(),
            "Fan-out finished"
        );

        Ok(outcome)
    }

    async fn run_chunks(
        &self,
        chunks: &[&[String]],
        query: &DependentQuery,
        mut snapshot: Option<&mut Snapshot>,
    ) -> Result<FanOutOutcome> {
        let mut outcome = FanOutOutcome {
            chunks: chunks.len(),
            ..Default::default()
        };

        for (index, ids) in chunks.iter().enumerate() {
            let chunk_query = query.chunk_query(index, ids)?;
            let result = match snapshot.as_deref_mut() {
                Some(snapshot) => {
                    self.paginator
                        .fetch_in_snapshot(snapshot, &chunk_query)
                        .await
                }
                None => self.paginator.fetch_scroll(&chunk_query).await,
            };

            match result {
                Ok(chunk) => outcome.absorb(chunk),
                Err(error) => match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(FetchError::Chunk {
                            chunk: index,
                            chunks: chunks.len(),
                            source: Box::new(error),
                        });
                    }
                    FailurePolicy::SkipChunk => {
                        tracing::warn!(
                            target: TRACING_TARGET_FANOUT,
                            phase = %query.phase,
                            chunk = index,
                            identifiers = ids.len(),
                            error = %error,
                            "Chunk failed, skipping"
                        );
                        outcome.skipped_chunks.push(index);
                    }
                },
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use pagebench_search::{ErrorKind, SearchService};
    use pagebench_test::InMemorySearchProvider;
    use serde_json::json;

    use super::*;
    use crate::PaginatorConfig;

    const INDEX: &str = "positions";

    fn position(position: usize, account: usize) -> Value {
        json!({
            "Position": {
                "positionId": format!("position_{position}"),
                "accountId": format!("account_{account}"),
                "status": "status_3"
            }
        })
    }

    /// Two positions per account for `accounts` accounts.
    async fn provider_with(accounts: usize) -> InMemorySearchProvider {
        let provider = InMemorySearchProvider::default();
        let documents = (0..accounts * 2).map(|i| position(i, i / 2));
        provider.index_documents(INDEX, documents).await;
        provider
    }

    fn ids(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("account_{i}")).collect()
    }

    fn query() -> DependentQuery {
        DependentQuery::new(
            INDEX,
            "Position.accountId",
            Projection::new(["Position.positionId", "Position.accountId"]),
        )
        .with_phase("query2.2")
    }

    fn fan_out(
        provider: &InMemorySearchProvider,
        strategy: Strategy,
        config: FanOutConfig,
    ) -> FanOut {
        let service = SearchService::new(provider.clone());
        let paginator =
            Paginator::new(service, PaginatorConfig::new(strategy).with_page_size(3)).unwrap();
        FanOut::new(paginator, config).unwrap()
    }

    const STRATEGIES: [Strategy; 2] = [Strategy::Scroll, Strategy::PointInTime];

    #[tokio::test]
    async fn test_one_query_per_chunk_in_order() {
        for strategy in STRATEGIES {
            let provider = provider_with(10).await;
            let fan_out = fan_out(&provider, strategy, FanOutConfig::new(4));

            let outcome = fan_out.fetch(&ids(0..10), &query()).await.unwrap();

            assert_eq!(outcome.chunks, 3, "{strategy}");
            assert!(outcome.is_complete());
            assert_eq!(outcome.len(), 20);

            let accounts: Vec<&Value> = outcome
                .documents
                .iter()
                .map(|d| &d["Position"]["accountId"])
                .collect();
            let mut sorted = accounts.clone();
            sorted.sort_by_key(|v| v.as_str().and_then(|s| s[8..].parse::<usize>().ok()));
            assert_eq!(accounts, sorted, "{strategy}");

            // First request of each chunk carries that chunk's identifiers.
            let members: Vec<usize> = provider
                .searches()
                .await
                .iter()
                .filter(|s| s.search_after.is_none())
                .map(|s| s.predicate.member_count())
                .collect();
            assert_eq!(members, vec![4, 4, 2], "{strategy}");
        }
    }

    #[tokio::test]
    async fn test_large_identifier_set_is_split_at_chunk_size() {
        let provider = InMemorySearchProvider::default();
        provider.create_index(INDEX).await;
        let fan_out = fan_out(&provider, Strategy::Scroll, FanOutConfig::new(10_000));

        let outcome = fan_out.fetch(&ids(0..25_000), &query()).await.unwrap();

        assert!(outcome.is_empty());
        let members: Vec<usize> = provider
            .searches()
            .await
            .iter()
            .map(|s| s.predicate.member_count())
            .collect();
        assert_eq!(members, vec![10_000, 10_000, 5_000]);
    }

    #[tokio::test]
    async fn test_returns_exactly_the_dependent_records() {
        for strategy in STRATEGIES {
            let provider = provider_with(20).await;
            let fan_out = fan_out(&provider, strategy, FanOutConfig::new(3));
            let wanted = ids(5..12);

            let outcome = fan_out.fetch(&wanted, &query()).await.unwrap();

            assert_eq!(outcome.len(), wanted.len() * 2, "{strategy}");
            assert!(outcome.documents.iter().all(|d| {
                d["Position"]["accountId"]
                    .as_str()
                    .is_some_and(|id| wanted.iter().any(|w| w == id))
            }));
            assert!(outcome.documents.iter().all(|d| d["Position"].get("status").is_none()));
        }
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_requests() {
        for strategy in STRATEGIES {
            let provider = provider_with(3).await;
            let fan_out = fan_out(&provider, strategy, FanOutConfig::default());

            let outcome = fan_out.fetch(&[], &query()).await.unwrap();

            assert!(outcome.is_empty());
            assert_eq!(outcome.chunks, 0);
            let calls = provider.calls().await;
            assert_eq!(calls.page_requests(), 0);
            assert_eq!(calls.open_point_in_time, 0);
        }
    }

    #[tokio::test]
    async fn test_snapshot_is_shared_across_chunks() {
        let provider = provider_with(10).await;
        let fan_out = fan_out(&provider, Strategy::PointInTime, FanOutConfig::new(2));

        let outcome = fan_out.fetch(&ids(0..10), &query()).await.unwrap();

        assert_eq!(outcome.chunks, 5);
        let calls = provider.calls().await;
        assert_eq!(calls.open_point_in_time, 1);
        assert_eq!(calls.close_point_in_time, 1);
        assert_eq!(provider.open_handles().await, 0);
    }

    #[tokio::test]
    async fn test_scroll_chunks_each_clear_their_cursor() {
        let provider = provider_with(10).await;
        let fan_out = fan_out(&provider, Strategy::Scroll, FanOutConfig::new(2));

        fan_out.fetch(&ids(0..10), &query()).await.unwrap();

        assert_eq!(provider.calls().await.clear_scroll, 5);
        assert_eq!(provider.open_handles().await, 0);
    }

    #[tokio::test]
    async fn test_abort_policy_reports_failing_chunk() {
        for strategy in STRATEGIES {
            let provider = provider_with(10).await;
            // Chunks of 4 ids hold 8 positions: 3 pages plus the empty one.
            provider
                .fail_page_request(5, ErrorKind::ServiceUnavailable)
                .await;
            let fan_out = fan_out(&provider, strategy, FanOutConfig::new(4));

            let error = fan_out.fetch(&ids(0..10), &query()).await.unwrap_err();

            assert!(
                matches!(error, FetchError::Chunk { chunk: 1, chunks: 3, .. }),
                "{strategy}: {error}"
            );
            assert_eq!(error.kind(), Some(ErrorKind::ServiceUnavailable));
            assert_eq!(provider.open_handles().await, 0, "{strategy}");
        }
    }

    #[tokio::test]
    async fn test_skip_policy_continues_after_failure() {
        let provider = provider_with(10).await;
        provider
            .fail_page_request(5, ErrorKind::ServiceUnavailable)
            .await;
        let config = FanOutConfig::new(4).with_failure_policy(FailurePolicy::SkipChunk);
        let fan_out = fan_out(&provider, Strategy::Scroll, config);

        let outcome = fan_out.fetch(&ids(0..10), &query()).await.unwrap();

        assert_eq!(outcome.skipped_chunks, vec![1]);
        assert!(!outcome.is_complete());
        // Chunks 0 and 2 hold 8 and 4 positions.
        assert_eq!(outcome.len(), 12);
    }
}
