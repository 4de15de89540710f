//! The two benchmark query patterns.
//!
//! - Query 1 resolves account ids straight from the position superindex.
//! - Query 2 resolves the same ids from the account-domain index (phase 2.1)
//!   and then fetches every position referencing them from the superindex
//!   (phase 2.2).

mod config;
mod report;

use std::time::Instant;

use pagebench_search::{Predicate, Projection, SearchService};

pub use self::config::{
    DEFAULT_ACCOUNT_INDEX, DEFAULT_POSITION_INDEX, DEFAULT_PREDICATE, ScenarioConfig,
};
pub use self::report::{BenchmarkReport, PhaseReport, QueryReport};
use crate::{
    DependentQuery, FanOut, FanOutConfig, FetchError, FetchOutcome, IdentifierSet, Paginator,
    PaginatorConfig, Query, Result, TRACING_TARGET_SCENARIO,
};

/// Runs the benchmark queries against one search service.
#[derive(Debug, Clone)]
pub struct Benchmark {
    paginator: Paginator,
    fan_out: FanOut,
    scenario: ScenarioConfig,
}

impl Benchmark {
    /// Creates a benchmark after validating every setting.
    pub fn new(
        service: SearchService,
        paginator: PaginatorConfig,
        fan_out: FanOutConfig,
        scenario: ScenarioConfig,
    ) -> Result<Self> {
        scenario.validate().map_err(FetchError::Config)?;
        let paginator = Paginator::new(service, paginator)?;
        let fan_out = FanOut::new(paginator.clone(), fan_out)?;

        Ok(Self {
            paginator,
            fan_out,
            scenario,
        })
    }

    /// Returns the scenario settings.
    pub fn scenario(&self) -> &ScenarioConfig {
        &self.scenario
    }

    /// Query 1: account ids matching the predicate, from the superindex.
    pub async fn query1(&self) -> Result<QueryReport> {
        let started_at = Instant::now();
        tracing::info!(
            target: TRACING_TARGET_SCENARIO,
            index = %self.scenario.position_index,
            predicate = %self.scenario.predicate,
            "Query 1: resolving account ids from the superindex"
        );

        let outcome = self
            .paginator
            .fetch(&self.account_query(&self.scenario.position_index, "query1"))
            .await?;
        let ids = self.identifiers("query1", &outcome);

        let report = QueryReport::new("query1", ids.len(), started_at.elapsed())
            .with_phase(PhaseReport::from_fetch("query1", &outcome));

        tracing::info!(
            target: TRACING_TARGET_SCENARIO,
            account_ids = report.documents,
            pages = outcome.pages,
            elapsed_ms = report.elapsed_ms,
            "Query 1 finished"
        );

        Ok(report)
    }

    /// Query 2: account ids from the account index, then their positions.
    pub async fn query2(&self) -> Result<QueryReport> {
        let started_at = Instant::now();
        tracing::info!(
            target: TRACING_TARGET_SCENARIO,
            account_index = %self.scenario.account_index,
            position_index = %self.scenario.position_index,
            predicate = %self.scenario.predicate,
            "Query 2: resolving account ids, then fetching their positions"
        );

        let outcome = self
            .paginator
            .fetch(&self.account_query(&self.scenario.account_index, "query2.1"))
            .await?;
        let ids = self.identifiers("query2.1", &outcome);
        let resolved = PhaseReport::from_fetch("query2.1", &outcome);

        tracing::info!(
            target: TRACING_TARGET_SCENARIO,
            account_ids = ids.len(),
            elapsed_ms = resolved.elapsed_ms,
            "Query 2.1 finished"
        );

        if ids.is_empty() {
            tracing::info!(
                target: TRACING_TARGET_SCENARIO,
                "No account ids found, skipping query 2.2"
            );
            return Ok(QueryReport::new("query2", 0, started_at.elapsed()).with_phase(resolved));
        }

        let positions = DependentQuery::new(
            &self.scenario.position_index,
            &self.scenario.position_account_field,
            Projection::new(self.scenario.position_fields.iter().cloned()),
        )
        .with_phase("query2.2");
        let fanned = self.fan_out.fetch(&ids.ids, &positions).await?;

        let report = QueryReport::new("query2", fanned.len(), started_at.elapsed())
            .with_phase(resolved)
            .with_phase(PhaseReport::from_fan_out("query2.2", &fanned));

        tracing::info!(
            target: TRACING_TARGET_SCENARIO,
            positions = report.documents,
            chunks = fanned.chunks,
            skipped_chunks = fanned.skipped_chunks.len(),
            elapsed_ms = report.elapsed_ms,
            "Query 2 finished"
        );

        Ok(report)
    }

    /// Runs query 1 and then query 2 and compares their durations.
    pub async fn run(&self) -> Result<BenchmarkReport> {
        let query1 = self.query1().await?;
        let query2 = self.query2().await?;

        let report = BenchmarkReport::new(
            self.paginator.config().strategy,
            &self.scenario.predicate,
            query1,
            query2,
        );

        tracing::info!(
            target: TRACING_TARGET_SCENARIO,
            strategy = %report.strategy,
            query1_ms = report.query1.elapsed_ms,
            query2_ms = report.query2.elapsed_ms,
            difference_ms = report.difference_ms,
            "Benchmark finished"
        );

        Ok(report)
    }

    fn account_query(&self, index: &str, phase: &str) -> Query {
        Query::new(
            index,
            Predicate::term(&self.scenario.predicate_field, self.scenario.predicate.as_str()),
            Projection::new([self.scenario.account_id_field.as_str()]),
        )
        .with_phase(phase)
    }

    fn identifiers(&self, phase: &str, outcome: &FetchOutcome) -> IdentifierSet {
        let ids = outcome.identifiers(&self.scenario.account_id_field);
        if ids.missing > 0 {
            tracing::warn!(
                target: TRACING_TARGET_SCENARIO,
                phase,
                missing = ids.missing,
                field = %self.scenario.account_id_field,
                "Skipped documents without an account id"
            );
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use pagebench_search::ErrorKind;
    use pagebench_test::InMemorySearchProvider;
    use serde_json::{Value, json};

    use super::*;
    use crate::{FailurePolicy, Strategy};

    const ACCOUNTS: &str = "accounts";
    const POSITIONS: &str = "positions";

    fn account(i: usize, system: &str) -> Value {
        json!({ "Account": { "accountId": format!("account_{i}"), "businessSystemCode": system } })
    }

    fn position(p: usize, a: usize, system: &str) -> Value {
        json!({
            "Account": { "accountId": format!("account_{a}"), "businessSystemCode": system },
            "Position": { "positionId": format!("position_{p}"), "accountId": format!("account_{a}") }
        })
    }

    /// Accounts 0..6; even accounts belong to `system_822`. Every account
    /// holds three positions.
    async fn seeded() -> InMemorySearchProvider {
        let provider = InMemorySearchProvider::default();
        let system = |a: usize| if a % 2 == 0 { "system_822" } else { "system_1" };

        provider
            .index_documents(ACCOUNTS, (0..6).map(|a| account(a, system(a))))
            .await;
        provider
            .index_documents(POSITIONS, (0..18).map(|p| position(p, p / 3, system(p / 3))))
            .await;
        provider
    }

    fn benchmark(provider: &InMemorySearchProvider, strategy: Strategy) -> Benchmark {
        Benchmark::new(
            SearchService::new(provider.clone()),
            PaginatorConfig::new(strategy).with_page_size(4),
            FanOutConfig::new(2),
            ScenarioConfig::default().with_indices(ACCOUNTS, POSITIONS),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_reports_both_queries() {
        for strategy in [Strategy::Scroll, Strategy::PointInTime] {
            let provider = seeded().await;

            let report = benchmark(&provider, strategy).run().await.unwrap();

            assert_eq!(report.strategy, strategy);
            assert_eq!(report.predicate, "system_822");
            // Nine superindex documents belong to the three matching accounts.
            assert_eq!(report.query1.documents, 9);
            assert_eq!(report.query2.documents, 9);
            assert_eq!(report.query2.phases.len(), 2);
            assert_eq!(report.query2.phases[0].documents, 3);
            assert_eq!(report.query2.phases[1].chunks, Some(2));
            assert!(report.query1.is_complete() && report.query2.is_complete());
            assert_eq!(
                report.difference_ms,
                report.query2.elapsed_ms as i64 - report.query1.elapsed_ms as i64
            );
            assert_eq!(provider.open_handles().await, 0);
        }
    }

    #[tokio::test]
    async fn test_unmatched_predicate_skips_fan_out() {
        let provider = seeded().await;
        let benchmark = Benchmark::new(
            SearchService::new(provider.clone()),
            PaginatorConfig::new(Strategy::PointInTime),
            FanOutConfig::default(),
            ScenarioConfig::default()
                .with_indices(ACCOUNTS, POSITIONS)
                .with_predicate("system_999"),
        )
        .unwrap();

        let report = benchmark.query2().await.unwrap();

        assert_eq!(report.documents, 0);
        assert_eq!(report.phases.len(), 1);
        // Only the account index snapshot was opened.
        assert_eq!(provider.calls().await.open_point_in_time, 1);
    }

    #[tokio::test]
    async fn test_missing_index_fails_query() {
        let provider = InMemorySearchProvider::default();
        let error = benchmark(&provider, Strategy::Scroll)
            .query1()
            .await
            .unwrap_err();
        assert_eq!(error.kind(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_skipped_chunks_are_reported() {
        let provider = seeded().await;
        let benchmark = Benchmark::new(
            SearchService::new(provider.clone()),
            PaginatorConfig::new(Strategy::Scroll).with_page_size(10),
            FanOutConfig::new(1).with_failure_policy(FailurePolicy::SkipChunk),
            ScenarioConfig::default().with_indices(ACCOUNTS, POSITIONS),
        )
        .unwrap();

        // Query 2.1 takes two page requests; fail the first chunk's opening search.
        provider
            .fail_page_request(3, ErrorKind::ServiceUnavailable)
            .await;
        let report = benchmark.query2().await.unwrap();

        assert_eq!(report.phases[1].skipped_chunks, vec![0]);
        assert_eq!(report.documents, 6);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_invalid_scenario_is_rejected() {
        let provider = InMemorySearchProvider::default();
        let result = Benchmark::new(
            SearchService::new(provider),
            PaginatorConfig::default(),
            FanOutConfig::default(),
            ScenarioConfig::default().with_predicate(" "),
        );
        assert!(matches!(result, Err(FetchError::Config(_))));
    }
}
