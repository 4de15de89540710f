//! Bounded-parallelism bulk submission.

use std::time::{Duration, Instant};

use futures::future::join_all;
use pagebench_search::{BulkOperation, BulkRequest, SearchService};
use serde::{Deserialize, Serialize};

use crate::{RecordGenerator, Result, SeedConfig, TRACING_TARGET};

/// Summary of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    /// Positions generated; each produced one document per index.
    pub documents: usize,
    /// Bulk requests submitted.
    pub batches: usize,
    /// Bulk requests that failed outright.
    pub failed_batches: usize,
    /// Items the engine rejected inside otherwise successful requests.
    pub failed_items: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SeedReport {
    /// Returns true if every batch and item was written.
    pub fn is_clean(&self) -> bool {
        self.failed_batches == 0 && self.failed_items == 0
    }
}

/// A batch being filled for one index.
struct PendingBatch {
    index: String,
    request: BulkRequest,
}

impl PendingBatch {
    fn new(index: &str, capacity: usize) -> Self {
        Self {
            index: index.to_owned(),
            request: BulkRequest::with_capacity(capacity),
        }
    }

    fn take(&mut self, capacity: usize) -> BulkRequest {
        std::mem::replace(&mut self.request, BulkRequest::with_capacity(capacity))
    }
}

/// Writes generated records to the account and position indices.
#[derive(Debug, Clone)]
pub struct Seeder {
    service: SearchService,
    config: SeedConfig,
}

impl Seeder {
    /// Creates a seeder after validating its settings.
    pub fn new(service: SearchService, config: SeedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { service, config })
    }

    /// Returns the seeder settings.
    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Generates and writes every record.
    pub async fn run(&self) -> Result<SeedReport> {
        self.run_with(RecordGenerator::new(&self.config)?).await
    }

    /// Writes the records of an existing generator.
    pub async fn run_with(&self, generator: RecordGenerator) -> Result<SeedReport> {
        let started_at = Instant::now();
        let batch_size = self.config.batch_size;
        let mut report = SeedReport::default();

        let mut accounts = PendingBatch::new(&self.config.account_index, batch_size);
        let mut positions = PendingBatch::new(&self.config.position_index, batch_size);
        let mut group = Vec::with_capacity(self.config.max_concurrent_batches);

        tracing::info!(
            target: TRACING_TARGET,
            account_index = %self.config.account_index,
            position_index = %self.config.position_index,
            total_docs = self.config.total_docs,
            batch_size,
            max_concurrent_batches = self.config.max_concurrent_batches,
            "Seeding indices"
        );

        for record in generator {
            report.documents += 1;

            for (pending, document) in [
                (&mut accounts, serde_json::to_value(&record.account)?),
                (&mut positions, serde_json::to_value(&record.position)?),
            ] {
                pending
                    .request
                    .push(BulkOperation::index(&pending.index, document));

                if pending.request.len() >= batch_size {
                    group.push(pending.take(batch_size));
                    if group.len() >= self.config.max_concurrent_batches {
                        self.submit_group(&mut group, &mut report).await;
                    }
                }
            }
        }

        for pending in [&mut accounts, &mut positions] {
            if !pending.request.is_empty() {
                group.push(pending.take(0));
                if group.len() >= self.config.max_concurrent_batches {
                    self.submit_group(&mut group, &mut report).await;
                }
            }
        }
        self.submit_group(&mut group, &mut report).await;

        report.elapsed = started_at.elapsed();
        tracing::info!(
            target: TRACING_TARGET,
            documents = report.documents,
            batches = report.batches,
            failed_batches = report.failed_batches,
            failed_items = report.failed_items,
            elapsed_ms = report.elapsed.as_millis(),
            "Seeding finished"
        );

        Ok(report)
    }

    /// Submits every queued batch concurrently and waits for all of them.
    async fn submit_group(&self, group: &mut Vec<BulkRequest>, report: &mut SeedReport) {
        if group.is_empty() {
            return;
        }

        let batches = std::mem::take(group);
        let results = join_all(batches.iter().map(|batch| self.service.bulk(batch))).await;

        for (batch, result) in batches.iter().zip(results) {
            report.batches += 1;
            match result {
                Ok(response) if response.errors => {
                    report.failed_items += response.failed_items;
                }
                Ok(_) => {}
                Err(error) => {
                    report.failed_batches += 1;
                    tracing::error!(
                        target: TRACING_TARGET,
                        documents = batch.len(),
                        error = %error,
                        "Bulk batch failed"
                    );
                }
            }
        }

        tracing::debug!(
            target: TRACING_TARGET,
            documents = report.documents,
            batches = report.batches,
            "Batch group submitted"
        );
    }
}
