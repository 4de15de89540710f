//! Benchmark reports.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{FanOutOutcome, FetchOutcome, Strategy};

/// Timing and counts of one phase of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: String,
    pub documents: usize,
    pub pages: usize,
    /// Fan-out chunks, if the phase was a fan-out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_chunks: Vec<usize>,
    pub truncated: bool,
    pub elapsed_ms: u64,
}

impl PhaseReport {
    pub(crate) fn from_fetch(phase: &str, outcome: &FetchOutcome) -> Self {
        Self {
            phase: phase.to_owned(),
            documents: outcome.len(),
            pages: outcome.pages,
            chunks: None,
            skipped_chunks: Vec::new(),
            truncated: outcome.truncated,
            elapsed_ms: millis(outcome.elapsed),
        }
    }

    pub(crate) fn from_fan_out(phase: &str, outcome: &FanOutOutcome) -> Self {
        Self {
            phase: phase.to_owned(),
            documents: outcome.len(),
            pages: outcome.pages,
            chunks: Some(outcome.chunks),
            skipped_chunks: outcome.skipped_chunks.clone(),
            truncated: outcome.truncated,
            elapsed_ms: millis(outcome.elapsed),
        }
    }

    /// Returns true if nothing was skipped or truncated.
    pub fn is_complete(&self) -> bool {
        self.skipped_chunks.is_empty() && !self.truncated
    }
}

/// Result of one benchmark query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryReport {
    pub name: String,
    /// Records the query produced: account ids for query 1, positions for
    /// query 2.
    pub documents: usize,
    pub elapsed_ms: u64,
    pub phases: Vec<PhaseReport>,
}

impl QueryReport {
    pub(crate) fn new(name: &str, documents: usize, elapsed: Duration) -> Self {
        Self {
            name: name.to_owned(),
            documents,
            elapsed_ms: millis(elapsed),
            phases: Vec::new(),
        }
    }

    #[must_use]
    pub(crate) fn with_phase(mut self, phase: PhaseReport) -> Self {
        self.phases.push(phase);
        self
    }

    /// Returns true if every phase ran to completion.
    pub fn is_complete(&self) -> bool {
        self.phases.iter().all(PhaseReport::is_complete)
    }
}

/// Both queries side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub strategy: Strategy,
    pub predicate: String,
    pub query1: QueryReport,
    pub query2: QueryReport,
    /// `query2 - query1` in milliseconds; negative when query 2 was faster.
    pub difference_ms: i64,
}

impl BenchmarkReport {
    pub(crate) fn new(
        strategy: Strategy,
        predicate: &str,
        query1: QueryReport,
        query2: QueryReport,
    ) -> Self {
        let difference_ms = i64::try_from(query2.elapsed_ms)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(query1.elapsed_ms).unwrap_or(i64::MAX));

        Self {
            strategy,
            predicate: predicate.to_owned(),
            query1,
            query2,
            difference_ms,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
