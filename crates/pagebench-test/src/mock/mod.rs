//! Mock implementations of search backends for testing.
//!
//! The in-memory provider follows the engine's paging semantics closely
//! enough to drive paginators, fan-outs and seeders end to end without a
//! running cluster.

mod projection;
mod search;

use pagebench_search::SearchService;
pub use search::{CallCounts, InMemorySearchProvider, MockSearchConfig};

/// Creates a search service over an empty in-memory backend.
///
/// Returns the provider as well so tests can load documents, inject faults
/// and inspect call counts.
pub fn create_mock_service() -> (SearchService, InMemorySearchProvider) {
    let provider = InMemorySearchProvider::default();
    (SearchService::new(provider.clone()), provider)
}
