//! Query descriptions handed to the paginator.

use pagebench_search::{Predicate, Projection, SearchRequest};

/// A filtered, projected query over one index.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Index to search.
    pub index: String,
    /// Filter applied to every page.
    pub predicate: Predicate,
    /// Source fields to return.
    pub projection: Projection,
    /// Label attached to logs and errors.
    pub phase: String,
}

impl Query {
    /// Creates a query; the phase label defaults to the index name.
    pub fn new(index: impl Into<String>, predicate: Predicate, projection: Projection) -> Self {
        let index = index.into();
        Self {
            phase: index.clone(),
            index,
            predicate,
            projection,
        }
    }

    /// Sets the phase label.
    #[must_use]
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Builds the bare page request for this query.
    pub(crate) fn page_request(&self, size: u32) -> SearchRequest {
        SearchRequest::new(self.predicate.clone(), self.projection.clone(), size)
    }
}
