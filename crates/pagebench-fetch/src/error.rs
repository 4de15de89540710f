//! Retrieval errors.

use std::fmt;

use pagebench_search::ErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for retrieval operations.
pub type Result<T, E = FetchError> = std::result::Result<T, E>;

/// How far a query got before it failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Pages fully consumed.
    pub pages: usize,
    /// Documents collected from those pages.
    pub documents: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pages, {} documents", self.pages, self.documents)
    }
}

/// Error returned by paginators and fan-outs.
///
/// Documents collected before a failure are never returned; a failed query
/// yields only its progress counters.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Paginator or fan-out settings are out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A predicate could not be built.
    #[error("invalid query")]
    Query(#[source] pagebench_search::Error),

    /// The point-in-time snapshot could not be opened.
    #[error("{phase}: failed to open point-in-time snapshot")]
    Snapshot {
        phase: String,
        #[source]
        source: pagebench_search::Error,
    },

    /// A page request failed.
    #[error("{phase}: page request failed after {progress}")]
    Page {
        phase: String,
        progress: Progress,
        #[source]
        source: pagebench_search::Error,
    },

    /// A fan-out chunk failed and the fan-out was aborted.
    #[error("chunk {chunk} of {chunks} failed")]
    Chunk {
        chunk: usize,
        chunks: usize,
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Returns the underlying search error, if any.
    pub fn search_error(&self) -> Option<&pagebench_search::Error> {
        match self {
            Self::Config(_) => None,
            Self::Query(source) | Self::Snapshot { source, .. } | Self::Page { source, .. } => {
                Some(source)
            }
            Self::Chunk { source, .. } => source.search_error(),
        }
    }

    /// Returns the kind of the underlying search error, if any.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.search_error().map(|error| error.kind)
    }

    /// Returns true if the failure was an expired cursor or snapshot.
    pub fn is_cursor_expired(&self) -> bool {
        self.kind() == Some(ErrorKind::CursorExpired)
    }

    /// Returns the progress of the failing query, if a page request failed.
    pub fn progress(&self) -> Option<Progress> {
        match self {
            Self::Page { progress, .. } => Some(*progress),
            Self::Chunk { source, .. } => source.progress(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_error_exposes_inner_failure() {
        let error = FetchError::Chunk {
            chunk: 2,
            chunks: 3,
            source: Box::new(FetchError::Page {
                phase: "query2.2".into(),
                progress: Progress {
                    pages: 1,
                    documents: 10,
                },
                source: pagebench_search::Error::cursor_expired(),
            }),
        };

        assert!(error.is_cursor_expired());
        assert_eq!(error.progress().map(|p| p.pages), Some(1));
        assert_eq!(error.to_string(), "chunk 2 of 3 failed");
    }

    #[test]
    fn test_config_error_has_no_search_error() {
        let error = FetchError::Config("bad".into());
        assert!(error.search_error().is_none());
        assert!(!error.is_cursor_expired());
    }
}
