//! Structured error handling for search engine operations.

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while talking to a search engine.
///
/// An empty page is never an error; it is the normal end-of-results signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Input validation failed before any request was issued.
    InvalidInput,
    /// Connection, timeout or other transport-level failure.
    Transport,
    /// The scroll cursor or point-in-time snapshot no longer exists.
    CursorExpired,
    /// The engine rejected the query as malformed.
    QueryRejected,
    /// Credentials were missing or rejected.
    Authentication,
    /// The index or handle does not exist.
    NotFound,
    /// The engine is overloaded or temporarily unavailable.
    ServiceUnavailable,
    /// A request or response body could not be (de)serialized.
    Serialization,
    /// Client configuration is invalid.
    Configuration,
    /// Unknown error occurred.
    #[default]
    Unknown,
}

impl ErrorKind {
    /// Check if this error kind is typically transient.
    ///
    /// Nothing in this workspace retries automatically; the flag only
    /// informs callers that decide to.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport | Self::ServiceUnavailable)
    }
}

/// Structured error type with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<String>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
    /// Additional context information.
    pub context: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
            context: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
            context: None,
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a transport error.
    pub fn transport() -> Self {
        Self::new(ErrorKind::Transport)
    }

    /// Creates a cursor-expired error.
    pub fn cursor_expired() -> Self {
        Self::new(ErrorKind::CursorExpired)
    }

    /// Creates a query-rejected error.
    pub fn query_rejected() -> Self {
        Self::new(ErrorKind::QueryRejected)
    }

    /// Creates a not-found error.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// Creates a serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds context to the error.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns true if the cursor or snapshot this request relied on is gone.
    #[must_use]
    pub const fn is_cursor_expired(&self) -> bool {
        matches!(self.kind, ErrorKind::CursorExpired)
    }

    /// Check if this error is transient based on its kind.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::from_source(ErrorKind::Serialization, error).with_message("Invalid JSON payload")
    }
}
