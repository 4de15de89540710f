//! Error types for the Elasticsearch REST client.

use reqwest::StatusCode;
use thiserror::Error;

use super::wire::ErrorBody;

/// Result type alias for Elasticsearch client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Elasticsearch client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The engine answered with a non-success status.
    #[error("HTTP {status}: {reason}")]
    Status {
        status: StatusCode,
        error_type: Option<String>,
        reason: String,
    },
}

impl Error {
    /// Builds a status error from a non-success response body.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => {
                let cause = parsed.error.primary_cause();
                Self::Status {
                    status,
                    error_type: cause.and_then(|c| c.kind.clone()),
                    reason: cause
                        .and_then(|c| c.reason.clone())
                        .unwrap_or_else(|| truncate(body)),
                }
            }
            Err(_) => Self::Status {
                status,
                error_type: None,
                reason: truncate(body),
            },
        }
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(512).collect()
}

/// Engine error types signalling that a cursor or snapshot is gone.
const CONTEXT_MISSING: &[&str] = &["search_context_missing_exception"];

impl From<Error> for crate::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    crate::Error::transport()
                        .with_message("Request timed out")
                        .with_source(e)
                } else if e.is_connect() {
                    crate::Error::transport()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.is_decode() {
                    crate::Error::serialization()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    crate::Error::transport()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => crate::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Status {
                status,
                error_type,
                reason,
            } => {
                let kind = classify(status, error_type.as_deref());
                let error = crate::Error::new(kind).with_message(format!("HTTP {status}: {reason}"));
                match error_type {
                    Some(error_type) => error.with_context(error_type),
                    None => error,
                }
            }
        }
    }
}

/// Maps an engine status and error type onto the error taxonomy.
fn classify(status: StatusCode, error_type: Option<&str>) -> crate::ErrorKind {
    use crate::ErrorKind;

    if error_type.is_some_and(|t| CONTEXT_MISSING.contains(&t)) {
        return ErrorKind::CursorExpired;
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Authentication,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::BAD_REQUEST => ErrorKind::QueryRejected,
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::Transport,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const EXPIRED_SCROLL: &str = r#"{
        "error": {
            "root_cause": [{
                "type": "search_context_missing_exception",
                "reason": "No search context found for id [1234]"
            }],
            "type": "search_phase_execution_exception",
            "reason": "all shards failed"
        },
        "status": 404
    }"#;

    #[test]
    fn test_expired_scroll_is_cursor_expired() {
        let error: crate::Error = Error::from_status(StatusCode::NOT_FOUND, EXPIRED_SCROLL).into();
        assert_eq!(error.kind, ErrorKind::CursorExpired);
        assert!(
            error
                .message
                .as_deref()
                .is_some_and(|m| m.contains("No search context found"))
        );
    }

    #[test]
    fn test_missing_index_is_not_found() {
        let body = r#"{"error":{"type":"index_not_found_exception","reason":"no such index [x]"},"status":404}"#;
        let error: crate::Error = Error::from_status(StatusCode::NOT_FOUND, body).into();
        assert_eq!(error.kind, ErrorKind::NotFound);
        assert_eq!(error.context.as_deref(), Some("index_not_found_exception"));
    }

    #[test]
    fn test_bad_request_is_query_rejected() {
        let body = r#"{"error":{"type":"parsing_exception","reason":"unknown query [trm]"},"status":400}"#;
        let error: crate::Error = Error::from_status(StatusCode::BAD_REQUEST, body).into();
        assert_eq!(error.kind, ErrorKind::QueryRejected);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            classify(StatusCode::UNAUTHORIZED, None),
            ErrorKind::Authentication
        );
        assert_eq!(
            classify(StatusCode::SERVICE_UNAVAILABLE, None),
            ErrorKind::ServiceUnavailable
        );
        assert_eq!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, None),
            ErrorKind::Transport
        );
    }

    #[test]
    fn test_unparseable_body_keeps_text() {
        let error = Error::from_status(StatusCode::BAD_GATEWAY, "upstream unavailable");
        let error: crate::Error = error.into();
        assert_eq!(error.kind, ErrorKind::ServiceUnavailable);
        assert!(
            error
                .message
                .as_deref()
                .is_some_and(|m| m.contains("upstream unavailable"))
        );
    }
}
