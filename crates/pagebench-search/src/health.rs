//! Health reporting for search backends.

use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Represents the operational status of a search backend.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    /// All shards are allocated.
    #[default]
    Healthy,
    /// Searches work but the cluster is not fully replicated.
    Degraded,
    /// Some data is unavailable.
    Unhealthy,
}

/// Health information for a search backend.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Current service status
    pub status: ServiceStatus,
    /// Response time for the health check
    pub response: Option<Duration>,
    /// Optional message describing the current state
    pub message: Option<String>,
    /// Timestamp when the health check was performed
    pub checked_at: Timestamp,
}

impl ServiceHealth {
    /// Creates a new healthy report.
    pub fn healthy() -> Self {
        Self {
            status: ServiceStatus::Healthy,
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    /// Creates a new degraded report.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Degraded,
            message: Some(message.into()),
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    /// Creates a new unhealthy report.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Unhealthy,
            message: Some(message.into()),
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    /// Sets the response time for this health check.
    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response = Some(response_time);
        self
    }

    /// Returns true unless the backend reported itself unhealthy.
    pub fn is_usable(&self) -> bool {
        self.status != ServiceStatus::Unhealthy
    }
}
