//! Seeding errors.

use thiserror::Error;

/// Result type for seeding operations.
pub type Result<T, E = SeedError> = std::result::Result<T, E>;

/// Errors that stop a seeding run.
///
/// Failed bulk writes are not among them; they are counted in the report.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Generator settings are out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A date in the generated range could not be computed.
    #[error("date arithmetic failed: {0}")]
    Date(#[from] jiff::Error),

    /// A record could not be turned into a document.
    #[error("failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),
}
