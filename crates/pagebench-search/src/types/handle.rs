//! Opaque cursor handles and sort keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server-held scroll cursor id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrollId(String);

impl ScrollId {
    /// Wraps a raw scroll id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScrollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time snapshot id.
///
/// The engine may hand back a new id with every page; the latest one wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointInTimeId(String);

impl PointInTimeId {
    /// Wraps a raw point-in-time id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointInTimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sort values of a hit, fed back as `search_after` to resume after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortKey(Vec<Value>);

impl SortKey {
    /// Creates a sort key from its values.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Returns the sort values.
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Returns true if the key has no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
