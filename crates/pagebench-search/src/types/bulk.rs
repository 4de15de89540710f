//! Bulk write request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::Result;

/// A single document to index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkOperation {
    /// Destination index.
    pub index: String,
    /// Document id; the engine assigns one when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Document body.
    pub document: Value,
}

impl BulkOperation {
    /// Creates an index operation with an engine-assigned id.
    pub fn index(index: impl Into<String>, document: Value) -> Self {
        Self {
            index: index.into(),
            id: None,
            document,
        }
    }
}

/// A batch of index operations sent in one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkRequest {
    operations: Vec<BulkOperation>,
}

impl BulkRequest {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty batch with room for `capacity` operations.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            operations: Vec::with_capacity(capacity),
        }
    }

    /// Adds an operation.
    pub fn push(&mut self, operation: BulkOperation) {
        self.operations.push(operation);
    }

    /// Returns the operations of this batch.
    pub fn operations(&self) -> &[BulkOperation] {
        &self.operations
    }

    /// Returns the number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Renders the batch as newline-delimited JSON: an action line followed
    /// by the document line, for every operation, with a trailing newline.
    pub fn to_ndjson(&self) -> Result<String> {
        let mut body = String::new();
        for operation in &self.operations {
            let action = match &operation.id {
                Some(id) => json!({ "index": { "_index": operation.index, "_id": id } }),
                None => json!({ "index": { "_index": operation.index } }),
            };
            body.push_str(&serde_json::to_string(&action)?);
            body.push('\n');
            body.push_str(&serde_json::to_string(&operation.document)?);
            body.push('\n');
        }
        Ok(body)
    }
}

impl FromIterator<BulkOperation> for BulkRequest {
    fn from_iter<T: IntoIterator<Item = BulkOperation>>(iter: T) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

/// Acknowledgment of a bulk write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResponse {
    /// True if at least one item failed.
    pub errors: bool,
    /// Number of items the engine acknowledged.
    pub items: usize,
    /// Number of items that failed.
    pub failed_items: usize,
    /// Server-side processing time in milliseconds.
    pub took_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndjson_layout() {
        let mut request = BulkRequest::new();
        request.push(BulkOperation::index(
            "accounts",
            json!({ "Account": { "accountId": "account_0" } }),
        ));
        request.push(BulkOperation {
            index: "positions".into(),
            id: Some("p-1".into()),
            document: json!({ "Position": { "positionId": "position_0" } }),
        });

        let body = request.to_ndjson().unwrap();
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], r#"{"index":{"_index":"accounts"}}"#);
        let action: Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(
            action,
            json!({ "index": { "_index": "positions", "_id": "p-1" } })
        );
        assert!(body.ends_with('\n'));
    }

    #[test]
    fn test_empty_batch_renders_nothing() {
        assert_eq!(BulkRequest::new().to_ndjson().unwrap(), "");
    }
}
