//! Search response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PointInTimeId, ScrollId, SortKey};

/// Whether the reported total is exact or a lower bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalHitsRelation {
    #[default]
    Eq,
    Gte,
}

/// Total-match count reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    #[serde(default)]
    pub relation: TotalHitsRelation,
}

impl TotalHits {
    /// Creates an exact total.
    pub fn exact(value: u64) -> Self {
        Self {
            value,
            relation: TotalHitsRelation::Eq,
        }
    }
}

/// One matching document reduced to its projected fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Index the document lives in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Document id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Projected source.
    #[serde(default)]
    pub source: Value,
    /// Sort values, present on sorted searches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortKey>,
}

impl Hit {
    /// Creates a hit from its source document.
    pub fn new(source: Value) -> Self {
        Self {
            index: None,
            id: None,
            source,
            sort: None,
        }
    }

    /// Attaches sort values.
    #[must_use]
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Looks up a dotted path such as `Account.accountId` in the source.
    ///
    /// A literal key containing dots takes precedence over nested lookup,
    /// since sources may be stored flattened.
    pub fn field(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.source, path)
    }
}

/// Resolves a dotted path inside a JSON document.
pub fn lookup_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let object = document.as_object()?;
    if let Some(value) = object.get(path) {
        return Some(value);
    }

    let (head, rest) = path.split_once('.')?;
    lookup_path(object.get(head)?, rest)
}

/// One page of results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Scroll cursor to continue with, if a scroll is open.
    pub scroll_id: Option<ScrollId>,
    /// Latest point-in-time id, if the search ran inside a snapshot.
    pub point_in_time_id: Option<PointInTimeId>,
    /// Advisory total-match count.
    pub total: Option<TotalHits>,
    /// Hits of this page.
    pub hits: Vec<Hit>,
    /// Server-side processing time in milliseconds.
    pub took_ms: Option<u64>,
}

impl SearchResponse {
    /// Returns true if the page carries no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the number of hits on this page.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns the sort key of the last hit, the cursor for the next page.
    pub fn last_sort_key(&self) -> Option<&SortKey> {
        self.hits.last().and_then(|hit| hit.sort.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_field_lookup_nested() {
        let hit = Hit::new(json!({ "Account": { "accountId": "account_7" } }));
        assert_eq!(hit.field("Account.accountId"), Some(&json!("account_7")));
        assert_eq!(hit.field("Account.status"), None);
        assert_eq!(hit.field("Position.accountId"), None);
    }

    #[test]
    fn test_field_lookup_flattened() {
        let hit = Hit::new(json!({ "Account.accountId": "account_9" }));
        assert_eq!(hit.field("Account.accountId"), Some(&json!("account_9")));
    }

    #[test]
    fn test_last_sort_key() {
        let response = SearchResponse {
            hits: vec![
                Hit::new(json!({})).with_sort(SortKey::new(vec![json!(1)])),
                Hit::new(json!({})).with_sort(SortKey::new(vec![json!(2)])),
            ],
            ..Default::default()
        };
        assert_eq!(
            response.last_sort_key(),
            Some(&SortKey::new(vec![json!(2)]))
        );
        assert!(SearchResponse::default().last_sort_key().is_none());
    }
}
