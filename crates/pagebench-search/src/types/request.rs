//! Search request construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{AsRefStr, Display};

use super::{KeepAlive, PointInTimeId, Predicate, Projection, SortKey};
use crate::{Error, Result};

/// Maximum number of hits a single page may request.
///
/// Matches the engine's default `index.max_result_window`.
pub const MAX_RESULT_WINDOW: u32 = 10_000;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A single sort clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

impl SortField {
    /// Creates a sort clause.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Index order, the cheapest deterministic sort inside a snapshot.
    pub fn doc_order() -> Self {
        Self::new("_doc", SortOrder::Asc)
    }

    fn to_clause(&self) -> Value {
        json!({ self.field.as_str(): self.order.as_ref() })
    }
}

/// Point-in-time binding of a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointInTime {
    pub id: PointInTimeId,
    pub keep_alive: KeepAlive,
}

impl PointInTime {
    /// Creates a point-in-time binding.
    pub fn new(id: PointInTimeId, keep_alive: KeepAlive) -> Self {
        Self { id, keep_alive }
    }
}

/// A single page request.
///
/// A request targets either a named index or a point-in-time snapshot, never
/// both; the snapshot already knows its index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Target index, unset for point-in-time searches.
    pub index: Option<String>,
    /// Filter predicate.
    pub predicate: Predicate,
    /// Source fields to return.
    pub projection: Projection,
    /// Page size.
    pub size: u32,
    /// Opens a scroll cursor with this keep-alive.
    pub scroll: Option<KeepAlive>,
    /// Sort clauses.
    pub sort: Vec<SortField>,
    /// Snapshot to search.
    pub point_in_time: Option<PointInTime>,
    /// Resume after this sort key.
    pub search_after: Option<SortKey>,
}

impl SearchRequest {
    /// Creates a request with the given filter, projection and page size.
    pub fn new(predicate: Predicate, projection: Projection, size: u32) -> Self {
        Self {
            index: None,
            predicate,
            projection,
            size,
            scroll: None,
            sort: Vec::new(),
            point_in_time: None,
            search_after: None,
        }
    }

    /// Targets a named index.
    #[must_use]
    pub fn on_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Opens a scroll cursor with the given keep-alive.
    #[must_use]
    pub fn with_scroll(mut self, keep_alive: KeepAlive) -> Self {
        self.scroll = Some(keep_alive);
        self
    }

    /// Searches a point-in-time snapshot.
    #[must_use]
    pub fn within(mut self, point_in_time: PointInTime) -> Self {
        self.point_in_time = Some(point_in_time);
        self
    }

    /// Appends a sort clause.
    #[must_use]
    pub fn with_sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    /// Resumes after the given sort key, if any.
    #[must_use]
    pub fn with_search_after(mut self, search_after: Option<SortKey>) -> Self {
        self.search_after = search_after;
        self
    }

    /// Checks the request shape before it is sent.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 || self.size > MAX_RESULT_WINDOW {
            return Err(Error::invalid_input().with_message(format!(
                "page size must be between 1 and {MAX_RESULT_WINDOW}, got {}",
                self.size
            )));
        }

        match (&self.index, &self.point_in_time) {
            (Some(_), Some(_)) => {
                return Err(Error::invalid_input()
                    .with_message("point-in-time searches must not name an index"));
            }
            (None, None) => {
                return Err(Error::invalid_input()
                    .with_message("search needs either an index or a point-in-time"));
            }
            _ => {}
        }

        if self.scroll.is_some() && self.point_in_time.is_some() {
            return Err(Error::invalid_input()
                .with_message("scroll and point-in-time cannot be combined"));
        }

        if self.search_after.is_some() && self.sort.is_empty() {
            return Err(Error::invalid_input().with_message("search_after requires a sort"));
        }

        Ok(())
    }

    /// Renders the request body in query DSL form.
    ///
    /// The index and scroll keep-alive travel in the URL, not the body.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("size".into(), json!(self.size));
        body.insert("query".into(), self.predicate.to_query());

        if !self.projection.is_empty() {
            body.insert("_source".into(), json!(self.projection));
        }
        if !self.sort.is_empty() {
            let sort: Vec<Value> = self.sort.iter().map(SortField::to_clause).collect();
            body.insert("sort".into(), Value::Array(sort));
        }
        if let Some(pit) = &self.point_in_time {
            body.insert(
                "pit".into(),
                json!({ "id": pit.id, "keep_alive": pit.keep_alive }),
            );
        }
        if let Some(search_after) = &self.search_after {
            body.insert("search_after".into(), json!(search_after));
        }

        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate() -> Predicate {
        Predicate::term("Account.businessSystemCode", "system_822")
    }

    #[test]
    fn test_scroll_body() {
        let request = SearchRequest::new(predicate(), Projection::new(["Account.accountId"]), 500)
            .on_index("accounts")
            .with_scroll(KeepAlive::default());

        assert!(request.validate().is_ok());
        assert_eq!(
            request.to_body(),
            json!({
                "size": 500,
                "query": { "term": { "Account.businessSystemCode": "system_822" } },
                "_source": ["Account.accountId"],
            })
        );
    }

    #[test]
    fn test_point_in_time_body() {
        let pit = PointInTime::new(PointInTimeId::new("pit-1"), KeepAlive::default());
        let request = SearchRequest::new(predicate(), Projection::default(), 100)
            .within(pit)
            .with_sort(SortField::doc_order())
            .with_search_after(Some(SortKey::new(vec![json!(41)])));

        assert!(request.validate().is_ok());
        assert_eq!(
            request.to_body(),
            json!({
                "size": 100,
                "query": { "term": { "Account.businessSystemCode": "system_822" } },
                "sort": [{ "_doc": "asc" }],
                "pit": { "id": "pit-1", "keep_alive": "2m" },
                "search_after": [41],
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let base = SearchRequest::new(predicate(), Projection::default(), 10);
        assert!(base.validate().is_err());

        let oversized = base.clone().on_index("a");
        let oversized = SearchRequest {
            size: MAX_RESULT_WINDOW + 1,
            ..oversized
        };
        assert!(oversized.validate().is_err());

        let pit = PointInTime::new(PointInTimeId::new("pit"), KeepAlive::default());
        let both = base.clone().on_index("a").within(pit.clone());
        assert!(both.validate().is_err());

        let scroll_in_pit = base.clone().within(pit).with_scroll(KeepAlive::default());
        assert!(scroll_in_pit.validate().is_err());

        let unsorted_resume = base
            .on_index("a")
            .with_search_after(Some(SortKey::new(vec![json!(1)])));
        assert!(unsorted_resume.validate().is_err());
    }
}
