//! JSON bodies exchanged with the Elasticsearch REST API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    BulkResponse, Hit, KeepAlive, PointInTimeId, ScrollId, SearchResponse, ServiceHealth, SortKey,
    TotalHits, TotalHitsRelation,
};

/// Body of `POST /_search/scroll`.
#[derive(Debug, Serialize)]
pub(crate) struct ScrollBody<'a> {
    pub scroll: String,
    pub scroll_id: &'a str,
}

impl<'a> ScrollBody<'a> {
    pub fn new(scroll_id: &'a ScrollId, keep_alive: KeepAlive) -> Self {
        Self {
            scroll: keep_alive.to_string(),
            scroll_id: scroll_id.as_str(),
        }
    }
}

/// Body of `DELETE /_search/scroll`.
#[derive(Debug, Serialize)]
pub(crate) struct ClearScrollBody<'a> {
    pub scroll_id: [&'a str; 1],
}

/// Body of `DELETE /_pit`.
#[derive(Debug, Serialize)]
pub(crate) struct ClosePitBody<'a> {
    pub id: &'a str,
}

/// Response of `POST /{index}/_pit`.
#[derive(Debug, Deserialize)]
pub(crate) struct OpenPitBody {
    pub id: String,
}

impl From<OpenPitBody> for PointInTimeId {
    fn from(body: OpenPitBody) -> Self {
        PointInTimeId::new(body.id)
    }
}

/// Response of `_search` and `_search/scroll`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchBody {
    #[serde(default, rename = "_scroll_id")]
    pub scroll_id: Option<String>,
    #[serde(default)]
    pub pit_id: Option<String>,
    #[serde(default)]
    pub took: Option<u64>,
    #[serde(default)]
    pub hits: HitsBody,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HitsBody {
    #[serde(default)]
    pub total: Option<TotalBody>,
    #[serde(default)]
    pub hits: Vec<HitBody>,
}

/// The total is an object on current clusters and a bare number when
/// `rest_total_hits_as_int` is set.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TotalBody {
    Object {
        value: u64,
        #[serde(default)]
        relation: TotalHitsRelation,
    },
    Count(u64),
}

impl From<TotalBody> for TotalHits {
    fn from(body: TotalBody) -> Self {
        match body {
            TotalBody::Object { value, relation } => TotalHits { value, relation },
            TotalBody::Count(value) => TotalHits::exact(value),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HitBody {
    #[serde(default, rename = "_index")]
    pub index: Option<String>,
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default, rename = "_source")]
    pub source: Value,
    #[serde(default)]
    pub sort: Option<Vec<Value>>,
}

impl From<HitBody> for Hit {
    fn from(body: HitBody) -> Self {
        Hit {
            index: body.index,
            id: body.id,
            source: body.source,
            sort: body.sort.map(SortKey::new),
        }
    }
}

impl From<SearchBody> for SearchResponse {
    fn from(body: SearchBody) -> Self {
        SearchResponse {
            scroll_id: body.scroll_id.map(ScrollId::new),
            point_in_time_id: body.pit_id.map(PointInTimeId::new),
            total: body.hits.total.map(TotalHits::from),
            hits: body.hits.hits.into_iter().map(Hit::from).collect(),
            took_ms: body.took,
        }
    }
}

/// Response of `POST /_bulk`.
#[derive(Debug, Deserialize)]
pub(crate) struct BulkBody {
    #[serde(default)]
    pub took: Option<u64>,
    #[serde(default)]
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkItemBody>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkItemBody {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub error: Option<Value>,
}

impl BulkItemBody {
    fn failed(&self) -> bool {
        self.error.is_some() || self.status >= 300
    }
}

impl From<BulkBody> for BulkResponse {
    fn from(body: BulkBody) -> Self {
        let failed_items = body
            .items
            .iter()
            .flat_map(|item| item.values())
            .filter(|item| item.failed())
            .count();

        BulkResponse {
            errors: body.errors || failed_items > 0,
            items: body.items.len(),
            failed_items,
            took_ms: body.took,
        }
    }
}

/// Response of `GET /_cluster/health`.
#[derive(Debug, Deserialize)]
pub(crate) struct ClusterHealthBody {
    #[serde(default)]
    pub cluster_name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub number_of_nodes: Option<u64>,
}

impl From<ClusterHealthBody> for ServiceHealth {
    fn from(body: ClusterHealthBody) -> Self {
        let cluster = body.cluster_name.as_deref().unwrap_or("cluster");
        match body.status.as_str() {
            "green" => ServiceHealth::healthy(),
            "yellow" => ServiceHealth::degraded(format!("{cluster} reports yellow status")),
            other => ServiceHealth::unhealthy(format!("{cluster} reports {other} status")),
        }
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(flatten)]
    pub cause: ErrorCause,
    #[serde(default)]
    pub root_cause: Vec<ErrorCause>,
}

impl ErrorDetail {
    /// Returns the first root cause, or the top-level error when none is given.
    pub fn primary_cause(&self) -> Option<&ErrorCause> {
        self.root_cause.first().or(Some(&self.cause))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorCause {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}
