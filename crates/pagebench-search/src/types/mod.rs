//! Engine-neutral request and response types.
//!
//! The query and body shapes follow the Elasticsearch query DSL, which is
//! the lingua franca of the engines this workspace targets.

mod bulk;
mod handle;
mod keep_alive;
mod predicate;
mod request;
mod response;

pub use bulk::{BulkOperation, BulkRequest, BulkResponse};
pub use handle::{PointInTimeId, ScrollId, SortKey};
pub use keep_alive::KeepAlive;
pub use predicate::{MAX_TERMS_COUNT, Predicate, Projection};
pub use request::{MAX_RESULT_WINDOW, PointInTime, SearchRequest, SortField, SortOrder};
pub use response::{Hit, SearchResponse, TotalHits, TotalHitsRelation, lookup_path};
