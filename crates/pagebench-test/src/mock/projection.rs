//! Source filtering the way the engine applies `_source` includes.

use pagebench_search::{Projection, lookup_path};
use serde_json::{Map, Value};

/// Reduces a document to the projected paths, keeping their nesting.
///
/// Paths missing from the document are left out.
pub(crate) fn project(document: &Value, projection: &Projection) -> Value {
    if projection.is_empty() {
        return document.clone();
    }

    let mut projected = Map::new();
    for path in projection.fields() {
        if let Some(value) = lookup_path(document, path) {
            insert_path(&mut projected, path, value.clone());
        }
    }

    Value::Object(projected)
}

fn insert_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_owned(), value);
        }
        Some((head, rest)) => {
            let child = target
                .entry(head.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_projection_keeps_nesting() {
        let document = json!({
            "Position": { "positionId": "position_3", "accountId": "account_1", "status": "open" },
            "Account": { "accountId": "account_1" }
        });
        let projection = Projection::new(["Position.positionId", "Position.accountId"]);

        assert_eq!(
            project(&document, &projection),
            json!({ "Position": { "positionId": "position_3", "accountId": "account_1" } })
        );
    }

    #[test]
    fn test_empty_projection_returns_whole_document() {
        let document = json!({ "a": 1 });
        assert_eq!(project(&document, &Projection::default()), document);
    }

    #[test]
    fn test_missing_paths_are_skipped() {
        let document = json!({ "Account": {} });
        let projection = Projection::new(["Account.accountId"]);
        assert_eq!(project(&document, &projection), json!({}));
    }
}
