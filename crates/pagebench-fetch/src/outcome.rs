//! Results of a completed query.

use std::time::Duration;

use pagebench_search::{TotalHits, lookup_path};
use serde_json::Value;

/// All documents of a query that ran to completion or to its page ceiling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    /// Projected documents of every page, in page order.
    pub documents: Vec<Value>,
    /// Advisory match count reported by the first page.
    pub total_hits: Option<TotalHits>,
    /// Pages consumed, excluding the terminating empty page.
    pub pages: usize,
    /// Wall-clock time spent, release included.
    pub elapsed: Duration,
    /// True if the page ceiling stopped the query early.
    pub truncated: bool,
}

impl FetchOutcome {
    /// Returns the number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no document matched.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Extracts the value of `field` from every document.
    pub fn identifiers(&self, field: &str) -> IdentifierSet {
        IdentifierSet::collect(&self.documents, field)
    }
}

/// Identifier values extracted from a result set.
///
/// Order follows the documents and duplicates are kept. Numbers are rendered
/// as strings; documents without a string or number at the path are counted
/// in `missing`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    pub ids: Vec<String>,
    pub missing: usize,
}

impl IdentifierSet {
    /// Extracts the value of `field` from each document.
    pub fn collect<'a, I>(documents: I, field: &str) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut set = Self::default();
        for document in documents {
            match lookup_path(document, field) {
                Some(Value::String(id)) => set.ids.push(id.clone()),
                Some(Value::Number(id)) => set.ids.push(id.to_string()),
                _ => set.missing += 1,
            }
        }
        set
    }

    /// Returns the number of identifiers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no identifier was found.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_identifiers_keep_order_and_duplicates() {
        let outcome = FetchOutcome {
            documents: vec![
                json!({ "Account": { "accountId": "account_2" } }),
                json!({ "Account": { "accountId": 7 } }),
                json!({ "Account": {} }),
                json!({ "Account": { "accountId": "account_2" } }),
            ],
            ..Default::default()
        };

        let set = outcome.identifiers("Account.accountId");
        assert_eq!(set.ids, vec!["account_2", "7", "account_2"]);
        assert_eq!(set.missing, 1);
    }
}
