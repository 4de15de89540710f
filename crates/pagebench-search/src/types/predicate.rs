//! Filter predicates and source projections.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{Error, Result};

/// Maximum number of members in a single membership predicate.
///
/// Matches the engine's default `index.max_terms_count`.
pub const MAX_TERMS_COUNT: usize = 65_536;

/// Field filter applied to every page of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field == value`.
    Term { field: String, value: Value },
    /// `field IN values`.
    Terms { field: String, values: Vec<Value> },
}

impl Predicate {
    /// Creates an equality predicate.
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a membership predicate.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`] if the set is empty or has more
    /// than [`MAX_TERMS_COUNT`] members.
    ///
    /// [`ErrorKind::InvalidInput`]: crate::ErrorKind::InvalidInput
    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = field.into();
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();

        if values.is_empty() {
            return Err(Error::invalid_input()
                .with_message("membership predicate needs at least one value")
                .with_context(field));
        }
        if values.len() > MAX_TERMS_COUNT {
            return Err(Error::invalid_input()
                .with_message(format!(
                    "membership predicate has {} values, the limit is {MAX_TERMS_COUNT}",
                    values.len()
                ))
                .with_context(field));
        }

        Ok(Self::Terms { field, values })
    }

    /// Returns the filtered field.
    pub fn field(&self) -> &str {
        match self {
            Self::Term { field, .. } | Self::Terms { field, .. } => field,
        }
    }

    /// Returns how many values the predicate accepts.
    pub fn member_count(&self) -> usize {
        match self {
            Self::Term { .. } => 1,
            Self::Terms { values, .. } => values.len(),
        }
    }

    /// Returns true if `candidate` satisfies the predicate.
    pub fn accepts(&self, candidate: &Value) -> bool {
        match self {
            Self::Term { value, .. } => value == candidate,
            Self::Terms { values, .. } => values.contains(candidate),
        }
    }

    /// Renders the predicate as a query DSL clause.
    pub fn to_query(&self) -> Value {
        match self {
            Self::Term { field, value } => json!({ "term": { field: value } }),
            Self::Terms { field, values } => json!({ "terms": { field: values } }),
        }
    }
}

/// Ordered list of dotted source paths to return for every hit.
///
/// An empty projection returns whole documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projection(Vec<String>);

impl Projection {
    /// Creates a projection over the given fields.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    /// Returns the projected fields.
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// Returns true if the projection selects whole documents.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
