//! Search request bodies.
//!
//! A [`SearchRequest`] wraps a query with pagination, sorting and stored field
//! selection:
//!
//! ```rust
//! use esdsl_query::prelude::*;
//!
//! let request = SearchRequest::new()
//!     .size(10)
//!     .query(query().term("user", "kimchy"))
//!     .sort(sort("age"));
//!
//! assert_eq!(
//!     request.to_json_string().unwrap(),
//!     r#"{"size":10,"query":{"term":{"user":"kimchy"}},"sort":[{"age":{"order":"asc"}}]}"#
//! );
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::QueryResult;
use crate::query::Query;
use crate::serializer::{DslSerializer, ToJson};
use crate::sort::Sort;
use crate::transport::SearchTransport;

/// A full search request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    from: Option<u64>,
    size: Option<u64>,
    query: Option<Query>,
    sort: Vec<Sort>,
    fields: Vec<String>,
}

impl SearchRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the first hit.
    pub fn from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    /// Number of hits to return.
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the query.
    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    /// Append a sort. Sorts apply in the order they are added.
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    /// Return only these stored fields.
    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The query, if set.
    pub fn get_query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// The sorts, in order.
    pub fn sorts(&self) -> &[Sort] {
        &self.sort
    }

    /// Serialize with the transport's configuration and run the search.
    pub async fn execute<T>(&self, transport: &T, index: &str) -> QueryResult<Value>
    where
        T: SearchTransport + ?Sized,
    {
        let body = self.to_json_with(&transport.config())?;
        debug!(index = index, "Executing search request");
        transport.search(index, body).await
    }
}

impl ToJson for SearchRequest {
    fn write_json(&self, serializer: &DslSerializer<'_>) -> QueryResult<Value> {
        let mut body = Map::new();
        if let Some(from) = self.from {
            body.insert("from".into(), Value::from(from));
        }
        if let Some(size) = self.size {
            body.insert("size".into(), Value::from(size));
        }
        if let Some(query) = &self.query {
            body.insert("query".into(), serializer.query(query)?);
        }
        if !self.sort.is_empty() {
            body.insert(
                "sort".into(),
                Value::Array(self.sort.iter().map(|s| serializer.sort(s)).collect()),
            );
        }
        if !self.fields.is_empty() {
            body.insert(
                "fields".into(),
                Value::Array(self.fields.iter().cloned().map(Value::String).collect()),
            );
        }
        Ok(Value::Object(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DslConfig, FilterOnlyPolicy};
    use crate::filter::filter;
    use crate::query::query;
    use crate::sort::sort;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_request() {
        assert_eq!(SearchRequest::new().to_json_string().unwrap(), "{}");
    }

    #[test]
    fn test_full_request_key_order() {
        let request = SearchRequest::new()
            .fields(["title"])
            .sort(sort("last_name").desc())
            .sort(sort("age"))
            .query(query().all())
            .size(20)
            .from(40);

        assert_eq!(
            request.to_json_string().unwrap(),
            r#"{"from":40,"size":20,"query":{"match_all":{}},"sort":[{"last_name":{"order":"desc"}},{"age":{"order":"asc"}}],"fields":["title"]}"#
        );
    }

    #[test]
    fn test_request_honours_filter_only_policy() {
        let request = SearchRequest::new().query(query().filter(filter().exists("a")));
        assert_eq!(request.to_json().unwrap(), json!({"query": {}}));

        let reject = DslConfig::builder().filter_only(FilterOnlyPolicy::Reject).build();
        assert!(request.to_json_with(&reject).is_err());
    }
}
