//! The interface a search backend implements.
//!
//! This crate does not talk to a cluster. A transport receives a serialized
//! request body and returns the raw response document.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::DslConfig;
use crate::error::{QueryError, QueryResult};
use crate::search::SearchRequest;

/// A backend that can run a search.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Run a search against `index` with a serialized request body.
    async fn search(&self, index: &str, body: Value) -> QueryResult<Value>;

    /// Serializer configuration used for requests sent through this transport.
    fn config(&self) -> DslConfig {
        DslConfig::default()
    }

    /// Serialize `request` and run it.
    async fn search_request(&self, index: &str, request: &SearchRequest) -> QueryResult<Value> {
        let body = crate::serializer::ToJson::to_json_with(request, &self.config())?;
        self.search(index, body).await
    }
}

/// A transport that records request bodies and answers with a fixed response.
#[derive(Debug, Clone)]
pub struct StaticTransport {
    response: Value,
    config: DslConfig,
    requests: Arc<RwLock<Vec<(String, Value)>>>,
}

impl StaticTransport {
    /// Create a transport answering every search with `response`.
    pub fn new(response: Value) -> Self {
        Self {
            response,
            config: DslConfig::default(),
            requests: Arc::default(),
        }
    }

    /// Use `config` when serializing requests.
    pub fn with_config(mut self, config: DslConfig) -> Self {
        self.config = config;
        self
    }

    /// The `(index, body)` pairs received so far.
    pub fn requests(&self) -> QueryResult<Vec<(String, Value)>> {
        self.requests
            .read()
            .map(|r| r.clone())
            .map_err(|_| QueryError::internal("request log lock poisoned"))
    }
}

#[async_trait]
impl SearchTransport for StaticTransport {
    async fn search(&self, index: &str, body: Value) -> QueryResult<Value> {
        self.requests
            .write()
            .map_err(|_| QueryError::internal("request log lock poisoned"))?
            .push((index.to_string(), body));
        Ok(self.response.clone())
    }

    fn config(&self) -> DslConfig {
        self.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterOnlyPolicy;
    use crate::filter::filter;
    use crate::query::query;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_transport_records_bodies() {
        let transport = StaticTransport::new(json!({"hits": {"total": 0}}));
        let request = SearchRequest::new().size(1).query(query().term("user", "kimchy"));

        let response = request.execute(&transport, "github").await.unwrap();
        assert_eq!(response, json!({"hits": {"total": 0}}));

        let requests = transport.requests().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "github");
        assert_eq!(requests[0].1, json!({"size": 1, "query": {"term": {"user": "kimchy"}}}));
    }

    #[tokio::test]
    async fn test_transport_config_is_applied() {
        let transport = StaticTransport::new(json!({})).with_config(
            DslConfig::builder().filter_only(FilterOnlyPolicy::Reject).build(),
        );
        let request = SearchRequest::new().query(query().filter(filter().exists("a")));

        let err = transport.search_request("idx", &request).await.unwrap_err();
        assert!(err.is_construction_error());
        assert!(transport.requests().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dyn_transport() {
        let transport: Arc<dyn SearchTransport> =
            Arc::new(StaticTransport::new(json!({"ok": true})));
        let response = SearchRequest::new()
            .query(query().all())
            .execute(transport.as_ref(), "idx")
            .await
            .unwrap();
        assert_eq!(response["ok"], json!(true));
    }
}
