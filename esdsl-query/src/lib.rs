//! # esdsl-query
//!
//! Builders and a deterministic JSON serializer for an Elasticsearch 1.x style
//! query DSL.
//!
//! This crate provides:
//! - Filter nodes (`term`, `terms`, `range`, `exists`, `missing`, `prefix`,
//!   `regexp`, `geo_distance_range`, `bool`, `nested`, embedded queries)
//! - Compound filters joined by a boolean operator
//! - Query nodes (`match_all`, `term`, `terms`, `prefix`, `query_string`,
//!   `bool`, `constant_score`, `function_score`) with attached filters
//! - Sort specifications and full search request bodies
//! - An async transport interface for executing requests
//!
//! ## Filters
//!
//! ```rust
//! use esdsl_query::prelude::*;
//!
//! let f = filter().terms("user", ["kimchy", "elasticsearch"]);
//! assert_eq!(f.to_json_string().unwrap(), r#"{"terms":{"user":["kimchy","elasticsearch"]}}"#);
//!
//! let r = range().field("age").gte(18).lt(65).build();
//! assert_eq!(r.to_json_string().unwrap(), r#"{"range":{"age":{"gte":18,"lt":65}}}"#);
//! ```
//!
//! ## Filtered queries
//!
//! A query with an attached filter is emitted as a `filtered` query:
//!
//! ```rust
//! use esdsl_query::prelude::*;
//!
//! let q = query()
//!     .search("actor:\"bob\"")
//!     .range(
//!         range()
//!             .field("@timestamp")
//!             .from("2012-12-29T16:52:48+00:00")
//!             .to("2012-12-29T17:52:48+00:00"),
//!     );
//!
//! assert_eq!(
//!     q.to_json_string().unwrap(),
//!     r#"{"filtered":{"query":{"query_string":{"query":"actor:\"bob\""}},"filter":{"range":{"@timestamp":{"from":"2012-12-29T16:52:48+00:00","to":"2012-12-29T17:52:48+00:00"}}}}}"#
//! );
//! ```
//!
//! ## Compound filters
//!
//! ```rust
//! use esdsl_query::prelude::*;
//!
//! let group = filters!["or", filter().exists("a"), filter().missing("b")];
//! assert_eq!(
//!     group.to_json_string().unwrap(),
//!     r#"{"or":[{"exists":{"field":"a"}},{"missing":{"field":"b"}}]}"#
//! );
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod group;
pub mod logging;
#[macro_use]
pub mod macros;
pub mod query;
pub mod search;
pub mod serializer;
pub mod sort;
pub mod transport;
pub mod value;

pub use config::{DslConfig, DslConfigBuilder, FilterOnlyPolicy};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use filter::{
    FieldRange, Filter, FilterBool, FilterShape, GeoDistanceRange, InnerHits, NestedFilter,
    RangeBounds, RangeFilter,
};
pub use group::{BoolClause, FilterGroup, FilterItem};
pub use query::{
    ConstantScore, FunctionScore, Query, QueryBool, QueryShape, QueryString, ScoreFunction,
    WeightScore,
};
pub use search::SearchRequest;
pub use serializer::{DslSerializer, ToJson};
pub use sort::{Sort, SortOrder};
pub use transport::{SearchTransport, StaticTransport};
pub use value::FilterValue;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{DslConfig, FilterOnlyPolicy};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::filter::{Filter, RangeBounds, filter, range};
    pub use crate::filters;
    pub use crate::group::{BoolClause, FilterGroup, FilterItem, compound_filter};
    pub use crate::query::{Query, QueryString, WeightScore, query};
    pub use crate::search::SearchRequest;
    pub use crate::serializer::ToJson;
    pub use crate::sort::{Sort, SortOrder, sort};
    pub use crate::transport::SearchTransport;
    pub use crate::value::FilterValue;
}
