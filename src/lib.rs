//! # esdsl
//!
//! Typed builders and a deterministic JSON serializer for the Elasticsearch
//! 1.x query DSL.
//!
//! esdsl provides:
//! - Filter and query expression trees where each node holds one active shape
//! - Compound filters joined by `and`/`or`, collapsing single items
//! - `filtered` query composition from a query plus an attached filter
//! - Sorts and full search request bodies
//! - An async transport trait for handing request bodies to a cluster client
//!
//! ## Quick Start
//!
//! ```rust
//! use esdsl::prelude::*;
//!
//! let request = SearchRequest::new()
//!     .size(25)
//!     .query(
//!         query()
//!             .term("user", "kimchy")
//!             .filter(range().field("age").gte(18)),
//!     )
//!     .sort(sort("last_name").desc());
//!
//! assert_eq!(
//!     request.to_json_string().unwrap(),
//!     r#"{"size":25,"query":{"filtered":{"query":{"term":{"user":"kimchy"}},"filter":{"range":{"age":{"gte":18}}}}},"sort":[{"last_name":{"order":"desc"}}]}"#
//! );
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Query and filter builders, the serializer and the transport interface.
pub mod dsl {
    pub use esdsl_query::*;
}

pub use esdsl_query::filters;
pub use esdsl_query::logging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use esdsl_query::prelude::*;
}

// Re-export key types at the crate root
pub use dsl::{
    DslConfig, Filter, FilterGroup, Query, QueryError, QueryResult, SearchRequest, Sort, ToJson,
};
