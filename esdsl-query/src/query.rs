//! Query clauses: scoring conditions, optionally paired with a filter.
//!
//! A [`Query`] holds at most one active shape. Attaching a filter turns the
//! node into a `filtered` query when it is serialized, as long as the node
//! carries a query clause of its own.
//!
//! ```rust
//! use esdsl_query::filter::range;
//! use esdsl_query::query::query;
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
//! assert!(q.has_query());
//! assert!(q.attached_filter().is_some());
//! ```

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::filter::Filter;
use crate::group::{FilterGroup, FilterItem};
use crate::value::FilterValue;

/// Create an empty query.
pub fn query() -> Query {
    Query::new()
}

/// Lucene-syntax free text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    /// Operator between terms (`AND`/`OR`).
    pub default_operator: String,
    /// Field searched when the text names none.
    pub default_field: String,
    /// The query text.
    pub query: String,
    /// Field that must exist (`_exists_`).
    pub exists: String,
    /// Field that must be missing (`_missing_`).
    pub missing: String,
    /// Explicit list of searched fields.
    pub fields: Vec<String>,
}

impl QueryString {
    /// Create a query string searching `field` (may be empty) for `query`.
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            default_field: field.into(),
            query: query.into(),
            ..Self::default()
        }
    }

    /// Set the default operator.
    pub fn default_operator(mut self, operator: impl Into<String>) -> Self {
        self.default_operator = operator.into();
        self
    }

    /// Set the default field.
    pub fn default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = field.into();
        self
    }

    /// Search an explicit list of fields.
    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Require `field` to exist.
    pub fn exists(mut self, field: impl Into<String>) -> Self {
        self.exists = field.into();
        self
    }

    /// Require `field` to be missing.
    pub fn missing(mut self, field: impl Into<String>) -> Self {
        self.missing = field.into();
        self
    }
}

/// Boolean combination of queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBool {
    /// Queries that must all match.
    pub must: Vec<Query>,
    /// Queries of which at least one should match.
    pub should: Vec<Query>,
}

/// Constant score wrapper around a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantScore {
    /// The filter whose matches all receive `boost`.
    pub filter: Option<Filter>,
    /// Score given to every match; omitted when zero.
    pub boost: f64,
}

/// A weight applied to documents matching a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightScore {
    /// Weight multiplier.
    pub weight: i64,
    /// Documents the weight applies to.
    pub filter: Option<Filter>,
}

impl WeightScore {
    /// Create a weight function for `filter`.
    pub fn new(weight: i64, filter: Filter) -> Self {
        Self {
            weight,
            filter: Some(filter),
        }
    }
}

/// One function of a function score query.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreFunction {
    /// `{"weight": n, "filter": f}`.
    Weight(WeightScore),
    /// Any other function, passed through untouched.
    Raw(Value),
}

impl From<WeightScore> for ScoreFunction {
    fn from(w: WeightScore) -> Self {
        Self::Weight(w)
    }
}

impl From<Value> for ScoreFunction {
    fn from(v: Value) -> Self {
        Self::Raw(v)
    }
}

/// Function score wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionScore {
    /// How function scores combine (`multiply`, `sum`, `first`, ...).
    pub score_mode: String,
    /// The query whose matches get scored.
    pub query: Option<Box<Query>>,
    /// Scoring functions, in order.
    pub functions: Vec<ScoreFunction>,
}

/// The active shape of a [`Query`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryShape {
    /// `match_all`.
    MatchAll,
    /// `term`: field equals value, one entry per field.
    Term(BTreeMap<String, FilterValue>),
    /// `terms`: field equals any of the values.
    Terms(BTreeMap<String, Vec<FilterValue>>),
    /// `prefix`: field starts with value, one entry per field.
    Prefix(BTreeMap<String, String>),
    /// `query_string`.
    QueryString(QueryString),
    /// `bool`.
    Bool(QueryBool),
    /// `constant_score`.
    ConstantScore(ConstantScore),
    /// `function_score`.
    FunctionScore(FunctionScore),
}

impl QueryShape {
    /// Wire name of the shape.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MatchAll => "match_all",
            Self::Term(_) => "term",
            Self::Terms(_) => "terms",
            Self::Prefix(_) => "prefix",
            Self::QueryString(_) => "query_string",
            Self::Bool(_) => "bool",
            Self::ConstantScore(_) => "constant_score",
            Self::FunctionScore(_) => "function_score",
        }
    }

    /// Whether this shape counts as a query clause when a filter is attached.
    ///
    /// Score wrappers do not: a filter attached next to them is not wrapped
    /// into a `filtered` query.
    pub fn is_query_clause(&self) -> bool {
        !matches!(self, Self::ConstantScore(_) | Self::FunctionScore(_))
    }
}

/// A query node.
///
/// A node may carry both an attached [`Filter`] and an attached
/// [`FilterGroup`]; the filter takes precedence when serializing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    shape: Option<QueryShape>,
    filter: Option<Box<Filter>>,
    filter_group: Option<FilterGroup>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active shape, if any.
    pub fn shape(&self) -> Option<&QueryShape> {
        self.shape.as_ref()
    }

    /// Wire name of the active shape.
    pub fn kind(&self) -> Option<&'static str> {
        self.shape.as_ref().map(QueryShape::name)
    }

    /// Whether the node carries a query clause a filter can be paired with.
    pub fn has_query(&self) -> bool {
        self.shape.as_ref().is_some_and(QueryShape::is_query_clause)
    }

    /// The attached filter, if any.
    pub fn attached_filter(&self) -> Option<&Filter> {
        self.filter.as_deref()
    }

    /// The attached filter group, if any.
    pub fn attached_filter_group(&self) -> Option<&FilterGroup> {
        self.filter_group.as_ref()
    }

    fn set_shape(&mut self, shape: QueryShape) {
        if let Some(previous) = &self.shape {
            if previous.name() != shape.name() {
                debug!(
                    from = previous.name(),
                    to = shape.name(),
                    "Replacing query shape"
                );
            }
        }
        self.shape = Some(shape);
    }

    /// Match every document.
    pub fn all(mut self) -> Self {
        self.set_shape(QueryShape::MatchAll);
        self
    }

    /// Match documents whose `field` equals `value`.
    pub fn term(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        match &mut self.shape {
            Some(QueryShape::Term(terms)) => {
                terms.insert(field.into(), value.into());
            }
            _ => {
                let mut terms = BTreeMap::new();
                terms.insert(field.into(), value.into());
                self.set_shape(QueryShape::Term(terms));
            }
        }
        self
    }

    /// Match documents whose `field` equals any of `values`.
    ///
    /// Values accumulate across calls; a call without values is a no-op.
    pub fn terms<V: Into<FilterValue>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<FilterValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return self;
        }
        match &mut self.shape {
            Some(QueryShape::Terms(terms)) => {
                terms.entry(field.into()).or_default().extend(values);
            }
            _ => {
                let mut terms = BTreeMap::new();
                terms.insert(field.into(), values);
                self.set_shape(QueryShape::Terms(terms));
            }
        }
        self
    }

    /// Match documents whose `field` starts with `value`.
    pub fn prefix(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self.shape {
            Some(QueryShape::Prefix(prefixes)) => {
                prefixes.insert(field.into(), value.into());
            }
            _ => {
                let mut prefixes = BTreeMap::new();
                prefixes.insert(field.into(), value.into());
                self.set_shape(QueryShape::Prefix(prefixes));
            }
        }
        self
    }

    /// Free text search in Lucene syntax.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.set_shape(QueryShape::QueryString(QueryString::new("", text)));
        self
    }

    /// Use a fully built query string clause.
    pub fn query_string(mut self, qs: QueryString) -> Self {
        self.set_shape(QueryShape::QueryString(qs));
        self
    }

    /// Free text search scoped to fields.
    ///
    /// `fields` is a comma separated list. A single name becomes the default
    /// field, several names become an explicit field list. `exists` and
    /// `missing` name sentinel fields and may be empty.
    ///
    /// ```rust
    /// use esdsl_query::query::{query, QueryShape};
    ///
    /// let q = query().fields("title,body", "rust", "", "");
    /// let Some(QueryShape::QueryString(qs)) = q.shape() else { panic!() };
    /// assert_eq!(qs.fields, vec!["title", "body"]);
    /// assert!(qs.default_field.is_empty());
    /// ```
    pub fn fields(
        mut self,
        fields: &str,
        search: impl Into<String>,
        exists: impl Into<String>,
        missing: impl Into<String>,
    ) -> Self {
        let field_list: Vec<&str> = fields.split(',').collect();
        let mut qs = QueryString::new("", search);
        if field_list.len() == 1 {
            qs.default_field = fields.to_string();
        } else {
            qs.fields = field_list.into_iter().map(str::to_string).collect();
        }
        qs.exists = exists.into();
        qs.missing = missing.into();
        self.set_shape(QueryShape::QueryString(qs));
        self
    }

    /// Combine queries: all of `must` and any of `should`.
    pub fn bool(mut self, must: Vec<Query>, should: Vec<Query>) -> Self {
        self.set_shape(QueryShape::Bool(QueryBool { must, should }));
        self
    }

    /// Give every document matching `filter` the score `boost`.
    pub fn constant_score(mut self, filter: Filter, boost: f64) -> Self {
        self.set_shape(QueryShape::ConstantScore(ConstantScore {
            filter: Some(filter),
            boost,
        }));
        self
    }

    /// Score the matches of `inner` with `functions`, combined by `mode`.
    pub fn function_score<F: Into<ScoreFunction>>(
        mut self,
        mode: impl Into<String>,
        inner: Query,
        functions: impl IntoIterator<Item = F>,
    ) -> Self {
        self.set_shape(QueryShape::FunctionScore(FunctionScore {
            score_mode: mode.into(),
            query: Some(Box::new(inner)),
            functions: functions.into_iter().map(Into::into).collect(),
        }));
        self
    }

    /// Attach a filter, replacing any attached filter.
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(Box::new(filter.into()));
        self
    }

    /// Attach filters as a compound group.
    ///
    /// Follows [`FilterGroup::add_filters`]: a leading boolean clause marker
    /// sets the group operator. Repeated calls append to the same group.
    pub fn filters(mut self, items: impl IntoIterator<Item = FilterItem>) -> Self {
        self.filter_group
            .get_or_insert_with(FilterGroup::new)
            .add_filters(items);
        self
    }

    /// Limit the query with a range (or any) filter.
    ///
    /// When a filter is already attached the new one is combined into it
    /// with [`Filter::add`], so an attached `term` filter is kept over an
    /// incoming `range`.
    pub fn range(mut self, filter: impl Into<Filter>) -> Self {
        let filter = filter.into();
        self.filter = Some(Box::new(match self.filter.take() {
            Some(existing) => existing.add(filter),
            None => filter,
        }));
        self
    }

    /// Like [`Query::range`], but fails if the attached filter and the new
    /// one hold different shapes.
    ///
    /// ```rust
    /// use esdsl_query::prelude::*;
    ///
    /// let err = query()
    ///     .all()
    ///     .filter(filter().term("user", "kimchy"))
    ///     .try_range(range().field("age").gte(1))
    ///     .unwrap_err();
    /// assert_eq!(err.code.code(), "E1002");
    /// ```
    pub fn try_range(mut self, filter: impl Into<Filter>) -> QueryResult<Self> {
        let filter = filter.into();
        let combined = match self.filter.take() {
            Some(existing) => existing.try_add(filter).map_err(|e| {
                QueryError::invalid_query("range filter conflicts with the attached filter")
                    .with_clause("filtered")
                    .with_source(e)
            })?,
            None => filter,
        };
        self.filter = Some(Box::new(combined));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterShape, filter, range};

    #[test]
    fn test_term_fields_persist() {
        let q = query().term("user", "kimchy").term("org", "elastic").term("user", "bob");
        let Some(QueryShape::Term(terms)) = q.shape() else {
            panic!("expected term shape");
        };
        assert_eq!(terms.len(), 2);
        assert_eq!(terms["user"], FilterValue::from("bob"));
    }

    #[test]
    fn test_has_query() {
        assert!(!query().has_query());
        assert!(query().all().has_query());
        assert!(query().prefix("name", "ki").has_query());
        assert!(query().bool(vec![], vec![]).has_query());
        assert!(!query().constant_score(filter().exists("a"), 2.0).has_query());
        assert!(
            !query()
                .function_score("sum", query().all(), Vec::<ScoreFunction>::new())
                .has_query()
        );
    }

    #[test]
    fn test_fields_single_sets_default_field() {
        let q = query().fields("title", "rust", "author", "");
        let Some(QueryShape::QueryString(qs)) = q.shape() else {
            panic!("expected query_string shape");
        };
        assert_eq!(qs.default_field, "title");
        assert!(qs.fields.is_empty());
        assert_eq!(qs.exists, "author");
        assert!(qs.missing.is_empty());
    }

    #[test]
    fn test_range_merges_into_attached_filter() {
        let q = query()
            .all()
            .range(range().field("age").gte(18))
            .range(filter().exists("email"));
        assert_eq!(q.attached_filter().and_then(Filter::kind), Some("range"));

        let q = query()
            .all()
            .range(filter().missing("email"))
            .range(range().field("age").gte(18));
        assert_eq!(q.attached_filter().and_then(Filter::kind), Some("range"));

        let q = query().all().range(range().field("age").gte(18));
        let Some(FilterShape::Range(ranges)) = q.attached_filter().and_then(Filter::shape) else {
            panic!("expected range filter");
        };
        assert!(ranges.contains_key("age"));
    }

    #[test]
    fn test_filters_accumulate_into_one_group() {
        let q = query()
            .all()
            .filters([
                FilterItem::from("or"),
                filter().term("a", 1).into(),
                filter().term("b", 2).into(),
            ])
            .filters([FilterItem::from(filter().exists("c"))]);
        let group = q.attached_filter_group().unwrap();
        assert_eq!(group.operator().as_str(), "or");
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn test_try_range_rejects_conflicting_filter() {
        let err = query()
            .all()
            .filter(filter().term("user", "kimchy"))
            .try_range(range().field("age").gte(1))
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidQuery);
        assert!(err.source.is_some());

        let q = query()
            .all()
            .try_range(range().field("age").gte(1))
            .and_then(|q| q.try_range(range().field("age").lt(9)))
            .unwrap();
        assert_eq!(q.attached_filter().and_then(Filter::kind), Some("range"));
    }

    #[test]
    fn test_terms_without_values_is_noop() {
        let q = query().terms("tags", Vec::<String>::new());
        assert!(q.shape().is_none());
        assert!(!q.has_query());

        let q = query().all().terms("tags", Vec::<String>::new());
        assert_eq!(q.kind(), Some("match_all"));
    }

    #[test]
    fn test_search_replaces_previous_shape() {
        let q = query().term("user", "kimchy").search("bob");
        assert_eq!(q.kind(), Some("query_string"));
    }
}
