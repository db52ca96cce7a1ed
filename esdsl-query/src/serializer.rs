//! JSON rendering of query trees.
//!
//! Serialization is a structural fold: each node's active shape maps to
//! exactly one wire shape. Maps keyed by document field names come out in
//! sorted key order; fixed structures keep their wire key order.
//!
//! ```rust
//! use esdsl_query::prelude::*;
//!
//! let q = query().term("user", "kimchy");
//! assert_eq!(q.to_json_string().unwrap(), r#"{"term":{"user":"kimchy"}}"#);
//! ```

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::config::{DslConfig, FilterOnlyPolicy};
use crate::error::{QueryError, QueryResult};
use crate::filter::{Filter, FilterShape, GeoDistanceRange, NestedFilter, RangeBounds};
use crate::group::{FilterGroup, FilterItem};
use crate::query::{
    ConstantScore, FunctionScore, Query, QueryShape, QueryString, ScoreFunction,
};
use crate::search::SearchRequest;
use crate::sort::Sort;
use crate::value::{FilterValue, number};

/// Renders nodes to JSON under one configuration.
#[derive(Debug, Clone, Copy)]
pub struct DslSerializer<'a> {
    config: &'a DslConfig,
}

impl<'a> DslSerializer<'a> {
    /// Create a serializer for `config`.
    pub fn new(config: &'a DslConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &DslConfig {
        self.config
    }

    /// Render a JSON value as text, pretty-printed if configured.
    pub fn render(&self, value: &Value) -> QueryResult<String> {
        let text = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    /// Serialize a query node.
    ///
    /// An attached filter turns the node into a `filtered` query when the node
    /// has a query clause. Without one, the filter is handled by the
    /// configured [`FilterOnlyPolicy`].
    pub fn query(&self, query: &Query) -> QueryResult<Value> {
        let bare = self.query_shape(query.shape())?;

        let has_filter =
            query.attached_filter().is_some() || query.attached_filter_group().is_some();
        if !has_filter {
            return Ok(bare);
        }

        if !query.has_query() {
            return match self.config.filter_only {
                FilterOnlyPolicy::Drop => {
                    warn!(
                        shape = query.kind().unwrap_or("none"),
                        "Dropping filter attached to a query node without a query clause"
                    );
                    Ok(bare)
                }
                FilterOnlyPolicy::Reject => Err(QueryError::filter_without_query()),
            };
        }

        let filter = match (query.attached_filter(), query.attached_filter_group()) {
            (Some(filter), _) => self.filter(filter)?,
            (None, Some(group)) => self.group(group)?,
            (None, None) => return Err(QueryError::internal("attached filter disappeared")),
        };

        debug!(shape = query.kind().unwrap_or("none"), "Emitting filtered query");
        let mut filtered = Map::new();
        filtered.insert("query".into(), bare);
        filtered.insert("filter".into(), filter);
        Ok(single("filtered", Value::Object(filtered)))
    }

    fn query_shape(&self, shape: Option<&QueryShape>) -> QueryResult<Value> {
        let Some(shape) = shape else {
            return Ok(Value::Object(Map::new()));
        };
        let body = match shape {
            QueryShape::MatchAll => Value::Object(Map::new()),
            QueryShape::Term(terms) => field_map(terms.iter(), |f, v| v.to_json(f))?,
            QueryShape::Terms(terms) => field_map(terms.iter(), |f, v| list(f, v))?,
            QueryShape::Prefix(prefixes) => {
                field_map(prefixes.iter(), |_, v| Ok(Value::String(v.clone())))?
            }
            QueryShape::QueryString(qs) => query_string(qs),
            QueryShape::Bool(b) => {
                let must = b
                    .must
                    .iter()
                    .map(|q| self.query(q))
                    .collect::<QueryResult<Vec<_>>>()?;
                let should = b
                    .should
                    .iter()
                    .map(|q| self.query(q))
                    .collect::<QueryResult<Vec<_>>>()?;
                bool_clauses(must, should)
            }
            QueryShape::ConstantScore(cs) => self.constant_score(cs)?,
            QueryShape::FunctionScore(fs) => self.function_score(fs)?,
        };
        Ok(single(shape.name(), body))
    }

    fn constant_score(&self, cs: &ConstantScore) -> QueryResult<Value> {
        let mut body = Map::new();
        if let Some(filter) = &cs.filter {
            body.insert("filter".into(), self.filter(filter)?);
        }
        if cs.boost != 0.0 {
            body.insert("boost".into(), number("boost", cs.boost)?);
        }
        Ok(Value::Object(body))
    }

    fn function_score(&self, fs: &FunctionScore) -> QueryResult<Value> {
        let functions = fs
            .functions
            .iter()
            .map(|f| self.score_function(f))
            .collect::<QueryResult<Vec<_>>>()?;

        let mut body = Map::new();
        body.insert("functions".into(), Value::Array(functions));
        if let Some(inner) = &fs.query {
            body.insert("query".into(), self.query(inner)?);
        }
        body.insert("score_mode".into(), Value::String(fs.score_mode.clone()));
        Ok(Value::Object(body))
    }

    fn score_function(&self, function: &ScoreFunction) -> QueryResult<Value> {
        match function {
            ScoreFunction::Weight(w) => {
                let mut body = Map::new();
                body.insert("weight".into(), Value::from(w.weight));
                if let Some(filter) = &w.filter {
                    body.insert("filter".into(), self.filter(filter)?);
                }
                Ok(Value::Object(body))
            }
            ScoreFunction::Raw(v) => Ok(v.clone()),
        }
    }

    /// Serialize a filter node. An empty filter becomes `{}`.
    pub fn filter(&self, filter: &Filter) -> QueryResult<Value> {
        let Some(shape) = filter.shape() else {
            return Ok(Value::Object(Map::new()));
        };
        let body = match shape {
            FilterShape::Term(terms) => field_map(terms.iter(), |f, v| v.to_json(f))?,
            FilterShape::Terms(terms) => field_map(terms.iter(), |f, v| list(f, v))?,
            FilterShape::Range(ranges) => field_map(ranges.iter(), range_bounds)?,
            FilterShape::Exists(field) | FilterShape::Missing(field) => {
                let mut body = Map::new();
                body.insert("field".into(), Value::String(field.clone()));
                Value::Object(body)
            }
            FilterShape::Prefix { field, value } => single(field, Value::String(value.clone())),
            FilterShape::Regexp { field, pattern } => {
                single(field, Value::String(pattern.clone()))
            }
            FilterShape::GeoDistanceRange(geo) => geo_distance_range(geo)?,
            FilterShape::Bool(b) => {
                let must = b
                    .must
                    .iter()
                    .map(|f| self.filter(f))
                    .collect::<QueryResult<Vec<_>>>()?;
                let should = b
                    .should
                    .iter()
                    .map(|f| self.filter(f))
                    .collect::<QueryResult<Vec<_>>>()?;
                bool_clauses(must, should)
            }
            FilterShape::Nested(nested) => self.nested(nested)?,
            FilterShape::Query(query) => self.query(query)?,
        };
        Ok(single(shape.name(), body))
    }

    fn nested(&self, nested: &NestedFilter) -> QueryResult<Value> {
        let mut body = Map::new();
        body.insert("filter".into(), self.filter(&nested.filter)?);
        if !nested.path.is_empty() {
            body.insert("path".into(), Value::String(nested.path.clone()));
        }
        if let Some(inner) = nested.inner_hits {
            let mut hits = Map::new();
            hits.insert("from".into(), Value::from(inner.from));
            hits.insert("size".into(), Value::from(inner.size));
            body.insert("inner_hits".into(), Value::Object(hits));
        }
        Ok(Value::Object(body))
    }

    /// Serialize a compound filter.
    ///
    /// No items gives `null`, a single item is emitted unwrapped, and more
    /// items are listed under the operator.
    pub fn group(&self, group: &FilterGroup) -> QueryResult<Value> {
        trace!(
            operator = group.operator().as_str(),
            items = group.len(),
            "Serializing compound filter"
        );
        match group.items() {
            [] => Ok(Value::Null),
            [only] => self.item(only),
            items => {
                let items = items
                    .iter()
                    .map(|i| self.item(i))
                    .collect::<QueryResult<Vec<_>>>()?;
                Ok(single(group.operator().as_str(), Value::Array(items)))
            }
        }
    }

    fn item(&self, item: &FilterItem) -> QueryResult<Value> {
        match item {
            FilterItem::Clause(clause) => Ok(Value::String(clause.as_str().to_string())),
            FilterItem::Filter(filter) => self.filter(filter),
            FilterItem::Group(group) => self.group(group),
            FilterItem::Value(value) => Ok(value.clone()),
        }
    }

    /// Serialize a sort specification.
    pub fn sort(&self, sort: &Sort) -> Value {
        let mut order = Map::new();
        if let Some(missing) = sort.missing_placement() {
            order.insert("missing".into(), Value::String(missing.to_string()));
        }
        order.insert("order".into(), Value::String(sort.order.as_str().to_string()));
        single(&sort.field, Value::Object(order))
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn field_map<'v, V: 'v>(
    entries: impl Iterator<Item = (&'v String, &'v V)>,
    render: impl Fn(&str, &V) -> QueryResult<Value>,
) -> QueryResult<Value> {
    let mut map = Map::new();
    for (field, value) in entries {
        map.insert(field.clone(), render(field, value)?);
    }
    Ok(Value::Object(map))
}

fn list(field: &str, values: &[FilterValue]) -> QueryResult<Value> {
    values
        .iter()
        .map(|v| v.to_json(field))
        .collect::<QueryResult<Vec<_>>>()
        .map(Value::Array)
}

fn range_bounds(field: &str, bounds: &RangeBounds) -> QueryResult<Value> {
    let mut map = Map::new();
    for (name, value) in bounds.entries() {
        map.insert(name.to_string(), value.to_json(field)?);
    }
    Ok(Value::Object(map))
}

fn bool_clauses(must: Vec<Value>, should: Vec<Value>) -> Value {
    let mut body = Map::new();
    if !must.is_empty() {
        body.insert("must".into(), Value::Array(must));
    }
    if !should.is_empty() {
        body.insert("should".into(), Value::Array(should));
    }
    Value::Object(body)
}

fn query_string(qs: &QueryString) -> Value {
    let mut body = Map::new();
    for (key, value) in [
        ("default_operator", &qs.default_operator),
        ("default_field", &qs.default_field),
        ("query", &qs.query),
        ("_exists_", &qs.exists),
        ("_missing_", &qs.missing),
    ] {
        if !value.is_empty() {
            body.insert(key.into(), Value::String(value.clone()));
        }
    }
    if !qs.fields.is_empty() {
        body.insert(
            "fields".into(),
            Value::Array(qs.fields.iter().cloned().map(Value::String).collect()),
        );
    }
    Value::Object(body)
}

fn geo_distance_range(geo: &GeoDistanceRange) -> QueryResult<Value> {
    let mut origin = Map::new();
    origin.insert("lat".into(), number("lat", geo.lat)?);
    origin.insert("lon".into(), number("lon", geo.lon)?);

    let mut body = Map::new();
    body.insert("from".into(), Value::String(geo.from.clone()));
    body.insert("to".into(), Value::String(geo.to.clone()));
    body.insert(geo.field.clone(), Value::Object(origin));
    body.insert("distance_type".into(), Value::String(geo.distance_type.clone()));
    Ok(Value::Object(body))
}

/// Conversion of a node into its wire JSON.
pub trait ToJson {
    /// Render the node with `serializer`.
    fn write_json(&self, serializer: &DslSerializer<'_>) -> QueryResult<Value>;

    /// Render with the default configuration.
    fn to_json(&self) -> QueryResult<Value> {
        self.to_json_with(&DslConfig::default())
    }

    /// Render with `config`.
    fn to_json_with(&self, config: &DslConfig) -> QueryResult<Value> {
        self.write_json(&DslSerializer::new(config))
    }

    /// Render to text with the default configuration.
    fn to_json_string(&self) -> QueryResult<String> {
        self.to_json_string_with(&DslConfig::default())
    }

    /// Render to text with `config`.
    fn to_json_string_with(&self, config: &DslConfig) -> QueryResult<String> {
        let serializer = DslSerializer::new(config);
        serializer.render(&self.write_json(&serializer)?)
    }
}

impl ToJson for Query {
    fn write_json(&self, serializer: &DslSerializer<'_>) -> QueryResult<Value> {
        serializer.query(self)
    }
}

impl ToJson for Filter {
    fn write_json(&self, serializer: &DslSerializer<'_>) -> QueryResult<Value> {
        serializer.filter(self)
    }
}

impl ToJson for FilterGroup {
    fn write_json(&self, serializer: &DslSerializer<'_>) -> QueryResult<Value> {
        serializer.group(self)
    }
}

impl ToJson for Sort {
    fn write_json(&self, serializer: &DslSerializer<'_>) -> QueryResult<Value> {
        Ok(serializer.sort(self))
    }
}

macro_rules! impl_serialize_via_json {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    let value = self.to_json().map_err(serde::ser::Error::custom)?;
                    serde::Serialize::serialize(&value, serializer)
                }
            }
        )+
    };
}

impl_serialize_via_json!(Query, Filter, FilterGroup, Sort, SearchRequest);
