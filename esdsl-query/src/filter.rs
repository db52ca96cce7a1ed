//! Filter clauses: non-scoring conditions that restrict the matched documents.
//!
//! A [`Filter`] holds at most one active shape. Builder calls of the same kind
//! as the current shape merge into it (terms append, term and range maps merge
//! per field); a call of another kind replaces the shape.
//!
//! ```rust
//! use esdsl_query::filter::{filter, range};
//!
//! let by_user = filter().term("user", "kimchy");
//! let by_tags = filter().terms("tags", ["rust", "search"]);
//! let recent = range()
//!     .field("@timestamp")
//!     .from("2012-12-29T16:52:48+00:00")
//!     .to("2012-12-29T17:52:48+00:00")
//!     .build();
//!
//! assert_eq!(by_user.kind(), Some("term"));
//! assert_eq!(by_tags.kind(), Some("terms"));
//! assert_eq!(recent.kind(), Some("range"));
//! ```

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{QueryError, QueryResult};
use crate::query::Query;
use crate::value::FilterValue;

/// Create an empty filter.
pub fn filter() -> Filter {
    Filter::new()
}

/// Start a range filter; select a field before setting bounds.
pub fn range() -> RangeFilter {
    RangeFilter::new()
}

/// Bounds of a range clause on a single field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBounds {
    /// Inclusive lower bound (legacy `from`).
    pub from: Option<FilterValue>,
    /// Inclusive upper bound (legacy `to`).
    pub to: Option<FilterValue>,
    /// Greater than.
    pub gt: Option<FilterValue>,
    /// Greater than or equal.
    pub gte: Option<FilterValue>,
    /// Less than.
    pub lt: Option<FilterValue>,
    /// Less than or equal.
    pub lte: Option<FilterValue>,
}

impl RangeBounds {
    /// Create empty bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `from` bound.
    pub fn from(mut self, value: impl Into<FilterValue>) -> Self {
        self.from = Some(value.into());
        self
    }

    /// Set the `to` bound.
    pub fn to(mut self, value: impl Into<FilterValue>) -> Self {
        self.to = Some(value.into());
        self
    }

    /// Set the `gt` bound.
    pub fn gt(mut self, value: impl Into<FilterValue>) -> Self {
        self.gt = Some(value.into());
        self
    }

    /// Set the `gte` bound.
    pub fn gte(mut self, value: impl Into<FilterValue>) -> Self {
        self.gte = Some(value.into());
        self
    }

    /// Set the `lt` bound.
    pub fn lt(mut self, value: impl Into<FilterValue>) -> Self {
        self.lt = Some(value.into());
        self
    }

    /// Set the `lte` bound.
    pub fn lte(mut self, value: impl Into<FilterValue>) -> Self {
        self.lte = Some(value.into());
        self
    }

    /// Check if no bound is set.
    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.to.is_none()
            && self.gt.is_none()
            && self.gte.is_none()
            && self.lt.is_none()
            && self.lte.is_none()
    }

    /// Overlay the bounds set in `other` onto these bounds.
    pub fn merge(&mut self, other: RangeBounds) {
        let RangeBounds { from, to, gt, gte, lt, lte } = other;
        if from.is_some() {
            self.from = from;
        }
        if to.is_some() {
            self.to = to;
        }
        if gt.is_some() {
            self.gt = gt;
        }
        if gte.is_some() {
            self.gte = gte;
        }
        if lt.is_some() {
            self.lt = lt;
        }
        if lte.is_some() {
            self.lte = lte;
        }
    }

    /// Iterate the set bounds in wire order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&'static str, &FilterValue)> {
        [
            ("from", &self.from),
            ("gt", &self.gt),
            ("gte", &self.gte),
            ("lt", &self.lt),
            ("lte", &self.lte),
            ("to", &self.to),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name, v)))
    }
}

/// A range filter under construction with no field selected yet.
///
/// Bound setters only exist on [`FieldRange`], which is obtained by selecting
/// a field, so a bound can never be set without a target field.
#[derive(Debug, Clone, Default)]
pub struct RangeFilter {
    ranges: BTreeMap<String, RangeBounds>,
}

impl RangeFilter {
    /// Create an empty range filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the field subsequent bounds apply to.
    pub fn field(mut self, name: impl Into<String>) -> FieldRange {
        let field = name.into();
        self.ranges.entry(field.clone()).or_default();
        FieldRange {
            ranges: self.ranges,
            field,
        }
    }

    /// Finish the range filter. Without a selected field the filter is empty.
    pub fn build(self) -> Filter {
        Filter::from_ranges(self.ranges)
    }
}

/// A range filter with a selected field.
#[derive(Debug, Clone)]
pub struct FieldRange {
    ranges: BTreeMap<String, RangeBounds>,
    field: String,
}

impl FieldRange {
    /// The currently selected field.
    pub fn selected(&self) -> &str {
        &self.field
    }

    /// Select another field; bounds already set are kept.
    pub fn field(self, name: impl Into<String>) -> FieldRange {
        RangeFilter {
            ranges: self.ranges,
        }
        .field(name)
    }

    fn bound(mut self, set: impl FnOnce(&mut RangeBounds)) -> Self {
        set(self.ranges.entry(self.field.clone()).or_default());
        self
    }

    /// Set the `from` bound on the selected field.
    pub fn from(self, value: impl Into<FilterValue>) -> Self {
        let value = value.into();
        self.bound(|b| b.from = Some(value))
    }

    /// Set the `to` bound on the selected field.
    pub fn to(self, value: impl Into<FilterValue>) -> Self {
        let value = value.into();
        self.bound(|b| b.to = Some(value))
    }

    /// Set the `gt` bound on the selected field.
    pub fn gt(self, value: impl Into<FilterValue>) -> Self {
        let value = value.into();
        self.bound(|b| b.gt = Some(value))
    }

    /// Set the `gte` bound on the selected field.
    pub fn gte(self, value: impl Into<FilterValue>) -> Self {
        let value = value.into();
        self.bound(|b| b.gte = Some(value))
    }

    /// Set the `lt` bound on the selected field.
    pub fn lt(self, value: impl Into<FilterValue>) -> Self {
        let value = value.into();
        self.bound(|b| b.lt = Some(value))
    }

    /// Set the `lte` bound on the selected field.
    pub fn lte(self, value: impl Into<FilterValue>) -> Self {
        let value = value.into();
        self.bound(|b| b.lte = Some(value))
    }

    /// Finish the range filter.
    ///
    /// Fields with a blank name are dropped; use [`FieldRange::try_build`] to
    /// reject them instead.
    pub fn build(self) -> Filter {
        Filter::from_ranges(self.ranges)
    }

    /// Finish the range filter, failing if any selected field name is blank.
    pub fn try_build(self) -> QueryResult<Filter> {
        if self.ranges.keys().any(|field| field.trim().is_empty()) {
            return Err(blank_range_field());
        }
        Ok(Filter::from_ranges(self.ranges))
    }
}

fn blank_range_field() -> QueryError {
    QueryError::invalid_filter("range bounds set without a field")
        .with_clause("range")
        .with_suggestion("Select a field first: range().field(\"age\").gte(18)")
}

impl From<RangeFilter> for Filter {
    fn from(range: RangeFilter) -> Self {
        range.build()
    }
}

impl From<FieldRange> for Filter {
    fn from(range: FieldRange) -> Self {
        range.build()
    }
}

/// Geo distance range clause.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDistanceRange {
    /// Lower distance, e.g. `"200km"`.
    pub from: String,
    /// Upper distance, e.g. `"400km"`.
    pub to: String,
    /// Geo point field the origin is keyed by.
    pub field: String,
    /// Distance computation, e.g. `"arc"` or `"plane"`.
    pub distance_type: String,
    /// Origin latitude.
    pub lat: f64,
    /// Origin longitude.
    pub lon: f64,
}

/// Inner hits returned alongside nested matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerHits {
    /// Offset of the first inner hit.
    pub from: u32,
    /// Number of inner hits.
    pub size: u32,
}

/// Nested clause: applies a filter to nested objects under `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedFilter {
    /// Path of the nested object.
    pub path: String,
    /// Filter applied to each nested object.
    pub filter: Box<Filter>,
    /// Inner hits, present only when a positive size was requested.
    pub inner_hits: Option<InnerHits>,
}

/// Boolean combination of filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBool {
    /// Filters that must all match.
    pub must: Vec<Filter>,
    /// Filters of which at least one should match.
    pub should: Vec<Filter>,
}

/// The active shape of a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterShape {
    /// `term`: field equals value.
    Term(BTreeMap<String, FilterValue>),
    /// `terms`: field equals any of the values.
    Terms(BTreeMap<String, Vec<FilterValue>>),
    /// `range`: bounds per field.
    Range(BTreeMap<String, RangeBounds>),
    /// `exists`: field is present.
    Exists(String),
    /// `missing`: field is absent.
    Missing(String),
    /// `prefix`: field starts with value.
    Prefix {
        /// Field name.
        field: String,
        /// Prefix to match.
        value: String,
    },
    /// `regexp`: field matches pattern.
    Regexp {
        /// Field name.
        field: String,
        /// Regular expression.
        pattern: String,
    },
    /// `geo_distance_range`.
    GeoDistanceRange(GeoDistanceRange),
    /// `bool` with must/should lists.
    Bool(FilterBool),
    /// `nested`.
    Nested(NestedFilter),
    /// `query`: a full query embedded in a filter.
    Query(Box<Query>),
}

impl FilterShape {
    /// Position of the shape in the fixed resolution order used by
    /// [`Filter::add`]; lower wins.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Term(_) => 0,
            Self::Terms(_) => 1,
            Self::Range(_) => 2,
            Self::Exists(_) => 3,
            Self::Prefix { .. } => 4,
            Self::Missing(_) => 5,
            Self::Regexp { .. } => 6,
            Self::GeoDistanceRange(_) => 7,
            Self::Bool(_) => 8,
            Self::Nested(_) => 9,
            Self::Query(_) => 10,
        }
    }

    fn is_mergeable(&self) -> bool {
        matches!(self, Self::Exists(_) | Self::Missing(_) | Self::Range(_))
    }

    /// Wire name of the shape.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Term(_) => "term",
            Self::Terms(_) => "terms",
            Self::Range(_) => "range",
            Self::Exists(_) => "exists",
            Self::Missing(_) => "missing",
            Self::Prefix { .. } => "prefix",
            Self::Regexp { .. } => "regexp",
            Self::GeoDistanceRange(_) => "geo_distance_range",
            Self::Bool(_) => "bool",
            Self::Nested(_) => "nested",
            Self::Query(_) => "query",
        }
    }
}

/// A filter node.
///
/// A node is plain data; build it on one thread and hand it to the serializer
/// once complete. Builders take `self` by value, so a node under construction
/// cannot be shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    shape: Option<FilterShape>,
}

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    fn from_ranges(mut ranges: BTreeMap<String, RangeBounds>) -> Self {
        ranges.retain(|field, _| {
            let keep = !field.trim().is_empty();
            if !keep {
                warn!("Dropping range bounds set on a blank field name");
            }
            keep
        });
        if ranges.is_empty() {
            return Self::default();
        }
        Self {
            shape: Some(FilterShape::Range(ranges)),
        }
    }

    /// The active shape, if any.
    pub fn shape(&self) -> Option<&FilterShape> {
        self.shape.as_ref()
    }

    /// Wire name of the active shape.
    pub fn kind(&self) -> Option<&'static str> {
        self.shape.as_ref().map(FilterShape::name)
    }

    /// Check if no shape is set.
    pub fn is_empty(&self) -> bool {
        self.shape.is_none()
    }

    fn set_shape(&mut self, shape: FilterShape) {
        if let Some(previous) = &self.shape {
            if previous.name() != shape.name() {
                debug!(
                    from = previous.name(),
                    to = shape.name(),
                    "Replacing filter shape"
                );
            }
        }
        self.shape = Some(shape);
    }

    /// Match documents whose `field` equals `value`.
    ///
    /// Repeated calls keep one entry per field, the last write winning.
    pub fn term(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        match &mut self.shape {
            Some(FilterShape::Term(terms)) => {
                terms.insert(field.into(), value.into());
            }
            _ => {
                let mut terms = BTreeMap::new();
                terms.insert(field.into(), value.into());
                self.set_shape(FilterShape::Term(terms));
            }
        }
        self
    }

    /// Match documents whose `field` equals any of `values`.
    ///
    /// Values accumulate across calls on the same field.
    ///
    /// ```rust
    /// use esdsl_query::filter::{filter, FilterShape};
    ///
    /// let f = filter().terms("user", ["a"]).terms("user", ["b"]);
    /// let Some(FilterShape::Terms(terms)) = f.shape() else { panic!() };
    /// assert_eq!(terms["user"].len(), 2);
    /// ```
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
            Some(FilterShape::Terms(terms)) => {
                terms.entry(field.into()).or_default().extend(values);
            }
            _ => {
                let mut terms = BTreeMap::new();
                terms.insert(field.into(), values);
                self.set_shape(FilterShape::Terms(terms));
            }
        }
        self
    }

    /// Add range bounds on `field`, merging with bounds already set on it.
    ///
    /// A blank field name leaves the filter unchanged.
    pub fn range(mut self, field: impl Into<String>, bounds: RangeBounds) -> Self {
        let field = field.into();
        if field.trim().is_empty() {
            warn!("Ignoring range bounds set on a blank field name");
            return self;
        }
        match &mut self.shape {
            Some(FilterShape::Range(ranges)) => {
                ranges.entry(field).or_default().merge(bounds);
            }
            _ => {
                let mut ranges = BTreeMap::new();
                ranges.insert(field, bounds);
                self.set_shape(FilterShape::Range(ranges));
            }
        }
        self
    }

    /// Like [`Filter::range`], but rejects an empty field name.
    pub fn try_range(self, field: impl Into<String>, bounds: RangeBounds) -> QueryResult<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(blank_range_field());
        }
        Ok(self.range(field, bounds))
    }

    /// Match documents where `field` is present.
    pub fn exists(mut self, field: impl Into<String>) -> Self {
        self.set_shape(FilterShape::Exists(field.into()));
        self
    }

    /// Match documents where `field` is absent.
    pub fn missing(mut self, field: impl Into<String>) -> Self {
        self.set_shape(FilterShape::Missing(field.into()));
        self
    }

    /// Match documents whose `field` starts with `value`.
    pub fn prefix(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_shape(FilterShape::Prefix {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Match documents whose `field` matches the regular expression.
    pub fn regexp(mut self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.set_shape(FilterShape::Regexp {
            field: field.into(),
            pattern: pattern.into(),
        });
        self
    }

    /// Match documents whose geo point lies within a distance band of an origin.
    pub fn geo_distance_range(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        field: impl Into<String>,
        distance_type: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Self {
        self.set_shape(FilterShape::GeoDistanceRange(GeoDistanceRange {
            from: from.into(),
            to: to.into(),
            field: field.into(),
            distance_type: distance_type.into(),
            lat,
            lon,
        }));
        self
    }

    /// Combine filters: all of `must` and any of `should`.
    pub fn bool(mut self, must: Vec<Filter>, should: Vec<Filter>) -> Self {
        self.set_shape(FilterShape::Bool(FilterBool { must, should }));
        self
    }

    /// Apply `inner` to nested objects under `path`.
    ///
    /// Inner hits are requested only when `size` is positive.
    pub fn nested(mut self, path: impl Into<String>, inner: Filter, from: u32, size: u32) -> Self {
        let inner_hits = (size > 0).then_some(InnerHits { from, size });
        self.set_shape(FilterShape::Nested(NestedFilter {
            path: path.into(),
            filter: Box::new(inner),
            inner_hits,
        }));
        self
    }

    /// Embed a full query in this filter.
    pub fn query(mut self, query: Query) -> Self {
        self.set_shape(FilterShape::Query(Box::new(query)));
        self
    }

    /// Combine another filter into this one.
    ///
    /// Only the `exists`, `missing` and `range` shapes of `other` are taken
    /// over; any other shape of `other` is ignored. A shape of the same kind
    /// overwrites this filter's shape. When the two shapes differ, the one
    /// earlier in the resolution order wins:
    /// `term`, `terms`, `range`, `exists`, `prefix`, `missing`, `regexp`,
    /// `geo_distance_range`, `bool`, `nested`, `query`.
    ///
    /// ```rust
    /// use esdsl_query::filter::{filter, range};
    ///
    /// let kept = filter().term("user", "kimchy").add(range().field("age").gte(1).build());
    /// assert_eq!(kept.kind(), Some("term"));
    ///
    /// let taken = filter().exists("email").add(range().field("age").gte(1).build());
    /// assert_eq!(taken.kind(), Some("range"));
    /// ```
    pub fn add(mut self, other: Filter) -> Self {
        let Some(incoming) = other.shape else {
            return self;
        };
        if !incoming.is_mergeable() {
            debug!(shape = incoming.name(), "Filter::add ignores this shape");
            return self;
        }
        let take = match &self.shape {
            Some(current) if current.name() != incoming.name() => {
                let take = incoming.precedence() < current.precedence();
                let (kept, dropped) = if take {
                    (incoming.name(), current.name())
                } else {
                    (current.name(), incoming.name())
                };
                warn!(kept, dropped, "Combined filter holds two shapes; dropping one");
                take
            }
            _ => true,
        };
        if take {
            self.shape = Some(incoming);
        }
        self
    }

    /// Like [`Filter::add`], but fails instead of dropping a shape when the
    /// two filters hold different shapes.
    pub fn try_add(self, other: Filter) -> QueryResult<Self> {
        if let (Some(current), Some(incoming)) = (&self.shape, &other.shape) {
            if incoming.is_mergeable() && current.name() != incoming.name() {
                return Err(QueryError::invalid_filter(format!(
                    "cannot combine a {} filter with a {} filter",
                    current.name(),
                    incoming.name()
                ))
                .with_clause(incoming.name())
                .with_suggestion("Combine them in a compound filter: filters![a, b]"));
            }
        }
        Ok(self.add(other))
    }
}
