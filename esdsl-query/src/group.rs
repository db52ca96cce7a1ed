//! Compound filters: a list of clauses joined by one boolean operator.
//!
//! ```rust
//! use esdsl_query::filter::filter;
//! use esdsl_query::filters;
//!
//! let group = filters!["or", filter().term("a", 1), filter().term("b", 2)];
//! assert_eq!(group.operator().as_str(), "or");
//! assert_eq!(group.len(), 2);
//! ```

use std::fmt;

use serde_json::Value;
use tracing::trace;

use crate::filter::{FieldRange, Filter, RangeFilter};

/// Build a compound filter from a list of items.
///
/// A leading boolean clause marker (followed by at least one more item) sets
/// the operator; otherwise the operator is `and`.
pub fn compound_filter(items: impl IntoIterator<Item = FilterItem>) -> FilterGroup {
    let mut group = FilterGroup::new();
    group.add_filters(items);
    group
}

/// A boolean clause type such as `and` or `or`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoolClause(String);

impl BoolClause {
    /// Create a clause marker.
    pub fn new(clause: impl Into<String>) -> Self {
        Self(clause.into())
    }

    /// The `and` operator.
    pub fn and() -> Self {
        Self::new("and")
    }

    /// The `or` operator.
    pub fn or() -> Self {
        Self::new("or")
    }

    /// The clause name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BoolClause {
    fn default() -> Self {
        Self::and()
    }
}

impl fmt::Display for BoolClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of a compound filter list.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterItem {
    /// Boolean clause marker. Consumed as the operator when it leads a list;
    /// anywhere else it is emitted as a plain string.
    Clause(BoolClause),
    /// A filter node.
    Filter(Filter),
    /// A nested compound filter.
    Group(FilterGroup),
    /// Any other value, passed through untouched.
    Value(Value),
}

impl From<BoolClause> for FilterItem {
    fn from(c: BoolClause) -> Self {
        Self::Clause(c)
    }
}

impl From<&str> for FilterItem {
    fn from(s: &str) -> Self {
        Self::Clause(BoolClause::new(s))
    }
}

impl From<String> for FilterItem {
    fn from(s: String) -> Self {
        Self::Clause(BoolClause::new(s))
    }
}

impl From<Filter> for FilterItem {
    fn from(f: Filter) -> Self {
        Self::Filter(f)
    }
}

impl From<RangeFilter> for FilterItem {
    fn from(r: RangeFilter) -> Self {
        Self::Filter(r.build())
    }
}

impl From<FieldRange> for FilterItem {
    fn from(r: FieldRange) -> Self {
        Self::Filter(r.build())
    }
}

impl From<FilterGroup> for FilterItem {
    fn from(g: FilterGroup) -> Self {
        Self::Group(g)
    }
}

impl From<Value> for FilterItem {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

/// An ordered list of filter items combined under one boolean operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGroup {
    operator: BoolClause,
    items: Vec<FilterItem>,
}

impl FilterGroup {
    /// Create an empty group with the `and` operator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The boolean operator joining the items.
    pub fn operator(&self) -> &BoolClause {
        &self.operator
    }

    /// The items, in insertion order.
    pub fn items(&self) -> &[FilterItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the group has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append items to the group.
    ///
    /// If more than one item is supplied and the first is a boolean clause
    /// marker, it sets the operator instead of being appended.
    pub fn add_filters(&mut self, items: impl IntoIterator<Item = FilterItem>) {
        let mut items: Vec<FilterItem> = items.into_iter().collect();
        if items.len() > 1 {
            if let FilterItem::Clause(clause) = &items[0] {
                trace!(operator = clause.as_str(), "Compound filter operator set");
                self.operator = clause.clone();
                items.remove(0);
            }
        }
        self.items.extend(items);
    }

    /// Builder form of [`FilterGroup::add_filters`].
    pub fn with_filters(mut self, items: impl IntoIterator<Item = FilterItem>) -> Self {
        self.add_filters(items);
        self
    }
}

impl fmt::Display for FilterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filters({}): {}:{:?}", self.operator, self.items.len(), self.items)
    }
}
