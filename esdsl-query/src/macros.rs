//! Macros for building heterogeneous clause lists.

/// Build a [`FilterGroup`](crate::group::FilterGroup) from mixed items.
///
/// Every argument is converted with `FilterItem::from`, so filters, range
/// builders, nested groups, JSON values and clause markers can be mixed. A
/// leading string sets the operator.
///
/// ```rust
/// use esdsl_query::filter::{filter, range};
/// use esdsl_query::filters;
///
/// let group = filters![
///     "or",
///     filter().term("user", "kimchy"),
///     range().field("age").gte(18),
///     serde_json::json!({"match_all": {}}),
/// ];
/// assert_eq!(group.len(), 3);
/// ```
#[macro_export]
macro_rules! filters {
    () => {
        $crate::group::FilterGroup::new()
    };
    ($($item:expr),+ $(,)?) => {
        $crate::group::compound_filter(::std::vec![
            $($crate::group::FilterItem::from($item)),+
        ])
    };
}
