//! Sort specifications.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl SortOrder {
    /// Wire keyword for this sort order.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort on `field`, ascending.
pub fn sort(field: impl Into<String>) -> Sort {
    Sort::new(field)
}

/// Sort by a single field.
///
/// ```rust
/// use esdsl_query::sort::sort;
/// use esdsl_query::ToJson;
///
/// let s = sort("last_name").desc().missing_last();
/// assert_eq!(s.to_json_string().unwrap(), r#"{"last_name":{"missing":"_last","order":"desc"}}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// Field to sort on.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
    /// Placement of documents without the field. Only `_first` and `_last`
    /// reach the wire.
    pub missing: Option<String>,
}

impl Sort {
    /// Sort on `field`, ascending.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
            missing: None,
        }
    }

    /// Sort descending.
    pub fn desc(mut self) -> Self {
        self.order = SortOrder::Desc;
        self
    }

    /// Sort ascending.
    pub fn asc(mut self) -> Self {
        self.order = SortOrder::Asc;
        self
    }

    /// Set the missing placement.
    pub fn missing(mut self, placement: impl Into<String>) -> Self {
        self.missing = Some(placement.into());
        self
    }

    /// Put documents without the field first.
    pub fn missing_first(self) -> Self {
        self.missing("_first")
    }

    /// Put documents without the field last.
    pub fn missing_last(self) -> Self {
        self.missing("_last")
    }

    /// The missing placement if it is one the wire format accepts.
    pub fn missing_placement(&self) -> Option<&str> {
        self.missing
            .as_deref()
            .filter(|m| matches!(*m, "_first" | "_last"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ascending() {
        let s = sort("age");
        assert_eq!(s.order, SortOrder::Asc);
        assert_eq!(s.order.to_string(), "asc");
        assert!(s.missing_placement().is_none());
    }

    #[test]
    fn test_missing_only_accepts_sentinels() {
        assert_eq!(sort("a").missing_first().missing_placement(), Some("_first"));
        assert_eq!(sort("a").missing("_LAST").missing_placement(), None);
        assert_eq!(sort("a").missing("0").missing_placement(), None);
    }

    #[test]
    fn test_desc_then_asc() {
        assert_eq!(sort("a").desc().asc().order, SortOrder::Asc);
    }
}
