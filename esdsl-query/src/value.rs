//! Leaf values carried by term, terms and range clauses.

use serde_json::{Number, Value};

use crate::error::{QueryError, QueryResult};

/// Largest magnitude at which a whole float is still emitted as an integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A value that can be compared against a document field.
///
/// Serializes exactly as it appears on the wire: whole floats as integers,
/// non-finite floats as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value (also used for dates such as `2012-12-29T16:52:48+00:00`).
    String(String),
    /// Arbitrary JSON passed through untouched.
    Json(Value),
    /// List of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to its wire representation.
    ///
    /// `field` is only used to label the error when a float is not finite.
    pub fn to_json(&self, field: &str) -> QueryResult<Value> {
        Ok(match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => number(field, *f)?,
            Self::String(s) => Value::String(s.clone()),
            Self::Json(v) => v.clone(),
            Self::List(values) => Value::Array(
                values
                    .iter()
                    .map(|v| v.to_json(field))
                    .collect::<QueryResult<_>>()?,
            ),
        })
    }
}

/// Render a float the way the wire format expects it.
///
/// Whole numbers are written without a fractional part (`2`, not `2.0`) and
/// non-finite values are rejected.
pub(crate) fn number(field: &str, value: f64) -> QueryResult<Value> {
    if !value.is_finite() {
        return Err(QueryError::invalid_number(field, value));
    }
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        return Ok(Value::from(value as i64));
    }
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| QueryError::invalid_number(field, value))
}

impl serde::Serialize for FilterValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.to_json("value").map_err(serde::ser::Error::custom)?;
        serde::Serialize::serialize(&value, serializer)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for FilterValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<&String> for FilterValue {
    fn from(v: &String) -> Self {
        Self::String(v.clone())
    }
}

impl From<Value> for FilterValue {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_value_from() {
        assert_eq!(FilterValue::from(42i32), FilterValue::Int(42));
        assert_eq!(FilterValue::from("hello"), FilterValue::String("hello".to_string()));
        assert_eq!(FilterValue::from(true), FilterValue::Bool(true));
        assert_eq!(FilterValue::from(None::<i64>), FilterValue::Null);
    }

    #[test]
    fn test_whole_floats_render_as_integers() {
        assert_eq!(FilterValue::Float(3.0).to_json("age").unwrap(), json!(3));
        assert_eq!(FilterValue::Float(2.5).to_json("age").unwrap(), json!(2.5));
        assert_eq!(number("boost", -4.0).unwrap().to_string(), "-4");
    }

    #[test]
    fn test_non_finite_float_is_rejected() {
        let err = FilterValue::Float(f64::INFINITY).to_json("price").unwrap_err();
        assert_eq!(err.context.field, Some("price".to_string()));
    }

    #[test]
    fn test_serde_matches_wire_rendering() {
        assert_eq!(serde_json::to_string(&FilterValue::Float(3.0)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&FilterValue::from(vec![1.5, 2.0])).unwrap(),
            "[1.5,2]"
        );

        let err = serde_json::to_string(&FilterValue::Float(f64::NAN)).unwrap_err();
        assert!(err.to_string().contains("E6002"));
        assert!(serde_json::to_value(FilterValue::Float(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_list_and_json_values() {
        let value = FilterValue::from(vec!["a", "b"]);
        assert_eq!(value.to_json("tags").unwrap(), json!(["a", "b"]));

        let raw = FilterValue::from(json!({"lat": 1}));
        assert_eq!(raw.to_json("loc").unwrap(), json!({"lat": 1}));
    }
}
