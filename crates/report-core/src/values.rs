//! Cell values carried from the source table to the graph store.

use crate::types::ColumnType;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// A single typed cell.
///
/// Values are produced by the source reader according to the inferred
/// [`ColumnType`] of their column and are never coerced afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Empty cell
    #[default]
    Null,

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point (always finite)
    Float(f64),

    /// Boolean value
    Boolean(bool),

    /// Calendar date
    Date(NaiveDate),

    /// Date and time without timezone
    DateTime(NaiveDateTime),

    /// Text value
    String(String),
}

impl FieldValue {
    /// The column type this value belongs to.
    pub fn column_type(&self) -> ColumnType {
        match self {
            FieldValue::Null => ColumnType::Null,
            FieldValue::Integer(_) => ColumnType::Integer,
            FieldValue::Float(_) => ColumnType::Float,
            FieldValue::Boolean(_) => ColumnType::Boolean,
            FieldValue::Date(_) => ColumnType::Date,
            FieldValue::DateTime(_) => ColumnType::DateTime,
            FieldValue::String(_) => ColumnType::String,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            FieldValue::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Null.to_string(), "null");
        assert_eq!(FieldValue::Integer(42).to_string(), "42");
        assert_eq!(FieldValue::from("Central").to_string(), "Central");
        let date = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
        assert_eq!(FieldValue::Date(date).to_string(), "2020-01-05");
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(FieldValue::Integer(30).as_f64(), Some(30.0));
        assert_eq!(FieldValue::Float(34.05).as_i64(), None);
        assert_eq!(FieldValue::from("30").as_f64(), None);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(7i64)), FieldValue::Integer(7));
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&vec![
            FieldValue::Null,
            FieldValue::Integer(1),
            FieldValue::from("M"),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,1,"M"]"#);
    }
}
