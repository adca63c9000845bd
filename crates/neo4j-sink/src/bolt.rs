//! Conversions between report values and Neo4j Bolt values.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use neo4rs::{BoltNull, BoltType};
use report_core::FieldValue;

/// Convert a field value to the Bolt value bound as a query parameter.
///
/// Dates and datetimes become native Neo4j `Date` / `LocalDateTime` values.
pub fn field_to_bolt(value: &FieldValue) -> BoltType {
    match value {
        FieldValue::Null => BoltType::Null(BoltNull),
        FieldValue::Integer(i) => BoltType::from(*i),
        FieldValue::Float(f) => BoltType::from(*f),
        FieldValue::Boolean(b) => BoltType::from(*b),
        FieldValue::Date(d) => BoltType::from(*d),
        FieldValue::DateTime(dt) => BoltType::from(*dt),
        FieldValue::String(s) => BoltType::from(s.as_str()),
    }
}

/// Render a grouping key returned by an aggregation as display text.
///
/// Values that have a [`FieldValue`] counterpart render exactly as that
/// value's `Display`, so labels match the in-memory store.
pub fn bolt_to_label(value: &BoltType) -> String {
    match value {
        BoltType::String(s) => s.value.clone(),
        BoltType::Integer(i) => FieldValue::Integer(i.value).to_string(),
        BoltType::Float(f) => FieldValue::Float(f.value).to_string(),
        BoltType::Boolean(b) => FieldValue::Boolean(b.value).to_string(),
        BoltType::Null(_) => FieldValue::Null.to_string(),
        BoltType::Date(d) => match NaiveDate::try_from(d) {
            Ok(date) => FieldValue::Date(date).to_string(),
            Err(_) => format!("{value:?}"),
        },
        BoltType::LocalDateTime(dt) => match NaiveDateTime::try_from(dt) {
            Ok(datetime) => FieldValue::DateTime(datetime).to_string(),
            Err(_) => format!("{value:?}"),
        },
        BoltType::DateTime(dt) => match DateTime::<FixedOffset>::try_from(dt) {
            Ok(datetime) => format!(
                "{}{}",
                FieldValue::DateTime(datetime.naive_local()),
                datetime.format("%:z")
            ),
            Err(_) => format!("{value:?}"),
        },
        other => format!("{other:?}"),
    }
}
