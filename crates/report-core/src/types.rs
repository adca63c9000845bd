//! Column types inferred from source data.
//!
//! A source column starts out as [`ColumnType::Null`] and is widened once per
//! non-empty cell. The lattice is small on purpose: integers widen to floats,
//! dates widen to datetimes, and every other mix collapses to strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inferred type of a whole source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// No non-empty cell has been seen yet
    Null,

    /// 64-bit signed integer
    Integer,

    /// 64-bit IEEE 754 floating point
    Float,

    /// `true` / `false`
    Boolean,

    /// Calendar date without time (`YYYY-MM-DD`)
    Date,

    /// Date and time without timezone
    DateTime,

    /// Anything else
    String,
}

impl ColumnType {
    /// Least upper bound of two column types.
    ///
    /// ```
    /// use report_core::ColumnType;
    ///
    /// assert_eq!(ColumnType::Integer.widen(ColumnType::Float), ColumnType::Float);
    /// assert_eq!(ColumnType::Null.widen(ColumnType::Date), ColumnType::Date);
    /// assert_eq!(ColumnType::Integer.widen(ColumnType::Date), ColumnType::String);
    /// ```
    pub fn widen(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Null, t) | (t, Null) => t,
            (Integer, Float) | (Float, Integer) => Float,
            (Date, DateTime) | (DateTime, Date) => DateTime,
            _ => String,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Null => "null",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::String => "string",
        };
        f.write_str(name)
    }
}
