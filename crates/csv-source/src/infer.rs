//! Cell-level type inference and parsing.
//!
//! Inference runs over every non-empty cell of a column and widens the
//! column type with [`ColumnType::widen`]. Parsing then converts each cell
//! according to the final column type.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use report_core::{ColumnType, FieldValue};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Narrowest type a single cell fits.
///
/// Empty cells are [`ColumnType::Null`] and never influence the column type.
pub fn infer_cell(text: &str) -> ColumnType {
    if text.is_empty() {
        return ColumnType::Null;
    }
    if text.parse::<i64>().is_ok() {
        return ColumnType::Integer;
    }
    if parse_float(text).is_some() {
        return ColumnType::Float;
    }
    if parse_bool(text).is_some() {
        return ColumnType::Boolean;
    }
    if parse_date(text).is_some() {
        return ColumnType::Date;
    }
    if parse_datetime(text).is_some() {
        return ColumnType::DateTime;
    }
    ColumnType::String
}

/// Parse a cell as the given column type.
///
/// Returns `None` when a non-empty cell does not fit the type.
pub fn parse_cell(text: &str, column_type: ColumnType) -> Option<FieldValue> {
    if text.is_empty() {
        return Some(FieldValue::Null);
    }
    match column_type {
        ColumnType::Null => None,
        ColumnType::Integer => text.parse::<i64>().ok().map(FieldValue::Integer),
        ColumnType::Float => parse_float(text).map(FieldValue::Float),
        ColumnType::Boolean => parse_bool(text).map(FieldValue::Boolean),
        ColumnType::Date => parse_date(text).map(FieldValue::Date),
        ColumnType::DateTime => parse_datetime(text)
            .or_else(|| parse_date(text).map(|d| d.and_time(NaiveTime::MIN)))
            .map(FieldValue::DateTime),
        ColumnType::String => Some(FieldValue::String(text.to_string())),
    }
}

// Rust accepts "inf" and "NaN" as floats; source data never means those.
fn parse_float(text: &str) -> Option<f64> {
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Running column-type inference over a stream of rows.
#[derive(Debug, Clone)]
pub struct ColumnInference {
    types: Vec<ColumnType>,
}

impl ColumnInference {
    pub fn new(column_count: usize) -> Self {
        Self {
            types: vec![ColumnType::Null; column_count],
        }
    }

    /// Widen every column with one row's cells.
    pub fn observe<'a>(&mut self, cells: impl IntoIterator<Item = &'a str>) {
        for (ty, cell) in self.types.iter_mut().zip(cells) {
            *ty = ty.widen(infer_cell(cell));
        }
    }

    pub fn finish(self) -> Vec<ColumnType> {
        self.types
    }
}
