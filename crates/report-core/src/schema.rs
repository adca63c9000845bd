//! Canonical node schema for arrest reports.
//!
//! The source dataset uses human-readable headers ("Report ID", "Sex Code", ...).
//! Every persisted node uses the snake_case names of [`ReportField`]. The
//! mapping between the two is fixed and 1:1.

use crate::values::FieldValue;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;

/// Label of every node written by the ingestion pipeline.
pub const NODE_LABEL: &str = "Report";

/// Number of canonical fields on a report node.
pub const FIELD_COUNT: usize = 20;

/// One canonical field of an arrest report node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportField {
    Id,
    ReportType,
    ArrestDate,
    Time,
    AreaId,
    AreaName,
    ReportingDistrict,
    Age,
    SexCode,
    DescentCode,
    ChargeGroupCode,
    ChargeGroupDescription,
    ArrestTypeCode,
    Charge,
    ChargeDescription,
    DispositionDescription,
    Address,
    CrossStreet,
    Lat,
    Lon,
}

impl ReportField {
    /// All fields in node property order.
    pub const ALL: [ReportField; FIELD_COUNT] = [
        ReportField::Id,
        ReportField::ReportType,
        ReportField::ArrestDate,
        ReportField::Time,
        ReportField::AreaId,
        ReportField::AreaName,
        ReportField::ReportingDistrict,
        ReportField::Age,
        ReportField::SexCode,
        ReportField::DescentCode,
        ReportField::ChargeGroupCode,
        ReportField::ChargeGroupDescription,
        ReportField::ArrestTypeCode,
        ReportField::Charge,
        ReportField::ChargeDescription,
        ReportField::DispositionDescription,
        ReportField::Address,
        ReportField::CrossStreet,
        ReportField::Lat,
        ReportField::Lon,
    ];

    /// Property name on the persisted node.
    pub const fn name(self) -> &'static str {
        match self {
            ReportField::Id => "id",
            ReportField::ReportType => "report_type",
            ReportField::ArrestDate => "arrest_date",
            ReportField::Time => "time",
            ReportField::AreaId => "area_id",
            ReportField::AreaName => "area_name",
            ReportField::ReportingDistrict => "reporting_district",
            ReportField::Age => "age",
            ReportField::SexCode => "sex_code",
            ReportField::DescentCode => "descent_code",
            ReportField::ChargeGroupCode => "charge_group_code",
            ReportField::ChargeGroupDescription => "charge_group_description",
            ReportField::ArrestTypeCode => "arrest_type_code",
            ReportField::Charge => "charge",
            ReportField::ChargeDescription => "charge_description",
            ReportField::DispositionDescription => "disposition_description",
            ReportField::Address => "address",
            ReportField::CrossStreet => "cross_street",
            ReportField::Lat => "lat",
            ReportField::Lon => "lon",
        }
    }

    /// Header of the source column this field is selected from.
    pub const fn source_column(self) -> &'static str {
        match self {
            ReportField::Id => "Report ID",
            ReportField::ReportType => "Report Type",
            ReportField::ArrestDate => "Arrest Date",
            ReportField::Time => "Time",
            ReportField::AreaId => "Area ID",
            ReportField::AreaName => "Area Name",
            ReportField::ReportingDistrict => "Reporting District",
            ReportField::Age => "Age",
            ReportField::SexCode => "Sex Code",
            ReportField::DescentCode => "Descent Code",
            ReportField::ChargeGroupCode => "Charge Group Code",
            ReportField::ChargeGroupDescription => "Charge Group Description",
            ReportField::ArrestTypeCode => "Arrest Type Code",
            ReportField::Charge => "Charge",
            ReportField::ChargeDescription => "Charge Description",
            ReportField::DispositionDescription => "Disposition Description",
            ReportField::Address => "Address",
            ReportField::CrossStreet => "Cross Street",
            ReportField::Lat => "LAT",
            ReportField::Lon => "LON",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the source table, keyed by the original column headers.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    columns: Arc<[String]>,
    values: Vec<FieldValue>,
}

impl RawRecord {
    /// Build a record from shared headers and one value per header.
    ///
    /// Returns `None` unless there is exactly one value per column.
    pub fn new(columns: Arc<[String]>, values: Vec<FieldValue>) -> Option<Self> {
        (columns.len() == values.len()).then_some(Self { columns, values })
    }

    /// Value of the column with the given header, if the column exists.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Take ownership of the values, in column order.
    pub fn into_values(self) -> Vec<FieldValue> {
        self.values
    }
}

/// Canonical report node: exactly one value per [`ReportField`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArrestReportNode {
    fields: [FieldValue; FIELD_COUNT],
}

impl ArrestReportNode {
    /// Node with every field set to null.
    pub fn empty() -> Self {
        Self {
            fields: std::array::from_fn(|_| FieldValue::Null),
        }
    }

    /// Build a node from values given in [`ReportField::ALL`] order.
    pub fn from_values(fields: [FieldValue; FIELD_COUNT]) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: ReportField) -> &FieldValue {
        &self.fields[field.index()]
    }

    pub fn set(&mut self, field: ReportField, value: impl Into<FieldValue>) {
        self.fields[field.index()] = value.into();
    }

    /// Builder-style variant of [`ArrestReportNode::set`].
    pub fn with(mut self, field: ReportField, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// The node's `id` property.
    pub fn id(&self) -> &FieldValue {
        self.get(ReportField::Id)
    }

    /// Iterate `(field, value)` pairs in property order.
    pub fn iter(&self) -> impl Iterator<Item = (ReportField, &FieldValue)> {
        ReportField::ALL.into_iter().zip(self.fields.iter())
    }
}

impl Default for ArrestReportNode {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for ArrestReportNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.name(), value)?;
        }
        map.end()
    }
}
