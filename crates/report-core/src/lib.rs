//! Core types for the arrest-graph ingestion pipeline.
//!
//! - [`ColumnType`] - inferred type of a source column
//! - [`FieldValue`] - a single typed cell
//! - [`RawRecord`] - one source row keyed by its original headers
//! - [`ArrestReportNode`] - the canonical node shape, one value per [`ReportField`]
//!
//! ```text
//! report-core (this crate)
//!    │
//!    ├─── arrest-csv-source   (reads CSV into RawRecord, maps to ArrestReportNode)
//!    └─── arrest-neo4j-sink   (binds ArrestReportNode fields as Cypher parameters)
//! ```

pub mod schema;
pub mod types;
pub mod values;

pub use schema::{ArrestReportNode, RawRecord, ReportField, FIELD_COUNT, NODE_LABEL};
pub use types::ColumnType;
pub use values::FieldValue;
