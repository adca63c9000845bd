//! CSV source for arrest-graph.
//!
//! This crate reads the arrest-records CSV ([`TabularSource`]), infers column
//! types, and maps each row onto the canonical report node
//! ([`SchemaTransformer`]).
//!
//! ```ignore
//! use arrest_csv_source::{SchemaTransformer, SourceOptions, TabularSource};
//!
//! let source = TabularSource::open("Arrest_Data_from_2020_to_Present.csv", SourceOptions::default())?;
//! let transformer = SchemaTransformer::for_columns(source.columns())?;
//! for node in transformer.transform_all(source.into_records()?) {
//!     println!("{:?}", node?.id());
//! }
//! ```

mod error;
pub mod infer;
mod reader;
mod transform;

pub use error::{SchemaMismatchError, SourceReadError};
pub use reader::{RecordStream, SourceOptions, TabularSource};
pub use transform::SchemaTransformer;
