//! arrest-graph: load arrest report CSV exports into Neo4j.
//!
//! Every source row becomes one node labeled `Report`. The pieces live in
//! their own crates:
//!
//! - `report-core`: canonical field set and value types
//! - `arrest-csv-source`: header parsing, type inference, row streaming, renaming
//! - `arrest-neo4j-sink`: driver lifetime, node writer, report queries
//!
//! This crate ties them together with the YAML config loader, the ingestion
//! pipeline and report rendering used by the `arrest-graph` binary.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::ConfigError;
pub use error::PipelineError;
pub use pipeline::{ingest_with, IngestOptions, IngestSummary};

pub use arrest_csv_source::SourceOptions;
pub use arrest_neo4j_sink::{
    Aggregation, ConnectionSettings, WriteFailurePolicy, WriteOptions,
};
