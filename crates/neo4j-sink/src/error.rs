//! Error types for the Neo4j sink.

use thiserror::Error;

/// Low-level failure reported by a [`ReportStore`](crate::ReportStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// Neo4j driver error
    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),

    /// A result row did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// The store refused the operation
    #[error("Rejected: {0}")]
    Rejected(String),
}

/// The driver could not be configured or the server could not be reached.
#[derive(Error, Debug)]
#[error("Failed to connect to graph database at {uri}: {source}")]
pub struct ConnectionError {
    pub uri: String,
    #[source]
    pub source: StoreError,
}

/// Creating the node for one record failed.
#[derive(Error, Debug)]
#[error("Failed to write report {id} (row {row}): {source}")]
pub struct WriteError {
    /// `id` property of the offending record
    pub id: String,
    /// 1-indexed position of the record in the input
    pub row: u64,
    #[source]
    pub source: StoreError,
}

/// A read-side aggregation query failed.
#[derive(Error, Debug)]
#[error("Query '{query}' failed: {source}")]
pub struct QueryError {
    pub query: &'static str,
    #[source]
    pub source: StoreError,
}
