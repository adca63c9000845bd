//! Pipeline error type.

use crate::config::ConfigError;
use arrest_csv_source::{SchemaMismatchError, SourceReadError};
use arrest_neo4j_sink::{ConnectionError, QueryError, WriteError};
use thiserror::Error;

/// A failure at the pipeline boundary. The variant names the failing stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceReadError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaMismatchError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("Report query error: {0}")]
    Query(#[from] QueryError),

    /// The blocking source task panicked or was cancelled
    #[error("Source task failed: {0}")]
    Producer(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// Short name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Config(_) => "config",
            PipelineError::Source(_) | PipelineError::Producer(_) => "source",
            PipelineError::Schema(_) => "transform",
            PipelineError::Connection(_) => "connect",
            PipelineError::Write(_) => "write",
            PipelineError::Query(_) => "report",
        }
    }
}
