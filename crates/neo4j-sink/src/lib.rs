//! Neo4j writer, connection lifetime, and report queries for arrest-graph.
//!
//! In Neo4j each arrest report becomes one node labeled `Report`, with the
//! record's fields as properties.
//!
//! # Example
//!
//! ```ignore
//! use arrest_neo4j_sink::{write_all, ConnectionSettings, GraphDriver, Neo4jDriver, WriteOptions};
//!
//! let settings = ConnectionSettings::new("bolt://localhost:7687", "neo4j", "password");
//! let driver = Neo4jDriver::connect(&settings).await?;
//! let session = driver.open_session();
//!
//! let metrics = write_all(&session, nodes, WriteOptions::default()).await?;
//! println!("Created {} nodes in {:?}", metrics.nodes_created, metrics.duration);
//! ```

mod bolt;
mod error;
mod query;
mod session;
mod store;
pub mod testing;
mod writer;

pub use bolt::{bolt_to_label, field_to_bolt};
pub use error::{ConnectionError, QueryError, StoreError, WriteError};
pub use query::{age_group, AggregateRow, Aggregation, AGE_GROUPS};
pub use session::{create_report_cypher, ConnectionSettings, Neo4jDriver, Neo4jSession};
pub use store::{GraphDriver, ReportStore};
pub use writer::{write_all, ReportWriter, WriteFailurePolicy, WriteMetrics, WriteOptions};

/// Run one aggregation, attaching the query name to any failure.
pub async fn run_aggregation<S: ReportStore + ?Sized>(
    store: &S,
    aggregation: Aggregation,
) -> Result<Vec<AggregateRow>, QueryError> {
    store
        .aggregate(aggregation)
        .await
        .map_err(|source| QueryError {
            query: aggregation.name(),
            source,
        })
}
