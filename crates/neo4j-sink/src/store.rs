//! Store and driver traits.
//!
//! The ingestion pipeline is written against these traits and monomorphized
//! for the concrete implementation: [`Neo4jDriver`](crate::Neo4jDriver) in
//! production and [`MemoryStore`](crate::testing::MemoryStore) in tests.

use crate::error::StoreError;
use crate::query::{AggregateRow, Aggregation};
use report_core::ArrestReportNode;

/// Operations a session offers on report nodes.
#[async_trait::async_trait]
pub trait ReportStore: Send + Sync {
    /// Create one node labeled `Report` with the record's fields as properties.
    ///
    /// Plain create: an existing node with the same `id` is not looked up.
    async fn create_report(&self, node: &ArrestReportNode) -> Result<(), StoreError>;

    /// Count nodes labeled `Report`.
    async fn count_reports(&self) -> Result<u64, StoreError>;

    /// Run one of the fixed read-side aggregations.
    async fn aggregate(&self, aggregation: Aggregation) -> Result<Vec<AggregateRow>, StoreError>;
}

/// An open connection to a graph store that hands out sessions.
///
/// Dropping the driver releases the connection.
pub trait GraphDriver: Send + Sync {
    type Session: ReportStore;

    /// Open a session. Dropping the session releases it.
    fn open_session(&self) -> Self::Session;

    /// Human-readable target for log messages.
    fn target(&self) -> &str;
}
