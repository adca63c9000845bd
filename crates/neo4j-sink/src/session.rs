//! Neo4j driver and session lifetime.

use crate::bolt::{bolt_to_label, field_to_bolt};
use crate::error::{ConnectionError, StoreError};
use crate::query::{AggregateRow, Aggregation};
use crate::store::{GraphDriver, ReportStore};
use neo4rs::{query, BoltType, ConfigBuilder, Graph};
use report_core::{ArrestReportNode, ReportField, NODE_LABEL};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Connection settings for the graph database.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Bolt URI (e.g., "bolt://localhost:7687")
    pub graph_uri: String,
    pub username: String,
    pub password: String,
    /// Database name; the server default when `None`
    pub database: Option<String>,
}

impl ConnectionSettings {
    pub fn new(
        graph_uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            graph_uri: graph_uri.into(),
            username: username.into(),
            password: password.into(),
            database: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("graph_uri", &self.graph_uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Cypher for creating one report node, every field bound as `$name`.
pub fn create_report_cypher() -> String {
    let props: Vec<String> = ReportField::ALL
        .iter()
        .map(|f| format!("{0}: ${0}", f.name()))
        .collect();
    format!("CREATE (r:{NODE_LABEL} {{{}}})", props.join(", "))
}

/// Owns the Neo4j connection pool for one pipeline run.
pub struct Neo4jDriver {
    graph: Graph,
    uri: String,
}

impl Neo4jDriver {
    /// Configure the driver and check the server answers a trivial query.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, ConnectionError> {
        let fail = |source: StoreError| ConnectionError {
            uri: settings.graph_uri.clone(),
            source,
        };

        debug!(
            "Connecting to Neo4j at {} as {}",
            settings.graph_uri, settings.username
        );
        let mut builder = ConfigBuilder::default()
            .uri(&settings.graph_uri)
            .user(&settings.username)
            .password(&settings.password);
        if let Some(database) = &settings.database {
            builder = builder.db(database.as_str());
        }
        let config = builder.build().map_err(|e| fail(e.into()))?;

        let graph = Graph::connect(config).map_err(|e| fail(e.into()))?;
        graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| fail(e.into()))?;

        info!("Neo4j connection established: {}", settings.graph_uri);
        Ok(Self {
            graph,
            uri: settings.graph_uri.clone(),
        })
    }
}

impl GraphDriver for Neo4jDriver {
    type Session = Neo4jSession;

    fn open_session(&self) -> Neo4jSession {
        let id = SESSION_COUNTER.fetch_add(1, Ordering::SeqCst);
        debug!("Opening Neo4j session {} on {}", id, self.uri);
        Neo4jSession {
            graph: self.graph.clone(),
            create_cypher: create_report_cypher(),
            id,
        }
    }

    fn target(&self) -> &str {
        &self.uri
    }
}

impl Drop for Neo4jDriver {
    fn drop(&mut self) {
        debug!("Closing Neo4j driver for {}", self.uri);
    }
}

/// A session scoped to one ingestion or report run.
pub struct Neo4jSession {
    graph: Graph,
    create_cypher: String,
    id: u64,
}

#[async_trait::async_trait]
impl ReportStore for Neo4jSession {
    async fn create_report(&self, node: &ArrestReportNode) -> Result<(), StoreError> {
        let mut create = query(&self.create_cypher);
        for (field, value) in node.iter() {
            create = create.param(field.name(), field_to_bolt(value));
        }
        self.graph.run(create).await?;
        Ok(())
    }

    async fn count_reports(&self) -> Result<u64, StoreError> {
        let cypher = format!("MATCH (n:{NODE_LABEL}) RETURN count(n) AS count");
        let mut result = self.graph.execute(query(&cypher)).await?;

        if let Some(row) = result.next().await? {
            let count: i64 = row
                .get("count")
                .map_err(|e| StoreError::Decode(format!("Failed to get count: {e}")))?;
            Ok(count as u64)
        } else {
            Ok(0)
        }
    }

    async fn aggregate(&self, aggregation: Aggregation) -> Result<Vec<AggregateRow>, StoreError> {
        debug!("Running {} on session {}", aggregation, self.id);
        let mut result = self.graph.execute(query(aggregation.cypher())).await?;

        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            let key: BoltType = row.get(aggregation.key_column()).map_err(|e| {
                StoreError::Decode(format!(
                    "Failed to get {}: {e}",
                    aggregation.key_column()
                ))
            })?;
            let count: i64 = row.get(aggregation.count_column()).map_err(|e| {
                StoreError::Decode(format!(
                    "Failed to get {}: {e}",
                    aggregation.count_column()
                ))
            })?;
            rows.push(AggregateRow::new(bolt_to_label(&key), count));
        }
        Ok(rows)
    }
}

impl Drop for Neo4jSession {
    fn drop(&mut self) {
        debug!("Closing Neo4j session {}", self.id);
    }
}
