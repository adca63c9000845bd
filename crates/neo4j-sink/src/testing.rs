//! In-memory graph store for tests.
//!
//! [`MemoryStore`] evaluates the aggregations with the same grouping and
//! null filtering as their Cypher, and records driver and session lifetime
//! events so tests can check release order.

use crate::error::StoreError;
use crate::query::{AggregateRow, Aggregation};
use crate::store::{GraphDriver, ReportStore};
use report_core::ArrestReportNode;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    nodes: Vec<ArrestReportNode>,
    create_calls: u64,
    failing_ids: HashSet<String>,
    events: Vec<String>,
}

/// Shared in-memory node store. Clones see the same nodes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every create for a record with this `id`.
    pub fn fail_on_id(&self, id: impl Into<String>) -> &Self {
        self.lock().failing_ids.insert(id.into());
        self
    }

    pub fn nodes(&self) -> Vec<ArrestReportNode> {
        self.lock().nodes.clone()
    }

    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    /// Number of create attempts, successful or not.
    pub fn create_calls(&self) -> u64 {
        self.lock().create_calls
    }

    /// Lifetime events in the order they happened.
    pub fn events(&self) -> Vec<String> {
        self.lock().events.clone()
    }

    fn record(&self, event: impl Into<String>) {
        self.lock().events.push(event.into());
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl ReportStore for MemoryStore {
    async fn create_report(&self, node: &ArrestReportNode) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.create_calls += 1;
        let id = node.id().to_string();
        if state.failing_ids.contains(&id) {
            return Err(StoreError::Rejected(format!("create refused for id {id}")));
        }
        state.nodes.push(node.clone());
        Ok(())
    }

    async fn count_reports(&self) -> Result<u64, StoreError> {
        Ok(self.lock().nodes.len() as u64)
    }

    async fn aggregate(&self, aggregation: Aggregation) -> Result<Vec<AggregateRow>, StoreError> {
        let state = self.lock();
        let mut rows: Vec<AggregateRow> = Vec::new();
        for node in &state.nodes {
            let Some(key) = aggregation.group_key(node.get(aggregation.source_field())) else {
                continue;
            };
            match rows.iter_mut().find(|row| row.key == key) {
                Some(row) => row.count += 1,
                None => rows.push(AggregateRow::new(key, 1)),
            }
        }
        Ok(rows)
    }
}

/// Driver over a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryDriver {
    store: MemoryStore,
}

impl MemoryDriver {
    pub fn new(store: MemoryStore) -> Self {
        store.record("driver opened");
        Self { store }
    }
}

impl GraphDriver for MemoryDriver {
    type Session = MemorySession;

    fn open_session(&self) -> MemorySession {
        self.store.record("session opened");
        MemorySession {
            store: self.store.clone(),
        }
    }

    fn target(&self) -> &str {
        "memory"
    }
}

impl Drop for MemoryDriver {
    fn drop(&mut self) {
        self.store.record("driver closed");
    }
}

/// Session over a [`MemoryStore`].
#[derive(Debug)]
pub struct MemorySession {
    store: MemoryStore,
}

#[async_trait::async_trait]
impl ReportStore for MemorySession {
    async fn create_report(&self, node: &ArrestReportNode) -> Result<(), StoreError> {
        self.store.create_report(node).await
    }

    async fn count_reports(&self) -> Result<u64, StoreError> {
        self.store.count_reports().await
    }

    async fn aggregate(&self, aggregation: Aggregation) -> Result<Vec<AggregateRow>, StoreError> {
        self.store.aggregate(aggregation).await
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.store.record("session closed");
    }
}
