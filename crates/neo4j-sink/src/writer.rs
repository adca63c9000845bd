//! Sequential report writer.
//!
//! Each record becomes exactly one `CREATE` issued in input order. Nothing
//! is rolled back: when a write fails under [`WriteFailurePolicy::Abort`],
//! every node created before it stays in the store.

use crate::error::WriteError;
use crate::store::ReportStore;
use report_core::ArrestReportNode;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What the writer does when creating a node fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteFailurePolicy {
    /// Stop at the first failed record and return its error.
    #[default]
    Abort,
    /// Log the failed record, remember its id, and continue.
    Skip,
}

/// Writer options.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    pub policy: WriteFailurePolicy,
    /// Count records without issuing any write.
    pub dry_run: bool,
}

/// Metrics from a write run.
#[derive(Debug, Clone, Default)]
pub struct WriteMetrics {
    /// Records handed to the writer.
    pub rows_read: u64,
    /// Nodes the store confirmed.
    pub nodes_created: u64,
    /// Ids of records skipped under [`WriteFailurePolicy::Skip`].
    pub skipped_ids: Vec<String>,
    /// Total time taken.
    pub duration: Duration,
}

impl WriteMetrics {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.rows_read as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Writes report nodes one at a time through a borrowed session.
pub struct ReportWriter<'s, S: ReportStore + ?Sized> {
    store: &'s S,
    options: WriteOptions,
    metrics: WriteMetrics,
    started: Instant,
}

impl<'s, S: ReportStore + ?Sized> ReportWriter<'s, S> {
    pub fn new(store: &'s S, options: WriteOptions) -> Self {
        Self {
            store,
            options,
            metrics: WriteMetrics::default(),
            started: Instant::now(),
        }
    }

    /// Write one record. Rows are numbered from 1 in the order they arrive.
    pub async fn write(&mut self, node: &ArrestReportNode) -> Result<(), WriteError> {
        self.metrics.rows_read += 1;
        let row = self.metrics.rows_read;

        if self.options.dry_run {
            debug!("Dry run: skipping create for report {} (row {row})", node.id());
            return Ok(());
        }

        match self.store.create_report(node).await {
            Ok(()) => {
                self.metrics.nodes_created += 1;
                if self.metrics.nodes_created % 10_000 == 0 {
                    debug!("Created {} report nodes", self.metrics.nodes_created);
                }
                Ok(())
            }
            Err(source) => {
                let err = WriteError {
                    id: node.id().to_string(),
                    row,
                    source,
                };
                match self.options.policy {
                    WriteFailurePolicy::Abort => Err(err),
                    WriteFailurePolicy::Skip => {
                        warn!("{err}; skipping");
                        self.metrics.skipped_ids.push(err.id);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Metrics so far.
    pub fn metrics(&self) -> &WriteMetrics {
        &self.metrics
    }

    pub fn finish(mut self) -> WriteMetrics {
        self.metrics.duration = self.started.elapsed();
        info!(
            "Wrote {} of {} reports in {:?} ({:.0} rows/sec)",
            self.metrics.nodes_created,
            self.metrics.rows_read,
            self.metrics.duration,
            self.metrics.rows_per_second()
        );
        if !self.metrics.skipped_ids.is_empty() {
            warn!("Skipped {} failed reports", self.metrics.skipped_ids.len());
        }
        self.metrics
    }
}

/// Write every node from an iterator, in order.
pub async fn write_all<S, I>(
    store: &S,
    nodes: I,
    options: WriteOptions,
) -> Result<WriteMetrics, WriteError>
where
    S: ReportStore + ?Sized,
    I: IntoIterator<Item = ArrestReportNode>,
{
    let mut writer = ReportWriter::new(store, options);
    for node in nodes {
        writer.write(&node).await?;
    }
    Ok(writer.finish())
}
