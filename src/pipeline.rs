//! CSV to Neo4j ingestion pipeline.
//!
//! Startup runs the type-inference pass over the source file on a blocking
//! thread while the driver connects. A failed connect cancels the pass and
//! waits for it to close the file. Records are then read, transformed and
//! sent over a bounded channel by a blocking producer task while the writer
//! consumes them one at a time on the pipeline task.
//!
//! Teardown is the same on every exit path: the session is released, then the
//! driver, then the source (channel receiver and producer task).

use crate::error::PipelineError;
use arrest_csv_source::{SchemaTransformer, SourceOptions, SourceReadError, TabularSource};
use arrest_neo4j_sink::{
    ConnectionError, ConnectionSettings, GraphDriver, Neo4jDriver, ReportStore, ReportWriter,
    WriteMetrics, WriteOptions,
};
use report_core::ArrestReportNode;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub const DEFAULT_SOURCE_PATH: &str = "Arrest_Data_from_2020_to_Present.csv";

/// Capacity of the channel between the source task and the writer.
pub const CHANNEL_CAPACITY: usize = 1024;

type SourceItem = Result<ArrestReportNode, SourceReadError>;

/// Options for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub source: PathBuf,
    pub source_options: SourceOptions,
    pub write: WriteOptions,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE_PATH),
            source_options: SourceOptions::default(),
            write: WriteOptions::default(),
        }
    }
}

/// Outcome of a completed ingestion run.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub source: PathBuf,
    /// Writer counts; `duration` is the wall time from startup to teardown
    pub metrics: WriteMetrics,
    pub dry_run: bool,
}

/// Ingest the source file into Neo4j.
pub async fn run(
    settings: &ConnectionSettings,
    options: &IngestOptions,
) -> Result<IngestSummary, PipelineError> {
    ingest_with(Neo4jDriver::connect(settings), options).await
}

/// Ingest the source file through whichever driver `connect` resolves to.
pub async fn ingest_with<D, F>(
    connect: F,
    options: &IngestOptions,
) -> Result<IngestSummary, PipelineError>
where
    D: GraphDriver,
    F: Future<Output = Result<D, ConnectionError>>,
{
    let started = Instant::now();
    info!("Starting ingestion from {}", options.source.display());

    let cancel = Arc::new(AtomicBool::new(false));
    let inference = {
        let path = options.source.clone();
        let source_options = options.source_options.clone();
        let cancel = Arc::clone(&cancel);
        tokio::task::spawn_blocking(move || {
            TabularSource::open_cancellable(path, source_options, &cancel)
        })
    };

    let driver = match connect.await {
        Ok(driver) => driver,
        Err(e) => {
            cancel.store(true, Ordering::Relaxed);
            let _ = inference.await;
            debug!("Source released after failed connect");
            return Err(e.into());
        }
    };
    info!("Connected to {}", driver.target());
    let source = inference.await??;

    let transformer = match SchemaTransformer::for_columns(source.columns()) {
        Ok(transformer) => transformer,
        Err(e) => {
            drop(driver);
            drop(source);
            return Err(e.into());
        }
    };

    let (tx, mut rx) = mpsc::channel::<SourceItem>(CHANNEL_CAPACITY);
    let producer = tokio::task::spawn_blocking(move || produce(source, transformer, tx));

    let session = driver.open_session();
    let outcome = drain(&session, &mut rx, options.write).await;

    drop(session);
    drop(driver);
    drop(rx);
    let joined = producer.await;
    debug!("Pipeline resources released");

    let mut metrics = outcome?;
    joined?;

    metrics.duration = started.elapsed();
    info!(
        "Ingestion complete: {} rows read, {} nodes created in {:?} ({:.0} rows/sec)",
        metrics.rows_read,
        metrics.nodes_created,
        metrics.duration,
        metrics.rows_per_second()
    );
    let summary = IngestSummary {
        source: options.source.clone(),
        metrics,
        dry_run: options.write.dry_run,
    };
    Ok(summary)
}

// Runs on a blocking thread. Stops after the first error or once the
// receiver is gone.
fn produce(source: TabularSource, transformer: SchemaTransformer, tx: mpsc::Sender<SourceItem>) {
    let records = match source.into_records() {
        Ok(records) => records,
        Err(e) => {
            let _ = tx.blocking_send(Err(e));
            return;
        }
    };
    for item in transformer.transform_all(records) {
        let failed = item.is_err();
        if tx.blocking_send(item).is_err() {
            debug!("Writer stopped, ending source stream");
            return;
        }
        if failed {
            return;
        }
    }
}

async fn drain<S: ReportStore>(
    session: &S,
    rx: &mut mpsc::Receiver<SourceItem>,
    options: WriteOptions,
) -> Result<WriteMetrics, PipelineError> {
    let mut writer = ReportWriter::new(session, options);
    while let Some(item) = rx.recv().await {
        let node = item?;
        writer.write(&node).await?;
    }
    Ok(writer.finish())
}
