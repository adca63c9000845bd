//! Ingestion pipeline end to end against the in-memory store.

use arrest_graph::pipeline::ingest_with;
use arrest_graph::report::report_with;
use arrest_graph::{
    Aggregation, IngestOptions, PipelineError, SourceOptions, WriteFailurePolicy, WriteOptions,
};
use arrest_neo4j_sink::testing::{MemoryDriver, MemoryStore};
use arrest_neo4j_sink::{AggregateRow, ConnectionError, StoreError};
use report_core::{FieldValue, ReportField};
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("arrest_graph=debug,arrest_neo4j_sink=debug")
        .try_init()
        .ok();
}

fn header() -> String {
    ReportField::ALL
        .iter()
        .map(|f| f.source_column())
        .collect::<Vec<_>>()
        .join(",")
}

fn row(id: i64, sex: &str, age: i64, area: &str) -> String {
    format!(
        "{id},BOOKING,2020-06-28,1530,3,{area},356,{age},{sex},W,5,Burglary,F,459PC,BURGLARY,,3800 S  FIGUEROA ST,,34.0168,-118.2819"
    )
}

fn dataset(rows: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", header()).unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn options(file: &NamedTempFile) -> IngestOptions {
    IngestOptions {
        source: file.path().to_path_buf(),
        ..Default::default()
    }
}

async fn ingest(
    store: &MemoryStore,
    options: &IngestOptions,
) -> Result<arrest_graph::IngestSummary, PipelineError> {
    let driver = MemoryDriver::new(store.clone());
    ingest_with(async { Ok::<_, ConnectionError>(driver) }, options).await
}

async fn counts(store: &MemoryStore, aggregation: Aggregation) -> HashMap<String, i64> {
    let driver = MemoryDriver::new(store.clone());
    report_with(async { Ok::<_, ConnectionError>(driver) }, aggregation)
        .await
        .unwrap()
        .into_iter()
        .map(|AggregateRow { key, count }| (key, count))
        .collect()
}

#[tokio::test]
async fn test_every_row_becomes_one_node() {
    init_logging();
    let rows: Vec<_> = (1..=5).map(|i| row(i, "M", 30, "Central")).collect();
    let file = dataset(&rows);
    let store = MemoryStore::new();

    let summary = ingest(&store, &options(&file)).await.unwrap();

    assert_eq!(summary.metrics.rows_read, 5);
    assert_eq!(summary.metrics.nodes_created, 5);
    assert!(summary.metrics.skipped_ids.is_empty());
    assert_eq!(store.create_calls(), 5);

    let nodes = store.nodes();
    let ids: Vec<_> = nodes.iter().map(|n| n.id().clone()).collect();
    assert_eq!(ids, (1..=5).map(FieldValue::Integer).collect::<Vec<_>>());
    assert_eq!(nodes[0].get(ReportField::AreaName), &FieldValue::from("Central"));
    assert_eq!(nodes[0].get(ReportField::Lat), &FieldValue::Float(34.0168));
    assert_eq!(nodes[0].get(ReportField::DispositionDescription), &FieldValue::Null);
}

#[tokio::test]
async fn test_counts_by_sex() {
    let file = dataset(&[row(1, "M", 30, "Central"), row(2, "F", 41, "Central")]);
    let store = MemoryStore::new();
    ingest(&store, &options(&file)).await.unwrap();

    let by_sex = counts(&store, Aggregation::ArrestsBySex).await;
    assert_eq!(by_sex, HashMap::from([("M".to_string(), 1), ("F".to_string(), 1)]));
}

#[tokio::test]
async fn test_counts_by_age_group() {
    let file = dataset(&[
        row(1, "M", 17, "Central"),
        row(2, "F", 30, "Newton"),
        row(3, "M", 60, "Central"),
    ]);
    let store = MemoryStore::new();
    ingest(&store, &options(&file)).await.unwrap();

    let by_age = counts(&store, Aggregation::FrequencyByAge).await;
    assert_eq!(
        by_age,
        HashMap::from([
            ("Under 18".to_string(), 1),
            ("26-35".to_string(), 1),
            ("Over 55".to_string(), 1),
        ])
    );

    let driver = MemoryDriver::new(store.clone());
    let by_area = report_with(
        async { Ok::<_, ConnectionError>(driver) },
        Aggregation::ReportsByArea,
    )
    .await
    .unwrap();
    assert_eq!(
        by_area,
        vec![AggregateRow::new("Central", 2), AggregateRow::new("Newton", 1)]
    );
}

#[tokio::test]
async fn test_running_twice_duplicates_nodes() {
    let file = dataset(&[row(1, "M", 30, "Central"), row(2, "F", 30, "Central")]);
    let store = MemoryStore::new();

    ingest(&store, &options(&file)).await.unwrap();
    ingest(&store, &options(&file)).await.unwrap();

    assert_eq!(store.node_count(), 4);
}

#[tokio::test]
async fn test_write_failure_keeps_earlier_nodes_and_releases_resources() {
    init_logging();
    let rows: Vec<_> = (1..=3).map(|i| row(i, "M", 30, "Central")).collect();
    let file = dataset(&rows);
    let store = MemoryStore::new();
    store.fail_on_id("2");

    let err = ingest(&store, &options(&file)).await.unwrap_err();

    let PipelineError::Write(write_err) = &err else {
        panic!("expected write error, got {err:?}");
    };
    assert_eq!(write_err.id, "2");
    assert_eq!(write_err.row, 2);
    assert_eq!(err.stage(), "write");
    assert_eq!(store.node_count(), 1);
    assert_eq!(store.create_calls(), 2);
    assert_eq!(
        store.events(),
        vec![
            "driver opened",
            "session opened",
            "session closed",
            "driver closed"
        ]
    );
}

#[tokio::test]
async fn test_skip_policy_writes_the_rest() {
    let rows: Vec<_> = (1..=3).map(|i| row(i, "F", 30, "Central")).collect();
    let file = dataset(&rows);
    let store = MemoryStore::new();
    store.fail_on_id("2");
    let options = IngestOptions {
        write: WriteOptions {
            policy: WriteFailurePolicy::Skip,
            dry_run: false,
        },
        ..options(&file)
    };

    let summary = ingest(&store, &options).await.unwrap();

    assert_eq!(summary.metrics.rows_read, 3);
    assert_eq!(summary.metrics.nodes_created, 2);
    assert_eq!(summary.metrics.skipped_ids, vec!["2".to_string()]);
    assert_eq!(store.node_count(), 2);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let rows: Vec<_> = (1..=3).map(|i| row(i, "F", 30, "Central")).collect();
    let file = dataset(&rows);
    let store = MemoryStore::new();
    let options = IngestOptions {
        write: WriteOptions {
            dry_run: true,
            ..Default::default()
        },
        ..options(&file)
    };

    let summary = ingest(&store, &options).await.unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.metrics.rows_read, 3);
    assert_eq!(summary.metrics.nodes_created, 0);
    assert_eq!(store.create_calls(), 0);
}

#[tokio::test]
async fn test_missing_column_persists_nothing() {
    let mut file = NamedTempFile::new().unwrap();
    let header = header().replace("Sex Code", "Gender");
    writeln!(file, "{header}").unwrap();
    writeln!(file, "{}", row(1, "M", 30, "Central")).unwrap();
    file.flush().unwrap();
    let store = MemoryStore::new();

    let err = ingest(&store, &options(&file)).await.unwrap_err();

    let PipelineError::Schema(mismatch) = &err else {
        panic!("expected schema error, got {err:?}");
    };
    assert_eq!(mismatch.missing, vec!["Sex Code".to_string()]);
    assert_eq!(store.create_calls(), 0);
    assert_eq!(store.events(), vec!["driver opened", "driver closed"]);
}

#[tokio::test]
async fn test_malformed_row_fails_before_any_write() {
    let file = dataset(&[row(1, "M", 30, "Central"), "2,short".to_string()]);
    let store = MemoryStore::new();

    let err = ingest(&store, &options(&file)).await.unwrap_err();

    assert!(matches!(err, PipelineError::Source(_)), "{err:?}");
    assert_eq!(err.stage(), "source");
    assert_eq!(store.create_calls(), 0);
}

#[tokio::test]
async fn test_missing_source_file() {
    let store = MemoryStore::new();
    let options = IngestOptions {
        source: "/nonexistent/arrests.csv".into(),
        ..Default::default()
    };

    let err = ingest(&store, &options).await.unwrap_err();
    assert!(matches!(err, PipelineError::Source(_)), "{err:?}");
}

#[tokio::test]
async fn test_connection_failure_is_reported() {
    let file = dataset(&[row(1, "M", 30, "Central")]);
    let connect = async {
        Err::<MemoryDriver, _>(ConnectionError {
            uri: "bolt://unreachable:7687".to_string(),
            source: StoreError::Rejected("connection refused".to_string()),
        })
    };

    let err = ingest_with(connect, &options(&file)).await.unwrap_err();

    assert_eq!(err.stage(), "connect");
    assert!(err.to_string().contains("bolt://unreachable:7687"));
}

// Descriptors of this process currently open on `path`.
#[cfg(target_os = "linux")]
fn open_handles(path: &std::path::Path) -> usize {
    std::fs::read_dir("/proc/self/fd")
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| {
            std::fs::read_link(entry.path())
                .map(|target| target == path)
                .unwrap_or(false)
        })
        .count()
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_failed_connect_releases_source_file() {
    let rows: Vec<_> = (1..=200_000).map(|i| row(i, "M", 30, "Central")).collect();
    let file = dataset(&rows);
    let path = file.path().canonicalize().unwrap();
    let baseline = open_handles(&path);
    let connect = async {
        Err::<MemoryDriver, _>(ConnectionError {
            uri: "bolt://unreachable:7687".to_string(),
            source: StoreError::Rejected("connection refused".to_string()),
        })
    };

    let err = ingest_with(connect, &options(&file)).await.unwrap_err();

    assert_eq!(err.stage(), "connect");
    assert_eq!(open_handles(&path), baseline);
}

#[tokio::test]
async fn test_semicolon_delimited_source() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", header().replace(',', ";")).unwrap();
    writeln!(file, "{}", row(7, "M", 30, "Central").replace(',', ";")).unwrap();
    file.flush().unwrap();
    let store = MemoryStore::new();
    let options = IngestOptions {
        source_options: SourceOptions { delimiter: b';' },
        ..options(&file)
    };

    let summary = ingest(&store, &options).await.unwrap();

    assert_eq!(summary.metrics.nodes_created, 1);
    assert_eq!(store.nodes()[0].id(), &FieldValue::Integer(7));
}
