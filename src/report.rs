//! Aggregation reports rendered as plain-text bar charts.

use crate::error::PipelineError;
use arrest_neo4j_sink::{
    run_aggregation, AggregateRow, Aggregation, ConnectionError, ConnectionSettings, GraphDriver,
    Neo4jDriver, AGE_GROUPS,
};
use std::fmt::Write;
use std::future::Future;

const BAR_WIDTH: usize = 40;

/// Run one aggregation against Neo4j.
pub async fn run(
    settings: &ConnectionSettings,
    aggregation: Aggregation,
) -> Result<Vec<AggregateRow>, PipelineError> {
    report_with(Neo4jDriver::connect(settings), aggregation).await
}

pub async fn report_with<D, F>(
    connect: F,
    aggregation: Aggregation,
) -> Result<Vec<AggregateRow>, PipelineError>
where
    D: GraphDriver,
    F: Future<Output = Result<D, ConnectionError>>,
{
    let driver = connect.await?;
    let session = driver.open_session();
    let mut rows = run_aggregation(&session, aggregation).await?;
    sort_rows(aggregation, &mut rows);
    Ok(rows)
}

/// Age groups in bucket order, everything else by descending count.
pub fn sort_rows(aggregation: Aggregation, rows: &mut [AggregateRow]) {
    match aggregation {
        Aggregation::FrequencyByAge => rows.sort_by_key(|row| {
            AGE_GROUPS
                .iter()
                .position(|(label, _)| *label == row.key)
                .unwrap_or(AGE_GROUPS.len())
        }),
        _ => rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key))),
    }
}

/// Render rows as a horizontal bar chart headed by the aggregation title.
pub fn render_chart(aggregation: Aggregation, rows: &[AggregateRow]) -> String {
    let mut out = String::new();
    let title = aggregation.title();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.len()));

    if rows.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let key_width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    let max = rows.iter().map(|r| r.count).max().unwrap_or(0).max(1);
    for row in rows {
        let len = (row.count.max(0) as usize * BAR_WIDTH).div_ceil(max as usize);
        let _ = writeln!(
            out,
            "{:<key_width$}  {:<bar_width$}  {}",
            row.key,
            "#".repeat(len),
            row.count,
            bar_width = BAR_WIDTH,
        );
    }
    out
}
