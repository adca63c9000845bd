//! Command-line interface for arrest-graph
//!
//! # Usage Examples
//!
//! ```bash
//! # Write a config file
//! arrest-graph init-config --uri bolt://localhost:7687 --user neo4j --password password
//!
//! # Load the default CSV export
//! arrest-graph ingest
//!
//! # Load another file, skipping records the database rejects
//! arrest-graph ingest --source arrests_2024.csv --skip-failed-records
//!
//! # Print a chart
//! arrest-graph report by-age
//! ```

use anyhow::Context;
use arrest_graph::config::{self, DEFAULT_CONFIG_PATH};
use arrest_graph::pipeline::{self, IngestOptions, DEFAULT_SOURCE_PATH};
use arrest_graph::report;
use arrest_graph::{
    Aggregation, ConnectionSettings, SourceOptions, WriteFailurePolicy, WriteOptions,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arrest-graph")]
#[command(about = "Load arrest report CSV exports into Neo4j and chart them")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigOpts {
    /// Path to the YAML config file
    #[arg(long, env = "ARREST_GRAPH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Create one Report node per row of a CSV export
    Ingest {
        #[command(flatten)]
        config_opts: ConfigOpts,

        /// CSV file to load
        #[arg(long, default_value = DEFAULT_SOURCE_PATH)]
        source: PathBuf,

        /// Field delimiter (single ASCII character)
        #[arg(long, default_value_t = ',')]
        delimiter: char,

        /// Log and skip records that fail to write instead of stopping
        #[arg(long)]
        skip_failed_records: bool,

        /// Read and transform every record without writing to Neo4j
        #[arg(long)]
        dry_run: bool,
    },

    /// Print an aggregation over the loaded reports
    Report {
        #[arg(value_enum)]
        chart: Chart,

        #[command(flatten)]
        config_opts: ConfigOpts,
    },

    /// Write a config file
    InitConfig {
        #[command(flatten)]
        config_opts: ConfigOpts,

        /// Neo4j connection URI
        #[arg(long)]
        uri: String,

        /// Neo4j username
        #[arg(long)]
        user: String,

        /// Neo4j password
        #[arg(long)]
        password: String,

        /// Neo4j database name (server default if omitted)
        #[arg(long)]
        database: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Chart {
    BySex,
    ByAge,
    ByArea,
}

impl From<Chart> for Aggregation {
    fn from(chart: Chart) -> Self {
        match chart {
            Chart::BySex => Aggregation::ArrestsBySex,
            Chart::ByAge => Aggregation::FrequencyByAge,
            Chart::ByArea => Aggregation::ReportsByArea,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            config_opts,
            source,
            delimiter,
            skip_failed_records,
            dry_run,
        } => {
            let settings = load_settings(&config_opts)?;
            let delimiter = u8::try_from(delimiter)
                .ok()
                .filter(u8::is_ascii)
                .with_context(|| format!("Delimiter {delimiter:?} is not a single ASCII character"))?;
            let policy = if skip_failed_records {
                WriteFailurePolicy::Skip
            } else {
                WriteFailurePolicy::Abort
            };
            let options = IngestOptions {
                source,
                source_options: SourceOptions { delimiter },
                write: WriteOptions { policy, dry_run },
            };

            let summary = pipeline::run(&settings, &options)
                .await
                .with_context(|| format!("Ingestion of {} failed", options.source.display()))?;

            let metrics = &summary.metrics;
            println!("Source:        {}", summary.source.display());
            println!("Rows read:     {}", metrics.rows_read);
            if summary.dry_run {
                println!("Nodes created: 0 (dry run)");
            } else {
                println!("Nodes created: {}", metrics.nodes_created);
            }
            if !metrics.skipped_ids.is_empty() {
                println!(
                    "Skipped:       {} ({})",
                    metrics.skipped_ids.len(),
                    metrics.skipped_ids.join(", ")
                );
            }
            println!(
                "Elapsed:       {:.2?} ({:.0} rows/sec)",
                metrics.duration,
                metrics.rows_per_second()
            );
        }
        Commands::Report { chart, config_opts } => {
            let settings = load_settings(&config_opts)?;
            let aggregation = Aggregation::from(chart);
            let rows = report::run(&settings, aggregation)
                .await
                .with_context(|| format!("Report {aggregation} failed"))?;
            print!("{}", report::render_chart(aggregation, &rows));
        }
        Commands::InitConfig {
            config_opts,
            uri,
            user,
            password,
            database,
            force,
        } => {
            let path = &config_opts.config;
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            let mut settings = ConnectionSettings::new(uri, user, password);
            settings.database = database;
            config::write(path, &settings)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn load_settings(opts: &ConfigOpts) -> anyhow::Result<ConnectionSettings> {
    config::load(&opts.config)
        .with_context(|| format!("Failed to load config from {}", opts.config.display()))
}
