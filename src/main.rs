//! `neardup` - find near-duplicate documents in a JSON Lines corpus.
//!
//! Reads `{"id": ..., "text": ...}` records, clusters them and writes a
//! `DocA, DocB, Similarity` CSV report.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use neardup::{run_pipeline, write_report_file, JsonLinesSource, NearDupConfig, StoreConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "neardup", version, about = "Near-duplicate document detection")]
struct Cli {
    /// JSON Lines input, one `{"id": ..., "text": ...}` object per line.
    #[arg(short, long)]
    input: PathBuf,

    /// CSV report path. Overrides `output.path` from the config file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Similarity threshold in (0, 1]. Overrides `cluster.similarity_threshold`.
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Keep shingle sets in a redb file at this path instead of memory.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NearDupConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NearDupConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config.cluster.similarity_threshold = threshold;
    }
    if let Some(path) = cli.store {
        let capacity = config.store.capacity;
        config.store = StoreConfig::redb(path);
        config.store.capacity = capacity;
    }
    if let Some(path) = cli.output {
        config.output.path = Some(path);
    }
    config.json_logs |= cli.json_logs;
    config.validate()?;

    init_tracing(&config);

    let Some(output) = config.output.path.clone() else {
        bail!("no output path: pass --output or set output.path in the config");
    };

    let source = JsonLinesSource::open(&cli.input)
        .with_context(|| format!("opening input {}", cli.input.display()))?;
    let report = run_pipeline(source, &config)?;
    write_report_file(&report, &output)
        .with_context(|| format!("writing report {}", output.display()))?;

    tracing::info!(
        records = report.ingest.records,
        stored = report.ingest.stored,
        skipped = report.ingest.skipped,
        groups = report.groups.len(),
        duplicate_groups = report.duplicate_groups(),
        members = report.cluster.members,
        bands = report.cluster.bands,
        rows = report.cluster.rows,
        ingest_ms = report.ingest_elapsed.as_millis(),
        cluster_ms = report.cluster_elapsed.as_millis(),
        output = %output.display(),
        "run_complete"
    );
    Ok(())
}

fn init_tracing(config: &NearDupConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}
