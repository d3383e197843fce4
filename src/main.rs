use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use configuration::{init_logging, load_config};
use engine::{AnalysisEngine, CancellationToken, RunOutput, SecurityInput};
use futures::future::join_all;
use history::{FlatFileHistory, HistorySource, JsonMetadataStore, MetadataSource};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod report;

/// The main entry point for the Trendline analysis application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only supplies RUST_LOG and overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Fits exponential growth models to daily price histories and ranks the results.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every history in the configured directory.
    Analyze(AnalyzeArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// The reference date of the run (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Configuration file. Defaults to ./config.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the JSON data file. Defaults to <output_dir>/<as_of>.json.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Overrides `ranking.top_n` for leaderboards and printed tables.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    top: Option<u64>,
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

/// Handles the orchestration of one analysis run.
async fn handle_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let mut config =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(top) = args.top {
        config.ranking.top_n = usize::try_from(top).context("--top is too large")?;
    }
    // Held until exit so buffered file logs are flushed.
    let _log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;

    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    tracing::info!(%as_of, history_dir = %config.data.history_dir.display(), "Starting analysis.");

    let metadata = load_metadata(&config.data.metadata_file)?;
    let source: Arc<dyn HistorySource> = Arc::new(FlatFileHistory::new(&config.data.history_dir));
    let inputs = load_inputs(source, &metadata).await?;

    let progress = progress_bar(inputs.len(), "Fitting")?;
    let engine = AnalysisEngine::new(&config, as_of)
        .context("Failed to prepare the analysis")?
        .with_progress(progress.clone());

    // Ctrl-C stops the run between securities.
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let run = tokio::task::spawn_blocking(move || engine.run(&inputs, &cancel))
        .await
        .context("Analysis task panicked")?;
    watcher.abort();
    let output = run.context("Analysis run failed")?;
    progress.finish_with_message("Analysis complete.");

    report::print_summary(&output, config.ranking.top_n);

    let path = args
        .output
        .unwrap_or_else(|| config.data.output_dir.join(format!("{as_of}.json")));
    write_output(&output, &path)?;
    println!("Wrote {}", path.display());

    Ok(())
}

/// Reads the metadata file, or falls back to UNKNOWN metadata for every ticker
/// when the file does not exist.
fn load_metadata(path: &Path) -> anyhow::Result<JsonMetadataStore> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Metadata file not found; all securities are UNKNOWN.");
        return Ok(JsonMetadataStore::default());
    }
    JsonMetadataStore::open(path).context("Failed to load metadata")
}

/// Loads every history concurrently. Unreadable histories are logged and skipped.
async fn load_inputs(
    source: Arc<dyn HistorySource>,
    metadata: &dyn MetadataSource,
) -> anyhow::Result<Vec<SecurityInput>> {
    let lister = Arc::clone(&source);
    let tickers = tokio::task::spawn_blocking(move || lister.tickers())
        .await
        .context("History listing task panicked")?
        .context("Failed to list histories")?;

    let progress = progress_bar(tickers.len(), "Loading")?;
    let tasks: Vec<_> = tickers
        .into_iter()
        .map(|ticker| {
            let source = Arc::clone(&source);
            let pb_clone = progress.clone();
            tokio::task::spawn_blocking(move || {
                let series = source.load(&ticker);
                pb_clone.inc(1);
                (ticker, series)
            })
        })
        .collect();

    // Wait for all concurrent loads to complete
    let results = join_all(tasks).await;
    progress.finish_and_clear();

    let mut inputs = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok((ticker, Ok(series))) => {
                let metadata = metadata.metadata(&ticker);
                inputs.push(SecurityInput::new(series, metadata));
            }
            Ok((ticker, Err(e))) => {
                tracing::warn!(%ticker, error = %e, "Skipping unreadable history.");
            }
            Err(e) => tracing::error!(error = %e, "A history load task failed."),
        }
    }
    tracing::info!(securities = inputs.len(), "Histories loaded.");
    Ok(inputs)
}

fn progress_bar(len: usize, label: &str) -> anyhow::Result<ProgressBar> {
    let progress_bar = ProgressBar::new(len as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_prefix(label.to_string());
    Ok(progress_bar)
}

fn write_output(output: &RunOutput, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), output)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
