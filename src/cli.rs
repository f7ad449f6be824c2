//! CLI definition and dispatch.
//!
//! Each setting resolves from its flag, then its `SHORTSHEET_*` environment
//! variable, then the INI file given with `--config`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_store_adapter::CsvStoreAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::snapshot_dir_adapter::SnapshotDirAdapter;
use crate::domain::aggregator::{Aggregator, RunReport};
use crate::domain::error::ShortsheetError;
use crate::domain::layout::ColumnLayout;
use crate::domain::parser::{ParseStats, parse_snapshot};
use crate::domain::run_config::{SourceConfig, build_run_config, build_source_config};
use crate::ports::snapshot_port::SnapshotPort;
use crate::ports::store_port::StorePort;

#[derive(Parser, Debug)]
#[command(
    name = "shortsheet",
    about = "Convert daily short-availability snapshots into per-ticker and per-date CSV files"
)]
pub struct Cli {
    /// Log per-file activity
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert one processing date and merge it into the output tree
    Convert {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Parse a snapshot and report its layout without writing anything
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct SourceArgs {
    /// INI file with [run] and [paths] sections
    #[arg(short, long, env = "SHORTSHEET_CONFIG")]
    pub config: Option<PathBuf>,
    /// Processing date, YYYYMMDD
    #[arg(long, env = "SHORTSHEET_DATE")]
    pub date: Option<String>,
    /// Feed format: basic or extended
    #[arg(long, env = "SHORTSHEET_FORMAT")]
    pub format: Option<String>,
    #[arg(long, env = "SHORTSHEET_RAW_ROOT")]
    pub raw_root: Option<String>,
    /// Snapshot file name inside the date directory
    #[arg(long, env = "SHORTSHEET_SNAPSHOT_FILE")]
    pub snapshot_file: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct OutputArgs {
    #[arg(long, env = "SHORTSHEET_OUTPUT_ROOT")]
    pub output_root: Option<String>,
    /// Directory of prior per-ticker files (default: <output_root>/by-ticker)
    #[arg(long, env = "SHORTSHEET_HISTORY_ROOT")]
    pub history_root: Option<String>,
}

/// Result of parsing and draining one snapshot.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub report: RunReport,
    pub stats: ParseStats,
    pub layout: Option<ColumnLayout>,
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);
    match cli.command {
        Command::Convert { source, output } => run_convert(&source, &output),
        Command::Inspect { source } => run_inspect(&source),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Layer flag and environment values over the optional INI file.
pub fn load_config(
    source: &SourceArgs,
    output: Option<&OutputArgs>,
) -> Result<FileConfigAdapter, ShortsheetError> {
    let mut adapter = match &source.config {
        Some(path) => {
            FileConfigAdapter::from_file(path).map_err(|e| ShortsheetError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?
        }
        None => FileConfigAdapter::empty(),
    };

    adapter.set_override("run", "date", source.date.clone());
    adapter.set_override("run", "format", source.format.clone());
    adapter.set_override("paths", "raw_root", source.raw_root.clone());
    adapter.set_override("paths", "snapshot_file", source.snapshot_file.clone());
    if let Some(output) = output {
        adapter.set_override("paths", "output_root", output.output_root.clone());
        adapter.set_override("paths", "history_root", output.history_root.clone());
    }
    Ok(adapter)
}

fn run_convert(source_args: &SourceArgs, output_args: &OutputArgs) -> ExitCode {
    // Stage 1: resolve configuration
    let config = match load_config(source_args, Some(output_args))
        .and_then(|adapter| build_run_config(&adapter))
    {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    // Stage 2: output directories
    let store = CsvStoreAdapter::from_config(&config);
    if let Err(e) = store.prepare() {
        tracing::error!("cannot prepare output tree: {e}");
        return (&e).into();
    }

    // Stages 3-5: read, ingest, drain
    let snapshots = SnapshotDirAdapter::from_config(&config.source);
    let outcome = match run_conversion_pipeline(&snapshots, &store, &config.source) {
        Ok(o) => o,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    match outcome.report.into_result() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

/// Read the whole snapshot, ingest it, then write every output file.
pub fn run_conversion_pipeline(
    snapshots: &dyn SnapshotPort,
    store: &dyn StorePort,
    source: &SourceConfig,
) -> Result<ConversionOutcome, ShortsheetError> {
    let date_key = source.date_key();
    tracing::info!(date = %date_key, format = %source.format, "converting snapshot");

    let mut aggregator = Aggregator::new(source.date, source.format);
    let lines = snapshots.read_lines(source.date)?;
    let (records, parser) = parse_snapshot(&lines, source.format);
    let stats = parser.stats();
    if parser.layout().is_none() {
        tracing::warn!(date = %date_key, "no column header found in snapshot");
    }
    aggregator.ingest_all(records);

    let report = aggregator.drain(store);
    tracing::info!(
        date = %date_key,
        records = report.records,
        tickers = report.tickers_written,
        merged = report.history_rows_merged,
        rejected = stats.rejected,
        malformed = stats.malformed,
        "records/s = {:.0}",
        report.throughput()
    );
    if !report.is_success() {
        tracing::warn!(
            failed_tickers = report.failed_tickers.len(),
            failed_dates = report.failed_dates.len(),
            "conversion finished with failures"
        );
    }

    Ok(ConversionOutcome {
        report,
        stats,
        layout: parser.layout(),
    })
}

fn run_inspect(source_args: &SourceArgs) -> ExitCode {
    let source = match load_config(source_args, None).and_then(|a| build_source_config(&a)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    let snapshots = SnapshotDirAdapter::from_config(&source);
    let lines = match snapshots.read_lines(source.date) {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    let (_, parser) = parse_snapshot(&lines, source.format);
    print!("{}", format_inspection(&source, parser.layout(), parser.stats()));
    ExitCode::SUCCESS
}

pub fn format_inspection(
    source: &SourceConfig,
    layout: Option<ColumnLayout>,
    stats: ParseStats,
) -> String {
    let mut out = format!(
        "Snapshot {} ({} feed) in {}\n",
        source.date_key(),
        source.format,
        source.snapshot_dir().display()
    );
    match layout {
        Some(l) => {
            let rate = |i: Option<usize>| i.map_or("-".to_string(), |i| i.to_string());
            out.push_str(&format!(
                "  Columns: symbol={} available={} rebate={} fee={}\n",
                l.symbol,
                l.available,
                rate(l.rebate),
                rate(l.fee)
            ));
        }
        None => out.push_str("  Columns: not found\n"),
    }
    out.push_str(&format!(
        "  Lines: {}  Records: {}  Rejected: {}  Malformed: {}\n",
        stats.lines, stats.records, stats.rejected, stats.malformed
    ));
    out
}
