use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Daily cloud-cost ingestion and reporting.
#[derive(Debug, Parser)]
#[command(name = "costwise", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format for the command report.
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Override the store database path (default: $COSTWISE_HOME/warehouse/costs.duckdb).
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, validate, aggregate, and publish one batch of usage records.
    Run(RunArgs),
    /// Re-run the fixed verification rollups over the gold table.
    Verify,
    /// Write a full snapshot of the gold table to a Parquet or CSV file.
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// First usage date to ingest, YYYY-MM-DD (default: 30 days before end).
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<String>,

    /// Last usage date to ingest, YYYY-MM-DD (default: today).
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<String>,

    /// Billing feed seed; the same seed replays the same batch.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Also export the gold snapshot after publishing.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Target file; the extension picks the format (.parquet or .csv).
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
