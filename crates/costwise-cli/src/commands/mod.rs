mod export;
mod run;
mod verify;

use costwise_warehouse::{ExportReport, GoldSummary, PublishSummary, Store};
use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Machine-readable result of one CLI invocation.
#[derive(Debug, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    Run(RunReport),
    Verify(GoldSummary),
    Export(ExportReport),
}

/// Stage-by-stage accounting for a pipeline run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub start_date: String,
    pub end_date: String,
    pub fetched: usize,
    pub rejected: usize,
    pub failure_rate_pct: f64,
    pub staged: usize,
    pub aggregated: usize,
    pub publish: PublishSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportReport>,
    pub summary: GoldSummary,
}

pub fn dispatch(cli: &Cli, store: &Store) -> Result<Report, CliError> {
    match &cli.command {
        Command::Run(args) => run::run(args, store),
        Command::Verify => verify::run(store),
        Command::Export(args) => export::run(args, store),
    }
}
