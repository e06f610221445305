mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use costwise_warehouse::{Store, StoreConfig};

use crate::cli::Cli;
use crate::error::CliError;

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = match &cli.db_path {
        Some(path) => StoreConfig::at_db_path(path),
        None => StoreConfig::default(),
    };
    let store = Store::open(config)?;

    let report = commands::dispatch(&cli, &store)?;
    output::render(&report, cli.format, cli.pretty)?;

    Ok(())
}
