use costwise_warehouse::Store;

use crate::commands::Report;
use crate::error::CliError;

pub fn run(store: &Store) -> Result<Report, CliError> {
    Ok(Report::Verify(store.summary()?))
}
