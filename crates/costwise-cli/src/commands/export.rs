use costwise_warehouse::Store;
use uuid::Uuid;

use crate::cli::ExportArgs;
use crate::commands::Report;
use crate::error::CliError;

pub fn run(args: &ExportArgs, store: &Store) -> Result<Report, CliError> {
    let run_id = format!("export:{}", Uuid::new_v4());
    Ok(Report::Export(store.export_snapshot(&run_id, &args.path)?))
}
