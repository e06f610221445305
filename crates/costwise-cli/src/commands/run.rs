use std::fmt::Display;

use costwise_core::{
    aggregate, evaluate_batch, validate_batch, AggregatedCostRow, CostFeed, DateRange,
    MockBillingFeed, PipelineError, RateTable, RawCostRecord, UsageDate, ValidationOutcome,
};
use costwise_warehouse::{DailyCostRow, RawCostRow, Store};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::cli::RunArgs;
use crate::commands::{Report, RunReport};
use crate::error::CliError;

/// Sequence one batch through the pipeline: fetch, validate, gate, stage,
/// aggregate, publish, verify. A gate abort or store failure stops the run
/// before anything downstream executes; the gate in particular fires before
/// the first store write, so an aborted batch leaves the store untouched.
pub fn run(args: &RunArgs, store: &Store) -> Result<Report, CliError> {
    let range = resolve_range(args)?;
    let run_id = format!("run:{}", Uuid::new_v4());
    let rates = RateTable::default();

    let feed = MockBillingFeed::seeded(args.seed);
    let payloads = feed.fetch(&range).map_err(PipelineError::from)?;
    let fetched = payloads.len();

    let ValidationOutcome {
        verdicts,
        raw_accepted,
    } = validate_batch(&payloads, &rates);
    let rejected = verdicts.iter().filter(|verdict| !verdict.is_accepted()).count();
    let failure_rate_pct = if fetched == 0 {
        0.0
    } else {
        rejected as f64 / fetched as f64 * 100.0
    };

    let gold = evaluate_batch(verdicts)
        .into_accepted()
        .map_err(CliError::from)?;

    let staged = store.stage_raw(&run_id, &raw_rows(&raw_accepted))?;

    let rows = aggregate(gold);
    let aggregated = rows.len();
    let publish = store.publish(&run_id, &daily_rows(&rows))?;

    let export = match &args.export {
        Some(path) => Some(store.export_snapshot(&run_id, path)?),
        None => None,
    };

    let summary = store.summary()?;

    Ok(Report::Run(RunReport {
        run_id,
        start_date: range.start().format_iso(),
        end_date: range.end().format_iso(),
        fetched,
        rejected,
        failure_rate_pct,
        staged,
        aggregated,
        publish,
        export,
        summary,
    }))
}

fn resolve_range(args: &RunArgs) -> Result<DateRange, CliError> {
    let end = match &args.end_date {
        Some(text) => UsageDate::parse(text).map_err(invalid_argument)?,
        None => UsageDate::from_date(OffsetDateTime::now_utc().date()),
    };

    let start = match &args.start_date {
        Some(text) => UsageDate::parse(text).map_err(invalid_argument)?,
        None => {
            let date = end
                .into_inner()
                .checked_sub(Duration::days(30))
                .unwrap_or_else(|| end.into_inner());
            UsageDate::from_date(date)
        }
    };

    DateRange::new(start, end).map_err(invalid_argument)
}

fn invalid_argument(error: impl Display) -> CliError {
    CliError::InvalidArgument(error.to_string())
}

fn raw_rows(records: &[RawCostRecord]) -> Vec<RawCostRow> {
    records
        .iter()
        .map(|record| RawCostRow {
            usage_date: record.usage_date.clone(),
            subscription_id: record.subscription_id.clone(),
            service_name: record.service_name.clone(),
            cost: record.cost.clone(),
            currency: record.currency.clone(),
            team: record.team.clone(),
            cost_center: record.cost_center.clone(),
        })
        .collect()
}

fn daily_rows(rows: &[AggregatedCostRow]) -> Vec<DailyCostRow> {
    rows.iter()
        .map(|row| DailyCostRow {
            cost_date: row.key.usage_date.format_iso(),
            subscription_id: row.key.subscription_id.clone(),
            service_name: row.key.service_name.clone(),
            team: row.team.clone(),
            cost_center: row.cost_center.clone(),
            cost_usd: row.cost_usd,
        })
        .collect()
}
