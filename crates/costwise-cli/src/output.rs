use costwise_warehouse::{ExportReport, GoldSummary};

use crate::cli::OutputFormat;
use crate::commands::{Report, RunReport};
use crate::error::CliError;

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(report)?
            } else {
                serde_json::to_string(report)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(report),
    }

    Ok(())
}

fn render_table(report: &Report) {
    match report {
        Report::Run(run) => render_run(run),
        Report::Verify(summary) => render_summary(summary),
        Report::Export(export) => render_export(export),
    }
}

fn render_run(run: &RunReport) {
    println!("run {}", run.run_id);
    println!("date range: {} to {}", run.start_date, run.end_date);
    println!(
        "fetched {} records, rejected {} ({:.1}%), staged {}",
        run.fetched, run.rejected, run.failure_rate_pct, run.staged
    );
    println!("aggregated to {} daily rows", run.aggregated);
    println!(
        "published: {} inserted, {} updated",
        run.publish.inserted, run.publish.updated
    );
    if let Some(export) = &run.export {
        render_export(export);
    }
    println!();
    render_summary(&run.summary);
}

fn render_summary(summary: &GoldSummary) {
    match (&summary.first_date, &summary.last_date) {
        (Some(first), Some(last)) => {
            println!("gold table: {} rows, {} to {}", summary.total_rows, first, last);
        }
        _ => println!("gold table: {} rows", summary.total_rows),
    }

    if !summary.top_teams.is_empty() {
        println!("top teams by cost:");
        for bucket in &summary.top_teams {
            println!("  {:<24} ${:.2}", bucket.label, bucket.total_usd);
        }
    }

    if !summary.top_services.is_empty() {
        println!("top services by cost:");
        for bucket in &summary.top_services {
            println!("  {:<24} ${:.2}", bucket.label, bucket.total_usd);
        }
    }

    if !summary.recent_daily.is_empty() {
        println!("recent daily totals:");
        for day in &summary.recent_daily {
            println!("  {}  ${:.2}", day.date, day.total_usd);
        }
    }
}

fn render_export(export: &ExportReport) {
    println!("exported {} rows to {}", export.rows, export.path.display());
}
