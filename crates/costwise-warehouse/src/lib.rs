pub mod duckdb;
pub mod migrations;
pub mod views;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

pub use crate::duckdb::{ConnectionPool, PooledConnection};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("store operation rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub home: PathBuf,
    pub db_path: PathBuf,
    pub max_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let home = resolve_home();
        let db_path = home.join("warehouse").join("costs.duckdb");
        Self {
            home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl StoreConfig {
    pub fn at_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }
}

/// Staged raw record, exactly as the billing API sent it. Dirty values
/// (sentinel costs, missing allocation) are staged on purpose for audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCostRow {
    pub usage_date: String,
    pub subscription_id: String,
    pub service_name: String,
    pub cost: String,
    pub currency: Option<String>,
    pub team: Option<String>,
    pub cost_center: Option<String>,
}

/// One daily-grain gold row, keyed by (date, subscription, service).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCostRow {
    pub cost_date: String,
    pub subscription_id: String,
    pub service_name: String,
    pub team: String,
    pub cost_center: String,
    pub cost_usd: Decimal,
}

/// Outcome of one publish batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBucket {
    pub label: String,
    pub total_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: String,
    pub total_usd: f64,
}

/// Fixed verification rollups over the gold table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoldSummary {
    pub total_rows: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub top_teams: Vec<CostBucket>,
    pub top_services: Vec<CostBucket>,
    pub recent_daily: Vec<DailyTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: i64,
}

/// DuckDB-backed store for staged raw records and published gold rows.
#[derive(Clone)]
pub struct Store {
    pool: ConnectionPool,
}

impl Store {
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(StoreConfig::default())
    }

    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let pool = ConnectionPool::new(config.db_path.clone(), config.max_pool_size);
        let store = Self { pool };
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        let connection = self.pool.acquire()?;
        migrations::apply_migrations(&connection)?;
        views::create_views(&connection)?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.pool.db_path()
    }

    /// Truncate-and-reload the raw staging table.
    ///
    /// Staging is full-replace by design: rerunning a batch must not
    /// accumulate duplicate raw rows.
    pub fn stage_raw(&self, run_id: &str, rows: &[RawCostRow]) -> Result<usize, StoreError> {
        let connection = self.pool.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<usize, StoreError> {
            connection.execute_batch("DELETE FROM raw_cloud_costs")?;

            for (seq, row) in rows.iter().enumerate() {
                let sql = format!(
                    r#"
INSERT INTO raw_cloud_costs (
    seq, usage_date, subscription_id, service_name, cost, currency, team, cost_center
) VALUES (
    {seq}, '{usage_date}', '{subscription_id}', '{service_name}', '{cost}',
    {currency}, {team}, {cost_center}
);
"#,
                    seq = seq,
                    usage_date = escape_sql_string(row.usage_date.as_str()),
                    subscription_id = escape_sql_string(row.subscription_id.as_str()),
                    service_name = escape_sql_string(row.service_name.as_str()),
                    cost = escape_sql_string(row.cost.as_str()),
                    currency = sql_option_string(row.currency.as_deref()),
                    team = sql_option_string(row.team.as_deref()),
                    cost_center = sql_option_string(row.cost_center.as_deref()),
                );
                connection.execute_batch(sql.as_str())?;
            }

            log_stage(&connection, run_id, "stage_raw", "ok", rows.len() as i64, None)?;
            Ok(rows.len())
        })();

        finalize_transaction(&connection, result)
    }

    /// Read the staged raw records back in staging order.
    pub fn scan_raw(&self) -> Result<Vec<RawCostRow>, StoreError> {
        let connection = self.pool.acquire()?;
        let mut statement = connection.prepare(
            "SELECT usage_date, subscription_id, service_name, cost, currency, team, cost_center \
             FROM raw_cloud_costs ORDER BY seq",
        )?;

        let rows = statement
            .query_map([], |row| {
                Ok(RawCostRow {
                    usage_date: row.get(0)?,
                    subscription_id: row.get(1)?,
                    service_name: row.get(2)?,
                    cost: row.get(3)?,
                    currency: row.get(4)?,
                    team: row.get(5)?,
                    cost_center: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Merge aggregated rows into the gold table.
    ///
    /// Each row is one atomic upsert on the composite key; there is no
    /// existence probe before the write, so concurrent publishers cannot
    /// race between check and act. The whole batch commits or rolls back
    /// together. Replaying an identical batch reports
    /// `inserted == 0, updated == rows.len()` and changes nothing.
    pub fn publish(&self, run_id: &str, rows: &[DailyCostRow]) -> Result<PublishSummary, StoreError> {
        let connection = self.pool.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<PublishSummary, StoreError> {
            let before: i64 =
                connection.query_row("SELECT COUNT(*) FROM gold_daily_costs", [], |row| {
                    row.get(0)
                })?;

            for row in rows {
                let sql = format!(
                    r#"
INSERT INTO gold_daily_costs (
    cost_date, subscription_id, service_name, team, cost_center, cost_usd, updated_at
) VALUES (
    CAST('{cost_date}' AS DATE), '{subscription_id}', '{service_name}',
    '{team}', '{cost_center}', {cost_usd}, now()
)
ON CONFLICT (cost_date, subscription_id, service_name) DO UPDATE SET
    team = excluded.team,
    cost_center = excluded.cost_center,
    cost_usd = excluded.cost_usd,
    updated_at = now();
"#,
                    cost_date = escape_sql_string(row.cost_date.as_str()),
                    subscription_id = escape_sql_string(row.subscription_id.as_str()),
                    service_name = escape_sql_string(row.service_name.as_str()),
                    team = escape_sql_string(row.team.as_str()),
                    cost_center = escape_sql_string(row.cost_center.as_str()),
                    cost_usd = row.cost_usd,
                );
                connection.execute_batch(sql.as_str())?;
            }

            let after: i64 =
                connection.query_row("SELECT COUNT(*) FROM gold_daily_costs", [], |row| {
                    row.get(0)
                })?;

            let inserted = usize::try_from(after - before).unwrap_or_default();
            let summary = PublishSummary {
                inserted,
                updated: rows.len().saturating_sub(inserted),
            };

            log_stage(&connection, run_id, "publish", "ok", rows.len() as i64, None)?;
            Ok(summary)
        })();

        finalize_transaction(&connection, result)
    }

    /// The fixed rollups the finance review asks for every week.
    pub fn summary(&self) -> Result<GoldSummary, StoreError> {
        let connection = self.pool.acquire()?;

        let total_rows: i64 =
            connection.query_row("SELECT COUNT(*) FROM gold_daily_costs", [], |row| row.get(0))?;

        let (first_date, last_date) = connection.query_row(
            "SELECT CAST(MIN(cost_date) AS VARCHAR), CAST(MAX(cost_date) AS VARCHAR) \
             FROM gold_daily_costs",
            [],
            |row| {
                let first: Option<String> = row.get(0)?;
                let last: Option<String> = row.get(1)?;
                Ok((first, last))
            },
        )?;

        let top_teams = query_buckets(
            &connection,
            "SELECT team, total_usd FROM vw_cost_by_team ORDER BY total_usd DESC, team LIMIT 5",
        )?;
        let top_services = query_buckets(
            &connection,
            "SELECT service_name, total_usd FROM vw_cost_by_service \
             ORDER BY total_usd DESC, service_name LIMIT 5",
        )?;

        let mut statement = connection.prepare(
            "SELECT CAST(cost_date AS VARCHAR), total_usd FROM vw_daily_cost \
             ORDER BY cost_date DESC LIMIT 7",
        )?;
        let recent_daily = statement
            .query_map([], |row| {
                Ok(DailyTotal {
                    date: row.get(0)?,
                    total_usd: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GoldSummary {
            total_rows,
            first_date,
            last_date,
            top_teams,
            top_services,
            recent_daily,
        })
    }

    /// Bulk-copy the complete current gold table to a Parquet or CSV file.
    ///
    /// Always the full aggregate, never a delta; the downstream warehouse
    /// replaces its copy wholesale each run.
    pub fn export_snapshot(&self, run_id: &str, path: &Path) -> Result<ExportReport, StoreError> {
        let format_clause = match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("parquet") => "(FORMAT PARQUET)",
            Some(extension) if extension.eq_ignore_ascii_case("csv") => "(FORMAT CSV, HEADER)",
            _ => {
                return Err(StoreError::Rejected(String::from(
                    "snapshot path must end in .parquet or .csv",
                )))
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let connection = self.pool.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<ExportReport, StoreError> {
            // Count and COPY see the same snapshot; a writer on another
            // connection cannot make the reported count disagree with the
            // exported file.
            let rows: i64 = connection
                .query_row("SELECT COUNT(*) FROM gold_daily_costs", [], |row| row.get(0))?;

            let sql = format!(
                "COPY (SELECT cost_date, subscription_id, service_name, team, cost_center, cost_usd \
                 FROM gold_daily_costs ORDER BY cost_date, subscription_id, service_name) \
                 TO '{path}' {format_clause}",
                path = escape_sql_string(path_to_sql(path).as_str()),
            );
            connection.execute_batch(sql.as_str())?;

            log_stage(&connection, run_id, "export", "ok", rows, Some(&path_to_sql(path)))?;

            Ok(ExportReport {
                path: path.to_path_buf(),
                rows,
            })
        })();

        finalize_transaction(&connection, result)
    }
}

fn query_buckets(
    connection: &::duckdb::Connection,
    sql: &str,
) -> Result<Vec<CostBucket>, StoreError> {
    let mut statement = connection.prepare(sql)?;
    let buckets = statement
        .query_map([], |row| {
            Ok(CostBucket {
                label: row.get(0)?,
                total_usd: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(buckets)
}

fn log_stage(
    connection: &::duckdb::Connection,
    run_id: &str,
    stage: &str,
    status: &str,
    row_count: i64,
    detail: Option<&str>,
) -> Result<(), StoreError> {
    let sql = format!(
        "INSERT INTO load_log (run_id, stage, status, row_count, detail) \
         VALUES ('{run_id}', '{stage}', '{status}', {row_count}, {detail})",
        run_id = escape_sql_string(run_id),
        stage = escape_sql_string(stage),
        status = escape_sql_string(status),
        row_count = row_count,
        detail = sql_option_string(detail),
    );
    connection.execute_batch(sql.as_str())?;
    Ok(())
}

fn finalize_transaction<T>(
    connection: &::duckdb::Connection,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

fn resolve_home() -> PathBuf {
    if let Some(path) = env::var_os("COSTWISE_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".costwise");
    }

    PathBuf::from(".costwise")
}

fn path_to_sql(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

fn sql_option_string(value: Option<&str>) -> String {
    match value {
        Some(value) => format!("'{}'", escape_sql_string(value)),
        None => String::from("NULL"),
    }
}
