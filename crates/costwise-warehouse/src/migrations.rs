use ::duckdb::Connection;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_core_tables",
        sql: r#"
CREATE TABLE IF NOT EXISTS raw_cloud_costs (
    seq BIGINT NOT NULL,
    usage_date TEXT NOT NULL,
    subscription_id TEXT NOT NULL,
    service_name TEXT NOT NULL,
    cost TEXT NOT NULL,
    currency TEXT,
    team TEXT,
    cost_center TEXT,
    staged_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS gold_daily_costs (
    cost_date DATE NOT NULL,
    subscription_id TEXT NOT NULL,
    service_name TEXT NOT NULL,
    team TEXT NOT NULL,
    cost_center TEXT NOT NULL,
    cost_usd DECIMAL(18, 6) NOT NULL,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (cost_date, subscription_id, service_name)
);

CREATE TABLE IF NOT EXISTS load_log (
    run_id TEXT NOT NULL,
    stage TEXT NOT NULL,
    status TEXT NOT NULL,
    row_count BIGINT,
    detail TEXT,
    timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    },
    Migration {
        version: "0002_indexes",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_gold_daily_costs_team ON gold_daily_costs(team);
CREATE INDEX IF NOT EXISTS idx_gold_daily_costs_service ON gold_daily_costs(service_name);
CREATE INDEX IF NOT EXISTS idx_load_log_run_stage ON load_log(run_id, stage);
"#,
    },
];

pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let query = format!(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = '{}'",
            escape_sql_string(migration.version)
        );
        let applied_count: i64 = connection.query_row(query.as_str(), [], |row| row.get(0))?;

        if applied_count == 0 {
            connection.execute_batch(migration.sql)?;
            let insert = format!(
                "INSERT INTO schema_migrations (version) VALUES ('{}')",
                escape_sql_string(migration.version)
            );
            connection.execute_batch(insert.as_str())?;
        }
    }

    Ok(())
}

fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}
