//! Rollup views over the gold table.
//!
//! These back the `verify` command's fixed summaries: cost by team, cost by
//! service, and the daily trend. Anything beyond these rollups is out of
//! scope for the store.

use ::duckdb::Connection;

pub fn create_views(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r"
CREATE OR REPLACE VIEW vw_cost_by_team AS
SELECT
    team,
    SUM(cost_usd)::DOUBLE AS total_usd
FROM gold_daily_costs
GROUP BY team;

CREATE OR REPLACE VIEW vw_cost_by_service AS
SELECT
    service_name,
    SUM(cost_usd)::DOUBLE AS total_usd
FROM gold_daily_costs
GROUP BY service_name;

CREATE OR REPLACE VIEW vw_daily_cost AS
SELECT
    cost_date,
    SUM(cost_usd)::DOUBLE AS total_usd
FROM gold_daily_costs
GROUP BY cost_date;
",
    )
}
