//! Shared scenario builders for cross-crate behavioral tests.

use costwise_core::{AggregatedCostRow, RawCostRecord};
use costwise_warehouse::{DailyCostRow, RawCostRow, Store, StoreConfig};
use serde_json::{json, Value};
use tempfile::TempDir;

/// A clean payload spread across 20 dates and 2 subscriptions, so large
/// batches aggregate to a bounded set of daily keys.
pub fn clean_payload(index: usize) -> Value {
    let day = index % 20 + 1;
    let subscription = if index % 2 == 0 {
        "aws-prod-001"
    } else {
        "aws-prod-002"
    };
    json!({
        "usage_date": format!("2025-01-{day:02}"),
        "subscription_id": subscription,
        "service_name": "EC2 Compute",
        "cost": "100.00",
        "currency": "USD",
        "team": "Apple Maps",
        "cost_center": "CC-4521"
    })
}

/// Malformed variants cycling through the failure modes the billing API is
/// known for: negative cost, missing team, delayed-billing sentinel.
pub fn malformed_payload(index: usize) -> Value {
    let mut payload = clean_payload(index);
    match index % 3 {
        0 => payload["cost"] = json!("-100.00"),
        1 => payload["team"] = Value::Null,
        _ => payload["cost"] = json!("N/A"),
    }
    payload
}

/// A batch of `total` payloads of which the first `malformed` are bad.
pub fn batch(total: usize, malformed: usize) -> Vec<Value> {
    assert!(malformed <= total);
    (0..total)
        .map(|index| {
            if index < malformed {
                malformed_payload(index)
            } else {
                clean_payload(index)
            }
        })
        .collect()
}

pub fn open_store(temp: &TempDir) -> Store {
    let db_path = temp.path().join("warehouse").join("costs.duckdb");
    Store::open(StoreConfig {
        home: temp.path().to_path_buf(),
        db_path,
        max_pool_size: 2,
    })
    .expect("store open")
}

pub fn to_raw_rows(records: &[RawCostRecord]) -> Vec<RawCostRow> {
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

pub fn to_daily_rows(rows: &[AggregatedCostRow]) -> Vec<DailyCostRow> {
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
