use std::collections::BTreeMap;

use crate::domain::{AggregatedCostRow, GoldCostRecord};

/// Roll gold records up to the daily grain.
///
/// Groups by the composite key (date, subscription, service) and sums costs
/// with exact decimal arithmetic; hourly observations collapse into one row
/// per day. Output is ordered by key.
///
/// Policy, not contract: when several records share a key, `team` and
/// `cost_center` come from the last record encountered in input order. Any
/// disagreement between the group's members is silently discarded; treat
/// this default as pending product clarification, not a guarantee.
pub fn aggregate(records: Vec<GoldCostRecord>) -> Vec<AggregatedCostRow> {
    let mut groups: BTreeMap<_, AggregatedCostRow> = BTreeMap::new();

    for record in records {
        let key = record.key();
        groups
            .entry(key.clone())
            .and_modify(|row| {
                row.cost_usd += record.cost_usd();
                row.team = record.team().to_owned();
                row.cost_center = record.cost_center().to_owned();
            })
            .or_insert_with(|| AggregatedCostRow {
                key,
                team: record.team().to_owned(),
                cost_center: record.cost_center().to_owned(),
                cost_usd: record.cost_usd(),
            });
    }

    groups.into_values().collect()
}
