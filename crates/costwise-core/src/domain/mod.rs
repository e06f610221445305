mod records;
mod usage_date;

pub use records::{AggregatedCostRow, CostKey, GoldCostRecord, RawCostRecord};
pub use usage_date::UsageDate;
