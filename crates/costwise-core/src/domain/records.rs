use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::UsageDate;

/// Unvalidated cost observation as received from the billing source.
///
/// Every field is a string because the API is not trusted to send correct
/// types; the documentation says `cost` is a number, but production APIs lie.
/// Optional fields may legitimately arrive null or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCostRecord {
    pub usage_date: String,
    pub subscription_id: String,
    pub service_name: String,
    pub cost: String,
    pub currency: Option<String>,
    pub team: Option<String>,
    pub cost_center: Option<String>,
}

/// Fully validated cost observation, safe for financial reporting.
///
/// Construction goes through [`crate::validate::promote_to_gold`] only; a
/// value of this type implies every business rule held, so downstream code
/// never re-checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoldCostRecord {
    usage_date: UsageDate,
    subscription_id: String,
    service_name: String,
    team: String,
    cost_center: String,
    cost_usd: Decimal,
}

impl GoldCostRecord {
    pub(crate) fn new(
        usage_date: UsageDate,
        subscription_id: String,
        service_name: String,
        team: String,
        cost_center: String,
        cost_usd: Decimal,
    ) -> Self {
        debug_assert!(cost_usd >= Decimal::ZERO);
        debug_assert!(!team.is_empty() && !cost_center.is_empty());
        Self {
            usage_date,
            subscription_id,
            service_name,
            team,
            cost_center,
            cost_usd,
        }
    }

    pub fn usage_date(&self) -> UsageDate {
        self.usage_date
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn cost_center(&self) -> &str {
        &self.cost_center
    }

    pub fn cost_usd(&self) -> Decimal {
        self.cost_usd
    }

    pub fn key(&self) -> CostKey {
        CostKey {
            usage_date: self.usage_date,
            subscription_id: self.subscription_id.clone(),
            service_name: self.service_name.clone(),
        }
    }
}

/// Composite aggregation and upsert key: one row per (date, subscription,
/// service) in the gold table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CostKey {
    pub usage_date: UsageDate,
    pub subscription_id: String,
    pub service_name: String,
}

/// One daily-grain row produced by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedCostRow {
    pub key: CostKey,
    pub team: String,
    pub cost_center: String,
    pub cost_usd: Decimal,
}
