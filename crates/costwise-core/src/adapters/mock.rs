use fastrand::Rng;
use serde_json::{json, Value};

use crate::feed::{CostFeed, DateRange, FeedError};

const TEAMS: [&str; 8] = [
    "Siri Infrastructure",
    "Apple Maps",
    "iCloud Services",
    "Apple Music",
    "App Store Backend",
    "FaceTime Infrastructure",
    "Apple Pay Systems",
    "Photos Infrastructure",
];

const SUBSCRIPTIONS: [&str; 5] = [
    "aws-prod-001",
    "aws-prod-002",
    "gcp-prod-001",
    "azure-prod-001",
    "aws-dev-001",
];

const COST_CENTERS: [&str; 5] = ["CC-4521", "CC-4522", "CC-4523", "CC-4524", "CC-4525"];

const CURRENCIES: [&str; 4] = ["USD", "EUR", "GBP", "JPY"];

/// Per-service daily cost bounds in whole dollars.
const SERVICE_COSTS: [(&str, u64, u64); 8] = [
    ("EC2 Compute", 10_000, 150_010),
    ("S3 Storage", 5_001, 80_000),
    ("RDS Database", 8_000, 120_000),
    ("CloudFront CDN", 3_000, 50_010),
    ("Lambda Functions", 1_000, 20_000),
    ("EBS Volumes", 2_000, 30_000),
    ("Data Transfer", 4_000, 60_000),
    ("ElastiCache", 6_000, 90_000),
];

/// Deterministic stand-in for the billing API.
///
/// Produces 5-15 records per day across realistic teams, services, and
/// subscriptions, and injects the data-quality problems the real API is
/// known for (delayed billing sentinels, missing allocation fields,
/// comma-formatted amounts, absent currency) at a configurable rate.
/// Same seed, same payloads.
#[derive(Debug, Clone)]
pub struct MockBillingFeed {
    seed: u64,
    problem_percent: u64,
}

impl Default for MockBillingFeed {
    fn default() -> Self {
        Self {
            seed: 42,
            problem_percent: 10,
        }
    }
}

impl MockBillingFeed {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn with_problem_percent(mut self, percent: u64) -> Self {
        self.problem_percent = percent.min(100);
        self
    }
}

impl CostFeed for MockBillingFeed {
    fn fetch(&self, range: &DateRange) -> Result<Vec<Value>, FeedError> {
        let mut rng = Rng::with_seed(self.seed);
        let mut records = Vec::new();

        for day in range.days() {
            let per_day = rng.usize(5..=15);
            for _ in 0..per_day {
                records.push(generate_record(
                    &mut rng,
                    &day.format_iso(),
                    self.problem_percent,
                ));
            }
        }

        Ok(records)
    }
}

fn generate_record(rng: &mut Rng, usage_date: &str, problem_percent: u64) -> Value {
    let (service, min_cost, max_cost) = SERVICE_COSTS[rng.usize(..SERVICE_COSTS.len())];
    let subscription = SUBSCRIPTIONS[rng.usize(..SUBSCRIPTIONS.len())];
    let team = TEAMS[rng.usize(..TEAMS.len())];
    let cost_center = COST_CENTERS[rng.usize(..COST_CENTERS.len())];
    let currency = CURRENCIES[rng.usize(..CURRENCIES.len())];

    let cost_cents = rng.u64(min_cost * 100..=max_cost * 100);

    let mut record = json!({
        "usage_date": usage_date,
        "subscription_id": subscription,
        "service_name": service,
        "team": team,
        "cost_center": cost_center,
        "currency": currency,
        "cost": format_cents(cost_cents),
    });

    if rng.u64(..100) < problem_percent {
        match rng.u64(..6) {
            // Billing delayed: cost arrives as a sentinel string.
            0 => record["cost"] = json!("N/A"),
            1 => record["cost"] = json!("pending"),
            // Allocation gaps.
            2 => record["team"] = Value::Null,
            3 => record["cost_center"] = json!(""),
            // Locale-formatted amount with thousands separators.
            4 => record["cost"] = json!(format_cents_with_commas(cost_cents)),
            // Currency omitted entirely.
            _ => record["currency"] = Value::Null,
        }
    }

    record
}

fn format_cents(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

fn format_cents_with_commas(cents: u64) -> String {
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (position, digit) in whole.chars().enumerate() {
        if position > 0 && (whole.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{grouped}.{:02}", cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UsageDate;

    fn week() -> DateRange {
        DateRange::new(
            UsageDate::parse("2025-01-01").unwrap(),
            UsageDate::parse("2025-01-07").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn same_seed_produces_identical_payloads() {
        let first = MockBillingFeed::seeded(7).fetch(&week()).unwrap();
        let second = MockBillingFeed::seeded(7).fetch(&week()).unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn different_seeds_diverge() {
        let first = MockBillingFeed::seeded(1).fetch(&week()).unwrap();
        let second = MockBillingFeed::seeded(2).fetch(&week()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn emits_five_to_fifteen_records_per_day() {
        let day = DateRange::new(
            UsageDate::parse("2025-01-01").unwrap(),
            UsageDate::parse("2025-01-01").unwrap(),
        )
        .unwrap();
        let records = MockBillingFeed::default().fetch(&day).unwrap();
        assert!((5..=15).contains(&records.len()));
    }

    #[test]
    fn clean_feed_passes_the_raw_contract() {
        let records = MockBillingFeed::seeded(3)
            .with_problem_percent(0)
            .fetch(&week())
            .unwrap();
        for record in &records {
            crate::validate::accept_raw(record).expect("clean records are well-formed");
        }
    }

    #[test]
    fn comma_formatting_groups_thousands() {
        assert_eq!(format_cents_with_commas(14_285_723), "142,857.23");
        assert_eq!(format_cents_with_commas(99_900), "999.00");
        assert_eq!(format_cents_with_commas(1_000_000), "10,000.00");
    }
}
