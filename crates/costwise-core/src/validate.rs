use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::{GoldCostRecord, RawCostRecord, UsageDate};
use crate::rates::RateTable;
use crate::ValidationError;

/// Outcome of validating one raw record, produced once and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationVerdict {
    Accepted(GoldCostRecord),
    Rejected {
        /// Position of the record in the original batch.
        index: usize,
        reason: ValidationError,
    },
}

impl ValidationVerdict {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Raw-intake contract: structural checks only.
///
/// Required fields must be present as JSON strings; optional fields may be
/// absent, null, or empty. This boundary is deliberately permissive because
/// upstream data is unreliable and staging dirty records has audit value.
pub fn accept_raw(payload: &Value) -> Result<RawCostRecord, ValidationError> {
    Ok(RawCostRecord {
        usage_date: required_string(payload, "usage_date")?,
        subscription_id: required_string(payload, "subscription_id")?,
        service_name: required_string(payload, "service_name")?,
        cost: required_string(payload, "cost")?,
        currency: optional_string(payload, "currency")?,
        team: optional_string(payload, "team")?,
        cost_center: optional_string(payload, "cost_center")?,
    })
}

/// Gold contract: the boundary where untrusted data becomes trusted.
///
/// Checks run in a fixed order: date, amount, sign, allocation. Refunds must
/// be modeled as separate credit records, so a negative normalized cost is an
/// upstream defect, not a legitimate event. Unattributed cost is a
/// data-quality failure: finance cannot report a dollar without knowing which
/// team and cost center to charge.
pub fn promote_to_gold(
    raw: &RawCostRecord,
    rates: &RateTable,
) -> Result<GoldCostRecord, ValidationError> {
    let usage_date = UsageDate::parse(&raw.usage_date)?;

    let cost_usd = rates.normalize(&raw.cost, raw.currency.as_deref())?;
    if cost_usd < Decimal::ZERO {
        return Err(ValidationError::NegativeCost { amount: cost_usd });
    }

    let team = required_allocation(raw.team.as_deref(), "team")?;
    let cost_center = required_allocation(raw.cost_center.as_deref(), "cost_center")?;

    Ok(GoldCostRecord::new(
        usage_date,
        raw.subscription_id.clone(),
        raw.service_name.clone(),
        team,
        cost_center,
        cost_usd,
    ))
}

/// Everything the batch validator learned about one input set.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// One verdict per input payload, in input order.
    pub verdicts: Vec<ValidationVerdict>,
    /// Records that passed the raw contract, in input order. Staged for
    /// audit even when gold promotion later rejected them.
    pub raw_accepted: Vec<RawCostRecord>,
}

/// Validate a whole batch: raw contract first, then gold promotion.
///
/// Each record's verdict is independent of every other record's, so this
/// loop could be fanned out across workers and re-sorted by index; the
/// sequential form is kept because batches are small.
pub fn validate_batch(payloads: &[Value], rates: &RateTable) -> ValidationOutcome {
    let mut verdicts = Vec::with_capacity(payloads.len());
    let mut raw_accepted = Vec::new();

    for (index, payload) in payloads.iter().enumerate() {
        let raw = match accept_raw(payload) {
            Ok(raw) => raw,
            Err(reason) => {
                verdicts.push(ValidationVerdict::Rejected { index, reason });
                continue;
            }
        };

        match promote_to_gold(&raw, rates) {
            Ok(gold) => verdicts.push(ValidationVerdict::Accepted(gold)),
            Err(reason) => verdicts.push(ValidationVerdict::Rejected { index, reason }),
        }
        raw_accepted.push(raw);
    }

    ValidationOutcome {
        verdicts,
        raw_accepted,
    }
}

fn required_string(payload: &Value, field: &'static str) -> Result<String, ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { field }),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(ValidationError::WrongType { field }),
    }
}

fn optional_string(
    payload: &Value,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ValidationError::WrongType { field }),
    }
}

fn required_allocation(
    value: Option<&str>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(ValidationError::MissingAllocation { field }),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    fn valid_payload() -> Value {
        json!({
            "usage_date": "2025-01-15",
            "subscription_id": "aws-prod-001",
            "service_name": "EC2 Compute",
            "cost": "142857.23",
            "currency": "USD",
            "team": "Siri Infrastructure",
            "cost_center": "CC-4521"
        })
    }

    #[test]
    fn accepts_valid_payload_into_raw() {
        let raw = accept_raw(&valid_payload()).expect("must accept");
        assert_eq!(raw.subscription_id, "aws-prod-001");
        assert_eq!(raw.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn raw_contract_allows_null_optionals() {
        let mut payload = valid_payload();
        payload["team"] = Value::Null;
        payload["currency"] = Value::Null;
        let raw = accept_raw(&payload).expect("raw contract is permissive");
        assert_eq!(raw.team, None);
        assert_eq!(raw.currency, None);
    }

    #[test]
    fn raw_contract_rejects_missing_required_field() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("cost");
        let error = accept_raw(&payload).expect_err("must reject");
        assert_eq!(error, ValidationError::MissingField { field: "cost" });
    }

    #[test]
    fn raw_contract_rejects_numeric_cost() {
        let mut payload = valid_payload();
        payload["cost"] = json!(142857.23);
        let error = accept_raw(&payload).expect_err("must reject");
        assert_eq!(error, ValidationError::WrongType { field: "cost" });
    }

    #[test]
    fn promotes_valid_raw_to_gold() {
        let raw = accept_raw(&valid_payload()).expect("must accept");
        let gold = promote_to_gold(&raw, &RateTable::default()).expect("must promote");
        assert_eq!(gold.usage_date().format_iso(), "2025-01-15");
        assert_eq!(gold.cost_usd(), Decimal::from_str("142857.23").unwrap());
        assert_eq!(gold.team(), "Siri Infrastructure");
    }

    #[test]
    fn gold_rejects_negative_cost() {
        let mut payload = valid_payload();
        payload["cost"] = json!("-100.00");
        let raw = accept_raw(&payload).expect("raw contract passes");
        let error = promote_to_gold(&raw, &RateTable::default()).expect_err("must reject");
        assert!(matches!(error, ValidationError::NegativeCost { .. }));
        assert_eq!(error.field(), "cost");
    }

    #[test]
    fn gold_rejects_sentinel_cost() {
        let mut payload = valid_payload();
        payload["cost"] = json!("N/A");
        let raw = accept_raw(&payload).expect("raw contract passes");
        let error = promote_to_gold(&raw, &RateTable::default()).expect_err("must reject");
        assert!(matches!(error, ValidationError::InvalidAmount { .. }));
    }

    #[test]
    fn gold_rejects_blank_allocation_fields() {
        for field in ["team", "cost_center"] {
            let mut payload = valid_payload();
            payload[field] = json!("   ");
            let raw = accept_raw(&payload).expect("raw contract passes");
            let error = promote_to_gold(&raw, &RateTable::default()).expect_err("must reject");
            assert!(matches!(error, ValidationError::MissingAllocation { .. }));
            assert_eq!(error.field(), field);
        }
    }

    #[test]
    fn gold_trims_allocation_fields() {
        let mut payload = valid_payload();
        payload["team"] = json!("  Apple Maps  ");
        let raw = accept_raw(&payload).expect("raw contract passes");
        let gold = promote_to_gold(&raw, &RateTable::default()).expect("must promote");
        assert_eq!(gold.team(), "Apple Maps");
    }

    #[test]
    fn gold_converts_currency_before_sign_check() {
        let mut payload = valid_payload();
        payload["cost"] = json!("100");
        payload["currency"] = json!("EUR");
        let raw = accept_raw(&payload).expect("raw contract passes");
        let gold = promote_to_gold(&raw, &RateTable::default()).expect("must promote");
        assert_eq!(gold.cost_usd(), Decimal::from_str("108.00").unwrap());
    }

    #[test]
    fn batch_verdicts_keep_input_order_and_indices() {
        let mut bad = valid_payload();
        bad["cost"] = json!("pending");
        let payloads = vec![valid_payload(), bad, valid_payload()];

        let outcome = validate_batch(&payloads, &RateTable::default());
        assert_eq!(outcome.verdicts.len(), 3);
        assert!(outcome.verdicts[0].is_accepted());
        assert!(matches!(
            outcome.verdicts[1],
            ValidationVerdict::Rejected { index: 1, .. }
        ));
        assert!(outcome.verdicts[2].is_accepted());
        // The pending-cost record still passes the raw contract and is staged.
        assert_eq!(outcome.raw_accepted.len(), 3);
    }

    #[test]
    fn structurally_broken_records_are_not_staged() {
        let payloads = vec![json!({ "cost": "10.00" }), valid_payload()];
        let outcome = validate_batch(&payloads, &RateTable::default());
        assert_eq!(outcome.raw_accepted.len(), 1);
        assert!(matches!(
            outcome.verdicts[0],
            ValidationVerdict::Rejected { index: 0, .. }
        ));
    }
}
