use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::ValidationError;

/// Amount strings the billing API sends when data is delayed. These are not
/// valid costs and the record carrying them must be rejected, never zeroed.
const NOT_A_NUMBER_SENTINELS: [&str; 4] = ["N/A", "null", "None", "pending"];

/// Immutable exchange-rate table, loaded once at process start.
///
/// Rates are fixed multipliers into the home reporting currency (USD).
/// Known risk, preserved from the upstream contract: an absent or
/// unrecognized currency code silently resolves to the home rate of 1.0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<String, Decimal>,
}

impl Default for RateTable {
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(String::from("USD"), Decimal::ONE);
        rates.insert(String::from("EUR"), Decimal::new(108, 2));
        rates.insert(String::from("GBP"), Decimal::new(127, 2));
        rates.insert(String::from("JPY"), Decimal::new(67, 4));
        Self { rates }
    }
}

impl RateTable {
    pub fn empty() -> Self {
        Self {
            rates: BTreeMap::new(),
        }
    }

    pub fn with_rate(mut self, code: impl Into<String>, rate: Decimal) -> Self {
        self.rates.insert(code.into().to_ascii_uppercase(), rate);
        self
    }

    /// Multiplier for `code`, defaulting to 1.0 when the code is absent or
    /// unknown. Lookup is case-insensitive.
    pub fn resolve(&self, code: Option<&str>) -> Decimal {
        let Some(code) = code else {
            return Decimal::ONE;
        };
        self.rates
            .get(&code.trim().to_ascii_uppercase())
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Normalize a raw amount string into the home currency.
    ///
    /// Surrounding whitespace and `,` thousands separators are stripped
    /// before parsing. No rounding is applied; rounding, if any, belongs at
    /// presentation.
    pub fn normalize(
        &self,
        amount_text: &str,
        currency: Option<&str>,
    ) -> Result<Decimal, ValidationError> {
        let cleaned = amount_text.trim().replace(',', "");

        if cleaned.is_empty() || NOT_A_NUMBER_SENTINELS.contains(&cleaned.as_str()) {
            return Err(ValidationError::InvalidAmount {
                value: amount_text.to_owned(),
            });
        }

        let amount =
            Decimal::from_str(&cleaned).map_err(|_| ValidationError::UnparsableAmount {
                value: amount_text.to_owned(),
            })?;

        Ok(amount * self.resolve(currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_every_sentinel_as_invalid_amount() {
        let rates = RateTable::default();
        for sentinel in ["", "N/A", "null", "None", "pending", "  N/A  "] {
            let error = rates
                .normalize(sentinel, Some("USD"))
                .expect_err("sentinel must be rejected");
            assert!(
                matches!(error, ValidationError::InvalidAmount { .. }),
                "expected InvalidAmount for {sentinel:?}, got {error:?}"
            );
        }
    }

    #[test]
    fn strips_thousands_separators() {
        let rates = RateTable::default();
        let amount = rates.normalize("142,857.23", Some("USD")).expect("must parse");
        assert_eq!(amount, Decimal::from_str("142857.23").unwrap());
    }

    #[test]
    fn converts_eur_at_fixed_rate() {
        let rates = RateTable::default();
        let amount = rates.normalize("100", Some("EUR")).expect("must parse");
        assert_eq!(amount, Decimal::from_str("108.00").unwrap());
    }

    #[test]
    fn absent_currency_defaults_to_home_rate() {
        let rates = RateTable::default();
        let amount = rates.normalize("50.25", None).expect("must parse");
        assert_eq!(amount, Decimal::from_str("50.25").unwrap());
    }

    #[test]
    fn unrecognized_currency_silently_defaults_to_home_rate() {
        let rates = RateTable::default();
        let amount = rates.normalize("50.25", Some("CHF")).expect("must parse");
        assert_eq!(amount, Decimal::from_str("50.25").unwrap());
    }

    #[test]
    fn currency_lookup_is_case_insensitive() {
        let rates = RateTable::default();
        let amount = rates.normalize("100", Some("eur")).expect("must parse");
        assert_eq!(amount, Decimal::from_str("108.00").unwrap());
    }

    #[test]
    fn rejects_garbage_text_as_unparsable() {
        let rates = RateTable::default();
        let error = rates
            .normalize("twelve dollars", Some("USD"))
            .expect_err("must reject");
        assert!(matches!(error, ValidationError::UnparsableAmount { .. }));
    }

    #[test]
    fn preserves_negative_amounts_for_downstream_rules() {
        // Sign policy belongs to gold promotion, not normalization.
        let rates = RateTable::default();
        let amount = rates.normalize("-100.00", Some("USD")).expect("must parse");
        assert!(amount < Decimal::ZERO);
    }

    #[test]
    fn custom_rate_overrides_default() {
        let rates = RateTable::default().with_rate("CHF", Decimal::new(112, 2));
        let amount = rates.normalize("100", Some("CHF")).expect("must parse");
        assert_eq!(amount, Decimal::from_str("112.00").unwrap());
    }
}
