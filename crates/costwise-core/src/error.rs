use rust_decimal::Decimal;
use thiserror::Error;

/// Per-record contract violations.
///
/// These are recoverable: the offending record is dropped and the batch
/// continues. Each variant names the field it applies to so rejection
/// reasons stay actionable in run reports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field '{field}' is missing from the payload")]
    MissingField { field: &'static str },
    #[error("field '{field}' must be a string")]
    WrongType { field: &'static str },

    #[error("invalid cost value '{value}' - billing data may be delayed")]
    InvalidAmount { value: String },
    #[error("cannot parse cost '{value}' as a decimal amount")]
    UnparsableAmount { value: String },

    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("cost cannot be negative: {amount}")]
    NegativeCost { amount: Decimal },

    #[error("'{field}' is required for cost allocation")]
    MissingAllocation { field: &'static str },
}

impl ValidationError {
    /// Name of the offending field.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::WrongType { field } => field,
            Self::InvalidAmount { .. } | Self::UnparsableAmount { .. } => "cost",
            Self::InvalidDate { .. } => "usage_date",
            Self::NegativeCost { .. } => "cost",
            Self::MissingAllocation { field } => field,
        }
    }
}

/// Fatal pipeline errors: nothing downstream of the failing stage runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(
        "validation failure rate {failure_rate:.1}% exceeds the 10% threshold; \
         the upstream schema may have changed"
    )]
    ThresholdExceeded {
        /// Failure rate as a percentage, e.g. `12.0`.
        failure_rate: f64,
        /// At most the first three rejection reasons.
        sample: Vec<String>,
    },

    #[error("billing feed error: {0}")]
    Feed(#[from] crate::feed::FeedError),
}
