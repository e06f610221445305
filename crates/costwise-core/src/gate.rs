use serde::Serialize;

use crate::domain::GoldCostRecord;
use crate::validate::ValidationVerdict;
use crate::{PipelineError, ValidationError};

/// Maximum tolerable fraction of per-record failures before the batch is
/// considered systemically untrustworthy.
pub const FAILURE_THRESHOLD: f64 = 0.10;

/// How many rejection reasons to keep as a diagnostic sample on abort.
const SAMPLE_SIZE: usize = 3;

/// One retained rejection, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionSample {
    pub index: usize,
    pub field: &'static str,
    pub reason: String,
}

impl RejectionSample {
    fn new(index: usize, reason: &ValidationError) -> Self {
        Self {
            index,
            field: reason.field(),
            reason: reason.to_string(),
        }
    }
}

/// Whole-batch verdict from the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchResult {
    /// The batch is trustworthy; carry the accepted records forward.
    Proceed(Vec<GoldCostRecord>),
    /// Systemic failure. Every record in the batch, accepted ones included,
    /// is unusable for this run.
    Abort {
        failure_rate: f64,
        sample: Vec<RejectionSample>,
    },
}

impl BatchResult {
    /// Convert an abort into the fatal pipeline error callers must stop on.
    pub fn into_accepted(self) -> Result<Vec<GoldCostRecord>, PipelineError> {
        match self {
            Self::Proceed(records) => Ok(records),
            Self::Abort {
                failure_rate,
                sample,
            } => Err(PipelineError::ThresholdExceeded {
                failure_rate: failure_rate * 100.0,
                sample: sample
                    .into_iter()
                    .map(|entry| format!("record {}: {}", entry.index, entry.reason))
                    .collect(),
            }),
        }
    }
}

/// Decide whether a batch of verdicts is acceptable as a whole.
///
/// Isolated bad rows are tolerated; an elevated failure rate means the
/// upstream schema probably changed, and admitting a partial batch would
/// silently under-report cost. A pure function of the rejection ratio:
/// ordering of verdicts never changes the outcome.
pub fn evaluate_batch(verdicts: Vec<ValidationVerdict>) -> BatchResult {
    let total = verdicts.len();
    if total == 0 {
        return BatchResult::Proceed(Vec::new());
    }

    let mut accepted = Vec::new();
    let mut sample = Vec::new();
    let mut rejected = 0usize;

    for verdict in verdicts {
        match verdict {
            ValidationVerdict::Accepted(gold) => accepted.push(gold),
            ValidationVerdict::Rejected { index, reason } => {
                rejected += 1;
                if sample.len() < SAMPLE_SIZE {
                    sample.push(RejectionSample::new(index, &reason));
                }
            }
        }
    }

    let failure_rate = rejected as f64 / total as f64;
    if failure_rate > FAILURE_THRESHOLD {
        BatchResult::Abort {
            failure_rate,
            sample,
        }
    } else {
        BatchResult::Proceed(accepted)
    }
}
