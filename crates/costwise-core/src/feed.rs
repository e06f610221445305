use std::fmt::{Display, Formatter};

use serde_json::Value;
use thiserror::Error;

use crate::domain::UsageDate;

/// Errors from the billing feed boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: UsageDate, end: UsageDate },

    #[error("billing API unavailable: {0}")]
    Unavailable(String),
}

/// Inclusive date range to fetch usage for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: UsageDate,
    end: UsageDate,
}

impl DateRange {
    pub fn new(start: UsageDate, end: UsageDate) -> Result<Self, FeedError> {
        if start > end {
            return Err(FeedError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> UsageDate {
        self.start
    }

    pub fn end(&self) -> UsageDate {
        self.end
    }

    /// Every day in the range, in calendar order.
    pub fn days(&self) -> Vec<UsageDate> {
        let mut days = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            days.push(current);
            let Some(next) = current.next_day() else {
                break;
            };
            current = next;
        }
        days
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Upstream collaborator supplying raw billing payloads.
///
/// The core treats this as an opaque producer of untyped JSON objects; all
/// trust decisions happen in the validator. Implementations own their own
/// timeouts and retries.
pub trait CostFeed {
    fn fetch(&self, range: &DateRange) -> Result<Vec<Value>, FeedError>;
}
