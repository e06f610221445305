//! Core contracts for costwise.
//!
//! This crate contains:
//! - Canonical domain models for raw, gold, and aggregated cost records
//! - The two-stage validation boundary (permissive raw intake, strict gold)
//! - Currency normalization against a fixed rate table
//! - The whole-batch failure-rate gate
//! - Daily-grain aggregation
//! - The billing feed trait and its deterministic mock adapter
//!
//! Nothing here touches storage; the pipeline's only stateful component
//! lives in `costwise-warehouse`.

pub mod adapters;
pub mod aggregate;
pub mod domain;
pub mod error;
pub mod feed;
pub mod gate;
pub mod rates;
pub mod validate;

pub use adapters::MockBillingFeed;
pub use aggregate::aggregate;
pub use domain::{AggregatedCostRow, CostKey, GoldCostRecord, RawCostRecord, UsageDate};
pub use error::{PipelineError, ValidationError};
pub use feed::{CostFeed, DateRange, FeedError};
pub use gate::{evaluate_batch, BatchResult, RejectionSample, FAILURE_THRESHOLD};
pub use rates::RateTable;
pub use validate::{accept_raw, promote_to_gold, validate_batch, ValidationOutcome, ValidationVerdict};
