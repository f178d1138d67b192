//! Error and diagnostic types for record construction and line rejection

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A record invariant was violated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("amount must be finite, got {0}")]
    NonFiniteAmount(f64),

    #[error("amount must not be negative, got {0}")]
    NegativeAmount(f64),

    #[error("amount {0} exceeds the maximum of {}", crate::record::MAX_AMOUNT)]
    AmountTooLarge(f64),
}

/// Why an input line was skipped. Rejections are per line and never abort a batch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("expected at least 3 fields (Date, Type, Amount)")]
    MalformedLine,

    #[error("date could not be parsed")]
    InvalidDate,

    #[error("amount must be a non-negative number")]
    InvalidAmount,

    #[error("type must be Income or Expense")]
    UnknownFlow,
}
