//! Error types for tally-ingest

use tally_core::RecordError;
use thiserror::Error;

/// Whole-input failure. Per-line problems are reported as rejects instead.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// A manually entered transaction failed validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryError {
    #[error("please enter a valid amount greater than zero (got {0})")]
    NonPositiveAmount(f64),

    #[error("category must not contain \", \": {0}")]
    DelimiterInCategory(String),

    #[error(transparent)]
    InvalidRecord(#[from] RecordError),
}
