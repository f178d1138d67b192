//! Error types for the forecasting stage

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why no forecast was produced. Terminal for forecasting only; the ledger and
/// category breakdown are still available to the caller.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForecastError {
    #[error("not enough data points for forecasting (need at least 2 months, got {points})")]
    InsufficientData { points: usize },

    #[error("no expense data available for forecasting")]
    NoExpenseColumn,

    #[error("error during forecasting: {0}")]
    FitFailure(String),

    #[error("invalid forecast settings: {0}")]
    InvalidConfig(String),
}
