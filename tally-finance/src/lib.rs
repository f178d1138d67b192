//! tally-finance: monthly aggregation, expense forecasting, threshold alerts,
//! and the end-to-end pipeline that ties them to the parser.

pub mod aggregate;
pub mod alerts;
pub mod error;
pub mod forecast;
pub mod pipeline;
pub mod simplex;

pub use aggregate::{CategoryBreakdown, MonthlyLedger, MonthlyTotals, aggregate};
pub use alerts::{ThresholdAlert, alerts};
pub use error::ForecastError;
pub use forecast::{
    ExpenseSeries, FittedModel, ForecastConfig, ForecastPoint, ForecastResult, ModelOrder,
    forecast, forecast_ledger,
};
pub use pipeline::{PipelineConfig, PipelineReport, PipelineStage, run, run_batch, run_lines};
