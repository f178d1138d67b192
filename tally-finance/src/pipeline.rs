//! One-shot pipeline run: parse -> aggregate -> forecast -> alerts.
//!
//! Every stage degrades independently. A failed forecast still leaves the
//! parsed batch, the ledger and the category breakdown available, and is
//! reported as `alerts == None` rather than an empty alert list.

use serde::{Deserialize, Serialize};
use tally_ingest::{ParseOptions, ParsedBatch, parse_lines, parse_text};
use tracing::{info, warn};

use crate::aggregate::{CategoryBreakdown, MonthlyLedger, aggregate};
use crate::alerts::{ThresholdAlert, alerts};
use crate::error::ForecastError;
use crate::forecast::{ForecastConfig, ForecastResult, forecast_ledger};

/// Default monthly expense threshold for alerts
pub const DEFAULT_THRESHOLD: f64 = 3000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Alert when a forecast month's predicted expense exceeds this
    pub threshold: f64,
    pub parse: ParseOptions,
    pub forecast: ForecastConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            parse: ParseOptions::default(),
            forecast: ForecastConfig::default(),
        }
    }
}

/// Terminal state of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineStage<'a> {
    ForecastFailed(&'a ForecastError),
    AlertsComputed(&'a [ThresholdAlert]),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub batch: ParsedBatch,
    pub ledger: MonthlyLedger,
    pub breakdown: CategoryBreakdown,
    pub forecast: Result<ForecastResult, ForecastError>,
    /// `None` when forecasting failed; `Some(empty)` when nothing crossed the threshold
    pub alerts: Option<Vec<ThresholdAlert>>,
}

impl PipelineReport {
    pub fn stage(&self) -> PipelineStage<'_> {
        match &self.forecast {
            Err(e) => PipelineStage::ForecastFailed(e),
            Ok(_) => PipelineStage::AlertsComputed(self.alerts.as_deref().unwrap_or(&[])),
        }
    }

    /// True when no records survived parsing
    pub fn has_no_data(&self) -> bool {
        self.batch.records.is_empty()
    }
}

/// Run the pipeline over a raw text blob
pub fn run(text: &str, config: &PipelineConfig) -> PipelineReport {
    run_batch(parse_text(text, config.parse), config)
}

/// Run the pipeline over pre-split lines (first line is the header)
pub fn run_lines<I, S>(lines: I, config: &PipelineConfig) -> PipelineReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    run_batch(parse_lines(lines, config.parse), config)
}

/// Run the remaining stages over an already parsed batch
pub fn run_batch(batch: ParsedBatch, config: &PipelineConfig) -> PipelineReport {
    info!(
        "Parsed {} records ({} rejected)",
        batch.records.len(),
        batch.rejects.len()
    );

    let (ledger, breakdown) = aggregate(&batch.records);
    info!(
        "Aggregated {} months, {} expense categories",
        ledger.len(),
        breakdown.len()
    );

    let forecast = forecast_ledger(&ledger, &config.forecast);
    let alerts = match &forecast {
        Ok(result) => {
            let found = alerts(result, config.threshold);
            info!(
                "Forecast {} months with {}, {} above threshold {:.2}",
                result.horizon(),
                result.order(),
                found.len(),
                config.threshold
            );
            Some(found)
        }
        Err(e) => {
            warn!("Forecast skipped: {}", e);
            None
        }
    };

    PipelineReport {
        batch,
        ledger,
        breakdown,
        forecast,
        alerts,
    }
}
