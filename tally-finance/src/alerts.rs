//! Threshold alerts over a successful forecast

use serde::{Deserialize, Serialize};
use std::fmt;
use tally_core::MonthKey;

use crate::forecast::ForecastResult;

/// A forecast month whose predicted expense exceeds the threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAlert {
    /// 1-based position within the forecast horizon
    pub step: usize,
    pub month: MonthKey,
    pub predicted: f64,
}

impl fmt::Display for ThresholdAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Month {}: Predicted expense ${:.2}", self.step, self.predicted)
    }
}

/// Alerts for every forecast month with `predicted > threshold`, in horizon order
pub fn alerts(forecast: &ForecastResult, threshold: f64) -> Vec<ThresholdAlert> {
    forecast
        .points
        .iter()
        .filter(|p| p.predicted > threshold)
        .map(|p| ThresholdAlert {
            step: p.step,
            month: p.month,
            predicted: p.predicted,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{FittedModel, ForecastPoint, ModelOrder};

    fn result_with(predictions: &[f64]) -> ForecastResult {
        let start = MonthKey::new(2024, 6).unwrap();
        ForecastResult {
            model: FittedModel {
                order: ModelOrder::ARIMA_111,
                ar: 0.2,
                ma: -0.1,
                sigma2: 1.0,
                iterations: 10,
            },
            confidence: 0.95,
            points: predictions
                .iter()
                .enumerate()
                .map(|(i, &p)| ForecastPoint {
                    step: i + 1,
                    month: start.plus(i + 1),
                    predicted: p,
                    lower: p - 100.0,
                    upper: p + 100.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_alerts_above_threshold() {
        let result = result_with(&[2000.0, 3500.0, 2800.0, 4100.0, 3000.0, 2900.0]);
        let found = alerts(&result, 3000.0);

        let steps: Vec<usize> = found.iter().map(|a| a.step).collect();
        assert_eq!(steps, vec![2, 4]);
        assert_eq!(found[0].predicted, 3500.0);
        assert_eq!(found[1].predicted, 4100.0);
        assert_eq!(found[0].month, MonthKey::new(2024, 8).unwrap());
    }

    #[test]
    fn test_equal_to_threshold_is_not_an_alert() {
        let result = result_with(&[3000.0, 3000.0]);
        assert!(alerts(&result, 3000.0).is_empty());
    }

    #[test]
    fn test_negative_threshold() {
        let result = result_with(&[0.0, 10.0]);
        assert_eq!(alerts(&result, -1.0).len(), 2);
    }

    #[test]
    fn test_display() {
        let result = result_with(&[3500.0]);
        let alert = alerts(&result, 3000.0)[0];
        assert_eq!(alert.to_string(), "Month 1: Predicted expense $3500.00");
    }
}
