//! Monthly expense forecasting with a fixed-order ARIMA(1,1,1) model.
//!
//! The ledger's expense column is signed (expenses are negative). It is turned
//! into magnitudes once, here, so every number in a [`ForecastResult`] is an
//! expense magnitude and compares directly against a positive threshold.
//!
//! Fitting minimizes the conditional sum of squares of the one-step errors of
//! the differenced series, with the pre-sample difference and innovation set to
//! zero. Both coefficients are kept inside (-1, 1) by a tanh mapping so the
//! fitted model is stationary and invertible.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tally_core::MonthKey;
use tracing::debug;

use crate::aggregate::MonthlyLedger;
use crate::error::ForecastError;
use crate::simplex::{self, SimplexOptions};

pub const DEFAULT_HORIZON: usize = 6;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;
pub const DEFAULT_MAX_ITERATIONS: usize = 2000;

// Keeps |phi|, |theta| strictly below 1
const COEFFICIENT_BOUND: f64 = 0.99;

/// Evenly spaced monthly series starting at `start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSeries {
    pub start: MonthKey,
    pub values: Vec<f64>,
}

impl ExpenseSeries {
    pub fn new(start: MonthKey, values: Vec<f64>) -> Self {
        Self { start, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Month of the last observation
    pub fn last_month(&self) -> Option<MonthKey> {
        self.len().checked_sub(1).map(|n| self.start.plus(n))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of future months to project
    pub horizon: usize,
    /// Two-sided coverage of the bounds, in (0, 1)
    pub confidence: f64,
    /// Iteration cap for the optimizer
    pub max_iterations: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            confidence: DEFAULT_CONFIDENCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidConfig(
                "horizon must be at least 1".to_string(),
            ));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(ForecastError::InvalidConfig(format!(
                "confidence must be between 0 and 1, got {}",
                self.confidence
            )));
        }
        if self.max_iterations == 0 {
            return Err(ForecastError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// (p, d, q) order of the fitted model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ModelOrder {
    pub const ARIMA_111: ModelOrder = ModelOrder { p: 1, d: 1, q: 1 };
}

impl std::fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Fitted coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub order: ModelOrder,
    /// AR(1) coefficient of the differenced series
    pub ar: f64,
    /// MA(1) coefficient of the differenced series
    pub ma: f64,
    /// Innovation variance
    pub sigma2: f64,
    /// Optimizer iterations used
    pub iterations: usize,
}

/// One projected month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 1-based position within the horizon
    pub step: usize,
    pub month: MonthKey,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub model: FittedModel,
    pub confidence: f64,
    pub points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn order(&self) -> ModelOrder {
        self.model.order
    }

    pub fn horizon(&self) -> usize {
        self.points.len()
    }
}

/// Forecast the ledger's expense column.
///
/// Fails with `NoExpenseColumn` when the ledger holds no expense records at all.
pub fn forecast_ledger(
    ledger: &MonthlyLedger,
    config: &ForecastConfig,
) -> Result<ForecastResult, ForecastError> {
    let series = ledger
        .expense_series()
        .ok_or(ForecastError::NoExpenseColumn)?;
    forecast(&series, config)
}

/// Fit ARIMA(1,1,1) to a signed monthly expense series and project
/// `config.horizon` months past its last observation.
pub fn forecast(
    series: &ExpenseSeries,
    config: &ForecastConfig,
) -> Result<ForecastResult, ForecastError> {
    config.validate()?;

    let last_month = match series.last_month() {
        Some(m) if series.len() >= 2 => m,
        _ => {
            return Err(ForecastError::InsufficientData {
                points: series.len(),
            });
        }
    };

    if series.values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::FitFailure(
            "series contains non-finite values".to_string(),
        ));
    }

    let magnitudes: Vec<f64> = series.values.iter().map(|v| -v).collect();
    let diffs: Vec<f64> = magnitudes.windows(2).map(|w| w[1] - w[0]).collect();
    if diffs.iter().all(|d| *d == 0.0) {
        return Err(ForecastError::FitFailure(
            "expense series is constant, the model is degenerate".to_string(),
        ));
    }

    let model = fit(&diffs, config.max_iterations)?;
    debug!(
        "Fitted {} with ar={:.4} ma={:.4} sigma2={:.4} in {} iterations",
        model.order, model.ar, model.ma, model.sigma2, model.iterations
    );

    let z = normal_quantile(0.5 + config.confidence / 2.0)?;
    let (last_diff, last_innovation) = {
        let errors = innovations(&diffs, model.ar, model.ma);
        (diffs[diffs.len() - 1], errors[errors.len() - 1])
    };

    let phi = model.ar;
    let theta = model.ma;
    let mut level = magnitudes[magnitudes.len() - 1];
    let mut prev_diff = last_diff;
    let mut cumulative_psi = 0.0;
    let mut variance_sum = 0.0;
    let mut points = Vec::with_capacity(config.horizon);

    for step in 1..=config.horizon {
        let diff = if step == 1 {
            phi * last_diff + theta * last_innovation
        } else {
            phi * prev_diff
        };
        level += diff;
        prev_diff = diff;

        // psi weights of ARMA(1,1): 1, (phi + theta) * phi^(j-1); integrated by cumulative sum
        let psi = if step == 1 {
            1.0
        } else {
            (phi + theta) * phi.powi(step as i32 - 2)
        };
        cumulative_psi += psi;
        variance_sum += cumulative_psi * cumulative_psi;

        let half_width = z * (model.sigma2 * variance_sum).sqrt();
        if !(level.is_finite() && half_width.is_finite()) {
            return Err(ForecastError::FitFailure(format!(
                "non-finite forecast at step {step}"
            )));
        }

        points.push(ForecastPoint {
            step,
            month: last_month.plus(step),
            predicted: level,
            lower: level - half_width,
            upper: level + half_width,
        });
    }

    Ok(ForecastResult {
        model,
        confidence: config.confidence,
        points,
    })
}

fn fit(diffs: &[f64], max_iterations: usize) -> Result<FittedModel, ForecastError> {
    let objective = |p: &[f64; 2]| {
        let (phi, theta) = coefficients(p);
        sum_of_squares(diffs, phi, theta)
    };
    let opts = SimplexOptions {
        max_iterations,
        ..SimplexOptions::default()
    };

    let minimum = simplex::minimize(objective, [0.0, 0.0], &opts).ok_or_else(|| {
        ForecastError::FitFailure(format!(
            "optimizer did not converge within {max_iterations} iterations"
        ))
    })?;

    let (ar, ma) = coefficients(&minimum.point);
    let sigma2 = minimum.value / diffs.len() as f64;
    if !(sigma2.is_finite() && sigma2 > 0.0) {
        return Err(ForecastError::FitFailure(format!(
            "degenerate innovation variance {sigma2}"
        )));
    }

    Ok(FittedModel {
        order: ModelOrder::ARIMA_111,
        ar,
        ma,
        sigma2,
        iterations: minimum.iterations,
    })
}

fn coefficients(p: &[f64; 2]) -> (f64, f64) {
    (
        COEFFICIENT_BOUND * p[0].tanh(),
        COEFFICIENT_BOUND * p[1].tanh(),
    )
}

/// One-step errors of ARMA(1,1) on the differenced series
fn innovations(diffs: &[f64], phi: f64, theta: f64) -> Vec<f64> {
    let mut prev_diff = 0.0;
    let mut prev_err = 0.0;
    diffs
        .iter()
        .map(|&d| {
            let err = d - phi * prev_diff - theta * prev_err;
            prev_diff = d;
            prev_err = err;
            err
        })
        .collect()
}

fn sum_of_squares(diffs: &[f64], phi: f64, theta: f64) -> f64 {
    innovations(diffs, phi, theta).iter().map(|e| e * e).sum()
}

fn normal_quantile(p: f64) -> Result<f64, ForecastError> {
    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidConfig(format!("normal distribution: {e}")))?;
    Ok(standard.inverse_cdf(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "approx not equal: left={a} right={b} eps={eps}");
    }

    fn jan_2024() -> MonthKey {
        MonthKey::new(2024, 1).unwrap()
    }

    fn signed(magnitudes: &[f64]) -> ExpenseSeries {
        ExpenseSeries::new(jan_2024(), magnitudes.iter().map(|m| -m).collect())
    }

    #[test]
    fn test_insufficient_data() {
        let cfg = ForecastConfig::default();
        assert_eq!(
            forecast(&signed(&[1200.0]), &cfg),
            Err(ForecastError::InsufficientData { points: 1 })
        );
        assert_eq!(
            forecast(&signed(&[]), &cfg),
            Err(ForecastError::InsufficientData { points: 0 })
        );
    }

    #[test]
    fn test_constant_series_is_fit_failure() {
        let result = forecast(&signed(&[500.0; 8]), &ForecastConfig::default());
        assert!(matches!(result, Err(ForecastError::FitFailure(_))));
    }

    #[test]
    fn test_non_finite_values_fail() {
        let series = ExpenseSeries::new(jan_2024(), vec![-1.0, f64::NAN, -3.0]);
        assert!(matches!(
            forecast(&series, &ForecastConfig::default()),
            Err(ForecastError::FitFailure(_))
        ));
    }

    #[test]
    fn test_invalid_config() {
        let series = signed(&[1.0, 2.0, 3.0]);
        let zero_horizon = ForecastConfig {
            horizon: 0,
            ..ForecastConfig::default()
        };
        assert!(matches!(
            forecast(&series, &zero_horizon),
            Err(ForecastError::InvalidConfig(_))
        ));
        let bad_confidence = ForecastConfig {
            confidence: 1.0,
            ..ForecastConfig::default()
        };
        assert!(matches!(
            forecast(&series, &bad_confidence),
            Err(ForecastError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_two_points_is_enough() {
        let result = forecast(&signed(&[1200.0, 1300.0]), &ForecastConfig::default()).unwrap();
        assert_eq!(result.horizon(), 6);
        assert_eq!(result.order(), ModelOrder::ARIMA_111);
        // A single difference leaves the coefficients at their starting point
        approx_eq(result.model.ar, 0.0, 1e-12);
        approx_eq(result.model.ma, 0.0, 1e-12);
        approx_eq(result.model.sigma2, 10_000.0, 1e-6);
        for p in &result.points {
            approx_eq(p.predicted, 1300.0, 1e-9);
        }
        // Random walk: variance grows linearly with the step
        let first_half = result.points[0].upper - result.points[0].predicted;
        approx_eq(first_half, 1.959_964 * 100.0, 1e-3);
        let sixth_half = result.points[5].upper - result.points[5].predicted;
        approx_eq(sixth_half, first_half * 6f64.sqrt(), 1e-6);
    }

    #[test]
    fn test_fit_near_coefficient_bound() {
        // The MA optimum sits close to the tanh bound, where the simplex crawls
        let result = forecast(
            &signed(&[4360.77, 4354.36, 0.0, 4103.9]),
            &ForecastConfig::default(),
        )
        .unwrap();
        assert!(result.model.ma < -0.9, "{:?}", result.model);
        assert!(result.model.iterations <= DEFAULT_MAX_ITERATIONS);
        assert_eq!(result.points.len(), 6);
        for p in &result.points {
            assert!(p.lower <= p.predicted && p.predicted <= p.upper, "{:?}", p);
        }
    }

    #[test]
    fn test_horizon_and_bounds() {
        let history = [
            1800.0, 2100.0, 1950.0, 2300.0, 2250.0, 2600.0, 2400.0, 2750.0, 2700.0, 2900.0,
            2850.0, 3100.0,
        ];
        let result = forecast(&signed(&history), &ForecastConfig::default()).unwrap();

        assert_eq!(result.points.len(), 6);
        assert_eq!(result.confidence, 0.95);
        for (i, p) in result.points.iter().enumerate() {
            assert_eq!(p.step, i + 1);
            assert_eq!(p.month, jan_2024().plus(11 + i + 1));
            assert!(p.lower <= p.predicted && p.predicted <= p.upper, "{:?}", p);
        }
        // Bounds widen with the horizon
        let widths: Vec<f64> = result.points.iter().map(|p| p.upper - p.lower).collect();
        assert!(widths.windows(2).all(|w| w[1] >= w[0]));
        assert!(result.model.ar.abs() < 1.0 && result.model.ma.abs() < 1.0);
        assert!(result.model.sigma2 > 0.0);
        // Forecast months follow the last observation
        assert_eq!(result.points[0].month, MonthKey::new(2025, 1).unwrap());
    }

    #[test]
    fn test_custom_horizon_and_confidence() {
        let history = [100.0, 140.0, 90.0, 160.0, 120.0];
        let narrow = ForecastConfig {
            horizon: 3,
            confidence: 0.5,
            ..ForecastConfig::default()
        };
        let wide = ForecastConfig {
            horizon: 3,
            confidence: 0.99,
            ..ForecastConfig::default()
        };
        let a = forecast(&signed(&history), &narrow).unwrap();
        let b = forecast(&signed(&history), &wide).unwrap();
        assert_eq!(a.points.len(), 3);
        for (n, w) in a.points.iter().zip(&b.points) {
            approx_eq(n.predicted, w.predicted, 1e-9);
            assert!(w.upper - w.lower > n.upper - n.lower);
        }
    }

    #[test]
    fn test_forecast_ledger_requires_expenses() {
        let ledger = MonthlyLedger::default();
        assert_eq!(
            forecast_ledger(&ledger, &ForecastConfig::default()),
            Err(ForecastError::NoExpenseColumn)
        );
    }

    #[test]
    fn test_last_month() {
        let series = signed(&[1.0, 2.0, 3.0]);
        assert_eq!(series.last_month(), MonthKey::new(2024, 3));
        assert_eq!(signed(&[]).last_month(), None);
    }

    #[test]
    fn test_innovations_recursion() {
        let errs = innovations(&[1.0, 2.0, 3.0], 0.5, 0.25);
        // e1 = 1; e2 = 2 - 0.5*1 - 0.25*1 = 1.25; e3 = 3 - 0.5*2 - 0.25*1.25 = 1.6875
        assert_eq!(errs, vec![1.0, 1.25, 1.6875]);
    }
}
