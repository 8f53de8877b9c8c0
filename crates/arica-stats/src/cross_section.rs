//! Cross-sectional regression of CAR on earnings surprise.
//!
//! One regression per CAR horizon, across every (ticker, event) observation
//! that survived the event-study sufficiency checks. CAR outliers are
//! trimmed to a quantile band before fitting.

use crate::StatsError;
use crate::ols::SimpleOls;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Configuration for the cross-sectional drift regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossSectionConfig {
    /// Lower CAR quantile retained when trimming outliers
    pub trim_lower: f64,
    /// Upper CAR quantile retained when trimming outliers
    pub trim_upper: f64,
    /// Minimum observations required before trimming
    pub min_observations: usize,
}

impl Default for CrossSectionConfig {
    fn default() -> Self {
        Self {
            trim_lower: 0.05,
            trim_upper: 0.95,
            min_observations: 10,
        }
    }
}

/// Per-horizon summary of the CAR-on-surprise regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionSummary {
    /// CAR horizon in trading days
    pub window: u32,
    /// Fitted intercept
    pub intercept: f64,
    /// Fitted surprise coefficient
    pub coefficient: f64,
    /// Standard error of the surprise coefficient
    pub std_error: f64,
    /// t-statistic of the surprise coefficient
    pub t_stat: f64,
    /// Two-sided p-value of the surprise coefficient (Student-t, n-2 dof)
    pub p_value: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Observations used after trimming
    pub n: usize,
}

/// Regress CAR on surprise for one horizon.
///
/// `surprises` and `cars` are parallel slices, one entry per (ticker,
/// event) observation. Observations whose CAR falls outside the configured
/// quantile band, or with a non-finite value on either side, are dropped
/// before fitting.
///
/// # Errors
///
/// Fails with `InsufficientData` when fewer than
/// `config.min_observations` observations are supplied, or fewer than
/// three survive trimming.
pub fn regress_car_on_surprise(
    window: u32,
    surprises: &[f64],
    cars: &[f64],
    config: &CrossSectionConfig,
) -> Result<RegressionSummary, StatsError> {
    if surprises.len() != cars.len() {
        return Err(StatsError::DimensionMismatch {
            x_len: surprises.len(),
            y_len: cars.len(),
        });
    }
    if cars.len() < config.min_observations {
        return Err(StatsError::InsufficientData {
            required: config.min_observations,
            actual: cars.len(),
        });
    }

    let lower = quantile(cars, config.trim_lower);
    let upper = quantile(cars, config.trim_upper);

    let kept: Vec<(f64, f64)> = surprises
        .iter()
        .zip(cars.iter())
        .filter(|(s, c)| s.is_finite() && c.is_finite() && **c >= lower && **c <= upper)
        .map(|(s, c)| (*s, *c))
        .collect();

    // Two parameters plus at least one residual degree of freedom.
    if kept.len() < 3 {
        return Err(StatsError::InsufficientData {
            required: 3,
            actual: kept.len(),
        });
    }

    let x = Array1::from_iter(kept.iter().map(|p| p.0));
    let y = Array1::from_iter(kept.iter().map(|p| p.1));
    let fit = SimpleOls::fit(x.view(), y.view())?;

    let n = kept.len();
    let nf = n as f64;
    let x_mean = x.sum() / nf;
    let y_mean = y.sum() / nf;

    let mut sxx = 0.0;
    let mut ssr = 0.0;
    let mut sst = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        sxx += dx * dx;
        let residual = yi - fit.predict(xi);
        ssr += residual * residual;
        sst += (yi - y_mean) * (yi - y_mean);
    }

    let dof = (n - 2) as f64;
    let sigma2 = ssr / dof;
    let std_error = (sigma2 / sxx).sqrt();
    let t_stat = if std_error > 0.0 {
        fit.beta / std_error
    } else {
        f64::INFINITY * fit.beta.signum()
    };
    let p_value = StudentsT::new(0.0, 1.0, dof)
        .map(|dist| 2.0 * (1.0 - dist.cdf(t_stat.abs())))
        .unwrap_or(f64::NAN);
    let r_squared = if sst > 0.0 { 1.0 - ssr / sst } else { 0.0 };

    Ok(RegressionSummary {
        window,
        intercept: fit.alpha,
        coefficient: fit.beta,
        std_error,
        t_stat,
        p_value,
        r_squared,
        n,
    })
}

/// Linear-interpolation quantile of a non-empty sample.
fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    if sorted.is_empty() {
        return f64::NAN;
    }

    let h = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
    }
}
