//! Single-regressor ordinary least squares.
//!
//! The closed-form fit of `y = alpha + beta * x`. This is all the market
//! model needs; there is no general multivariate solver here.

use crate::StatsError;
use ndarray::ArrayView1;

/// A fitted line `y = alpha + beta * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleOls {
    /// Intercept
    pub alpha: f64,
    /// Slope
    pub beta: f64,
    /// Number of observations used in the fit
    pub n_obs: usize,
}

impl SimpleOls {
    /// Fit by ordinary least squares.
    ///
    /// # Errors
    ///
    /// Fails with `DimensionMismatch` if the inputs have different lengths,
    /// `InsufficientData` with fewer than two observations, and
    /// `DegenerateRegressor` if `x` has (numerically) zero variance.
    pub fn fit(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Result<Self, StatsError> {
        if x.len() != y.len() {
            return Err(StatsError::DimensionMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }

        let n = x.len();
        if n < 2 {
            return Err(StatsError::InsufficientData {
                required: 2,
                actual: n,
            });
        }

        let nf = n as f64;
        let x_mean = x.sum() / nf;
        let y_mean = y.sum() / nf;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            let dx = xi - x_mean;
            sxx += dx * dx;
            sxy += dx * (yi - y_mean);
        }

        if !sxx.is_finite() || sxx < f64::EPSILON * nf {
            return Err(StatsError::DegenerateRegressor(n));
        }

        let beta = sxy / sxx;
        let alpha = y_mean - beta * x_mean;

        Ok(Self {
            alpha,
            beta,
            n_obs: n,
        })
    }

    /// Predicted response for a regressor value.
    pub const fn predict(&self, x: f64) -> f64 {
        self.alpha + self.beta * x
    }
}
