//! Market-model estimation.
//!
//! Fits `stock_return = alpha + beta * market_return` over the pre-event
//! estimation window only. Rows at or past the window bound never enter
//! the fit; including them would leak post-event information into the
//! expected-return benchmark.

use crate::error::{EventStudyError, Result};
use crate::returns::AlignedReturns;
use arica_stats::{StatsError, ols::SimpleOls};
use ndarray::ArrayView1;

/// A fitted single-factor market model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketModel {
    /// Intercept
    pub alpha: f64,
    /// Market sensitivity
    pub beta: f64,
    /// Estimation sample size
    pub n_obs: usize,
}

impl MarketModel {
    /// Fit over the estimation sample, return rows `[0, estimation_end)`.
    ///
    /// # Errors
    ///
    /// `InsufficientEstimationWindow` when the sample is shorter than
    /// `min_estimation_rows`, `DegenerateMarket` when the market-return
    /// column has no variance over the sample.
    pub fn fit(
        returns: &AlignedReturns,
        estimation_end: usize,
        min_estimation_rows: usize,
    ) -> Result<Self> {
        let end = estimation_end.min(returns.len());
        let market = &returns.market_returns()[..end];
        let stock = &returns.stock_returns()[..end];

        if market.len() < min_estimation_rows {
            return Err(EventStudyError::InsufficientEstimationWindow {
                actual: market.len(),
                required: min_estimation_rows,
            });
        }

        let fit = SimpleOls::fit(ArrayView1::from(market), ArrayView1::from(stock)).map_err(
            |err| match err {
                StatsError::DegenerateRegressor(_) => EventStudyError::DegenerateMarket,
                StatsError::InsufficientData { .. } | StatsError::DimensionMismatch { .. } => {
                    EventStudyError::InsufficientEstimationWindow {
                        actual: end,
                        required: min_estimation_rows,
                    }
                }
            },
        )?;

        Ok(Self {
            alpha: fit.alpha,
            beta: fit.beta,
            n_obs: fit.n_obs,
        })
    }

    /// Expected stock return for a market return under the fitted model.
    pub const fn expected(&self, market_return: f64) -> f64 {
        self.alpha + self.beta * market_return
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PriceSeries;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    /// Price paths with a known linear return relationship and no noise.
    fn linear_market(n: usize, alpha: f64, beta: f64) -> (PriceSeries, PriceSeries) {
        let start: NaiveDate = "2023-01-02".parse().unwrap();
        let dates: Vec<NaiveDate> = start.iter_days().take(n).collect();

        let mut stock_price = 100.0;
        let mut market_price = 4000.0;
        let mut stock_rows = vec![(dates[0], stock_price)];
        let mut market_rows = vec![(dates[0], market_price)];
        for (i, date) in dates.iter().enumerate().skip(1) {
            let market_return = ((i % 9) as f64 - 4.0) * 0.003;
            let stock_return = alpha + beta * market_return;
            market_price *= 1.0 + market_return;
            stock_price *= 1.0 + stock_return;
            stock_rows.push((*date, stock_price));
            market_rows.push((*date, market_price));
        }

        (
            PriceSeries::from_observations("AAPL", stock_rows),
            PriceSeries::from_observations("^GSPC", market_rows),
        )
    }

    #[test]
    fn test_recovers_known_coefficients() {
        let (stock, market) = linear_market(120, 0.002, 1.1);
        let returns = AlignedReturns::from_prices(&stock, &market, 30).unwrap();

        let model = MarketModel::fit(&returns, 80, 20).unwrap();

        assert_relative_eq!(model.alpha, 0.002, epsilon = 1e-10);
        assert_relative_eq!(model.beta, 1.1, epsilon = 1e-10);
        assert_eq!(model.n_obs, 80);
    }

    #[test]
    fn test_no_look_ahead() {
        let (stock, market) = linear_market(120, 0.002, 1.1);
        let returns = AlignedReturns::from_prices(&stock, &market, 30).unwrap();
        let baseline = MarketModel::fit(&returns, 60, 20).unwrap();

        // Perturb prices well past the estimation bound; returns at or
        // after row 60 change, earlier rows do not.
        let mut perturbed_rows: Vec<(NaiveDate, f64)> = stock
            .dates()
            .iter()
            .copied()
            .zip(stock.prices().iter().copied())
            .collect();
        for row in perturbed_rows.iter_mut().skip(70) {
            row.1 *= 1.5;
        }
        let perturbed = PriceSeries::from_observations("AAPL", perturbed_rows);
        let perturbed_returns = AlignedReturns::from_prices(&perturbed, &market, 30).unwrap();
        let refit = MarketModel::fit(&perturbed_returns, 60, 20).unwrap();

        assert!((refit.alpha - baseline.alpha).abs() < 1e-15);
        assert!((refit.beta - baseline.beta).abs() < 1e-15);
    }

    #[test]
    fn test_insufficient_estimation_window() {
        let (stock, market) = linear_market(120, 0.002, 1.1);
        let returns = AlignedReturns::from_prices(&stock, &market, 30).unwrap();

        let err = MarketModel::fit(&returns, 12, 20).unwrap_err();
        assert_eq!(
            err,
            EventStudyError::InsufficientEstimationWindow {
                actual: 12,
                required: 20
            }
        );
    }

    #[test]
    fn test_constant_market_is_degenerate() {
        let start: NaiveDate = "2023-01-02".parse().unwrap();
        let dates: Vec<NaiveDate> = start.iter_days().take(60).collect();
        let stock_rows: Vec<(NaiveDate, f64)> = dates
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, 100.0 + i as f64))
            .collect();
        // A flat market price path has identically zero returns.
        let market_rows: Vec<(NaiveDate, f64)> = dates.iter().map(|d| (*d, 4000.0)).collect();

        let stock = PriceSeries::from_observations("AAPL", stock_rows);
        let market = PriceSeries::from_observations("^GSPC", market_rows);
        let returns = AlignedReturns::from_prices(&stock, &market, 30).unwrap();

        let err = MarketModel::fit(&returns, 40, 20).unwrap_err();
        assert_eq!(err, EventStudyError::DegenerateMarket);
    }
}
