//! Return alignment across stock and market price series.

use crate::error::{EventStudyError, Result};
use crate::market_model::MarketModel;
use crate::series::PriceSeries;
use chrono::NaiveDate;

/// Stock and market returns on a shared trading-date axis.
///
/// A row exists only for dates where both input series carry a price;
/// unpaired dates are dropped, never interpolated, because the market-model
/// regression cannot tolerate unpaired observations. Returns are simple
/// period-over-period percentage changes, so the first aligned price row
/// has no return and is dropped. Once a market model is applied, parallel
/// `expected` and `abnormal` columns cover every row.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    dates: Vec<NaiveDate>,
    stock: Vec<f64>,
    market: Vec<f64>,
    expected: Vec<f64>,
    abnormal: Vec<f64>,
}

impl AlignedReturns {
    /// Align two price series on their common trading dates and compute
    /// simple returns.
    ///
    /// # Errors
    ///
    /// `InsufficientPriceData` when either series is empty or fewer than
    /// `min_aligned_rows` price rows survive the alignment.
    pub fn from_prices(
        stock: &PriceSeries,
        market: &PriceSeries,
        min_aligned_rows: usize,
    ) -> Result<Self> {
        if stock.is_empty() || market.is_empty() {
            return Err(EventStudyError::InsufficientPriceData {
                aligned: 0,
                required: min_aligned_rows,
            });
        }

        // Intersect the two sorted date axes.
        let mut dates = Vec::new();
        let mut stock_prices = Vec::new();
        let mut market_prices = Vec::new();
        let (mut i, mut j) = (0, 0);
        let (sd, md) = (stock.dates(), market.dates());
        while i < sd.len() && j < md.len() {
            match sd[i].cmp(&md[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dates.push(sd[i]);
                    stock_prices.push(stock.prices()[i]);
                    market_prices.push(market.prices()[j]);
                    i += 1;
                    j += 1;
                }
            }
        }

        if dates.len() < min_aligned_rows {
            return Err(EventStudyError::InsufficientPriceData {
                aligned: dates.len(),
                required: min_aligned_rows,
            });
        }

        let stock_returns = pct_change(&stock_prices);
        let market_returns = pct_change(&market_prices);
        dates.remove(0);

        Ok(Self {
            dates,
            stock: stock_returns,
            market: market_returns,
            expected: Vec::new(),
            abnormal: Vec::new(),
        })
    }

    /// Number of return rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table holds no return rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Trading dates of the return rows, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Stock returns, parallel to [`Self::dates`].
    pub fn stock_returns(&self) -> &[f64] {
        &self.stock
    }

    /// Market returns, parallel to [`Self::dates`].
    pub fn market_returns(&self) -> &[f64] {
        &self.market
    }

    /// Model-expected stock returns; empty until a model is applied.
    pub fn expected(&self) -> &[f64] {
        &self.expected
    }

    /// Abnormal returns (actual minus expected); empty until a model is
    /// applied.
    pub fn abnormal(&self) -> &[f64] {
        &self.abnormal
    }

    /// Score every row of the table with a fitted market model.
    ///
    /// Fills the `expected` and `abnormal` columns for the full series,
    /// estimation and post-event rows alike.
    pub fn apply_model(&mut self, model: &MarketModel) {
        self.expected = self.market.iter().map(|&m| model.expected(m)).collect();
        self.abnormal = self
            .stock
            .iter()
            .zip(self.expected.iter())
            .map(|(&actual, &expected)| actual - expected)
            .collect();
    }
}

/// Simple period-over-period returns; one element shorter than the input.
fn pct_change(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn series(symbol: &str, rows: &[(&str, f64)]) -> PriceSeries {
        PriceSeries::from_observations(
            symbol,
            rows.iter().map(|(d, p)| (date(d), *p)).collect(),
        )
    }

    #[test]
    fn test_alignment_keeps_only_shared_dates() {
        let stock = series(
            "AAPL",
            &[
                ("2024-01-02", 100.0),
                ("2024-01-03", 101.0),
                ("2024-01-05", 102.0),
                ("2024-01-08", 103.0),
            ],
        );
        let market = series(
            "^GSPC",
            &[
                ("2024-01-02", 4700.0),
                ("2024-01-04", 4705.0),
                ("2024-01-05", 4710.0),
                ("2024-01-08", 4720.0),
            ],
        );

        let aligned = AlignedReturns::from_prices(&stock, &market, 1).unwrap();

        // Shared price dates: 01-02, 01-05, 01-08; first return row dropped.
        assert_eq!(aligned.dates(), &[date("2024-01-05"), date("2024-01-08")]);
        assert_relative_eq!(aligned.stock_returns()[0], 102.0 / 100.0 - 1.0);
        assert_relative_eq!(aligned.market_returns()[1], 4720.0 / 4710.0 - 1.0);
    }

    #[test]
    fn test_aligned_never_exceeds_either_input() {
        let stock = series(
            "AAPL",
            &[("2024-01-02", 100.0), ("2024-01-03", 101.0), ("2024-01-04", 99.5)],
        );
        let market = series("^GSPC", &[("2024-01-03", 4700.0), ("2024-01-04", 4710.0)]);

        let aligned = AlignedReturns::from_prices(&stock, &market, 1).unwrap();
        assert!(aligned.len() <= stock.len().min(market.len()));
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        let stock = PriceSeries::empty("AAPL");
        let market = series("^GSPC", &[("2024-01-02", 4700.0)]);

        let err = AlignedReturns::from_prices(&stock, &market, 30).unwrap_err();
        assert_eq!(
            err,
            EventStudyError::InsufficientPriceData {
                aligned: 0,
                required: 30
            }
        );
    }

    #[test]
    fn test_too_few_aligned_rows() {
        let stock = series("AAPL", &[("2024-01-02", 100.0), ("2024-01-03", 101.0)]);
        let market = series("^GSPC", &[("2024-01-02", 4700.0), ("2024-01-03", 4705.0)]);

        let err = AlignedReturns::from_prices(&stock, &market, 30).unwrap_err();
        assert_eq!(
            err,
            EventStudyError::InsufficientPriceData {
                aligned: 2,
                required: 30
            }
        );
    }

    #[test]
    fn test_apply_model_scores_every_row() {
        let stock = series(
            "AAPL",
            &[
                ("2024-01-02", 100.0),
                ("2024-01-03", 102.0),
                ("2024-01-04", 101.0),
            ],
        );
        let market = series(
            "^GSPC",
            &[
                ("2024-01-02", 4700.0),
                ("2024-01-03", 4747.0),
                ("2024-01-04", 4699.5),
            ],
        );

        let mut aligned = AlignedReturns::from_prices(&stock, &market, 1).unwrap();
        assert!(aligned.abnormal().is_empty());

        let model = MarketModel {
            alpha: 0.0,
            beta: 1.0,
            n_obs: 2,
        };
        aligned.apply_model(&model);

        assert_eq!(aligned.expected().len(), aligned.len());
        assert_eq!(aligned.abnormal().len(), aligned.len());
        for idx in 0..aligned.len() {
            assert_relative_eq!(
                aligned.abnormal()[idx],
                aligned.stock_returns()[idx] - aligned.market_returns()[idx],
                epsilon = 1e-12
            );
        }
    }
}
