//! Adjusted-close price series.

use chrono::NaiveDate;

/// An adjusted-close price history for one symbol.
///
/// Dates are strictly increasing with no duplicates. Observations with a
/// non-finite or non-positive price are discarded at construction, so every
/// stored price is usable for return computation. An empty series is the
/// explicit "no data" value a price accessor returns when the provider has
/// nothing for the requested range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from (date, adjusted-close) observations.
    ///
    /// Observations are sorted by date; on duplicate dates the last
    /// observation wins.
    pub fn from_observations(symbol: impl Into<String>, mut rows: Vec<(NaiveDate, f64)>) -> Self {
        rows.retain(|(_, price)| price.is_finite() && *price > 0.0);
        rows.sort_by_key(|(date, _)| *date);

        let mut dates: Vec<NaiveDate> = Vec::with_capacity(rows.len());
        let mut prices: Vec<f64> = Vec::with_capacity(rows.len());
        for (date, price) in rows {
            if dates.last() == Some(&date) {
                if let Some(last) = prices.last_mut() {
                    *last = price;
                }
            } else {
                dates.push(date);
                prices.push(price);
            }
        }

        Self {
            symbol: symbol.into(),
            dates,
            prices,
        }
    }

    /// Explicit empty "no data" series.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            dates: Vec::new(),
            prices: Vec::new(),
        }
    }

    /// Symbol this history belongs to.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series carries no observations.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Trading dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Adjusted-close prices, parallel to [`Self::dates`].
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Price on an exact date, if observed.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|idx| self.prices[idx])
    }
}
