//! Earnings-history fetching from Yahoo Finance.
//!
//! Yahoo's `quoteSummary` endpoint reports quarterly earnings history as
//! `{raw, fmt}` value pairs with inconsistently-populated fields. All of
//! that schema tolerance is absorbed here: consumers only ever see
//! [`EarningsRow`] records with plain optional floats and a date string.

use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// One quarterly earnings event as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct EarningsRow {
    /// Event date string (`YYYY-MM-DD`)
    pub date: String,
    /// Consensus EPS estimate
    pub eps_estimate: Option<f64>,
    /// Reported EPS
    pub eps_actual: Option<f64>,
    /// Surprise as a fraction, derived from the EPS fields when both are
    /// present and the estimate is non-zero
    pub surprise: Option<f64>,
    /// Surprise in percent points, when the provider computes one
    pub surprise_pct: Option<f64>,
}

/// Yahoo Finance earnings-history provider.
pub struct YahooEarningsProvider {
    client: reqwest::Client,
    base_url: String,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooEarningsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooEarningsProvider")
            .field("base_url", &self.base_url)
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooEarningsProvider {
    /// Create a new provider with default rate limiting (1 req/sec).
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(1000))
    }

    /// Create a new provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit_delay,
        }
    }

    /// Fetch the quarterly earnings history for a symbol.
    ///
    /// Future-dated entries are excluded, so only announced results reach
    /// the caller. An empty vector is the explicit "no data" result when
    /// Yahoo has no earnings history for the symbol.
    pub async fn fetch_earnings(&self, symbol: &str) -> Result<Vec<EarningsRow>> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=earningsHistory",
            self.base_url, symbol
        );
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let rows = parse_earnings_history(&body, Utc::now().date_naive())?;

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        Ok(rows)
    }
}

impl Default for YahooEarningsProvider {
    fn default() -> Self {
        Self::new()
    }
}

// quoteSummary response shape, reduced to the fields we read.

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "earningsHistory")]
    earnings_history: Option<EarningsHistory>,
}

#[derive(Debug, Deserialize)]
struct EarningsHistory {
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    #[serde(rename = "epsActual")]
    eps_actual: Option<WrappedValue>,
    #[serde(rename = "epsEstimate")]
    eps_estimate: Option<WrappedValue>,
    #[serde(rename = "surprisePercent")]
    surprise_percent: Option<WrappedValue>,
    quarter: Option<WrappedDate>,
}

#[derive(Debug, Deserialize)]
struct WrappedValue {
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WrappedDate {
    raw: Option<i64>,
    fmt: Option<String>,
}

/// Parse a `quoteSummary` earnings-history response body.
///
/// Entries without a resolvable date, and entries dated after `today`,
/// are dropped. The result is sorted by date descending (most recent
/// first). Missing numeric fields stay `None`, never zero.
fn parse_earnings_history(body: &str, today: NaiveDate) -> Result<Vec<EarningsRow>> {
    let envelope: QuoteSummaryEnvelope = serde_json::from_str(body)?;

    let history = envelope
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .find_map(|r| r.earnings_history)
        .map(|h| h.history)
        .unwrap_or_default();

    let mut rows: Vec<EarningsRow> = history
        .into_iter()
        .filter_map(|entry| {
            let date = entry_date(entry.quarter.as_ref())?;
            if date > today {
                return None;
            }

            let eps_actual = entry.eps_actual.and_then(|v| v.raw).filter(|v| v.is_finite());
            let eps_estimate = entry
                .eps_estimate
                .and_then(|v| v.raw)
                .filter(|v| v.is_finite());
            let surprise = match (eps_actual, eps_estimate) {
                (Some(actual), Some(estimate)) if estimate != 0.0 => {
                    Some((actual - estimate) / estimate.abs())
                }
                _ => None,
            };
            // Yahoo reports surprisePercent raw as a fraction (fmt carries
            // the percent rendering); scale to percent points.
            let surprise_pct = entry
                .surprise_percent
                .and_then(|v| v.raw)
                .filter(|v| v.is_finite())
                .map(|v| v * 100.0);

            Some(EarningsRow {
                date: date.to_string(),
                eps_estimate,
                eps_actual,
                surprise,
                surprise_pct,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(rows)
}

fn entry_date(quarter: Option<&WrappedDate>) -> Option<NaiveDate> {
    let quarter = quarter?;
    if let Some(fmt) = &quarter.fmt
        && let Ok(date) = fmt.parse::<NaiveDate>()
    {
        return Some(date);
    }
    quarter
        .raw
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.date_naive())
}
