//! Study pipeline: per-ticker orchestration of data fetching and the
//! event-study engine.
//!
//! The loop structure mirrors the failure-isolation contract: a bad event
//! skips that event, a bad (event, horizon) pair skips that pair, and only
//! a failing earnings fetch fails the ticker (which the caller may still
//! choose to skip).

use arica::StudyConfig;
use arica_data::cache::SqliteCache;
use arica_data::error::DataError;
use arica_data::yahoo::earnings::EarningsRow;
use arica_data::yahoo::{YahooEarningsProvider, YahooQuoteProvider};
use arica_event::{CarRecord, PriceSeries, RawEvent, fetch_range, normalize_event, run_event};
use chrono::{Duration, NaiveDate, NaiveTime};
use indicatif::ProgressBar;
use polars::prelude::*;

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    /// Data fetch error.
    #[error("Data fetch error: {0}")]
    Fetch(#[from] DataError),
    /// Polars DataFrame error.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Configuration for data fetching.
#[derive(Debug, Clone)]
pub(crate) struct FetchConfig {
    /// Whether to use the cache.
    pub use_cache: bool,
    /// Whether to force refresh (ignore cache).
    pub force_refresh: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            force_refresh: false,
        }
    }
}

/// Outcome of processing one ticker.
#[derive(Debug, Default)]
pub(crate) struct TickerOutcome {
    /// CAR records across all events and horizons.
    pub records: Vec<CarRecord>,
    /// Events that produced at least one record.
    pub events_studied: usize,
    /// Events skipped for any reason.
    pub events_skipped: usize,
}

/// Map a provider earnings row onto the engine's raw-event shape.
pub(crate) fn to_raw_event(row: &EarningsRow) -> RawEvent {
    RawEvent {
        date: row.date.clone(),
        surprise: row.surprise,
        surprise_pct: row.surprise_pct,
        eps_estimate: row.eps_estimate,
        reported_eps: row.eps_actual,
    }
}

/// Extract a price series from a quote DataFrame.
///
/// An empty frame becomes an empty series, the explicit "no data" value.
pub(crate) fn to_price_series(symbol: &str, df: &DataFrame) -> Result<PriceSeries, PipelineError> {
    if df.height() == 0 {
        return Ok(PriceSeries::empty(symbol));
    }

    let dates = df.column("date")?.date()?;
    let closes = df.column("adjusted_close")?.f64()?;

    // Date columns store days since the Unix epoch.
    let epoch = NaiveDate::default();
    let mut rows = Vec::with_capacity(df.height());
    for (days, price) in dates.into_iter().zip(closes) {
        if let (Some(days), Some(price)) = (days, price) {
            rows.push((epoch + Duration::days(i64::from(days)), price));
        }
    }

    Ok(PriceSeries::from_observations(symbol, rows))
}

/// Fetch a price series for a date range, cache-first.
pub(crate) async fn fetch_price_series(
    provider: &YahooQuoteProvider,
    cache: Option<&SqliteCache>,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    force_refresh: bool,
) -> Result<PriceSeries, PipelineError> {
    if let Some(cache) = cache
        && !force_refresh
        && cache.has_quotes(symbol, start, end).unwrap_or(false)
        && let Ok(df) = cache.get_quotes(symbol, start, end)
    {
        return to_price_series(symbol, &df);
    }

    let start_dt = start.and_time(NaiveTime::MIN).and_utc();
    let end_dt = (end + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();
    let df = provider.fetch_adjusted_close(symbol, start_dt, end_dt).await?;

    if let Some(cache) = cache
        && df.height() > 0
        && let Err(e) = cache.put_quotes(&df)
    {
        eprintln!("Warning: Failed to cache quotes for {}: {}", symbol, e);
    }

    to_price_series(symbol, &df)
}

/// Run the event study for every earnings event of one ticker.
///
/// # Errors
///
/// Only a failing earnings fetch errors out; per-event and per-horizon
/// problems are reported as warnings and skipped.
pub(crate) async fn process_ticker(
    quotes: &YahooQuoteProvider,
    earnings: &YahooEarningsProvider,
    cache: Option<&SqliteCache>,
    ticker: &str,
    config: &StudyConfig,
    fetch: &FetchConfig,
    progress: Option<&ProgressBar>,
) -> Result<TickerOutcome, PipelineError> {
    let rows = earnings.fetch_earnings(ticker).await?;
    if rows.is_empty() {
        warn(progress, &format!("No earnings data found for {ticker}"));
        return Ok(TickerOutcome::default());
    }

    let mut outcome = TickerOutcome::default();
    for row in &rows {
        let event = match normalize_event(ticker, &to_raw_event(row)) {
            Ok(event) => event,
            Err(err) => {
                warn(progress, &format!("{ticker}: skipping event: {err}"));
                outcome.events_skipped += 1;
                continue;
            }
        };

        let (start, end) = fetch_range(event.event_date, config.max_window(), &config.policy);

        let stock = match fetch_price_series(
            quotes,
            cache,
            ticker,
            start,
            end,
            fetch.force_refresh,
        )
        .await
        {
            Ok(series) => series,
            Err(err) => {
                warn(
                    progress,
                    &format!("{ticker} {}: price fetch failed: {err}", event.event_date),
                );
                outcome.events_skipped += 1;
                continue;
            }
        };

        let market = match fetch_price_series(
            quotes,
            cache,
            &config.market_ticker,
            start,
            end,
            fetch.force_refresh,
        )
        .await
        {
            Ok(series) => series,
            Err(err) => {
                warn(
                    progress,
                    &format!(
                        "{} {}: benchmark fetch failed: {err}",
                        config.market_ticker, event.event_date
                    ),
                );
                outcome.events_skipped += 1;
                continue;
            }
        };

        match run_event(&stock, &market, &event, &config.car_windows, &config.policy) {
            Ok(study) => {
                for (_, err) in &study.skips {
                    warn(progress, &format!("{ticker} {}: {err}", event.event_date));
                }
                if study.records.is_empty() {
                    outcome.events_skipped += 1;
                } else {
                    outcome.events_studied += 1;
                }
                outcome.records.extend(study.records);
            }
            Err(err) => {
                warn(progress, &format!("{ticker} {}: {err}", event.event_date));
                outcome.events_skipped += 1;
            }
        }
    }

    Ok(outcome)
}

fn warn(progress: Option<&ProgressBar>, message: &str) {
    progress.map_or_else(
        || eprintln!("{message}"),
        |pb| pb.suspend(|| eprintln!("{message}")),
    );
}
