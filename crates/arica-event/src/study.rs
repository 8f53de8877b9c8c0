//! Per-event event-study driver.
//!
//! Glues the pipeline together for a single event: align returns, locate
//! the event row, fit the market model, score abnormal returns, and
//! aggregate CARs over every configured horizon. Failure isolation follows
//! the window structure: a horizon that fails its sufficiency check is
//! skipped on its own, while alignment, location, and fit failures fail
//! the whole event.

use crate::car::{CarRecord, car_over_window};
use crate::error::{EventStudyError, Result};
use crate::event::CanonicalEvent;
use crate::locate::locate_event;
use crate::market_model::MarketModel;
use crate::returns::AlignedReturns;
use crate::series::PriceSeries;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Data-sufficiency policy for the event-study engine.
///
/// The defaults reproduce the thresholds of the reference study; none of
/// them is claimed to be statistically optimal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPolicy {
    /// Minimum aligned price rows before returns are computed
    pub min_aligned_rows: usize,
    /// Minimum rows in the pre-event estimation sample
    pub min_estimation_rows: usize,
    /// Fraction of a horizon the realized post-event window must cover
    pub window_coverage: f64,
    /// Calendar days of history fetched before the event date
    pub estimation_lookback_days: i64,
    /// Calendar days fetched past the longest horizon
    pub post_event_pad_days: i64,
}

impl Default for StudyPolicy {
    fn default() -> Self {
        Self {
            min_aligned_rows: 30,
            min_estimation_rows: 20,
            window_coverage: 0.7,
            estimation_lookback_days: 120,
            post_event_pad_days: 5,
        }
    }
}

/// CAR records and per-horizon skips produced for one event.
#[derive(Debug, Clone, Default)]
pub struct EventStudyOutcome {
    /// One record per horizon that passed every sufficiency check
    pub records: Vec<CarRecord>,
    /// Horizons skipped, with the reason
    pub skips: Vec<(u32, EventStudyError)>,
}

/// Run the full abnormal-return computation for one event.
///
/// # Errors
///
/// Any alignment, location, or model-fit failure fails the event as a
/// whole; per-horizon sufficiency failures land in
/// [`EventStudyOutcome::skips`] instead.
pub fn run_event(
    stock: &PriceSeries,
    market: &PriceSeries,
    event: &CanonicalEvent,
    windows: &[u32],
    policy: &StudyPolicy,
) -> Result<EventStudyOutcome> {
    let mut returns = AlignedReturns::from_prices(stock, market, policy.min_aligned_rows)?;
    let location = locate_event(returns.dates(), event.event_date)?;
    let model = MarketModel::fit(&returns, location.estimation_end, policy.min_estimation_rows)?;
    returns.apply_model(&model);

    let mut outcome = EventStudyOutcome::default();
    for &window in windows {
        match car_over_window(
            returns.abnormal(),
            location.event_row,
            window,
            policy.window_coverage,
        ) {
            Ok(car) => outcome.records.push(CarRecord::new(event, window, car)),
            Err(err) => outcome.skips.push((window, err)),
        }
    }

    Ok(outcome)
}

/// Price-history date range needed to study an event.
///
/// Covers the estimation lookback before the event and the longest horizon
/// (plus pad) after it.
pub fn fetch_range(
    event_date: NaiveDate,
    max_window: u32,
    policy: &StudyPolicy,
) -> (NaiveDate, NaiveDate) {
    let start = event_date - Duration::days(policy.estimation_lookback_days);
    let end = event_date + Duration::days(i64::from(max_window) + policy.post_event_pad_days);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{RawEvent, normalize_event};
    use approx::assert_abs_diff_eq;

    /// 200 consecutive trading days with `stock = 0.002 + 1.1 * market`
    /// and zero noise, starting 2023-01-02.
    fn synthetic_pair() -> (PriceSeries, PriceSeries, Vec<NaiveDate>) {
        let start: NaiveDate = "2023-01-02".parse().unwrap();
        let dates: Vec<NaiveDate> = start.iter_days().take(200).collect();

        let mut stock_price = 50.0;
        let mut market_price = 4000.0;
        let mut stock_rows = vec![(dates[0], stock_price)];
        let mut market_rows = vec![(dates[0], market_price)];
        for (i, date) in dates.iter().enumerate().skip(1) {
            let market_return = ((i % 11) as f64 - 5.0) * 0.002;
            let stock_return = 0.002 + 1.1 * market_return;
            market_price *= 1.0 + market_return;
            stock_price *= 1.0 + stock_return;
            stock_rows.push((*date, stock_price));
            market_rows.push((*date, market_price));
        }

        (
            PriceSeries::from_observations("AAPL", stock_rows),
            PriceSeries::from_observations("^GSPC", market_rows),
            dates,
        )
    }

    fn event_at(dates: &[NaiveDate], idx: usize) -> CanonicalEvent {
        CanonicalEvent {
            ticker: "AAPL".to_string(),
            event_date: dates[idx],
            surprise: 0.0234,
            eps_estimate: Some(1.5),
            reported_eps: Some(1.54),
        }
    }

    #[test]
    fn test_exact_fit_has_zero_abnormal_and_zero_car() {
        let (stock, market, dates) = synthetic_pair();
        let event = event_at(&dates, 81);
        let policy = StudyPolicy::default();

        let mut returns = AlignedReturns::from_prices(&stock, &market, 30).unwrap();
        let location = locate_event(returns.dates(), event.event_date).unwrap();
        let model =
            MarketModel::fit(&returns, location.estimation_end, policy.min_estimation_rows)
                .unwrap();
        returns.apply_model(&model);

        // With zero noise the estimation window is fit exactly.
        for &ar in &returns.abnormal()[..location.estimation_end] {
            assert_abs_diff_eq!(ar, 0.0, epsilon = 1e-12);
        }

        let outcome = run_event(&stock, &market, &event, &[5], &policy).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].window, 5);
        assert_abs_diff_eq!(outcome.records[0].car, 0.0, epsilon = 1e-12);
        assert_eq!(outcome.records[0].surprise, 0.0234);
    }

    #[test]
    fn test_all_windows_produce_records_when_data_suffices() {
        let (stock, market, dates) = synthetic_pair();
        let event = event_at(&dates, 100);

        let outcome = run_event(
            &stock,
            &market,
            &event,
            &[1, 2, 5, 10, 30],
            &StudyPolicy::default(),
        )
        .unwrap();

        assert_eq!(outcome.records.len(), 5);
        assert!(outcome.skips.is_empty());
        let windows: Vec<u32> = outcome.records.iter().map(|r| r.window).collect();
        assert_eq!(windows, vec![1, 2, 5, 10, 30]);
    }

    #[test]
    fn test_long_horizon_skipped_short_horizons_survive() {
        let (stock, market, dates) = synthetic_pair();
        // Event near the end of the series: the 30-day window cannot reach
        // coverage, the short ones can.
        let event = event_at(&dates, 193);

        let outcome = run_event(
            &stock,
            &market,
            &event,
            &[1, 2, 5, 30],
            &StudyPolicy::default(),
        )
        .unwrap();

        let recorded: Vec<u32> = outcome.records.iter().map(|r| r.window).collect();
        assert_eq!(recorded, vec![1, 2, 5]);
        assert_eq!(outcome.skips.len(), 1);
        assert_eq!(outcome.skips[0].0, 30);
        assert!(matches!(
            outcome.skips[0].1,
            EventStudyError::InsufficientPostEventWindow { .. }
        ));
    }

    #[test]
    fn test_event_before_any_history_fails_event() {
        let (stock, market, dates) = synthetic_pair();
        let event = event_at(&dates, 0);

        let err = run_event(&stock, &market, &event, &[5], &StudyPolicy::default()).unwrap_err();
        assert!(matches!(err, EventStudyError::NoPreEventWindow(_)));
    }

    #[test]
    fn test_bad_event_isolated_from_batch() {
        let (stock, market, dates) = synthetic_pair();
        let raw_events = vec![
            RawEvent {
                date: dates[80].to_string(),
                surprise: Some(0.01),
                ..RawEvent::default()
            },
            RawEvent {
                date: "not-a-date".to_string(),
                surprise: Some(0.02),
                ..RawEvent::default()
            },
            RawEvent {
                date: dates[120].to_string(),
                surprise: Some(0.03),
                ..RawEvent::default()
            },
        ];

        let mut records = Vec::new();
        let mut skipped_events = 0;
        for raw in &raw_events {
            match normalize_event("AAPL", raw) {
                Ok(event) => {
                    let outcome =
                        run_event(&stock, &market, &event, &[1, 5], &StudyPolicy::default())
                            .unwrap();
                    records.extend(outcome.records);
                }
                Err(_) => skipped_events += 1,
            }
        }

        // The unparsable middle event is skipped; its neighbors are intact.
        assert_eq!(skipped_events, 1);
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.car.abs() < 1e-12));
        assert_eq!(records[0].surprise, 0.01);
        assert_eq!(records[2].surprise, 0.03);
    }

    #[test]
    fn test_fetch_range_spans_lookback_and_horizon() {
        let event_date: NaiveDate = "2024-05-02".parse().unwrap();
        let (start, end) = fetch_range(event_date, 30, &StudyPolicy::default());

        assert_eq!(start, event_date - Duration::days(120));
        assert_eq!(end, event_date + Duration::days(35));
    }
}
