//! Cumulative abnormal returns over post-event horizons.

use crate::error::{EventStudyError, Result};
use crate::event::CanonicalEvent;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One CAR observation for an (event, horizon) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    /// Ticker the event belongs to
    pub ticker: String,
    /// Announcement date of the event
    pub event_date: NaiveDate,
    /// Horizon in trading days
    pub window: u32,
    /// Cumulative abnormal return over the realized window
    pub car: f64,
    /// Earnings surprise as a fraction
    pub surprise: f64,
    /// Consensus EPS estimate, when reported
    pub eps_estimate: Option<f64>,
    /// Reported EPS, when reported
    pub reported_eps: Option<f64>,
}

impl CarRecord {
    /// Build the record for one (event, horizon) observation.
    pub fn new(event: &CanonicalEvent, window: u32, car: f64) -> Self {
        Self {
            ticker: event.ticker.clone(),
            event_date: event.event_date,
            window,
            car,
            surprise: event.surprise,
            eps_estimate: event.eps_estimate,
            reported_eps: event.reported_eps,
        }
    }
}

/// Sum abnormal returns over the post-event window for one horizon.
///
/// The window covers return rows `[event_row + 1, min(event_row + 1 + w, n))`:
/// the day after the event through `w` trading days later, clipped to the
/// available data. The event row itself is never included. A realized
/// window shorter than `coverage * w` rows is rejected rather than padded.
///
/// # Errors
///
/// `InsufficientPostEventWindow` when the coverage policy rejects the
/// realized window.
pub fn car_over_window(
    abnormal: &[f64],
    event_row: usize,
    window: u32,
    coverage: f64,
) -> Result<f64> {
    let start = (event_row + 1).min(abnormal.len());
    let end = start.saturating_add(window as usize).min(abnormal.len());
    let realized = end - start;

    if (realized as f64) < f64::from(window) * coverage {
        return Err(EventStudyError::InsufficientPostEventWindow {
            window,
            actual: realized,
            required: (f64::from(window) * coverage).ceil() as usize,
        });
    }

    Ok(abnormal[start..end].iter().sum())
}
