//! Event location on the aligned trading-date axis.

use crate::error::{EventStudyError, Result};
use chrono::NaiveDate;

/// Row positions anchoring an event within an aligned return series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindows {
    /// Index of the first return row dated on or after the event ("day 0")
    pub event_row: usize,
    /// Exclusive upper bound of the pre-event estimation sample
    pub estimation_end: usize,
}

/// Locate the event reference row: the earliest date `>= event_date`.
///
/// `dates` must be strictly ascending, so the smallest non-negative date
/// difference is exactly the partition point. The estimation sample is rows
/// `[0, event_row - 1)`; the row immediately before the event row is
/// excluded from estimation.
///
/// # Errors
///
/// `NoTradingDayFound` when every date precedes the event,
/// `NoPreEventWindow` when no estimation rows would remain.
pub fn locate_event(dates: &[NaiveDate], event_date: NaiveDate) -> Result<EventWindows> {
    let event_row = dates.partition_point(|d| *d < event_date);
    if event_row == dates.len() {
        return Err(EventStudyError::NoTradingDayFound(event_date));
    }
    if event_row < 2 {
        return Err(EventStudyError::NoPreEventWindow(event_date));
    }

    Ok(EventWindows {
        event_row,
        estimation_end: event_row - 1,
    })
}
