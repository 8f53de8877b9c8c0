//! Earnings-event normalization.
//!
//! Converts provider-shaped earnings records into the canonical form the
//! engine consumes. All schema tolerance lives here: the rest of the crate
//! only ever sees a [`CanonicalEvent`].

use crate::error::{EventStudyError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// An earnings event as delivered by a calendar provider.
///
/// The date is the provider's raw string. The surprise may arrive directly
/// as a fraction, or as a percentage needing division by 100. Fields the
/// provider does not supply stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Raw event date string
    pub date: String,
    /// Surprise as a fraction (e.g. 0.0234)
    pub surprise: Option<f64>,
    /// Surprise as a percentage (e.g. 2.34)
    pub surprise_pct: Option<f64>,
    /// Consensus EPS estimate
    pub eps_estimate: Option<f64>,
    /// Reported EPS
    pub reported_eps: Option<f64>,
}

/// A validated earnings event ready for the event-study engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Ticker the event belongs to
    pub ticker: String,
    /// Timezone-naive announcement date
    pub event_date: NaiveDate,
    /// Earnings surprise as a fraction, never a raw percentage
    pub surprise: f64,
    /// Consensus EPS estimate, when reported
    pub eps_estimate: Option<f64>,
    /// Reported EPS, when reported
    pub reported_eps: Option<f64>,
}

/// Normalize a raw provider event into a canonical one.
///
/// The event date becomes a timezone-naive calendar date; a trailing UTC
/// offset is stripped without altering the represented local date. A finite
/// direct `surprise` takes precedence over `surprise_pct / 100`; with
/// neither, the event is invalid.
///
/// # Errors
///
/// `DateParse` when the date string matches no accepted format,
/// `MissingSurprise` when no finite surprise can be resolved.
pub fn normalize_event(ticker: &str, raw: &RawEvent) -> Result<CanonicalEvent> {
    let event_date = parse_event_date(&raw.date)?;

    let surprise = match (finite(raw.surprise), finite(raw.surprise_pct)) {
        (Some(fraction), _) => fraction,
        (None, Some(pct)) => pct / 100.0,
        (None, None) => {
            return Err(EventStudyError::MissingSurprise {
                ticker: ticker.to_string(),
                date: raw.date.clone(),
            });
        }
    };

    Ok(CanonicalEvent {
        ticker: ticker.to_string(),
        event_date,
        surprise,
        eps_estimate: finite(raw.eps_estimate),
        reported_eps: finite(raw.reported_eps),
    })
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn parse_event_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();

    // Offset-carrying datetimes keep their local calendar date.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }

    Err(EventStudyError::DateParse(raw.to_string()))
}
