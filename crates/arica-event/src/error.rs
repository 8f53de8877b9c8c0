//! Error types for the event-study engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for event-study operations.
pub type Result<T> = std::result::Result<T, EventStudyError>;

/// Errors that can occur while computing abnormal returns for an event.
///
/// Every variant is recoverable at the per-event or per-horizon level:
/// the affected unit is skipped with a diagnostic and the batch continues.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EventStudyError {
    /// Event date could not be parsed
    #[error("unparsable event date: {0}")]
    DateParse(String),

    /// Neither surprise field is present and finite
    #[error("no valid surprise value for {ticker} event dated {date}")]
    MissingSurprise {
        /// Ticker the event belongs to
        ticker: String,
        /// Raw event date as delivered by the provider
        date: String,
    },

    /// Empty input series or too few aligned price rows
    #[error("insufficient aligned price data: {aligned} rows, need at least {required}")]
    InsufficientPriceData {
        /// Aligned price rows that survived
        aligned: usize,
        /// Minimum required rows
        required: usize,
    },

    /// No trading date on or after the event date
    #[error("no trading day on or after event date {0}")]
    NoTradingDayFound(NaiveDate),

    /// The pre-event estimation window would be empty
    #[error("no pre-event data before {0}")]
    NoPreEventWindow(NaiveDate),

    /// The estimation sample is below the minimum
    #[error("insufficient estimation period: {actual} rows, need at least {required}")]
    InsufficientEstimationWindow {
        /// Rows available for estimation
        actual: usize,
        /// Minimum required rows
        required: usize,
    },

    /// The realized post-event window is below the coverage threshold
    #[error(
        "insufficient post-event data for {window}-day window: only {actual} rows, need {required}"
    )]
    InsufficientPostEventWindow {
        /// Horizon in trading days
        window: u32,
        /// Rows actually available after the event
        actual: usize,
        /// Minimum rows the coverage policy requires
        required: usize,
    },

    /// The market return is constant over the estimation window
    #[error("market return is constant over the estimation window, market model is degenerate")]
    DegenerateMarket,
}
