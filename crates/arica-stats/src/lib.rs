#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/arica/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cross_section;
pub mod ols;

pub use cross_section::{CrossSectionConfig, RegressionSummary, regress_car_on_surprise};
pub use ols::SimpleOls;

use thiserror::Error;

/// Errors that can occur during regression estimation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StatsError {
    /// Insufficient data for estimation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Regressor has no variance, the fit is undefined
    #[error("Degenerate regressor: zero variance over {0} observations")]
    DegenerateRegressor(usize),

    /// Regressor and response lengths differ
    #[error("Dimension mismatch: regressor has {x_len} observations, response has {y_len}")]
    DimensionMismatch {
        /// Regressor length
        x_len: usize,
        /// Response length
        y_len: usize,
    },
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
