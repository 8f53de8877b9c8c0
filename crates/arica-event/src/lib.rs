#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/arica/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod car;
pub mod error;
pub mod event;
pub mod locate;
pub mod market_model;
pub mod returns;
pub mod series;
pub mod study;

pub use car::{CarRecord, car_over_window};
pub use error::{EventStudyError, Result};
pub use event::{CanonicalEvent, RawEvent, normalize_event};
pub use locate::{EventWindows, locate_event};
pub use market_model::MarketModel;
pub use returns::AlignedReturns;
pub use series::PriceSeries;
pub use study::{EventStudyOutcome, StudyPolicy, fetch_range, run_event};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
