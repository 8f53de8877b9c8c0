//! Study configuration.
//!
//! Everything the pipeline needs is carried here and injected by the
//! caller. There is no ambient configuration: the engine stays testable
//! with arbitrary horizons, benchmarks, and thresholds.

use arica_event::StudyPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a drift study run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Tickers to study
    pub tickers: Vec<String>,
    /// Benchmark symbol for the market model
    pub market_ticker: String,
    /// CAR horizons in trading days, ascending
    pub car_windows: Vec<u32>,
    /// Data-sufficiency thresholds for the event-study engine
    pub policy: StudyPolicy,
    /// Directory the result files are written to
    pub output_dir: PathBuf,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            market_ticker: "^GSPC".to_string(),
            car_windows: vec![1, 2, 5, 10, 30],
            policy: StudyPolicy::default(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl StudyConfig {
    /// Longest configured CAR horizon; zero when no horizons are set.
    pub fn max_window(&self) -> u32 {
        self.car_windows.iter().copied().max().unwrap_or(0)
    }
}
