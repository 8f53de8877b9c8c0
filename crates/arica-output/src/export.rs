//! Export functionality for event-study results.
//!
//! The CSV column names reproduce the published result schema
//! (`Ticker,EventDate,CAR_Window,...`), so downstream regression and
//! reporting notebooks keep working against the same headers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// One drift observation: a (ticker, event, horizon) CAR tied to its
/// earnings surprise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriftObservation {
    /// Security symbol.
    #[serde(rename = "Ticker")]
    pub ticker: String,

    /// Earnings announcement date.
    #[serde(rename = "EventDate")]
    pub event_date: NaiveDate,

    /// CAR horizon in trading days.
    #[serde(rename = "CAR_Window")]
    pub car_window: u32,

    /// Cumulative abnormal return over the horizon.
    #[serde(rename = "CAR")]
    pub car: f64,

    /// Earnings surprise as a fraction.
    #[serde(rename = "Surprise")]
    pub surprise: f64,

    /// Consensus EPS estimate, when reported.
    #[serde(rename = "EPS_Estimate")]
    pub eps_estimate: Option<f64>,

    /// Reported EPS, when reported.
    #[serde(rename = "Reported_EPS")]
    pub reported_eps: Option<f64>,
}

/// One row of the per-horizon regression summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegressionSummaryRow {
    /// CAR horizon in trading days.
    #[serde(rename = "Window")]
    pub window: u32,

    /// Fitted intercept.
    #[serde(rename = "Intercept")]
    pub intercept: f64,

    /// Fitted surprise coefficient.
    #[serde(rename = "Coefficient")]
    pub coefficient: f64,

    /// Standard error of the coefficient.
    #[serde(rename = "StdError")]
    pub std_error: f64,

    /// t-statistic of the coefficient.
    #[serde(rename = "TStat")]
    pub t_stat: f64,

    /// Two-sided p-value of the coefficient.
    #[serde(rename = "P-Value")]
    pub p_value: f64,

    /// Coefficient of determination.
    #[serde(rename = "R-squared")]
    pub r_squared: f64,

    /// Observations used in the fit.
    #[serde(rename = "N")]
    pub n: usize,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn serialize_csv<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let data = String::from_utf8(wtr.into_inner().map_err(|e| e.into_error())?)
        .unwrap_or_default();
    Ok(data)
}

impl Exporter for [DriftObservation] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => serialize_csv(self),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for [RegressionSummaryRow] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => serialize_csv(self),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Write the full drift dataset and the regression summary to a directory.
///
/// Produces `earnings_drift_results.csv` and, when summaries are present,
/// `regression_results_summary.csv`. The directory is created if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot
/// be written.
pub fn write_results(
    dir: &Path,
    observations: &[DriftObservation],
    summaries: &[RegressionSummaryRow],
) -> Result<(), ExportError> {
    std::fs::create_dir_all(dir)?;

    observations.export_to_file(&dir.join("earnings_drift_results.csv"), ExportFormat::Csv)?;

    if !summaries.is_empty() {
        summaries.export_to_file(
            &dir.join("regression_results_summary.csv"),
            ExportFormat::Csv,
        )?;
    }

    Ok(())
}
