//! Yahoo Finance data providers.

pub mod earnings;
pub mod quotes;

pub use earnings::{EarningsRow, YahooEarningsProvider};
pub use quotes::YahooQuoteProvider;
