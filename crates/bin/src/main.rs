//! Arica CLI binary.
//!
//! Command-line interface for the earnings drift study.

mod integration;

use arica::StudyConfig;
use arica_data::yahoo::{YahooEarningsProvider, YahooQuoteProvider};
use arica_event::{CarRecord, normalize_event};
use arica_output::{DriftObservation, RegressionSummaryRow, regression_table, write_results};
use arica_stats::cross_section::{CrossSectionConfig, RegressionSummary, regress_car_on_surprise};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager;
use integration::pipeline::{FetchConfig, process_ticker, to_raw_event};
use std::path::PathBuf;
use std::process;
use std::time::Duration as StdDuration;

#[derive(Parser)]
#[command(name = "arica")]
#[command(about = "Arica: earnings event-study and post-earnings drift analysis", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the drift study for a set of tickers
    Study {
        /// Ticker symbols to study
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Benchmark symbol for the market model
        #[arg(long, default_value = "^GSPC")]
        market: String,

        /// CAR horizons in trading days
        #[arg(long, value_delimiter = ',', default_value = "1,2,5,10,30")]
        windows: Vec<u32>,

        /// Directory for result files
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached data
        #[arg(long)]
        refresh: bool,
    },

    /// Show the normalized earnings events for a symbol
    Events {
        /// Stock symbol
        symbol: String,
    },

    /// Inspect or clear the quote cache
    Cache {
        /// Clear all cached quotes
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Study {
            symbols,
            market,
            windows,
            output_dir,
            no_cache,
            refresh,
        } => {
            let config = StudyConfig {
                tickers: symbols.iter().map(|s| s.to_uppercase()).collect(),
                market_ticker: market,
                car_windows: windows,
                output_dir,
                ..StudyConfig::default()
            };
            let fetch = FetchConfig {
                use_cache: !no_cache,
                force_refresh: refresh,
            };
            run_study(config, fetch).await?;
        }
        Commands::Events { symbol } => {
            show_events(&symbol.to_uppercase()).await?;
        }
        Commands::Cache { clear } => {
            cache_command(clear)?;
        }
    }

    Ok(())
}

async fn run_study(
    config: StudyConfig,
    fetch: FetchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Earnings drift study: {} ticker(s), benchmark {}, windows {:?}",
        config.tickers.len(),
        config.market_ticker,
        config.car_windows
    );

    let cache = if fetch.use_cache {
        match cache_manager::open_cache() {
            Ok(cache) => Some(cache),
            Err(e) => {
                eprintln!("Warning: cache unavailable, fetching everything fresh: {e}");
                None
            }
        }
    } else {
        println!("Cache: disabled");
        None
    };

    let quotes = YahooQuoteProvider::new();
    let earnings = YahooEarningsProvider::new();

    let pb = ProgressBar::new(config.tickers.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(StdDuration::from_millis(100));

    let mut records: Vec<CarRecord> = Vec::new();
    let mut events_studied = 0;
    let mut events_skipped = 0;
    for ticker in &config.tickers {
        pb.set_message(format!("Processing {ticker}..."));
        match process_ticker(
            &quotes,
            &earnings,
            cache.as_ref(),
            ticker,
            &config,
            &fetch,
            Some(&pb),
        )
        .await
        {
            Ok(outcome) => {
                if outcome.records.is_empty() {
                    pb.suspend(|| eprintln!("No valid abnormal returns generated for {ticker}"));
                }
                events_studied += outcome.events_studied;
                events_skipped += outcome.events_skipped;
                records.extend(outcome.records);
            }
            Err(e) => {
                pb.suspend(|| eprintln!("Warning: skipping {ticker}: {e}"));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message(format!(
        "{} CAR observations from {} events ({} skipped)",
        records.len(),
        events_studied,
        events_skipped
    ));

    // An empty result set is a valid outcome, not an error.
    if records.is_empty() {
        println!("No valid CAR observations were produced; nothing to write.");
        return Ok(());
    }

    let observations: Vec<DriftObservation> = records.iter().map(to_observation).collect();

    let cs_config = CrossSectionConfig::default();
    let mut summaries: Vec<RegressionSummaryRow> = Vec::new();
    for &window in &config.car_windows {
        let window_records: Vec<&CarRecord> =
            records.iter().filter(|r| r.window == window).collect();
        let surprises: Vec<f64> = window_records.iter().map(|r| r.surprise).collect();
        let cars: Vec<f64> = window_records.iter().map(|r| r.car).collect();

        match regress_car_on_surprise(window, &surprises, &cars, &cs_config) {
            Ok(summary) => summaries.push(to_summary_row(&summary)),
            Err(e) => println!("Skipping {window}-day regression: {e}"),
        }
    }

    write_results(&config.output_dir, &observations, &summaries)?;
    if !summaries.is_empty() {
        println!("{}", regression_table(&summaries));
    }
    println!(
        "Results written to {} ({} observations)",
        config.output_dir.display(),
        observations.len()
    );

    Ok(())
}

fn to_observation(record: &CarRecord) -> DriftObservation {
    DriftObservation {
        ticker: record.ticker.clone(),
        event_date: record.event_date,
        car_window: record.window,
        car: record.car,
        surprise: record.surprise,
        eps_estimate: record.eps_estimate,
        reported_eps: record.reported_eps,
    }
}

fn to_summary_row(summary: &RegressionSummary) -> RegressionSummaryRow {
    RegressionSummaryRow {
        window: summary.window,
        intercept: summary.intercept,
        coefficient: summary.coefficient,
        std_error: summary.std_error,
        t_stat: summary.t_stat,
        p_value: summary.p_value,
        r_squared: summary.r_squared,
        n: summary.n,
    }
}

async fn show_events(symbol: &str) -> Result<(), Box<dyn std::error::Error>> {
    let provider = YahooEarningsProvider::new();
    let rows = provider.fetch_earnings(symbol).await?;

    if rows.is_empty() {
        println!("No earnings history for {symbol}");
        return Ok(());
    }

    println!(
        "{:<12} {:>10} {:>10} {:>10}",
        "Date", "Estimate", "Reported", "Surprise"
    );
    for row in &rows {
        match normalize_event(symbol, &to_raw_event(row)) {
            Ok(event) => println!(
                "{:<12} {:>10} {:>10} {:>9.2}%",
                event.event_date,
                format_eps(event.eps_estimate),
                format_eps(event.reported_eps),
                event.surprise * 100.0
            ),
            Err(err) => println!("{:<12} skipped: {err}", row.date),
        }
    }

    Ok(())
}

fn format_eps(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn cache_command(clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cache = cache_manager::open_cache()?;

    if clear {
        cache.clear_all()?;
        println!("Cache cleared.");
    }

    let stats = cache.get_stats()?;
    println!(
        "Cache: {} quotes across {} symbols ({})",
        stats.total_quotes,
        stats.unique_symbols,
        cache_manager::get_cache_path().display()
    );

    Ok(())
}
