//! SQLite caching layer for quote data.
//!
//! Event studies fetch a price window around every event, and windows for
//! consecutive quarters of the same ticker overlap heavily. The cache keys
//! quotes on (symbol, date) so each trading day is fetched from Yahoo at
//! most once.

use crate::error::{DataError, Result};
use chrono::{NaiveDate, Utc};
use polars::prelude::*;
use rusqlite::{Connection, params};
use std::path::Path;

/// SQLite cache for adjusted-close quote data.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Open (or create) a cache database at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS quotes (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                adjusted_close REAL NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (symbol, date)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_quotes_symbol_date ON quotes(symbol, date)",
            [],
        )?;

        Ok(())
    }

    /// Check if quotes are cached for a symbol and date range.
    ///
    /// The range counts as cached when most of the expected trading days
    /// are present (roughly 70% of calendar days, weekends included in the
    /// denominator makes this a loose bound on purpose).
    pub fn has_quotes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM quotes
             WHERE symbol = ?1 AND date >= ?2 AND date <= ?3",
            params![symbol, start.to_string(), end.to_string()],
            |row| row.get(0),
        )?;

        let days = (end - start).num_days();
        let expected_count = (days as f64 * 0.7) as i64;

        Ok(count >= expected_count)
    }

    /// Get cached quotes for a symbol and date range.
    ///
    /// # Returns
    /// A DataFrame with columns symbol, date, adjusted_close; empty with
    /// the full schema when nothing is cached for the range.
    pub fn get_quotes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        let mut stmt = self.conn.prepare(
            "SELECT symbol, date, adjusted_close
             FROM quotes
             WHERE symbol = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC",
        )?;

        let mut symbols = Vec::new();
        let mut dates = Vec::new();
        let mut adj_closes = Vec::new();

        let rows = stmt.query_map(params![symbol, start.to_string(), end.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;

        for row in rows {
            let (sym, date, adj_close) = row?;
            symbols.push(sym);
            dates.push(date);
            adj_closes.push(adj_close);
        }

        let df = DataFrame::new(vec![
            Series::new("symbol".into(), symbols).into(),
            Series::new("date".into(), dates).into(),
            Series::new("adjusted_close".into(), adj_closes).into(),
        ])?;

        // The date column is stored as ISO text; hand back a proper Date
        // column so cached and freshly-fetched frames are interchangeable.
        let df = df
            .lazy()
            .with_column(
                col("date")
                    .cast(DataType::Date)
                    .alias("date"),
            )
            .collect()?;

        Ok(df)
    }

    /// Store quotes from a DataFrame with columns symbol, date, adjusted_close.
    pub fn put_quotes(&self, df: &DataFrame) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();

        let symbols = df.column("symbol")?.str()?;
        let dates = df.column("date")?.cast(&DataType::String)?;
        let dates = dates.str()?;
        let adj_closes = df.column("adjusted_close")?.f64()?;

        let tx = self.conn.unchecked_transaction()?;

        for i in 0..df.height() {
            let symbol = symbols
                .get(i)
                .ok_or_else(|| DataError::Parse("Missing symbol".to_string()))?;
            let date = dates
                .get(i)
                .ok_or_else(|| DataError::Parse("Missing date".to_string()))?;
            let adj_close = adj_closes
                .get(i)
                .ok_or_else(|| DataError::Parse("Missing adjusted_close".to_string()))?;

            tx.execute(
                "INSERT OR REPLACE INTO quotes (symbol, date, adjusted_close, cached_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![symbol, date, adj_close, cached_at],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Clear all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM quotes", [])?;
        Ok(())
    }

    /// Clear cached data for a specific symbol.
    pub fn clear_symbol(&self, symbol: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM quotes WHERE symbol = ?1", params![symbol])?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let quotes_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))?;

        let symbols_count: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT symbol) FROM quotes", [], |row| {
                    row.get(0)
                })?;

        Ok(CacheStats {
            total_quotes: quotes_count as usize,
            unique_symbols: symbols_count as usize,
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Total number of quote records
    pub total_quotes: usize,
    /// Number of unique symbols
    pub unique_symbols: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_frame(symbol: &str, rows: &[(&str, f64)]) -> DataFrame {
        let symbols: Vec<&str> = rows.iter().map(|_| symbol).collect();
        let dates: Vec<&str> = rows.iter().map(|(d, _)| *d).collect();
        let closes: Vec<f64> = rows.iter().map(|(_, p)| *p).collect();

        DataFrame::new(vec![
            Series::new("symbol".into(), symbols).into(),
            Series::new("date".into(), dates).into(),
            Series::new("adjusted_close".into(), closes).into(),
        ])
        .unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_cache_initialization() {
        let cache = SqliteCache::in_memory();
        assert!(cache.is_ok());
    }

    #[test]
    fn test_quote_round_trip() {
        let cache = SqliteCache::in_memory().unwrap();
        let df = quote_frame(
            "AAPL",
            &[
                ("2024-01-02", 185.5),
                ("2024-01-03", 184.0),
                ("2024-01-04", 182.3),
            ],
        );

        cache.put_quotes(&df).unwrap();

        let fetched = cache
            .get_quotes("AAPL", date("2024-01-01"), date("2024-01-31"))
            .unwrap();
        assert_eq!(fetched.height(), 3);

        let closes = fetched.column("adjusted_close").unwrap().f64().unwrap();
        assert_eq!(closes.get(0), Some(185.5));
        assert_eq!(closes.get(2), Some(182.3));
    }

    #[test]
    fn test_get_quotes_respects_range() {
        let cache = SqliteCache::in_memory().unwrap();
        let df = quote_frame(
            "AAPL",
            &[
                ("2024-01-02", 185.5),
                ("2024-02-02", 190.0),
                ("2024-03-04", 195.0),
            ],
        );
        cache.put_quotes(&df).unwrap();

        let fetched = cache
            .get_quotes("AAPL", date("2024-02-01"), date("2024-02-28"))
            .unwrap();
        assert_eq!(fetched.height(), 1);
    }

    #[test]
    fn test_put_quotes_overwrites_same_day() {
        let cache = SqliteCache::in_memory().unwrap();
        cache
            .put_quotes(&quote_frame("AAPL", &[("2024-01-02", 185.5)]))
            .unwrap();
        cache
            .put_quotes(&quote_frame("AAPL", &[("2024-01-02", 186.0)]))
            .unwrap();

        let fetched = cache
            .get_quotes("AAPL", date("2024-01-01"), date("2024-01-31"))
            .unwrap();
        assert_eq!(fetched.height(), 1);
        let closes = fetched.column("adjusted_close").unwrap().f64().unwrap();
        assert_eq!(closes.get(0), Some(186.0));
    }

    #[test]
    fn test_has_quotes_on_dense_range() {
        let cache = SqliteCache::in_memory().unwrap();
        let rows: Vec<(String, f64)> = (2..=30)
            .map(|day| (format!("2024-01-{day:02}"), 100.0 + day as f64))
            .collect();
        let refs: Vec<(&str, f64)> = rows.iter().map(|(d, p)| (d.as_str(), *p)).collect();
        cache.put_quotes(&quote_frame("AAPL", &refs)).unwrap();

        assert!(
            cache
                .has_quotes("AAPL", date("2024-01-02"), date("2024-01-30"))
                .unwrap()
        );
        assert!(
            !cache
                .has_quotes("MSFT", date("2024-01-02"), date("2024-01-30"))
                .unwrap()
        );
    }

    #[test]
    fn test_clear_operations_and_stats() {
        let cache = SqliteCache::in_memory().unwrap();
        cache
            .put_quotes(&quote_frame("AAPL", &[("2024-01-02", 185.5)]))
            .unwrap();
        cache
            .put_quotes(&quote_frame("^GSPC", &[("2024-01-02", 4742.8)]))
            .unwrap();

        let stats = cache.get_stats().unwrap();
        assert_eq!(stats.total_quotes, 2);
        assert_eq!(stats.unique_symbols, 2);

        cache.clear_symbol("AAPL").unwrap();
        assert_eq!(cache.get_stats().unwrap().total_quotes, 1);

        cache.clear_all().unwrap();
        assert_eq!(cache.get_stats().unwrap().total_quotes, 0);
    }
}
