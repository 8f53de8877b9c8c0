//! Cache manager for quote data.
//!
//! Opens the SQLite quote cache at a platform-specific default location.

use arica_data::cache::SqliteCache;
use arica_data::error::DataError;
use std::path::PathBuf;

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/arica/`
/// - macOS: `~/Library/Caches/arica/`
/// - Windows: `%LOCALAPPDATA%\arica\cache\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("arica")
}

/// Get the default cache database path.
pub(crate) fn get_cache_path() -> PathBuf {
    default_cache_dir().join("quotes.db")
}

/// Open the cache, creating the directory if needed.
pub(crate) fn open_cache() -> Result<SqliteCache, DataError> {
    let cache_path = get_cache_path();

    // Ensure parent directory exists
    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    SqliteCache::new(&cache_path)
}
