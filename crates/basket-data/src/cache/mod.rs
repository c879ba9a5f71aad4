//! Caching layer for quotes.

pub mod sqlite;

pub use sqlite::{CacheStats, QuoteFilter, SqliteCache};
