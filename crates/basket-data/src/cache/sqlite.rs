//! SQLite store for closing quotes.

use crate::error::{DataError, Result};
use crate::quote::{Quote, quotes_to_frame};
use chrono::{NaiveDate, Utc};
use polars::prelude::DataFrame;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::path::Path;

/// SQLite cache of quotes keyed by `(date, symbol, namespace)`.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

/// Restricts a quote query. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    /// Inclusive lower bound
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound
    pub end: Option<NaiveDate>,
    /// Symbols to keep
    pub symbols: Vec<String>,
}

impl QuoteFilter {
    /// Filter that matches every stored quote.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to an inclusive date range.
    pub const fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Restrict to the given symbols.
    pub fn symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of quote records
    pub total_quotes: usize,
    /// Number of unique symbols
    pub unique_symbols: usize,
    /// Earliest stored date
    pub first_date: Option<NaiveDate>,
    /// Latest stored date
    pub last_date: Option<NaiveDate>,
}

impl SqliteCache {
    /// Open (or create) a cache at `path`.
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

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS quotes (
                date TEXT NOT NULL,
                symbol TEXT NOT NULL,
                namespace TEXT NOT NULL,
                close REAL NOT NULL,
                currency TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (date, symbol, namespace)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_quotes_symbol_date ON quotes(symbol, date)",
            [],
        )?;

        Ok(())
    }

    /// Store quotes. An existing key keeps its row and takes the new close.
    pub fn put_quotes(&self, quotes: &[Quote]) -> Result<usize> {
        let cached_at = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;

        for quote in quotes {
            if !quote.close.is_finite() {
                return Err(DataError::Parse(format!(
                    "{} {}: non-finite close",
                    quote.symbol, quote.date
                )));
            }
            tx.execute(
                "INSERT INTO quotes (date, symbol, namespace, close, currency, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (date, symbol, namespace)
                 DO UPDATE SET close = excluded.close, cached_at = excluded.cached_at",
                params![
                    quote.date.to_string(),
                    quote.symbol,
                    quote.namespace,
                    quote.close,
                    quote.currency,
                    cached_at
                ],
            )?;
        }

        tx.commit()?;
        tracing::debug!(rows = quotes.len(), "stored quotes");
        Ok(quotes.len())
    }

    /// Read quotes matching `filter`, ordered by symbol then date.
    pub fn get_quotes(&self, filter: &QuoteFilter) -> Result<Vec<Quote>> {
        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(start) = filter.start {
            values.push(start.to_string());
            clauses.push(format!("date >= ?{}", values.len()));
        }
        if let Some(end) = filter.end {
            values.push(end.to_string());
            clauses.push(format!("date <= ?{}", values.len()));
        }
        if !filter.symbols.is_empty() {
            let placeholders: Vec<String> = filter
                .symbols
                .iter()
                .map(|symbol| {
                    values.push(symbol.clone());
                    format!("?{}", values.len())
                })
                .collect();
            clauses.push(format!("symbol IN ({})", placeholders.join(", ")));
        }

        let mut sql =
            "SELECT date, symbol, namespace, close, currency FROM quotes".to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY symbol ASC, date ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut quotes = Vec::new();
        for row in rows {
            let (date, symbol, namespace, close, currency) = row?;
            quotes.push(Quote {
                date: parse_date(&date)?,
                symbol,
                namespace,
                close,
                currency,
            });
        }

        Ok(quotes)
    }

    /// Read quotes matching `filter` as a long-format DataFrame.
    pub fn get_quotes_frame(&self, filter: &QuoteFilter) -> Result<DataFrame> {
        let quotes = self.get_quotes(filter)?;
        quotes_to_frame(&quotes)
    }

    /// Distinct stored symbols in ascending order.
    pub fn symbols(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT symbol FROM quotes ORDER BY symbol")?;
        let symbols = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(symbols)
    }

    /// Remove every quote for `symbol`, returning the number of rows deleted.
    pub fn clear_symbol(&self, symbol: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM quotes WHERE symbol = ?1", params![symbol])?;
        Ok(deleted)
    }

    /// Remove every quote.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM quotes", [])?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn stats(&self) -> Result<CacheStats> {
        let total_quotes: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))?;

        let unique_symbols: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT symbol) FROM quotes", [], |row| {
                    row.get(0)
                })?;

        let (first, last): (Option<String>, Option<String>) = self
            .conn
            .query_row("SELECT MIN(date), MAX(date) FROM quotes", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?
            .unwrap_or((None, None));

        Ok(CacheStats {
            total_quotes: total_quotes as usize,
            unique_symbols: unique_symbols as usize,
            first_date: first.as_deref().map(parse_date).transpose()?,
            last_date: last.as_deref().map(parse_date).transpose()?,
        })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DataError::Parse(format!("Invalid date {}: {}", s, e)))
}
