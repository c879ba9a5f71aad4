//! Errors for a whole run.

use thiserror::Error;

/// Result type alias for run-level operations.
pub type Result<T> = std::result::Result<T, RunError>;

/// Any failure while loading, building or exporting a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Quote acquisition or cache error
    #[error(transparent)]
    Data(#[from] basket_data::DataError),

    /// Index construction or valuation error
    #[error(transparent)]
    Index(#[from] basket_index::IndexError),

    /// Export error
    #[error(transparent)]
    Export(#[from] basket_output::ExportError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Run configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for RunError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
