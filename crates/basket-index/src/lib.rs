#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/basket-rs/basket/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calendar;
pub mod comparison;
pub mod correlation;
pub mod definition;
pub mod error;
pub mod portfolio;
pub mod price_table;
pub mod valuation;

// Re-export main types
pub use comparison::{ComparisonRow, ComparisonSeries, compare};
pub use correlation::{CorrelationResult, correlation};
pub use definition::{IndexDefinition, IndexDefinitionSet, RejectedIndex, Weighting, WeightingKind};
pub use error::{IndexError, Result};
pub use portfolio::{Holding, Portfolio, PortfolioBuilder};
pub use price_table::{PriceTable, Selection, SymbolStatistics};
pub use valuation::{Benchmark, IndexSeries, IndexValuator};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
