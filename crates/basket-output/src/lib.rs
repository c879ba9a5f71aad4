#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/basket-rs/basket/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod summary;

pub use export::{
    ComparisonExport, ComparisonRecord, ExportError, ExportFormat, Exporter, GnucashPrices,
    PortfolioExport, PortfolioHolding,
};
pub use report::{index_tree, portfolio_table, price_statistics_table, render_tree, ticker_tree};
pub use summary::ComparisonSummary;
