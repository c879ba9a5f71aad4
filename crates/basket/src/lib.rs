#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/basket-rs/basket/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod run;

// Re-export main types from sub-crates
pub use basket_data as data;
pub use basket_index as index;
pub use basket_output as output;

pub use config::RunConfig;
pub use error::{Result, RunError};
pub use run::{IndexFailure, IndexRun};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
