#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/basket-rs/basket/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod alphavantage;
pub mod archive;
pub mod cache;
pub mod error;
pub mod quote;

pub use error::{DataError, Result};
pub use quote::{DEFAULT_CURRENCY, DEFAULT_NAMESPACE, Quote, quotes_from_frame, quotes_to_frame};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
