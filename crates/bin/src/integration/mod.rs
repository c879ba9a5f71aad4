//! Glue between the command line and the library crates: cache location and the
//! network fetch with progress reporting.

pub(crate) mod cache_manager;
pub(crate) mod fetch;
