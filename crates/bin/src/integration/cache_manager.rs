//! Cache database location and opening.

use basket::RunConfig;
use basket_data::cache::SqliteCache;
use basket_data::error::DataError;
use std::path::{Path, PathBuf};

/// Resolve the cache path: the command-line override, then the run configuration,
/// then the platform cache directory (`~/.cache/basket/basket.db` on Linux).
pub(crate) fn cache_path(override_path: Option<&Path>, config: &RunConfig) -> PathBuf {
    override_path.map_or_else(|| config.cache_path(), Path::to_path_buf)
}

/// Open the cache, creating the directory if needed.
pub(crate) fn open_cache(path: &Path) -> Result<SqliteCache, DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!(path = %path.display(), "opening cache");
    SqliteCache::new(path)
}
