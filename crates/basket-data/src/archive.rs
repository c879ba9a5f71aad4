//! Archive of raw API payloads.
//!
//! Fetched payloads are written as a single JSON array so a run can be replayed
//! without network access.

use crate::error::Result;
use serde_json::Value;
use std::path::Path;

/// Write payloads to `path`, creating parent directories as needed.
pub fn save_responses<P: AsRef<Path>>(path: P, payloads: &[Value]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string(payloads)?)?;
    tracing::info!(path = %path.display(), records = payloads.len(), "wrote payload archive");
    Ok(())
}

/// Read payloads previously written by [`save_responses`].
pub fn load_responses<P: AsRef<Path>>(path: P) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let payloads: Vec<Value> = serde_json::from_str(&content)?;
    tracing::info!(path = %path.display(), records = payloads.len(), "read payload archive");
    Ok(payloads)
}
