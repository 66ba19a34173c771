//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the storage root exists, creating it (and parents) when missing.
pub fn ensure_storage_root(root: &Path) -> anyhow::Result<()> {
    if root.is_dir() {
        debug!(root = %root.display(), "storage root present");
        return Ok(());
    }
    if root.exists() {
        return Err(anyhow::anyhow!("{} exists but is not a directory", root.display()));
    }
    warn!(root = %root.display(), "storage root missing; creating it");
    std::fs::create_dir_all(root)
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", root.display()))?;
    Ok(())
}
