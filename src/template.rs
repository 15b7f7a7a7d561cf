//! New database files from a blank template.

use crate::core::Result;
use std::fs;
use std::path::Path;
use tracing::info;

/// Copies `template` byte-for-byte to `target`.
///
/// Returns `Ok(false)` and leaves the target untouched when it already
/// exists and `overwrite` is false.
pub fn create_database(template: &Path, target: &Path, overwrite: bool) -> Result<bool> {
    if !overwrite && target.exists() {
        return Ok(false);
    }

    let bytes = fs::read(template)?;
    fs::write(target, &bytes)?;
    info!("Created {} from {} ({} bytes)", target.display(), template.display(), bytes.len());
    Ok(true)
}
