//! Persisted artifact versions for QPC
//!
//! Gantree: L5_Engine → UniqueVersion
//!
//! `<dir>/<name>.unique` holds one integer: the last version handed out.

use qpc_core::{QpcError, QpcResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the version file for `name`
pub fn unique_file_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.unique", name))
}

/// Increment and persist the version counter for `name`
/// Gantree: bump_unique_file_version(dir,name) -> Result<u32> // 버전 증가
///
/// A missing file starts at 0, so the first call returns 1.
pub fn bump_unique_file_version(dir: &Path, name: &str) -> QpcResult<u32> {
    let path = unique_file_path(dir, name);
    if !path.exists() {
        log::debug!("creating version file '{}'", path.display());
        fs::write(&path, "0")?;
    }

    let text = fs::read_to_string(&path)?;
    let current: u32 = text.trim().parse().map_err(|_| {
        QpcError::Io(format!(
            "version file '{}' does not hold a number: '{}'",
            path.display(),
            text.trim()
        ))
    })?;

    let next = current.checked_add(1).ok_or_else(|| {
        QpcError::Io(format!(
            "version file '{}' is exhausted at {}",
            path.display(),
            current
        ))
    })?;
    fs::write(&path, next.to_string())?;
    log::info!("'{}' is at version {}", name, next);
    Ok(next)
}

// ============================================================================
// Tests
// ============================================================================
