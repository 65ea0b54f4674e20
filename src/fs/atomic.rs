//! Atomic file writes for generated scripts.
//!
//! Content goes to a temporary file in the target's directory, is synced,
//! and then renamed over the target. An interrupted run leaves either the
//! previous file or the complete new one, never a truncated script.
//!
//! On crash a temporary file named `.{filename}.{pid}.tmp` may remain.

use crate::error::{BatchError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write `content` to `path`, replacing any existing file.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            BatchError::UserError(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;
    keep_permissions(path, &temp_path)?;
    replace(&temp_path, path)
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            BatchError::UserError(format!("invalid output path '{}'", target.display()))
        })?;

    let temp_name = format!(".{}.{}.tmp", filename, std::process::id());
    Ok(match target.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    })
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let result = File::create(path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });

    result.map_err(|e| {
        let _ = fs::remove_file(path);
        BatchError::UserError(format!(
            "failed to write temporary file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Give `temp` the permissions of an existing `target`, so regenerating a
/// script keeps its executable bit.
fn keep_permissions(target: &Path, temp: &Path) -> Result<()> {
    let Ok(metadata) = fs::metadata(target) else {
        return Ok(());
    };
    fs::set_permissions(temp, metadata.permissions()).map_err(|e| {
        let _ = fs::remove_file(temp);
        BatchError::UserError(format!(
            "failed to copy permissions of '{}': {}",
            target.display(),
            e
        ))
    })
}

fn replace(source: &Path, target: &Path) -> Result<()> {
    // rename() replaces an existing target on POSIX; Windows refuses, so the
    // old file is removed first there.
    #[cfg(windows)]
    if target.exists() {
        let _ = fs::remove_file(target);
    }

    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        BatchError::UserError(format!("failed to write '{}': {}", target.display(), e))
    })
}
