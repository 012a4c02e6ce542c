//! Moving duplicates into a target directory.

use std::fs;
use std::path::{Path, PathBuf};

use super::ActionError;

/// Move `path` into the existing directory `target`, keeping its file name.
///
/// A plain rename is tried first; when that fails (typically because source
/// and target are on different filesystems) the file is copied and the
/// source removed.
///
/// # Errors
///
/// - [`ActionError::InvalidTarget`] if `target` is not an existing directory
///   or `path` has no file name
/// - [`ActionError::DestinationExists`] if `target/<name>` already exists
/// - [`ActionError::NotFound`] / [`ActionError::Io`] for filesystem failures
pub fn move_to(path: &Path, target: &Path) -> Result<PathBuf, ActionError> {
    if !target.is_dir() {
        return Err(ActionError::InvalidTarget(target.to_path_buf()));
    }
    let name = path
        .file_name()
        .ok_or_else(|| ActionError::InvalidTarget(path.to_path_buf()))?;
    let destination = target.join(name);

    if destination.symlink_metadata().is_ok() {
        return Err(ActionError::DestinationExists(destination));
    }
    fs::metadata(path).map_err(|e| ActionError::from_io(path, e))?;

    if let Err(rename_err) = fs::rename(path, &destination) {
        log::debug!(
            "Rename {} -> {} failed ({}), falling back to copy",
            path.display(),
            destination.display(),
            rename_err
        );
        fs::copy(path, &destination).map_err(|e| ActionError::from_io(path, e))?;
        if let Err(e) = fs::remove_file(path) {
            // Leave exactly one copy behind.
            let _ = fs::remove_file(&destination);
            return Err(ActionError::from_io(path, e));
        }
    }

    log::debug!("Moved {} -> {}", path.display(), destination.display());
    Ok(destination)
}
