//! File deletion: system trash or permanent removal.
//!
//! Both functions verify the file exists before acting and return the path
//! that was removed.

use std::fs;
use std::path::{Path, PathBuf};

use super::ActionError;

/// Move a file to the system trash/recycle bin.
///
/// # Errors
///
/// Returns [`ActionError::NotFound`] if the file is missing and
/// [`ActionError::TrashFailed`] if the platform trash rejects it.
pub fn delete_to_trash(path: &Path) -> Result<PathBuf, ActionError> {
    fs::metadata(path).map_err(|e| ActionError::from_io(path, e))?;

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        ActionError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::debug!("Moved to trash: {}", path.display());
    Ok(path.to_path_buf())
}

/// Permanently delete a file (cannot be undone).
///
/// # Errors
///
/// Returns [`ActionError`] if the file is missing or cannot be removed.
pub fn permanent_delete(path: &Path) -> Result<PathBuf, ActionError> {
    fs::metadata(path).map_err(|e| ActionError::from_io(path, e))?;

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        ActionError::from_io(path, e)
    })?;

    log::debug!("Permanently deleted: {}", path.display());
    Ok(path.to_path_buf())
}
