//! File dispositions applied to duplicates found during a check.
//!
//! This module provides:
//! - Safe deletion via the system trash (default, recoverable)
//! - Permanent deletion
//! - Relocation into a target directory
//! - Report-only mode that leaves the filesystem untouched
//!
//! Every destructive operation fails loudly: a missing file, an invalid
//! target directory, or an existing destination is returned as an
//! [`ActionError`] for the caller to propagate.
//!
//! ```no_run
//! use hashdex::actions::{apply, Disposition};
//! use std::path::{Path, PathBuf};
//!
//! let disposition = Disposition::Move { target: PathBuf::from("/tmp/dupes") };
//! let outcome = apply(&disposition, Path::new("/data/copy.txt")).unwrap();
//! println!("{:?}", outcome);
//! ```

pub mod delete;
pub mod relocate;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use delete::{delete_to_trash, permanent_delete};
pub use relocate::move_to;

/// What to do with a file whose fingerprint is already indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Leave the file in place; only report it.
    Report,
    /// Remove the file, either to the trash or permanently.
    Delete {
        /// Bypass the trash
        permanent: bool,
    },
    /// Move the file into `target`, keeping its file name.
    Move {
        /// Existing directory receiving the file
        target: PathBuf,
    },
}

impl Disposition {
    /// Whether applying this disposition removes the file from its current path.
    #[must_use]
    pub fn removes_source(&self) -> bool {
        !matches!(self, Self::Report)
    }
}

/// Result of applying a disposition to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Nothing was changed.
    Reported(PathBuf),
    /// The file was moved to the system trash.
    Trashed(PathBuf),
    /// The file was permanently removed.
    Deleted(PathBuf),
    /// The file now lives at `to`.
    Moved { from: PathBuf, to: PathBuf },
}

/// Error type for disposition operations.
#[derive(Debug, Error)]
pub enum ActionError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// The move target is missing or not a directory.
    #[error("invalid target directory: {0}")]
    InvalidTarget(PathBuf),

    /// The move destination is already occupied.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ActionError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::InvalidTarget(p)
            | Self::DestinationExists(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    pub(crate) fn from_io(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// Apply `disposition` to the file at `path`.
///
/// # Errors
///
/// Returns [`ActionError`] if the file cannot be deleted or moved.
pub fn apply(disposition: &Disposition, path: &Path) -> Result<ActionOutcome, ActionError> {
    match disposition {
        Disposition::Report => Ok(ActionOutcome::Reported(path.to_path_buf())),
        Disposition::Delete { permanent: true } => {
            permanent_delete(path).map(ActionOutcome::Deleted)
        }
        Disposition::Delete { permanent: false } => {
            delete_to_trash(path).map(ActionOutcome::Trashed)
        }
        Disposition::Move { target } => move_to(path, target).map(|to| ActionOutcome::Moved {
            from: path.to_path_buf(),
            to,
        }),
    }
}
