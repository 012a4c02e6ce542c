//! Scanner module for file discovery and content fingerprinting.
//!
//! This module provides functionality for:
//! - Directory traversal yielding `{full_path, filename}` records
//! - Sampled content fingerprinting (BLAKE3 + SHA-256)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`fingerprint`]: Head/tail sampled two-part digests
//!
//! # Example
//!
//! ```no_run
//! use hashdex::scanner::{DirectoryScanner, Fingerprinter, WalkerConfig};
//! use std::path::Path;
//!
//! let scanner = DirectoryScanner::new(Path::new("."), WalkerConfig::default());
//! let fingerprinter = Fingerprinter::new();
//!
//! for file in scanner.files().unwrap() {
//!     let fp = fingerprinter.fingerprint(&file.full_path).unwrap();
//!     println!("{} {}", fp.primary, file.full_path.display());
//! }
//! ```

pub mod fingerprint;
pub mod walker;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// Re-export main types
pub use fingerprint::{Fingerprint, Fingerprinter, DEFAULT_SAMPLE_SIZE};
pub use walker::DirectoryScanner;

/// A filesystem entry known to (or about to be added to) the index.
///
/// `full_path` is the unique key in the index; `filename` is the final
/// path component, stored alongside for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute (or scan-relative) path to the file
    pub full_path: PathBuf,
    /// Final component of the path
    pub filename: String,
}

impl FileRecord {
    /// Create a record from an explicit path and file name.
    #[must_use]
    pub fn new(full_path: PathBuf, filename: impl Into<String>) -> Self {
        Self {
            full_path,
            filename: filename.into(),
        }
    }

    /// Create a record from a path, deriving the file name from its last component.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(path.to_path_buf(), filename)
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Glob patterns to ignore (gitignore-style).
    pub ignore_patterns: Vec<String>,

    /// Also apply the scan root's `.gitignore`, if present.
    pub respect_gitignore: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool, ignore_patterns: Vec<String>) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
            ignore_patterns,
            respect_gitignore: false,
        }
    }

    /// Apply the root `.gitignore` in addition to `ignore_patterns`.
    #[must_use]
    pub fn with_respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An ignore pattern could not be compiled.
    #[error("Invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Parser message
        message: String,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file fingerprinting.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    pub(crate) fn from_io(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}
