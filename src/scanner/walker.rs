//! Directory scanner producing [`FileRecord`]s for the indexer.
//!
//! # Overview
//!
//! The scan root may be a single file, in which case exactly one record with
//! the canonical absolute path is produced, or a directory, which is walked
//! recursively with [`walkdir`]. Entries within a directory are visited in
//! file-name order so the output is stable for one invocation.
//!
//! # Features
//!
//! - Optional symlink following
//! - Hidden file filtering
//! - Gitignore-style pattern matching via the `ignore` crate, with the root
//!   `.gitignore` applied only on request
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use hashdex::scanner::{DirectoryScanner, WalkerConfig};
//! use std::path::Path;
//!
//! let scanner = DirectoryScanner::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! for entry in scanner.walk() {
//!     match entry {
//!         Ok(file) => println!("{}", file.full_path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, ScanError, WalkerConfig};

/// Enumerates the files below a scan root.
#[derive(Debug)]
pub struct DirectoryScanner {
    /// Root path to scan
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl DirectoryScanner {
    /// Create a new scanner for the given root.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Stop iteration once the flag becomes `true`.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Build gitignore matcher from config patterns and, when enabled, the
    /// root `.gitignore`.
    fn build_gitignore(&self) -> Result<Option<Gitignore>, ScanError> {
        let mut builder = GitignoreBuilder::new(&self.root);

        let gitignore_path = self.root.join(".gitignore");
        if self.config.respect_gitignore && gitignore_path.is_file() {
            if let Some(e) = builder.add(&gitignore_path) {
                log::warn!(
                    "Failed to load .gitignore from {}: {}",
                    gitignore_path.display(),
                    e
                );
            } else {
                log::debug!("Loaded .gitignore from {}", gitignore_path.display());
            }
        }

        for pattern in &self.config.ignore_patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| ScanError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
        }

        let gitignore = builder.build().map_err(|e| ScanError::InvalidPattern {
            pattern: self.config.ignore_patterns.join(", "),
            message: e.to_string(),
        })?;

        Ok((!gitignore.is_empty()).then_some(gitignore))
    }

    fn should_ignore(&self, path: &Path, is_dir: bool, gitignore: Option<&Gitignore>) -> bool {
        let Some(gi) = gitignore else {
            return false;
        };

        let relative_path = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative_path.to_string_lossy();
        let normalized_path = if cfg!(windows) {
            path_str.replace('\\', "/")
        } else {
            path_str.into_owned()
        };

        gi.matched(normalized_path, is_dir).is_ignore()
    }

    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
    }

    /// Walk the scan root, yielding one record per regular file.
    ///
    /// Errors for individual entries are yielded as [`ScanError`] values
    /// rather than stopping iteration. A missing root yields a single
    /// [`ScanError::NotFound`].
    pub fn walk(&self) -> Box<dyn Iterator<Item = Result<FileRecord, ScanError>> + '_> {
        if !self.root.exists() {
            return Box::new(std::iter::once(Err(ScanError::NotFound(self.root.clone()))));
        }

        if self.root.is_file() {
            let record = self
                .root
                .canonicalize()
                .map(|p| FileRecord::from_path(&p))
                .map_err(|source| ScanError::Io {
                    path: self.root.clone(),
                    source,
                });
            return Box::new(std::iter::once(record));
        }

        let gitignore = match self.build_gitignore() {
            Ok(gi) => gi,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };

        let skip_hidden = self.config.skip_hidden;
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        let iter = walk_dir
            .into_iter()
            .filter_entry(move |entry| {
                if skip_hidden && Self::is_hidden(entry) {
                    return false;
                }
                !(entry.depth() > 0
                    && self.should_ignore(
                        entry.path(),
                        entry.file_type().is_dir(),
                        gitignore.as_ref(),
                    ))
            })
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Scanner: Shutdown requested, stopping iteration");
                    return false;
                }
                true
            })
            .filter_map(|entry_result| match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file()
                        && !(entry.path_is_symlink() && entry.path().is_file())
                    {
                        return None;
                    }
                    Some(Ok(FileRecord::new(
                        entry.path().to_path_buf(),
                        entry.file_name().to_string_lossy().into_owned(),
                    )))
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                    Some(Err(ScanError::Io { path, source }))
                }
            });

        Box::new(iter)
    }

    /// Collect all files, logging and skipping entries that could not be read.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotFound`] if the root does not exist and
    /// [`ScanError::InvalidPattern`] if an ignore pattern is malformed.
    pub fn files(&self) -> Result<Vec<FileRecord>, ScanError> {
        let mut files = Vec::new();
        for entry in self.walk() {
            match entry {
                Ok(file) => files.push(file),
                Err(e @ (ScanError::NotFound(_) | ScanError::InvalidPattern { .. })) => {
                    return Err(e)
                }
                Err(e) => log::warn!("Skipping unreadable entry: {}", e),
            }
        }
        log::debug!("Discovered {} files under {}", files.len(), self.root.display());
        Ok(files)
    }
}
