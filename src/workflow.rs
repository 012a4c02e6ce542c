//! Batch operations over an index: add, check, duplicates and cleanup.
//!
//! [`IndexingWorkflow`] owns one [`IndexStore`] and drives it over a batch
//! of [`FileRecord`]s. Per-file failures are logged and tallied so one bad
//! file never sinks a whole batch; only destructive-operation failures
//! during `check` abort it, and even then the files handled so far are
//! returned with the error.
//!
//! # Example
//!
//! ```no_run
//! use hashdex::config::Config;
//! use hashdex::scanner::DirectoryScanner;
//! use hashdex::workflow::IndexingWorkflow;
//! use std::path::Path;
//!
//! let config = Config::load();
//! let mut workflow = IndexingWorkflow::open(&config).unwrap();
//! let files = DirectoryScanner::new(Path::new("."), config.walker_config())
//!     .files()
//!     .unwrap();
//! let summary = workflow.add(&files).unwrap();
//! println!("Successfully indexed {} files", summary.processed);
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::actions::{self, ActionError, ActionOutcome, Disposition};
use crate::config::Config;
use crate::duplicates::{DuplicateGroup, DuplicateResolver, ResolveError};
use crate::index::{AddOutcome, IndexError, IndexStore};
use crate::progress::ProgressCallback;
use crate::scanner::FileRecord;

/// Errors that abort a workflow operation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No index location was configured and none could be derived.
    #[error("cannot determine index location: {0}")]
    NoIndexLocation(String),

    /// The index could not be opened or queried.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// A delete or move failed.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// A check batch stopped part way; `summary` holds the files handled
    /// before `source` occurred. The rest of the batch was not processed.
    #[error("check stopped after {} handled files", .summary.matches.len())]
    CheckAborted {
        summary: Box<CheckSummary>,
        #[source]
        source: Box<WorkflowError>,
    },

    /// Duplicate resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Tally of an [`IndexingWorkflow::add`] batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddSummary {
    /// Files visited, including failures
    pub processed: usize,
    /// Files newly recorded
    pub added: usize,
    /// Files whose path was already in the index
    pub already_indexed: usize,
    /// Files that could not be fingerprinted or stored
    pub failures: Vec<FileFailure>,
    /// Distinct fingerprints in the index after the batch
    pub fingerprints: u64,
    /// The batch stopped early on a shutdown request
    pub interrupted: bool,
}

/// One file found to duplicate an indexed original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMatch {
    /// The checked file
    pub path: PathBuf,
    /// The indexed original it matched
    pub original: PathBuf,
    /// What was done to `path`
    pub outcome: ActionOutcome,
}

/// Tally of an [`IndexingWorkflow::check`] batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Files visited
    pub processed: usize,
    /// Files whose fingerprint was already indexed
    pub matches: Vec<CheckMatch>,
    /// Files that are themselves the indexed original
    pub skipped_originals: usize,
    /// Files that could not be fingerprinted
    pub failures: Vec<FileFailure>,
    /// The batch stopped early on a shutdown request
    pub interrupted: bool,
}

/// Tally of an [`IndexingWorkflow::cleanup`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    /// Records examined
    pub scanned: usize,
    /// Paths removed from the index because they no longer exist
    pub removed: Vec<PathBuf>,
    /// Stale records that could not be removed
    pub failures: Vec<FileFailure>,
    /// The pass stopped early on a shutdown request
    pub interrupted: bool,
}

/// Drives batch operations against one index.
pub struct IndexingWorkflow {
    store: IndexStore,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for IndexingWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexingWorkflow")
            .field("shutdown_flag", &self.shutdown_flag)
            .field("progress", &self.progress.as_ref().map(|_| "ProgressCallback"))
            .finish_non_exhaustive()
    }
}

impl IndexingWorkflow {
    /// Opens the index named by `config`, creating its schema if absent.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NoIndexLocation`] if no path is configured and the
    /// platform directories are unknown; [`WorkflowError::Index`] if the
    /// database cannot be opened or initialized.
    pub fn open(config: &Config) -> Result<Self, WorkflowError> {
        let path = config
            .resolved_index_path()
            .map_err(|e| WorkflowError::NoIndexLocation(e.to_string()))?;
        let store = IndexStore::open(&path)?.with_fingerprinter(config.fingerprinter());
        log::debug!("Using index at {}", path.display());
        Self::from_store(store)
    }

    /// Wraps an already opened store, creating its schema if absent.
    pub fn from_store(mut store: IndexStore) -> Result<Self, WorkflowError> {
        if !store.is_initialized()? {
            store.initialize_schema()?;
            log::info!("Created new index");
        }
        Ok(Self {
            store,
            shutdown_flag: None,
            progress: None,
        })
    }

    /// Stop batches between files once `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Report progress to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    #[must_use]
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn phase_start(&self, phase: &str, total: usize) {
        if let Some(ref progress) = self.progress {
            progress.on_phase_start(phase, total);
        }
    }

    fn phase_progress(&self, current: usize, path: &std::path::Path) {
        if let Some(ref progress) = self.progress {
            progress.on_progress(current, &path.to_string_lossy());
        }
    }

    fn phase_end(&self, phase: &str) {
        if let Some(ref progress) = self.progress {
            progress.on_phase_end(phase);
        }
    }

    fn abort_check(&self, summary: CheckSummary, source: impl Into<WorkflowError>) -> WorkflowError {
        self.phase_end("check");
        WorkflowError::CheckAborted {
            summary: Box::new(summary),
            source: Box::new(source.into()),
        }
    }

    /// Adds every file to the index.
    ///
    /// Fingerprinting and storage failures are logged, recorded in
    /// [`AddSummary::failures`], and the batch moves on.
    ///
    /// # Errors
    ///
    /// Only the final fingerprint count can fail the call.
    pub fn add(&mut self, files: &[FileRecord]) -> Result<AddSummary, WorkflowError> {
        let mut summary = AddSummary::default();
        self.phase_start("index", files.len());

        for file in files {
            if self.is_shutdown_requested() {
                log::info!("Indexing interrupted after {} files", summary.processed);
                summary.interrupted = true;
                break;
            }

            summary.processed += 1;
            self.phase_progress(summary.processed, &file.full_path);

            match self.store.add_file(file) {
                Ok(AddOutcome::Added) => summary.added += 1,
                Ok(AddOutcome::AlreadyIndexed) => {
                    log::debug!("Already indexed: {}", file.full_path.display());
                    summary.already_indexed += 1;
                }
                Err(e) => {
                    log::warn!("Failed to index {}: {}", file.full_path.display(), e);
                    summary.failures.push(FileFailure {
                        path: file.full_path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        self.phase_end("index");
        summary.fingerprints = self.store.count()?;
        log::debug!(
            "Index batch: {} processed, {} added, {} already indexed, {} failed",
            summary.processed,
            summary.added,
            summary.already_indexed,
            summary.failures.len()
        );
        Ok(summary)
    }

    /// Applies `disposition` to every file whose fingerprint is already
    /// indexed under a different path.
    ///
    /// Unseen fingerprints are left alone, as are files that are themselves
    /// the indexed original. When a deleted or moved file was indexed, its
    /// record is dropped from the store.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::CheckAborted`] as soon as a delete, a move or the
    /// database fails. Its summary lists the files handled up to that point,
    /// which stay handled; its source is the [`WorkflowError::Action`] or
    /// [`WorkflowError::Index`] that stopped the batch. Files that cannot be
    /// read are recorded in [`CheckSummary::failures`] instead.
    pub fn check(
        &mut self,
        files: &[FileRecord],
        disposition: &Disposition,
    ) -> Result<CheckSummary, WorkflowError> {
        let mut summary = CheckSummary::default();
        self.phase_start("check", files.len());

        for file in files {
            if self.is_shutdown_requested() {
                log::info!("Check interrupted after {} files", summary.processed);
                summary.interrupted = true;
                break;
            }

            summary.processed += 1;
            self.phase_progress(summary.processed, &file.full_path);

            let original = match self.store.fetch_by_fingerprint(file) {
                Ok(Some(original)) => original,
                Ok(None) => continue,
                Err(IndexError::Hash(e)) => {
                    log::warn!("Failed to check {}: {}", file.full_path.display(), e);
                    summary.failures.push(FileFailure {
                        path: file.full_path.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(self.abort_check(summary, e)),
            };

            if original.full_path == file.full_path {
                log::debug!("Skipping indexed original {}", file.full_path.display());
                summary.skipped_originals += 1;
                continue;
            }

            let outcome = match actions::apply(disposition, &file.full_path) {
                Ok(outcome) => outcome,
                Err(e) => return Err(self.abort_check(summary, e)),
            };

            let dropped = if disposition.removes_source() {
                self.store.delete(&file.full_path)
            } else {
                Ok(false)
            };

            summary.matches.push(CheckMatch {
                path: file.full_path.clone(),
                original: original.full_path,
                outcome,
            });

            match dropped {
                Ok(true) => log::debug!("Dropped {} from the index", file.full_path.display()),
                Ok(false) => {}
                Err(e) => return Err(self.abort_check(summary, e)),
            }
        }

        self.phase_end("check");
        Ok(summary)
    }

    /// Lazily resolves every fingerprint shared by more than one file.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Index`] if the candidate query fails.
    pub fn duplicates(
        &self,
    ) -> Result<impl Iterator<Item = Result<DuplicateGroup, ResolveError>> + '_, ResolveError> {
        DuplicateResolver::new(&self.store).find_duplicate_groups()
    }

    /// Removes every record whose path no longer exists on disk.
    ///
    /// Stale paths are collected from a full stream of the index first and
    /// deleted afterwards; each delete also reclaims orphaned fingerprints.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Index`] if the index cannot be enumerated.
    pub fn cleanup(&mut self) -> Result<CleanupSummary, WorkflowError> {
        let mut summary = CleanupSummary::default();
        let total = usize::try_from(self.store.file_count()?).unwrap_or(usize::MAX);
        self.phase_start("cleanup", total);

        let mut stale = Vec::new();
        for record in self.store.stream_files() {
            if self.is_shutdown_requested() {
                summary.interrupted = true;
                break;
            }
            let record = record?;
            summary.scanned += 1;
            self.phase_progress(summary.scanned, &record.full_path);
            if record.full_path.symlink_metadata().is_err() {
                stale.push(record.full_path);
            }
        }

        for path in stale {
            if self.is_shutdown_requested() {
                summary.interrupted = true;
                break;
            }
            match self.store.delete(&path) {
                Ok(true) => {
                    log::debug!("Removed stale entry {}", path.display());
                    summary.removed.push(path);
                }
                Ok(false) => {}
                Err(e) => {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                    summary.failures.push(FileFailure {
                        message: e.to_string(),
                        path,
                    });
                }
            }
        }

        self.phase_end("cleanup");
        Ok(summary)
    }
}
