//! Duplicate resolution with full-content verification.
//!
//! # Overview
//!
//! Fingerprints only sample large files, so two files can share a hash
//! record and still differ. [`DuplicateResolver`] walks every shared hash
//! record, takes the first file as the reference, and compares each other
//! member against it byte for byte:
//!
//! 1. **Length check**: different sizes can never be equal.
//! 2. **Chunked comparison**: both files are read in lockstep and compared
//!    chunk by chunk, stopping at the first difference.
//!
//! The resolver never writes to the index.
//!
//! # Example
//!
//! ```no_run
//! use hashdex::duplicates::DuplicateResolver;
//! use hashdex::index::IndexStore;
//! use std::path::Path;
//!
//! let store = IndexStore::open(Path::new("index.db")).unwrap();
//! for group in DuplicateResolver::new(&store).find_duplicate_groups().unwrap() {
//!     let group = group.unwrap();
//!     println!("{} confirmed, {} collisions", group.confirmed.len(), group.collisions.len());
//! }
//! ```

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::groups::DuplicateGroup;
use crate::index::{IndexError, IndexStore};

/// Read size used for chunked content comparison.
const COMPARE_CHUNK: usize = 64 * 1024;

/// Errors that can occur while resolving duplicate groups.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A group member could not be read for comparison.
    #[error("I/O error comparing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The index could not be queried.
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Groups indexed files by shared fingerprint and confirms true equality.
pub struct DuplicateResolver<'a> {
    store: &'a IndexStore,
}

impl<'a> DuplicateResolver<'a> {
    #[must_use]
    pub fn new(store: &'a IndexStore) -> Self {
        Self { store }
    }

    /// Lazily yields one [`DuplicateGroup`] per hash record shared by more
    /// than one file.
    ///
    /// Candidate hash ids are collected up front; each group's members are
    /// loaded and compared only when the iterator reaches it. A comparison
    /// failure is yielded as an error for that group and iteration continues.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Index`] if the candidate query fails.
    pub fn find_duplicate_groups(
        &self,
    ) -> Result<impl Iterator<Item = Result<DuplicateGroup, ResolveError>> + 'a, ResolveError>
    {
        let store = self.store;
        let hash_ids = store.duplicate_hash_ids()?;
        log::debug!("{} hash record(s) shared by multiple files", hash_ids.len());

        Ok(hash_ids.into_iter().map(move |hash_id| {
            let paths = store.paths_for_hash(hash_id)?;
            resolve_group(hash_id, paths)
        }))
    }
}

/// Split `paths` into confirmed members and collisions relative to the first path.
///
/// # Errors
///
/// Returns [`ResolveError::Io`] if any member cannot be read.
pub fn resolve_group(hash_id: i64, paths: Vec<PathBuf>) -> Result<DuplicateGroup, ResolveError> {
    let mut members = paths.into_iter();
    let Some(reference) = members.next() else {
        return Ok(DuplicateGroup {
            hash_id,
            confirmed: Vec::new(),
            collisions: Vec::new(),
        });
    };

    let mut group = DuplicateGroup::new(hash_id, reference);
    for candidate in members {
        let reference = group.confirmed[0].as_path();
        if files_identical(reference, &candidate)? {
            group.add_confirmed(candidate);
        } else {
            log::warn!(
                "Hash collision: {} shares a fingerprint with {} but differs in content",
                candidate.display(),
                reference.display()
            );
            group.add_collision(candidate);
        }
    }

    Ok(group)
}

/// Byte-for-byte comparison of two files.
///
/// # Errors
///
/// Returns [`ResolveError::Io`] naming the path that could not be read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, ResolveError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ResolveError::Io { path, source }
    };

    let len_a = std::fs::metadata(a).map_err(io_err(a))?.len();
    let len_b = std::fs::metadata(b).map_err(io_err(b))?.len();
    if len_a != len_b {
        return Ok(false);
    }

    let mut reader_a = BufReader::with_capacity(COMPARE_CHUNK, File::open(a).map_err(io_err(a))?);
    let mut reader_b = BufReader::with_capacity(COMPARE_CHUNK, File::open(b).map_err(io_err(b))?);
    let mut buf_a = vec![0u8; COMPARE_CHUNK];
    let mut buf_b = vec![0u8; COMPARE_CHUNK];

    loop {
        let n = read_full(&mut reader_a, &mut buf_a).map_err(io_err(a))?;
        let m = read_full(&mut reader_b, &mut buf_b).map_err(io_err(b))?;
        if n != m || buf_a[..n] != buf_b[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
