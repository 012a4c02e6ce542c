//! Sampled two-part content fingerprints.
//!
//! # Overview
//!
//! A [`Fingerprint`] is computed from a bounded sample of a file rather than
//! its full content:
//!
//! - Files smaller than the sample size are read whole.
//! - Larger files contribute `sample_size / 2` bytes from the start followed
//!   by `sample_size / 2` bytes from the end.
//!
//! Two independent digests are taken over the same sample bytes: BLAKE3 as
//! the primary and SHA-256 as the secondary. Equal fingerprints therefore do
//! not prove equal content for large files; the duplicate resolver performs
//! the full comparison.
//!
//! # Example
//!
//! ```no_run
//! use hashdex::scanner::Fingerprinter;
//! use std::path::Path;
//!
//! let fingerprinter = Fingerprinter::new();
//! let fp = fingerprinter.fingerprint(Path::new("movie.mkv")).unwrap();
//! println!("{} / {}", fp.primary, fp.secondary);
//! ```

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::HashError;

/// Default sample threshold in bytes (1 MB).
pub const DEFAULT_SAMPLE_SIZE: u64 = 1_000_000;

/// Smallest usable sample size; a head/tail split needs at least one byte each.
const MIN_SAMPLE_SIZE: u64 = 2;

/// Two-part content digest over a file sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// BLAKE3 digest, lowercase hex (64 characters)
    pub primary: String,
    /// SHA-256 digest, lowercase hex (64 characters)
    pub secondary: String,
}

impl Fingerprint {
    /// Compute both digests over an in-memory sample.
    #[must_use]
    pub fn of_bytes(sample: &[u8]) -> Self {
        let primary = blake3::hash(sample).to_hex().to_string();
        let secondary = format!("{:x}", Sha256::digest(sample));
        Self { primary, secondary }
    }
}

/// Computes [`Fingerprint`]s from head/tail content samples.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    sample_size: u64,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter {
    /// Create a fingerprinter with the default 1 MB sample threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }

    /// Use a custom sample threshold (clamped to at least 2 bytes).
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: u64) -> Self {
        self.sample_size = sample_size.max(MIN_SAMPLE_SIZE);
        self
    }

    /// The configured sample threshold in bytes.
    #[must_use]
    pub fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// Read the sample bytes for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened, stat'ed, or read.
    pub fn sample(&self, path: &Path) -> Result<Vec<u8>, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let size = file
            .metadata()
            .map_err(|e| HashError::from_io(path, e))?
            .len();

        if size < self.sample_size {
            let mut content = Vec::with_capacity(size as usize);
            file.read_to_end(&mut content)
                .map_err(|e| HashError::from_io(path, e))?;
            return Ok(content);
        }

        let half = self.sample_size / 2;
        let mut content = vec![0u8; (half * 2) as usize];
        let (head, tail) = content.split_at_mut(half as usize);

        file.read_exact(head)
            .map_err(|e| HashError::from_io(path, e))?;
        file.seek(SeekFrom::End(-(half as i64)))
            .map_err(|e| HashError::from_io(path, e))?;
        file.read_exact(tail)
            .map_err(|e| HashError::from_io(path, e))?;

        Ok(content)
    }

    /// Fingerprint the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be read. Callers do not retry.
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let sample = self.sample(path)?;
        log::trace!("Fingerprinting {} ({} sample bytes)", path.display(), sample.len());
        Ok(Fingerprint::of_bytes(&sample))
    }
}
