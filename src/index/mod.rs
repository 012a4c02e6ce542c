//! Persistent content index for hashdex.
//!
//! This module stores fingerprinted files in SQLite so duplicates can be
//! found across runs and across directory trees.
//!
//! # Architecture
//!
//! * [`database`]: Schema management, transactional writes and lookups.
//! * [`stream`]: Paged, forward-only enumeration of every indexed file.
//!
//! # Schema
//!
//! ```text
//! hashes(hash_id INTEGER PRIMARY KEY AUTOINCREMENT, primary_digest, secondary_digest)
//!     UNIQUE (primary_digest, secondary_digest)
//! files(hash_id -> hashes.hash_id, full_path, filename)
//!     UNIQUE (full_path)
//! ```
//!
//! A hash record is shared by every file with the same fingerprint. When the
//! last file referencing it is deleted, the hash record is reclaimed in the
//! same transaction.

pub mod database;
pub mod stream;

pub use database::{AddOutcome, IndexError, IndexResult, IndexStore};
pub use stream::{FileStream, PAGE_SIZE};
