//! SQLite-backed content index.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Transaction};
use thiserror::Error;

use super::stream::{FileStream, PAGE_SIZE};
use crate::scanner::{FileRecord, Fingerprint, Fingerprinter, HashError};

const SCHEMA: &str = "
    CREATE TABLE hashes (
        hash_id INTEGER PRIMARY KEY AUTOINCREMENT,
        primary_digest TEXT NOT NULL,
        secondary_digest TEXT NOT NULL
    );
    CREATE UNIQUE INDEX idx_hashes ON hashes (primary_digest, secondary_digest);
    CREATE TABLE files (
        hash_id INTEGER NOT NULL,
        full_path TEXT NOT NULL,
        filename TEXT NOT NULL,
        FOREIGN KEY (hash_id) REFERENCES hashes (hash_id)
    );
    CREATE UNIQUE INDEX idx_paths ON files (full_path);
    CREATE INDEX idx_files_hash ON files (hash_id);
";

/// Error type for index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The storage engine rejected an operation. Writes are rolled back.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The file could not be fingerprinted.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The index directory could not be created.
    #[error("failed to create index directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for index operations.
pub type IndexResult<T> = std::result::Result<T, IndexError>;

/// Outcome of adding a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new file record was written.
    Added,
    /// The path was already indexed; nothing changed.
    AlreadyIndexed,
}

/// Persistent index of fingerprinted files.
pub struct IndexStore {
    conn: Connection,
    fingerprinter: Fingerprinter,
}

impl IndexStore {
    /// Opens (or creates) the index database at `path`.
    ///
    /// Missing parent directories are created. The schema is not touched;
    /// check [`IndexStore::is_initialized`] and call
    /// [`IndexStore::initialize_schema`] for a fresh store.
    pub fn open(path: &Path) -> IndexResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| IndexError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        log::debug!("Opened index at {}", path.display());
        Self::from_connection(conn)
    }

    /// Opens a transient in-memory index.
    pub fn open_in_memory() -> IndexResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> IndexResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn,
            fingerprinter: Fingerprinter::new(),
        })
    }

    /// Use a custom fingerprinter (e.g. a different sample size).
    #[must_use]
    pub fn with_fingerprinter(mut self, fingerprinter: Fingerprinter) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    /// The fingerprinter used for every lookup and insert.
    #[must_use]
    pub fn fingerprinter(&self) -> &Fingerprinter {
        &self.fingerprinter
    }

    /// Whether both index tables exist.
    pub fn is_initialized(&self) -> IndexResult<bool> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('hashes', 'files')",
            [],
            |row| row.get(0),
        )?;
        Ok(tables == 2)
    }

    /// Creates the `hashes` and `files` tables with their unique indexes.
    ///
    /// # Errors
    ///
    /// Fails with [`IndexError::Database`] if the schema already exists.
    pub fn initialize_schema(&mut self) -> IndexResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(SCHEMA)?;
        tx.commit()?;
        log::debug!("Index schema initialized");
        Ok(())
    }

    /// Fingerprints `file` and records it in the index.
    ///
    /// The hash record and the file record are written in one transaction.
    /// Both inserts ignore uniqueness conflicts, so re-adding an indexed
    /// path is a no-op.
    ///
    /// # Errors
    ///
    /// [`IndexError::Hash`] if the file cannot be read, and
    /// [`IndexError::Database`] if the write fails (the transaction is
    /// rolled back before returning).
    pub fn add_file(&mut self, file: &FileRecord) -> IndexResult<AddOutcome> {
        let fingerprint = self.fingerprinter.fingerprint(&file.full_path)?;

        let tx = self.conn.transaction()?;
        match insert_record(&tx, file, &fingerprint) {
            Ok(inserted) => {
                tx.commit()?;
                if inserted {
                    log::trace!("Indexed {}", file.full_path.display());
                    Ok(AddOutcome::Added)
                } else {
                    Ok(AddOutcome::AlreadyIndexed)
                }
            }
            Err(e) => {
                tx.rollback()?;
                Err(e.into())
            }
        }
    }

    /// Whether a hash record exists for `file`'s fingerprint. The path is ignored.
    pub fn is_indexed(&self, file: &FileRecord) -> IndexResult<bool> {
        let fingerprint = self.fingerprinter.fingerprint(&file.full_path)?;
        Ok(self.hash_id(&fingerprint)?.is_some())
    }

    /// Returns the first indexed file sharing `file`'s fingerprint.
    ///
    /// Ties are broken by insertion order: the earliest indexed file wins.
    pub fn fetch_by_fingerprint(&self, file: &FileRecord) -> IndexResult<Option<FileRecord>> {
        let fingerprint = self.fingerprinter.fingerprint(&file.full_path)?;
        self.find_by_fingerprint(&fingerprint)
    }

    /// Looks up the file record stored under `path`.
    pub fn lookup_path(&self, path: &Path) -> IndexResult<Option<FileRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT full_path, filename FROM files WHERE full_path = ?1",
                params![path_key(path)],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Number of distinct fingerprints (hash records) in the index.
    pub fn count(&self) -> IndexResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM hashes", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of file records in the index.
    pub fn file_count(&self) -> IndexResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Lazily enumerates every file record, [`PAGE_SIZE`] rows at a time.
    #[must_use]
    pub fn stream_files(&self) -> FileStream<'_> {
        FileStream::new(&self.conn, PAGE_SIZE)
    }

    #[cfg(test)]
    pub(crate) fn stream_files_paged(&self, page_size: usize) -> FileStream<'_> {
        FileStream::new(&self.conn, page_size)
    }

    /// Removes the file record for `path` and reclaims orphaned hash records.
    ///
    /// Returns `true` if a file record was removed. Both deletes run in one
    /// transaction; on failure nothing changes.
    pub fn delete(&mut self, path: &Path) -> IndexResult<bool> {
        let tx = self.conn.transaction()?;
        match delete_record(&tx, path) {
            Ok((removed, reclaimed)) => {
                tx.commit()?;
                if reclaimed > 0 {
                    log::trace!("Reclaimed {} orphaned hash record(s)", reclaimed);
                }
                Ok(removed)
            }
            Err(e) => {
                tx.rollback()?;
                Err(e.into())
            }
        }
    }

    /// Ids of hash records referenced by more than one file, ascending.
    pub fn duplicate_hash_ids(&self) -> IndexResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT hash_id FROM files GROUP BY hash_id HAVING COUNT(*) > 1 ORDER BY hash_id",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Paths of every file referencing `hash_id`, in insertion order.
    pub fn paths_for_hash(&self, hash_id: i64) -> IndexResult<Vec<PathBuf>> {
        let mut stmt = self
            .conn
            .prepare("SELECT full_path FROM files WHERE hash_id = ?1 ORDER BY rowid")?;
        let paths = stmt
            .query_map(params![hash_id], |row| row.get::<_, String>(0))?
            .map(|r| r.map(PathBuf::from))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(paths)
    }

    fn hash_id(&self, fingerprint: &Fingerprint) -> IndexResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT hash_id FROM hashes WHERE primary_digest = ?1 AND secondary_digest = ?2",
                params![fingerprint.primary, fingerprint.secondary],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn find_by_fingerprint(&self, fingerprint: &Fingerprint) -> IndexResult<Option<FileRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT f.full_path, f.filename
                 FROM files f
                 JOIN hashes h ON h.hash_id = f.hash_id
                 WHERE h.primary_digest = ?1 AND h.secondary_digest = ?2
                 ORDER BY f.rowid
                 LIMIT 1",
                params![fingerprint.primary, fingerprint.secondary],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Inserts the hash (if new) and the file (if new). Returns whether the file row was written.
fn insert_record(
    tx: &Transaction<'_>,
    file: &FileRecord,
    fingerprint: &Fingerprint,
) -> rusqlite::Result<bool> {
    tx.execute(
        "INSERT OR IGNORE INTO hashes (primary_digest, secondary_digest) VALUES (?1, ?2)",
        params![fingerprint.primary, fingerprint.secondary],
    )?;
    let hash_id: i64 = tx.query_row(
        "SELECT hash_id FROM hashes WHERE primary_digest = ?1 AND secondary_digest = ?2",
        params![fingerprint.primary, fingerprint.secondary],
        |row| row.get(0),
    )?;
    let inserted = tx.execute(
        "INSERT OR IGNORE INTO files (hash_id, full_path, filename) VALUES (?1, ?2, ?3)",
        params![hash_id, path_key(&file.full_path), file.filename],
    )?;
    Ok(inserted == 1)
}

/// Deletes a file row and every orphaned hash row. Returns (file removed, hashes reclaimed).
fn delete_record(tx: &Transaction<'_>, path: &Path) -> rusqlite::Result<(bool, usize)> {
    let removed = tx.execute(
        "DELETE FROM files WHERE full_path = ?1",
        params![path_key(path)],
    )?;
    let reclaimed = tx.execute(
        "DELETE FROM hashes WHERE NOT EXISTS (
             SELECT 1 FROM files f WHERE f.hash_id = hashes.hash_id
         )",
        [],
    )?;
    Ok((removed > 0, reclaimed))
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    let full_path: String = row.get(0)?;
    let filename: String = row.get(1)?;
    Ok(FileRecord::new(PathBuf::from(full_path), filename))
}

/// Paths are stored as text; non-UTF-8 components are replaced lossily.
fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
