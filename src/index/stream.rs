//! Paged enumeration of indexed files.
//!
//! [`FileStream`] walks the `files` table with a rowid cursor, fetching a
//! fixed number of rows per query. Only one page is held in memory at a
//! time, so large indexes can be enumerated without materializing the whole
//! table. The stream is finite and forward-only.

use std::collections::VecDeque;

use rusqlite::{params, Connection};

use super::database::IndexResult;
use crate::scanner::FileRecord;

/// Default number of rows fetched per page.
pub const PAGE_SIZE: usize = 1000;

/// Lazy iterator over every [`FileRecord`] in the index, in insertion order.
pub struct FileStream<'a> {
    conn: &'a Connection,
    page_size: usize,
    last_rowid: i64,
    buffer: VecDeque<FileRecord>,
    exhausted: bool,
}

impl<'a> FileStream<'a> {
    pub(crate) fn new(conn: &'a Connection, page_size: usize) -> Self {
        Self {
            conn,
            page_size: page_size.max(1),
            last_rowid: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fetch_page(&mut self) -> IndexResult<()> {
        let conn = self.conn;
        let mut stmt = conn.prepare_cached(
            "SELECT rowid, full_path, filename FROM files WHERE rowid > ?1 ORDER BY rowid LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![self.last_rowid, self.page_size as i64], |row| {
            let rowid: i64 = row.get(0)?;
            let full_path: String = row.get(1)?;
            let filename: String = row.get(2)?;
            Ok((rowid, FileRecord::new(full_path.into(), filename)))
        })?;

        let mut fetched = 0;
        for row in rows {
            let (rowid, record) = row?;
            self.last_rowid = rowid;
            self.buffer.push_back(record);
            fetched += 1;
        }

        if fetched < self.page_size {
            self.exhausted = true;
        }
        log::trace!("Fetched page of {} file record(s)", fetched);
        Ok(())
    }
}

impl Iterator for FileStream<'_> {
    type Item = IndexResult<FileRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

impl std::iter::FusedIterator for FileStream<'_> {}
