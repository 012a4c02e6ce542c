//! Human-readable duplicate report.
//!
//! Each group starts with a separator line, lists its confirmed members
//! (reference first) and, when present, a separate list of hash collisions.

use std::io::{self, Write};
use std::path::Path;

use yansi::Paint;

use crate::duplicates::{DuplicateGroup, GroupStats};

const SEPARATOR: &str = "----------------------------------------";

/// Streaming text writer for duplicate groups.
pub struct TextOutput<W: Write> {
    writer: W,
    stats: GroupStats,
}

impl<W: Write> TextOutput<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            stats: GroupStats::default(),
        }
    }

    /// Write one group and fold it into the running totals.
    pub fn write_group(&mut self, group: &DuplicateGroup) -> io::Result<()> {
        self.stats.record(group);

        writeln!(self.writer, "{}", SEPARATOR.dim())?;
        let heading = format!("Fingerprint #{} ({} files)", group.hash_id, group.len());
        writeln!(self.writer, "{}", heading.bold())?;

        for (i, path) in group.confirmed.iter().enumerate() {
            let marker = if i == 0 { "*" } else { " " };
            writeln!(self.writer, "  {} {}", marker.green(), display(path))?;
        }

        if !group.collisions.is_empty() {
            writeln!(self.writer, "  {}", "hash collisions:".yellow().bold())?;
            for path in &group.collisions {
                writeln!(self.writer, "  {} {}", "!".yellow(), display(path))?;
            }
        }
        Ok(())
    }

    /// Write the closing totals.
    pub fn finish(&mut self) -> io::Result<GroupStats> {
        if self.stats.groups > 0 {
            writeln!(self.writer, "{}", SEPARATOR.dim())?;
        }
        writeln!(
            self.writer,
            "{} shared fingerprints: {} fully equal, {} with collisions",
            self.stats.groups, self.stats.equal_groups, self.stats.collision_groups
        )?;
        self.writer.flush()?;
        Ok(self.stats.clone())
    }

    /// Totals for the groups written so far.
    #[must_use]
    pub fn stats(&self) -> &GroupStats {
        &self.stats
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
