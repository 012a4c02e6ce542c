//! JSON output formatter for duplicate reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00Z",
//!   "groups": [
//!     {
//!       "hash_id": 3,
//!       "is_equal": false,
//!       "confirmed": ["/path/a.txt", "/path/b.txt"],
//!       "collisions": ["/path/c.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "groups": 1,
//!     "equal_groups": 0,
//!     "collision_groups": 1
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, GroupStats};

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    pub hash_id: i64,
    pub is_equal: bool,
    pub confirmed: Vec<String>,
    pub collisions: Vec<String>,
}

impl From<&DuplicateGroup> for JsonGroup {
    fn from(group: &DuplicateGroup) -> Self {
        let to_strings = |paths: &[std::path::PathBuf]| -> Vec<String> {
            paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect()
        };
        Self {
            hash_id: group.hash_id,
            is_equal: group.is_equal(),
            confirmed: to_strings(&group.confirmed),
            collisions: to_strings(&group.collisions),
        }
    }
}

/// Summary counts in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    pub groups: usize,
    pub equal_groups: usize,
    pub collision_groups: usize,
}

impl From<&GroupStats> for JsonSummary {
    fn from(stats: &GroupStats) -> Self {
        Self {
            groups: stats.groups,
            equal_groups: stats.equal_groups,
            collision_groups: stats.collision_groups,
        }
    }
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub generated_at: DateTime<Utc>,
    pub groups: Vec<JsonGroup>,
    pub summary: JsonSummary,
}

impl JsonReport {
    #[must_use]
    pub fn new(groups: &[DuplicateGroup]) -> Self {
        Self {
            generated_at: Utc::now(),
            groups: groups.iter().map(JsonGroup::from).collect(),
            summary: JsonSummary::from(&GroupStats::from_groups(groups)),
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
