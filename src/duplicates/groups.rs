//! Duplicate groups derived from the index.
//!
//! # Overview
//!
//! A [`DuplicateGroup`] is built for every hash record shared by two or more
//! indexed files. The first file (in storage order) is the reference member;
//! every other member is compared against it byte for byte and lands in
//! either `confirmed` or `collisions`.
//!
//! # Example
//!
//! ```
//! use hashdex::duplicates::DuplicateGroup;
//! use std::path::PathBuf;
//!
//! let mut group = DuplicateGroup::new(7, PathBuf::from("/a.txt"));
//! group.add_confirmed(PathBuf::from("/b.txt"));
//! assert!(group.is_equal());
//!
//! group.add_collision(PathBuf::from("/c.txt"));
//! assert!(!group.is_equal());
//! assert_eq!(group.len(), 3);
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Files sharing one fingerprint, split by full-content equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Hash record shared by every member
    pub hash_id: i64,
    /// Reference member followed by every member with identical content
    pub confirmed: Vec<PathBuf>,
    /// Members whose content differs from the reference despite equal fingerprints
    pub collisions: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a group seeded with its reference member.
    #[must_use]
    pub fn new(hash_id: i64, reference: PathBuf) -> Self {
        Self {
            hash_id,
            confirmed: vec![reference],
            collisions: Vec::new(),
        }
    }

    /// The first-seen member all others were compared against.
    #[must_use]
    pub fn reference(&self) -> Option<&Path> {
        self.confirmed.first().map(PathBuf::as_path)
    }

    pub fn add_confirmed(&mut self, path: PathBuf) {
        self.confirmed.push(path);
    }

    pub fn add_collision(&mut self, path: PathBuf) {
        self.collisions.push(path);
    }

    /// True when at least one member is confirmed and no collision was found.
    #[must_use]
    pub fn is_equal(&self) -> bool {
        !self.confirmed.is_empty() && self.collisions.is_empty()
    }

    /// Every member, confirmed first.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.confirmed
            .iter()
            .chain(self.collisions.iter())
            .map(PathBuf::as_path)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.confirmed.len() + self.collisions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Order-insensitive comparison of the confirmed and collision sets.
    #[must_use]
    pub fn same_members(&self, other: &DuplicateGroup) -> bool {
        fn set(paths: &[PathBuf]) -> HashSet<&Path> {
            paths.iter().map(PathBuf::as_path).collect()
        }
        set(&self.confirmed) == set(&other.confirmed)
            && set(&self.collisions) == set(&other.collisions)
    }
}

/// Aggregate counts over a set of resolved groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    /// Groups reported
    pub groups: usize,
    /// Groups with no collisions
    pub equal_groups: usize,
    /// Groups containing at least one collision
    pub collision_groups: usize,
    /// Confirmed members beyond the reference, summed over all groups
    pub redundant_files: usize,
}

impl GroupStats {
    /// Tally `groups`.
    #[must_use]
    pub fn from_groups(groups: &[DuplicateGroup]) -> Self {
        let mut stats = Self::default();
        for group in groups {
            stats.record(group);
        }
        stats
    }

    /// Fold one group into the tally.
    pub fn record(&mut self, group: &DuplicateGroup) {
        self.groups += 1;
        if group.is_equal() {
            self.equal_groups += 1;
        } else {
            self.collision_groups += 1;
        }
        self.redundant_files += group.confirmed.len().saturating_sub(1);
    }
}
