//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Grouping indexed files that share a fingerprint
//! - Full-content verification separating true duplicates from hash collisions

pub mod groups;
pub mod resolver;

pub use groups::{DuplicateGroup, GroupStats};
pub use resolver::{files_identical, resolve_group, DuplicateResolver, ResolveError};
