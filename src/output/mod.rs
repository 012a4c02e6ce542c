//! Output formatters for duplicate reports.
//!
//! - [`text`] streams colored, human-readable groups as they resolve
//! - [`json`] collects a machine-readable report for scripting
//!
//! # Example
//!
//! ```no_run
//! use hashdex::duplicates::DuplicateResolver;
//! use hashdex::index::IndexStore;
//! use hashdex::output::json::JsonReport;
//! use std::path::Path;
//!
//! let store = IndexStore::open(Path::new("index.db")).unwrap();
//! let groups: Vec<_> = DuplicateResolver::new(&store)
//!     .find_duplicate_groups()
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! println!("{}", JsonReport::new(&groups).to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutputError, JsonReport};
pub use text::TextOutput;
