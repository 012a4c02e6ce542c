//! Command-line interface definitions for hashdex.
//!
//! Global options (verbosity, color, index location) apply to every
//! subcommand.
//!
//! # Example
//!
//! ```bash
//! # Index a directory into the default index
//! hashdex index ~/Photos
//!
//! # Report files under ~/Downloads that are already indexed
//! hashdex check ~/Downloads
//!
//! # Move them aside instead
//! hashdex check ~/Downloads --move-to ~/dupes
//!
//! # Show groups of indexed files sharing a fingerprint, as JSON
//! hashdex duplicates --output json
//!
//! # Forget indexed files that no longer exist
//! hashdex --index /tmp/photos.db cleanup
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::actions::Disposition;
use crate::config::Config;

/// Content-fingerprint index for finding duplicate files.
///
/// hashdex records a fingerprint of every file it indexes in a SQLite
/// database, then checks new files against it, lists indexed duplicates,
/// and forgets files that have disappeared.
#[derive(Debug, Parser)]
#[command(name = "hashdex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Path to the index database
    ///
    /// Overrides the config file and HASHDEX_INDEX_PATH.
    #[arg(long, global = true, value_name = "PATH")]
    pub index: Option<PathBuf>,

    /// Fingerprint sample size (e.g., 1MB, 64KiB)
    ///
    /// Must match the value the index was built with.
    #[arg(long, global = true, value_name = "SIZE", value_parser = parse_size)]
    pub sample_size: Option<u64>,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add every file under a path to the index
    Index(IndexArgs),
    /// Find files under a path whose content is already indexed
    Check(CheckArgs),
    /// List indexed files that share a fingerprint
    Duplicates(DuplicatesArgs),
    /// Remove index entries whose files no longer exist
    Cleanup,
}

/// Scanner options shared by `index` and `check`.
#[derive(Debug, Clone, Default, Args)]
pub struct ScanOptions {
    /// Glob patterns to ignore (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Also exclude files matched by the scan root's .gitignore
    #[arg(long)]
    pub respect_gitignore: bool,
}

impl ScanOptions {
    /// Layer these flags over `config`. Flags only ever enable options.
    pub fn apply_to(&self, config: &mut Config) {
        config.follow_symlinks |= self.follow_symlinks;
        config.skip_hidden |= self.skip_hidden;
        config.respect_gitignore |= self.respect_gitignore;
        config
            .ignore_patterns
            .extend(self.ignore_patterns.iter().cloned());
    }
}

/// Arguments for the index subcommand.
#[derive(Debug, Args)]
pub struct IndexArgs {
    /// File or directory to index
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    #[command(flatten)]
    pub scan: ScanOptions,
}

/// Arguments for the check subcommand.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// File or directory to check against the index
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Delete files whose content is already indexed (to the trash by default)
    #[arg(long, conflicts_with = "move_to")]
    pub delete: bool,

    /// With --delete, remove files permanently instead of using the trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long, requires = "delete")]
    pub permanent: bool,

    /// Move files whose content is already indexed into DIR
    #[arg(long, value_name = "DIR")]
    pub move_to: Option<PathBuf>,

    #[command(flatten)]
    pub scan: ScanOptions,
}

impl CheckArgs {
    /// The disposition selected by the flags; report-only by default.
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        if let Some(ref target) = self.move_to {
            Disposition::Move {
                target: target.clone(),
            }
        } else if self.delete {
            Disposition::Delete {
                permanent: self.permanent,
            }
        } else {
            Disposition::Report
        }
    }
}

/// Arguments for the duplicates subcommand.
#[derive(Debug, Args)]
pub struct DuplicatesArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output format for the duplicates report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored text
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl Cli {
    /// Layer the global flags over `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref index) = self.index {
            config.index_path = Some(index.clone());
        }
        if let Some(sample_size) = self.sample_size {
            config.sample_size = sample_size;
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB (case insensitive).
///
/// # Examples
///
/// ```
/// use hashdex::cli::parse_size;
///
/// assert_eq!(parse_size("64KiB").unwrap(), 65_536);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
