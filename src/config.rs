//! Application configuration management.
//!
//! Settings are layered with figment, later layers overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. `config.toml` in the platform config directory
//! 3. `HASHDEX_*` environment variables (e.g. `HASHDEX_INDEX_PATH`)
//! 4. Command-line flags, applied by the caller
//!
//! The index location is an ordinary configuration value; nothing in the
//! library reads a global default.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::scanner::{Fingerprinter, WalkerConfig, DEFAULT_SAMPLE_SIZE};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "HASHDEX_";

/// File name of the index inside the config directory.
pub const INDEX_FILE_NAME: &str = "index.db";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Index database location; `None` means [`default_index_path`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,

    /// Fingerprint sample threshold in bytes.
    #[serde(default = "default_sample_size")]
    pub sample_size: u64,

    /// Skip hidden files and directories while scanning.
    #[serde(default)]
    pub skip_hidden: bool,

    /// Follow symbolic links while scanning.
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Gitignore-style patterns excluded from scans.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Apply the scan root's `.gitignore` as well.
    #[serde(default)]
    pub respect_gitignore: bool,
}

fn default_sample_size() -> u64 {
    DEFAULT_SAMPLE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_path: None,
            sample_size: DEFAULT_SAMPLE_SIZE,
            skip_hidden: false,
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            respect_gitignore: false,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path and
    /// the environment, falling back to defaults if extraction fails.
    pub fn load() -> Self {
        let path = config_path().ok();
        match Self::figment(path.as_deref()).extract::<Self>() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// The figment stack: defaults, then `config_file` (if any), then the
    /// environment.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = config_file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Save the configuration as TOML to the default platform-specific path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    /// Save the configuration as TOML to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// The index location: the configured path, else [`default_index_path`].
    pub fn resolved_index_path(&self) -> Result<PathBuf> {
        match &self.index_path {
            Some(path) => Ok(path.clone()),
            None => default_index_path(),
        }
    }

    /// Scanner settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.follow_symlinks,
            self.skip_hidden,
            self.ignore_patterns.clone(),
        )
        .with_respect_gitignore(self.respect_gitignore)
    }

    /// Fingerprinter using the configured sample size.
    #[must_use]
    pub fn fingerprinter(&self) -> Fingerprinter {
        Fingerprinter::new().with_sample_size(self.sample_size)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "hashdex", "hashdex")
        .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))
}

/// The platform-specific configuration file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// The platform-specific default index location.
pub fn default_index_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(INDEX_FILE_NAME))
}
