//! Application configuration management.
//!
//! Settings are layered: built-in defaults, then a JSON config file, then
//! command-line flags. Every field in the file is optional; an absent field
//! leaves the default in place.
//!
//! ```json
//! {
//!   "jobs": 8,
//!   "queue_capacity": 4096,
//!   "ignore_patterns": ["*.tmp", "node_modules/"]
//! }
//! ```

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::duplicates::FinderConfig;

/// Application configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Fingerprint worker threads.
    #[serde(default)]
    pub jobs: Option<usize>,
    /// Detector worker threads.
    #[serde(default)]
    pub detector_jobs: Option<usize>,
    /// Capacity of each inter-stage queue.
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    /// Read buffer size in bytes.
    #[serde(default)]
    pub buffer_size: Option<usize>,
    /// Skip hidden files and directories.
    #[serde(default)]
    pub skip_hidden: Option<bool>,
    /// Descend into symlinked directories.
    #[serde(default)]
    pub follow_symlinks: Option<bool>,
    /// Extra gitignore-style patterns.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        let loaded = Self::config_path().and_then(|path| {
            if path.exists() {
                Self::load_from(&path)
            } else {
                Ok(Self::default())
            }
        });
        match loaded {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load the configuration from `path`, or the default location if `None`.
    ///
    /// An explicitly named file that cannot be loaded is reported at warn
    /// level before falling back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            None => Self::load(),
            Some(path) => Self::load_from(path).unwrap_or_else(|e| {
                log::warn!("Ignoring config file: {:#}", e);
                Self::default()
            }),
        }
    }

    /// Load the configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay the values present in this file onto `finder`.
    #[must_use]
    pub fn apply(&self, mut finder: FinderConfig) -> FinderConfig {
        if let Some(jobs) = self.jobs {
            finder = finder.with_fingerprint_workers(jobs);
        }
        // Detector pool follows the fingerprint pool unless set explicitly
        let detectors = self.detector_jobs.unwrap_or(finder.fingerprint_workers);
        finder = finder.with_detector_workers(detectors);
        if let Some(capacity) = self.queue_capacity {
            finder = finder.with_queue_capacity(capacity);
        }
        if let Some(size) = self.buffer_size {
            finder = finder.with_buffer_size(size);
        }
        if let Some(skip_hidden) = self.skip_hidden {
            finder.walker_config.skip_hidden = skip_hidden;
        }
        if let Some(follow) = self.follow_symlinks {
            finder.walker_config.follow_symlinks = follow;
        }
        finder
            .walker_config
            .ignore_patterns
            .extend(self.ignore_patterns.iter().cloned());
        finder
    }

    /// Get the default platform-specific configuration path.
    fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "dupepair", "dupepair")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.json"))
    }
}
