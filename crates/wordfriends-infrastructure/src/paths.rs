//! Unified path management for Word'n'Friends configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/wordfriends/       # Config directory ($WORDFRIENDS_CONFIG_DIR overrides)
//! ├── profiles.toml            # User profiles and the current profile id
//! ├── settings.toml            # Lookup preferences
//! ├── defaults.ini             # Built-in profile source
//! └── prompts/                 # Optional system prompt templates
//!     └── system_{table,sentence,empty}.md
//! ```

use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "WORDFRIENDS_CONFIG_DIR";

const APP_DIR_NAME: &str = "wordfriends";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolved locations of every file the application reads or writes.
#[derive(Debug, Clone)]
pub struct WordPaths {
    root: PathBuf,
}

impl WordPaths {
    /// Resolves the config root.
    ///
    /// Priority: explicit `base`, then `$WORDFRIENDS_CONFIG_DIR`, then the
    /// platform config directory joined with `wordfriends`.
    pub fn new(base: Option<&Path>) -> Result<Self, PathError> {
        if let Some(base) = base {
            return Ok(Self::with_root(base));
        }

        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(dir)));
        }

        dirs::config_dir()
            .map(|dir| Self::with_root(dir.join(APP_DIR_NAME)))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profiles_file(&self) -> PathBuf {
        self.root.join("profiles.toml")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.toml")
    }

    pub fn defaults_file(&self) -> PathBuf {
        self.root.join("defaults.ini")
    }

    pub fn prompts_dir(&self) -> PathBuf {
        self.root.join("prompts")
    }
}
