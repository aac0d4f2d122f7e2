//! Unified path management for Markaz files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/markaz/            # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/markaz/       # Data directory
//! ├── state.json               # Active chat id
//! └── chats/                   # One JSON file per chat
//! ```
//!
//! Both roots collapse into a single directory when an explicit base is given
//! (CLI `--data-dir`, tests).

use std::path::{Path, PathBuf};

const APP_DIR: &str = "markaz";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for markaz_core::MarkazError {
    fn from(err: PathError) -> Self {
        markaz_core::MarkazError::config(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkazPaths {
    base: Option<PathBuf>,
}

impl MarkazPaths {
    /// Creates a resolver. With `Some(base)` every path lives under `base`.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g. `~/.config/markaz/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the data directory (e.g. `~/.local/share/markaz/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn chats_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("chats"))
    }
}
