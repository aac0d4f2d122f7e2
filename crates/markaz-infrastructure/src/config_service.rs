//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` and caches it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use markaz_core::Result;
use markaz_core::config::MarkazConfig;

use crate::paths::MarkazPaths;

/// Configuration service that loads and caches `MarkazConfig`.
///
/// A missing or empty file yields the defaults. A file that exists but fails
/// to parse or validate is an error; it is never silently replaced.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<MarkazConfig>>>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses `config.toml` in the configuration directory of `paths`.
    pub fn from_paths(paths: &MarkazPaths) -> Result<Self> {
        Ok(Self::new(paths.config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<MarkazConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    /// Writes the default configuration when no file exists yet.
    ///
    /// Returns `true` when a file was created.
    pub fn ensure_config_file(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, MarkazConfig::default().to_toml_string()?)?;
        tracing::info!("[ConfigService] Wrote default config to {}", self.path.display());
        Ok(true)
    }

    fn load_config(&self) -> Result<MarkazConfig> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "[ConfigService] {} not found, using defaults",
                    self.path.display()
                );
                return Ok(MarkazConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(MarkazConfig::default());
        }

        MarkazConfig::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), MarkazConfig::default());
    }

    #[test]
    fn test_loaded_config_is_cached_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[camera]\nfocus_distance = 90.0\n").unwrap();
        let service = ConfigService::new(&path);

        assert_eq!(service.get_config().unwrap().camera.focus_distance, 90.0);

        std::fs::write(&path, "[camera]\nfocus_distance = 60.0\n").unwrap();
        assert_eq!(service.get_config().unwrap().camera.focus_distance, 90.0);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().camera.focus_distance, 60.0);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[layout]\nschema_version = \"3.1.0\"\n").unwrap();

        let err = ConfigService::new(&path).get_config().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_ensure_config_file_writes_defaults_once() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("nested").join("config.toml"));

        assert!(service.ensure_config_file().unwrap());
        assert!(!service.ensure_config_file().unwrap());
        assert_eq!(service.get_config().unwrap(), MarkazConfig::default());
    }
}
