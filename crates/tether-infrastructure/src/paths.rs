//! Path management for tether configuration and state files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/tether/            # Config directory (or --config-dir)
//! ├── config.toml              # Client configuration
//! └── credentials.toml         # Access/refresh token, API key (0600)
//!
//! ~/.local/share/tether/       # Data directory
//! └── logs/                    # Rolling log files
//!     └── tether.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

const APP_DIR: &str = "tether";

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

/// Resolves tether file locations.
///
/// With a base directory every path lives below it (used by `--config-dir`
/// and by tests); otherwise the platform config and data dirs are used.
#[derive(Debug, Clone, Default)]
pub struct TetherPaths {
    base: Option<PathBuf>,
}

impl TetherPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the tether configuration directory (e.g. `~/.config/tether/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the tether data directory (e.g. `~/.local/share/tether/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the credential file.
    ///
    /// # Security Note
    ///
    /// The file holds bearer tokens; the store writes it with mode 600.
    pub fn credentials_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("credentials.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_under_base() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TetherPaths::new(Some(temp_dir.path()));

        assert_eq!(paths.config_dir().unwrap(), temp_dir.path());
        assert_eq!(
            paths.config_file().unwrap(),
            temp_dir.path().join("config.toml")
        );
        assert_eq!(
            paths.credentials_file().unwrap(),
            temp_dir.path().join("credentials.toml")
        );
        assert!(paths.logs_dir().unwrap().starts_with(temp_dir.path()));
    }

    #[test]
    fn test_default_paths_end_with_app_dir() {
        let paths = TetherPaths::default();
        if let Ok(config_dir) = paths.config_dir() {
            assert!(config_dir.ends_with("tether"));
            assert!(paths.config_file().unwrap().starts_with(&config_dir));
        }
    }
}
