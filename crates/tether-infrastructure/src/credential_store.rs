//! Credential store implementations.
//!
//! - [`FileCredentialStore`]: `credentials.toml` in the config directory
//! - [`InMemoryCredentialStore`]: process-local, for tests and `--ephemeral`

use crate::paths::{PathError, TetherPaths};
use crate::storage::AtomicTomlFile;
use std::sync::RwLock;
use tether_core::credentials::{CredentialStore, StoredCredentials};
use tether_core::{Result, SessionError};

/// Durable store backed by an owner-only TOML file.
pub struct FileCredentialStore {
    file: AtomicTomlFile<StoredCredentials>,
}

impl FileCredentialStore {
    pub fn new(paths: &TetherPaths) -> std::result::Result<Self, PathError> {
        Ok(Self::with_path(paths.credentials_file()?))
    }

    /// Creates a store at a custom path (for testing).
    pub fn with_path(path: std::path::PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path).private(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<StoredCredentials> {
        Ok(self.file.load()?.unwrap_or_default())
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        if credentials.is_empty() {
            return self.clear();
        }
        self.file.update(StoredCredentials::default(), |stored| {
            *stored = credentials.clone();
            Ok(())
        })?;
        tracing::debug!("[Storage] Credentials written to {}", self.path().display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.file.remove()?;
        tracing::debug!("[Storage] Credentials cleared");
        Ok(())
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<StoredCredentials>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
        }
    }
}

fn poisoned<T>(_: T) -> SessionError {
    SessionError::storage("credential store lock poisoned")
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<StoredCredentials> {
        Ok(self.inner.read().map_err(poisoned)?.clone())
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        *self.inner.write().map_err(poisoned)? = credentials.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.write().map_err(poisoned)? = StoredCredentials::default();
        Ok(())
    }
}
