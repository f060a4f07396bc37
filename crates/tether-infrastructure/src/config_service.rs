//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `config.toml` in the config directory.
//! Priority: environment variables > config.toml > built-in defaults.

use crate::paths::TetherPaths;
use crate::storage::AtomicTomlFile;
use tether_core::config::{ClientConfig, EchoPolicy};
use tether_core::{Result, SessionError};

pub const ENV_AUTH_URL: &str = "TETHER_AUTH_URL";
pub const ENV_TRANSPORT_URL: &str = "TETHER_TRANSPORT_URL";
pub const ENV_ECHO_POLICY: &str = "TETHER_ECHO_POLICY";

#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: TetherPaths,
}

impl ConfigService {
    pub fn new(paths: TetherPaths) -> Self {
        Self { paths }
    }

    /// Loads the configuration, writing a default `config.toml` on first run.
    pub fn load(&self) -> Result<ClientConfig> {
        let config = self.load_file()?;
        apply_env_overrides(config, |key| std::env::var(key).ok())
    }

    fn load_file(&self) -> Result<ClientConfig> {
        let path = self
            .paths
            .config_file()
            .map_err(|e| SessionError::config(e.to_string()))?;
        let file = AtomicTomlFile::<ClientConfig>::new(path);

        match file.load().map_err(|e| SessionError::config(e.to_string()))? {
            Some(config) => Ok(config),
            None => {
                let config = ClientConfig::default();
                if let Err(e) = file.save(&config) {
                    tracing::warn!(
                        "[Config] Could not write default config to {}: {}",
                        file.path().display(),
                        e
                    );
                } else {
                    tracing::info!("[Config] Wrote default config to {}", file.path().display());
                }
                Ok(config)
            }
        }
    }
}

/// Applies `TETHER_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_AUTH_URL).filter(|v| !v.trim().is_empty()) {
        config.auth_url = url.trim().to_string();
    }
    if let Some(url) = lookup(ENV_TRANSPORT_URL).filter(|v| !v.trim().is_empty()) {
        config.transport_url = url.trim().to_string();
    }
    if let Some(policy) = lookup(ENV_ECHO_POLICY) {
        config.echo_policy = policy
            .parse::<EchoPolicy>()
            .map_err(|e| SessionError::config(format!("{}: {}", ENV_ECHO_POLICY, e)))?;
    }
    Ok(config)
}
