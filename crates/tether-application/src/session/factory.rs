use anyhow::{Context, Result};
use std::sync::Arc;
use tether_core::config::ClientConfig;
use tether_core::credentials::CredentialStore;
use tether_core::session::ViewUpdate;
use tether_infrastructure::{
    FileCredentialStore, HttpAuthClient, InMemoryCredentialStore, TetherPaths, WebSocketTransport,
};
use tokio::sync::mpsc::UnboundedReceiver;

use super::controller::SessionController;

/// Where credentials are kept between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialBackend {
    /// `credentials.toml` in the config directory.
    File,
    /// Nothing survives the process.
    Memory,
}

/// Builds a [`SessionController`] wired to the production collaborators.
pub struct SessionFactory {
    config: ClientConfig,
    paths: TetherPaths,
}

impl SessionFactory {
    pub fn new(config: ClientConfig, paths: TetherPaths) -> Self {
        Self { config, paths }
    }

    pub fn create_store(&self, backend: CredentialBackend) -> Result<Arc<dyn CredentialStore>> {
        Ok(match backend {
            CredentialBackend::File => Arc::new(
                FileCredentialStore::new(&self.paths)
                    .context("Failed to resolve credentials path")?,
            ),
            CredentialBackend::Memory => Arc::new(InMemoryCredentialStore::new()),
        })
    }

    pub fn create_controller(
        &self,
        backend: CredentialBackend,
    ) -> Result<(SessionController, UnboundedReceiver<ViewUpdate>)> {
        let store = self.create_store(backend)?;
        let auth = Arc::new(HttpAuthClient::new(
            self.config.auth_url.clone(),
            self.config.request_timeout(),
        ));
        let transport = Arc::new(WebSocketTransport::new());

        tracing::debug!(
            "[Bootstrap] Auth API {}, transport {}",
            self.config.auth_url,
            self.config.transport_url
        );

        Ok(SessionController::new(
            self.config.clone(),
            auth,
            store,
            transport,
        ))
    }
}
