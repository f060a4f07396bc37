//! Infrastructure layer for Tether.
//!
//! Implementations of the collaborator interfaces declared in `tether-core`:
//! the HTTP auth client, credential stores, configuration loading and the
//! WebSocket transport.

pub mod auth_client;
pub mod config_service;
pub mod credential_store;
pub mod paths;
pub mod storage;
pub mod websocket_transport;

pub use auth_client::HttpAuthClient;
pub use config_service::ConfigService;
pub use credential_store::{FileCredentialStore, InMemoryCredentialStore};
pub use paths::TetherPaths;
pub use websocket_transport::WebSocketTransport;
