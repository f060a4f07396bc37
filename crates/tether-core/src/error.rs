//! Error types for the Tether client.

use thiserror::Error;

/// Failure reported by an [`AuthService`](crate::auth::AuthService) call.
///
/// The auth API signals failure either by a transport-level error or by a
/// `success: false` body. Both are failures to the controller, but the
/// distinction decides which message the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The service answered and refused the request.
    #[error("Request rejected: {message}")]
    Rejected { message: String },

    /// The request could not complete (connection, timeout, bad body).
    #[error("Network error: {0}")]
    Network(String),
}

impl AuthError {
    /// Creates a Rejected error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// The error taxonomy surfaced by the session controller.
///
/// Every network-facing operation converts its failures into one of these
/// variants locally; none of them is meant to reach a global handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Bad credentials at login.
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// Login, refresh or logout request could not complete.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// Refresh token invalid or expired; the session has been torn down.
    #[error("Refresh token rejected")]
    RefreshRejected,

    /// Transport refused the access token.
    #[error("Transport authentication failure: {0}")]
    TransportAuthFailure(String),

    /// Any other transport connection error.
    #[error("Transport failure: {0}")]
    TransportTransientFailure(String),

    /// An operation needed an access token and none was available.
    #[error("Missing access token")]
    MissingToken,

    /// Durable credential storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<AuthError> for SessionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected { message } => Self::AuthRejected(message),
            AuthError::Network(message) => Self::NetworkFailure(message),
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A type alias for `Result<T, SessionError>`.
pub type Result<T> = std::result::Result<T, SessionError>;
