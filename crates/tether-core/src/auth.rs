//! Auth service interface.
//!
//! The login API itself is an external collaborator; this module only
//! describes what the session controller needs from it.

use crate::error::AuthError;
use serde::{Deserialize, Serialize};

/// Public profile returned alongside a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
}

/// Tokens and profile granted by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

/// Remote authentication service.
///
/// Every method maps both transport failures and `success: false` answers
/// into [`AuthError`]; callers never see a partially successful result.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Exchanges username and password for a token pair.
    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, AuthError>;

    /// Mints a new access token. The refresh token itself is not rotated.
    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;

    /// Invalidates the refresh token on the server.
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;
}
