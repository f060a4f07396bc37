//! Credential model and the durable store interface.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The in-memory token pair held by an authenticated session.
///
/// An empty `access_token` means "no token"; the session state machine
/// relies on this to refuse `Authenticated` without one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.trim().is_empty()
    }

    /// The refresh token, if present and non-empty.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

/// The record persisted by a [`CredentialStore`].
///
/// Each field corresponds to one fixed key in the durable store.
/// `api_key` is a manually supplied access token that has no refresh token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl StoredCredentials {
    pub fn is_empty(&self) -> bool {
        non_empty(&self.access_token).is_none()
            && non_empty(&self.refresh_token).is_none()
            && non_empty(&self.api_key).is_none()
    }

    /// Returns the token pair when both an access and a refresh token exist.
    pub fn token_pair(&self) -> Option<Credentials> {
        let access = non_empty(&self.access_token)?;
        let refresh = non_empty(&self.refresh_token)?;
        Some(Credentials::new(access, Some(refresh.to_string())))
    }

    /// Returns a token usable without refresh: the stored access token,
    /// falling back to the standalone API key.
    pub fn manual_token(&self) -> Option<&str> {
        non_empty(&self.access_token).or_else(|| non_empty(&self.api_key))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Durable key-value storage for credentials.
///
/// Implementations must make `clear` idempotent: clearing an already
/// empty store succeeds.
///
/// # Security Note
///
/// Implementations must never log token values.
pub trait CredentialStore: Send + Sync {
    /// Loads the stored record. A missing store yields an empty record.
    fn load(&self) -> Result<StoredCredentials>;

    /// Overwrites the stored record.
    fn save(&self, credentials: &StoredCredentials) -> Result<()>;

    /// Removes every stored key.
    fn clear(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_token_checks() {
        let creds = Credentials::new("A1", Some("R1".to_string()));
        assert!(creds.has_access_token());
        assert_eq!(creds.refresh_token(), Some("R1"));

        let blank = Credentials::new("  ", Some(String::new()));
        assert!(!blank.has_access_token());
        assert_eq!(blank.refresh_token(), None);
    }

    #[test]
    fn test_token_pair_requires_both() {
        let only_access = StoredCredentials {
            access_token: Some("A1".into()),
            ..Default::default()
        };
        assert!(only_access.token_pair().is_none());
        assert_eq!(only_access.manual_token(), Some("A1"));

        let both = StoredCredentials {
            access_token: Some("A1".into()),
            refresh_token: Some("R1".into()),
            api_key: None,
        };
        assert_eq!(
            both.token_pair(),
            Some(Credentials::new("A1", Some("R1".to_string())))
        );
    }

    #[test]
    fn test_manual_token_falls_back_to_api_key() {
        let stored = StoredCredentials {
            access_token: Some(String::new()),
            refresh_token: None,
            api_key: Some("K1".into()),
        };
        assert_eq!(stored.manual_token(), Some("K1"));
        assert!(!stored.is_empty());
        assert!(StoredCredentials::default().is_empty());
    }
}
