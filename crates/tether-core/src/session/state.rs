use serde::{Deserialize, Serialize};

/// Which UI the client shows.
///
/// `Connected` implies `Authenticated`, which implies a non-empty access
/// token. Only the session controller moves between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    LoggedOut,
    Authenticated,
    Connected,
}

impl SessionState {
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated | Self::Connected)
    }

    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoggedOut => write!(f, "logged out"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Connected => write!(f, "connected"),
        }
    }
}
