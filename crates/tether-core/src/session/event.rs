use serde::{Deserialize, Serialize};

/// Inbound event names that all mean "a chat message arrived".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundKind {
    #[serde(rename = "message")]
    Message,
    #[serde(rename = "chat-message")]
    ChatMessage,
    #[serde(rename = "broadcast")]
    Broadcast,
}

impl InboundKind {
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "message" => Some(Self::Message),
            "chat-message" => Some(Self::ChatMessage),
            "broadcast" => Some(Self::Broadcast),
            _ => None,
        }
    }

    pub fn event_name(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::ChatMessage => "chat-message",
            Self::Broadcast => "broadcast",
        }
    }
}

/// Lifecycle and payload events reported by a transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connect,
    Disconnect { reason: String },
    ConnectError { message: String },
    Message { kind: InboundKind, text: String },
}

impl TransportEvent {
    /// True when a connect error text indicates the token was refused.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::ConnectError { message } => {
                message.contains("Authentication") || message.contains("Unauthorized")
            }
            _ => false,
        }
    }
}

/// Everything the session controller reacts to besides direct calls.
///
/// Events carry the identity of their producer so that events from a
/// closed transport session or a cancelled refresh timer can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Transport { session: u64, event: TransportEvent },
    RefreshDue { generation: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_kind_names() {
        for kind in [InboundKind::Message, InboundKind::ChatMessage, InboundKind::Broadcast] {
            assert_eq!(InboundKind::from_event_name(kind.event_name()), Some(kind));
        }
        assert_eq!(InboundKind::from_event_name("typing"), None);
    }

    #[test]
    fn test_auth_failure_detection() {
        let unauthorized = TransportEvent::ConnectError {
            message: "Unauthorized (HTTP 401)".into(),
        };
        let auth = TransportEvent::ConnectError {
            message: "Authentication error".into(),
        };
        let timeout = TransportEvent::ConnectError {
            message: "timeout".into(),
        };
        assert!(unauthorized.is_auth_failure());
        assert!(auth.is_auth_failure());
        assert!(!timeout.is_auth_failure());
        assert!(!TransportEvent::Connect.is_auth_failure());
    }
}
