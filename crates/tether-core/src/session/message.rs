//! Transcript message types.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    /// Status notices generated by the client itself.
    System,
    /// Messages received over the transport.
    Remote,
    /// Messages we sent, echoed locally.
    Own,
}

/// A single displayed chat message. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub origin: MessageOrigin,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(origin: MessageOrigin, text: impl Into<String>) -> Self {
        Self {
            origin,
            text: text.into(),
            timestamp: Local::now(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageOrigin::System, text)
    }

    pub fn remote(text: impl Into<String>) -> Self {
        Self::new(MessageOrigin::Remote, text)
    }

    pub fn own(text: impl Into<String>) -> Self {
        Self::new(MessageOrigin::Own, text)
    }

    /// Wall-clock time of day, e.g. `14:03:27`.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    /// System notices have no copy action.
    pub fn is_copyable(&self) -> bool {
        self.origin != MessageOrigin::System
    }
}
