//! Rendering instructions for the UI surface.
//!
//! The controller never draws anything itself; it emits `ViewUpdate`s and
//! whichever front end is attached renders them.

use super::message::Message;

/// Top-level panel to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Username/password form.
    Login,
    /// API-key field with connect/logout controls.
    Auth,
}

/// Visual class of the connection status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Section(Section),
    Status { kind: StatusKind, text: String },
    /// Message input and send button enabled (connected) or locked.
    InputEnabled(bool),
    /// Blocking notice for the user.
    Alert(String),
    /// Short-lived notice, e.g. after copying to the clipboard.
    Notice(String),
    /// Login request in flight.
    LoginPending(bool),
    MessageAppended(Message),
    TranscriptCleared,
    /// Mirror of the API-key field; `None` empties it.
    ApiKey(Option<String>),
}
