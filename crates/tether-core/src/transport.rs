//! Real-time transport interface.
//!
//! A transport opens sessions in the background and reports their
//! lifecycle through a [`TransportSink`]. Opening never blocks: whether the
//! connection succeeded is only known once a `Connect` or `ConnectError`
//! event arrives.

use crate::error::Result;
use crate::session::{SessionEvent, TransportEvent};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// Parameters for opening a transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub url: String,
    /// Sent both as a connection credential and as a bearer header, so
    /// servers expecting either form accept it.
    pub token: String,
}

impl ConnectRequest {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
        }
    }

    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Outbound `message` event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub text: String,
}

impl OutboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Forwards events of one transport session into the controller channel.
#[derive(Debug, Clone)]
pub struct TransportSink {
    session: u64,
    tx: UnboundedSender<SessionEvent>,
}

impl TransportSink {
    pub fn new(session: u64, tx: UnboundedSender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Returns false once the controller has gone away.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.tx
            .send(SessionEvent::Transport {
                session: self.session,
                event,
            })
            .is_ok()
    }
}

/// Handle to an open (or opening) transport session.
pub trait TransportSession: Send {
    fn emit(&self, message: OutboundMessage) -> Result<()>;

    /// Closes the session. Calling it more than once is harmless.
    fn close(&mut self);
}

pub trait Transport: Send + Sync {
    fn open(&self, request: ConnectRequest, sink: TransportSink) -> Box<dyn TransportSession>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_sink_tags_events_with_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = TransportSink::new(7, tx);

        assert!(sink.emit(TransportEvent::Connect));
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Transport {
                session: 7,
                event: TransportEvent::Connect
            }
        );

        drop(rx);
        assert!(!sink.emit(TransportEvent::Connect));
    }

    #[test]
    fn test_bearer_header() {
        let request = ConnectRequest::new("ws://localhost:3001/", "A1");
        assert_eq!(request.bearer_header(), "Bearer A1");
    }
}
