//! Scripted collaborators for controller tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tether_core::AuthError;
use tether_core::auth::{AuthService, LoginGrant, UserInfo};
use tether_core::session::TransportEvent;
use tether_core::transport::{
    ConnectRequest, OutboundMessage, Transport, TransportSession, TransportSink,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCall {
    Login { username: String, password: String },
    Refresh { refresh_token: String },
    Logout { refresh_token: String },
}

/// Auth service answering from queued results.
///
/// An empty queue answers with a network error.
#[derive(Default)]
pub struct ScriptedAuth {
    logins: Mutex<VecDeque<Result<LoginGrant, AuthError>>>,
    refreshes: Mutex<VecDeque<Result<String, AuthError>>>,
    logouts: Mutex<VecDeque<Result<(), AuthError>>>,
    calls: Mutex<Vec<AuthCall>>,
}

impl ScriptedAuth {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_login(&self, result: Result<LoginGrant, AuthError>) {
        self.logins.lock().unwrap().push_back(result);
    }

    pub fn push_refresh(&self, result: Result<String, AuthError>) {
        self.refreshes.lock().unwrap().push_back(result);
    }

    pub fn push_logout(&self, result: Result<(), AuthError>) {
        self.logouts.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<AuthCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn refresh_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, AuthCall::Refresh { .. }))
            .count()
    }

    fn next<T>(queue: &Mutex<VecDeque<Result<T, AuthError>>>) -> Result<T, AuthError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::network("no scripted response")))
    }
}

pub fn grant(access: &str, refresh: &str, username: &str) -> LoginGrant {
    LoginGrant {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        user: UserInfo {
            username: username.to_string(),
        },
    }
}

#[async_trait::async_trait]
impl AuthService for ScriptedAuth {
    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, AuthError> {
        self.calls.lock().unwrap().push(AuthCall::Login {
            username: username.to_string(),
            password: password.to_string(),
        });
        Self::next(&self.logins)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        self.calls.lock().unwrap().push(AuthCall::Refresh {
            refresh_token: refresh_token.to_string(),
        });
        Self::next(&self.refreshes)
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.calls.lock().unwrap().push(AuthCall::Logout {
            refresh_token: refresh_token.to_string(),
        });
        Self::next(&self.logouts)
    }
}

#[derive(Default)]
pub struct TransportLog {
    pub opened: Vec<ConnectRequest>,
    pub sinks: Vec<TransportSink>,
    pub emitted: Vec<(u64, OutboundMessage)>,
    pub closed: Vec<u64>,
}

/// Transport that records everything and connects only when told to.
#[derive(Default)]
pub struct FakeTransport {
    log: Arc<Mutex<TransportLog>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn opened(&self) -> Vec<ConnectRequest> {
        self.log.lock().unwrap().opened.clone()
    }

    pub fn emitted(&self) -> Vec<OutboundMessage> {
        self.log
            .lock()
            .unwrap()
            .emitted
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn closed(&self) -> Vec<u64> {
        self.log.lock().unwrap().closed.clone()
    }

    /// Reports `event` from the most recently opened session.
    pub fn fire(&self, event: TransportEvent) {
        let sink = self
            .log
            .lock()
            .unwrap()
            .sinks
            .last()
            .cloned()
            .expect("no transport session opened");
        sink.emit(event);
    }

    /// Reports `event` from the `index`-th opened session.
    pub fn fire_on(&self, index: usize, event: TransportEvent) {
        let sink = self.log.lock().unwrap().sinks[index].clone();
        sink.emit(event);
    }
}

impl Transport for FakeTransport {
    fn open(&self, request: ConnectRequest, sink: TransportSink) -> Box<dyn TransportSession> {
        let id = sink.session();
        let mut log = self.log.lock().unwrap();
        log.opened.push(request);
        log.sinks.push(sink);
        Box::new(FakeSession {
            id,
            log: self.log.clone(),
        })
    }
}

struct FakeSession {
    id: u64,
    log: Arc<Mutex<TransportLog>>,
}

impl TransportSession for FakeSession {
    fn emit(&self, message: OutboundMessage) -> tether_core::Result<()> {
        self.log.lock().unwrap().emitted.push((self.id, message));
        Ok(())
    }

    fn close(&mut self) {
        self.log.lock().unwrap().closed.push(self.id);
    }
}
