//! Session & connection controller.
//!
//! Owns the UI-mode state, the token pair, the refresh timer and the
//! current transport session. Direct calls (login, connect, ...) and
//! channel events (transport callbacks, refresh ticks) are both processed
//! through `&mut self`, so no two transitions ever interleave.
//!
//! ```text
//! LoggedOut     --login success------------------> Authenticated
//! Authenticated --connect() + transport connect--> Connected
//! Connected     --transport disconnect-----------> Authenticated
//! Authenticated/Connected --refresh failure------> LoggedOut
//! ```

use crate::texts;
use std::sync::Arc;
use tether_core::auth::AuthService;
use tether_core::config::{ClientConfig, EchoPolicy};
use tether_core::credentials::{CredentialStore, Credentials, StoredCredentials};
use tether_core::session::{
    Message, Section, SessionEvent, SessionState, StatusKind, Transcript, TransportEvent,
    ViewUpdate,
};
use tether_core::transport::{
    ConnectRequest, OutboundMessage, Transport, TransportSession, TransportSink,
};
use tether_core::{AuthError, Result, SessionError};
use tokio::sync::mpsc;

use super::refresh_timer::RefreshTimer;

/// The transport session currently owned by the controller.
struct Connection {
    id: u64,
    session: Box<dyn TransportSession>,
}

pub struct SessionController {
    config: ClientConfig,
    auth: Arc<dyn AuthService>,
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,

    state: SessionState,
    credentials: Credentials,
    /// Manually entered key, persisted under its own store key.
    api_key: Option<String>,
    refresh_timer: RefreshTimer,
    connection: Option<Connection>,
    last_connection_id: u64,
    transcript: Transcript,

    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    view: mpsc::UnboundedSender<ViewUpdate>,
}

impl SessionController {
    /// Creates a logged-out controller and the receiver for its view updates.
    ///
    /// Call [`restore`](Self::restore) afterwards to pick up persisted
    /// credentials.
    pub fn new(
        config: ClientConfig,
        auth: Arc<dyn AuthService>,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> (Self, mpsc::UnboundedReceiver<ViewUpdate>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (view, view_rx) = mpsc::unbounded_channel();

        let controller = Self {
            config,
            auth,
            store,
            transport,
            state: SessionState::LoggedOut,
            credentials: Credentials::default(),
            api_key: None,
            refresh_timer: RefreshTimer::new(),
            connection: None,
            last_connection_id: 0,
            transcript: Transcript::new(),
            events_tx,
            events_rx,
            view,
        };

        (controller, view_rx)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh_timer.is_pending()
    }

    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    // ========================================================================
    // Startup
    // ========================================================================

    /// Loads persisted credentials and decides the initial UI.
    ///
    /// With a full token pair the access token is refreshed silently and the
    /// transport connected before any login form is shown. A lone access
    /// token or API key restores `Authenticated` without connecting.
    pub async fn restore(&mut self) -> SessionState {
        let stored = self.store.load().unwrap_or_else(|e| {
            tracing::warn!("[Session] Could not read stored credentials: {}", e);
            StoredCredentials::default()
        });
        self.api_key = stored.api_key.clone().filter(|k| !k.trim().is_empty());

        if let Some(pair) = stored.token_pair() {
            tracing::info!("[Session] Restoring persisted session");
            self.credentials = pair;
            self.render(ViewUpdate::ApiKey(Some(self.credentials.access_token.clone())));
            self.set_state(SessionState::Authenticated);
            self.render(ViewUpdate::Section(Section::Auth));

            if self.refresh_access_token().await {
                // Cannot fail: the refresh just stored a non-empty token.
                let _ = self.connect();
            }
        } else if let Some(token) = stored.manual_token() {
            tracing::info!("[Session] Restoring manual access token");
            self.credentials = Credentials::new(token, None);
            self.render(ViewUpdate::ApiKey(Some(token.to_string())));
            self.set_state(SessionState::Authenticated);
            self.render(ViewUpdate::Section(Section::Auth));
        } else {
            self.set_state(SessionState::LoggedOut);
            self.render(ViewUpdate::Section(Section::Login));
        }

        self.state
    }

    // ========================================================================
    // User operations
    // ========================================================================

    /// Logs in and connects.
    ///
    /// Failures leave the state unchanged, raise an alert and are returned
    /// classified; they never escape as panics.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            self.alert(texts::MISSING_LOGIN_FIELDS);
            return Err(SessionError::AuthRejected(
                texts::MISSING_LOGIN_FIELDS.to_string(),
            ));
        }

        self.render(ViewUpdate::LoginPending(true));
        let result = self.auth.login(username, password).await;
        self.render(ViewUpdate::LoginPending(false));

        match result {
            Ok(grant) => {
                tracing::info!("[Session] Logged in as {}", grant.user.username);
                self.credentials = Credentials::new(grant.access_token, Some(grant.refresh_token));
                self.persist();
                self.render(ViewUpdate::ApiKey(Some(self.credentials.access_token.clone())));
                self.set_state(SessionState::Authenticated);
                self.render(ViewUpdate::Section(Section::Auth));
                self.connect()?;
                self.system(texts::welcome(&grant.user.username));
                Ok(())
            }
            Err(err) => {
                tracing::warn!("[Session] Login failed: {}", err);
                match &err {
                    AuthError::Rejected { message } => self.alert(texts::login_failed(message)),
                    AuthError::Network(_) => self.alert(texts::LOGIN_NETWORK_ERROR),
                }
                Err(err.into())
            }
        }
    }

    /// Opens a transport session with the current access token.
    ///
    /// Fire-and-forget: the outcome arrives later as a transport event.
    pub fn connect(&mut self) -> Result<()> {
        if !self.credentials.has_access_token() {
            tracing::warn!("[Session] Connect requested without access token");
            self.refresh_timer.cancel();
            self.set_state(SessionState::LoggedOut);
            self.alert(texts::MISSING_TOKEN);
            self.render(ViewUpdate::Section(Section::Login));
            return Err(SessionError::MissingToken);
        }

        self.close_connection();

        self.last_connection_id += 1;
        let id = self.last_connection_id;
        let request = ConnectRequest::new(
            self.config.transport_url.clone(),
            self.credentials.access_token.clone(),
        );
        let session = self
            .transport
            .open(request, TransportSink::new(id, self.events_tx.clone()));
        self.connection = Some(Connection { id, session });
        tracing::info!("[Session] Opening transport session {}", id);

        if !self.state.is_authenticated() {
            self.set_state(SessionState::Authenticated);
        }
        self.render(ViewUpdate::Status {
            kind: StatusKind::Connecting,
            text: texts::STATUS_CONNECTING.to_string(),
        });
        self.schedule_refresh();
        Ok(())
    }

    /// Closes the transport session and cancels the pending refresh.
    ///
    /// Does nothing when there is no session.
    pub fn disconnect(&mut self) {
        self.refresh_timer.cancel();

        let was_connected = self.state.is_connected();
        if !self.close_connection() {
            return;
        }

        self.render(ViewUpdate::Status {
            kind: StatusKind::Disconnected,
            text: texts::STATUS_DISCONNECTED.to_string(),
        });
        if was_connected {
            self.system(texts::disconnected(texts::CLIENT_DISCONNECT_REASON));
        }
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// Returns false without any request when no refresh token is held. Any
    /// failure of the request tears the session down to `LoggedOut`.
    pub async fn refresh_access_token(&mut self) -> bool {
        let Some(refresh_token) = self.credentials.refresh_token().map(str::to_string) else {
            return false;
        };

        match self.auth.refresh(&refresh_token).await {
            Ok(access_token) => {
                tracing::debug!("[Session] Access token refreshed");
                self.credentials.access_token = access_token;
                self.persist();
                self.render(ViewUpdate::ApiKey(Some(self.credentials.access_token.clone())));
                self.schedule_refresh();
                true
            }
            Err(err) => {
                // Network failures end the session the same way as a rejection.
                tracing::warn!("[Session] {}: {}", SessionError::RefreshRejected, err);
                if self.close_connection() {
                    self.render(ViewUpdate::Status {
                        kind: StatusKind::Disconnected,
                        text: texts::STATUS_DISCONNECTED.to_string(),
                    });
                }
                self.clear_credentials();
                if err.is_rejected() {
                    self.system(texts::SESSION_EXPIRED_LOGIN_AGAIN);
                }
                self.set_state(SessionState::LoggedOut);
                self.render(ViewUpdate::Section(Section::Login));
                false
            }
        }
    }

    /// Ends the session locally, notifying the server on a best-effort basis.
    pub async fn logout(&mut self) {
        if let Some(refresh_token) = self.credentials.refresh_token().map(str::to_string)
            && let Err(err) = self.auth.logout(&refresh_token).await
        {
            tracing::warn!("[Session] Logout request failed: {}", err);
        }

        self.disconnect();
        self.clear_credentials();
        self.set_state(SessionState::LoggedOut);
        self.render(ViewUpdate::Status {
            kind: StatusKind::Disconnected,
            text: texts::STATUS_LOGGED_OUT.to_string(),
        });
        self.render(ViewUpdate::InputEnabled(false));
        self.render(ViewUpdate::Section(Section::Login));

        self.transcript.clear();
        self.render(ViewUpdate::TranscriptCleared);
        self.render(ViewUpdate::Notice(texts::LOGGED_OUT.to_string()));
    }

    /// Sends a chat message. Blank text or a missing connection is a no-op.
    pub fn send_message(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() || !self.state.is_connected() {
            return Ok(());
        }
        let Some(connection) = &self.connection else {
            return Ok(());
        };

        connection.session.emit(OutboundMessage::new(text))?;
        if self.config.echo_policy == EchoPolicy::Local {
            self.append(Message::own(text));
        }
        Ok(())
    }

    /// Uses a manually supplied key as access token.
    pub fn set_api_key(&mut self, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }

        self.credentials.access_token = key.to_string();
        self.api_key = Some(key.to_string());
        self.persist();

        if self.state == SessionState::LoggedOut {
            self.set_state(SessionState::Authenticated);
            self.render(ViewUpdate::Section(Section::Auth));
        }
    }

    // ========================================================================
    // Event channel
    // ========================================================================

    /// Waits for the next transport event or refresh tick.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Handles every event that is already queued. Returns how many ran.
    pub async fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Applies one event to the state machine.
    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::RefreshDue { generation } => {
                if !self.refresh_timer.fire(generation) {
                    tracing::debug!("[Session] Dropping stale refresh tick {}", generation);
                    return;
                }
                self.on_refresh_due().await;
            }
            SessionEvent::Transport { session, event } => {
                if self.connection.as_ref().map(|c| c.id) != Some(session) {
                    tracing::debug!("[Session] Dropping event from closed session {}", session);
                    return;
                }
                self.on_transport_event(event);
            }
        }
    }

    async fn on_refresh_due(&mut self) {
        let was_connected = self.state.is_connected();
        let refreshed = self.refresh_access_token().await;
        if !refreshed && was_connected {
            self.disconnect();
            self.system(texts::SESSION_EXPIRED_DISCONNECTED);
        }
    }

    fn on_transport_event(&mut self, event: TransportEvent) {
        let auth_failure = event.is_auth_failure();
        match event {
            TransportEvent::Connect => {
                self.set_state(SessionState::Connected);
                self.render(ViewUpdate::Status {
                    kind: StatusKind::Connected,
                    text: texts::STATUS_CONNECTED.to_string(),
                });
                self.render(ViewUpdate::InputEnabled(true));
                self.system(texts::CONNECTED_TO_SERVER);
            }
            TransportEvent::Disconnect { reason } => {
                self.connection = None;
                if self.state.is_connected() {
                    self.set_state(SessionState::Authenticated);
                }
                self.render(ViewUpdate::Status {
                    kind: StatusKind::Disconnected,
                    text: texts::STATUS_DISCONNECTED.to_string(),
                });
                self.render(ViewUpdate::InputEnabled(false));
                self.system(texts::disconnected(&reason));
            }
            TransportEvent::ConnectError { message } => {
                self.connection = None;
                self.render(ViewUpdate::Status {
                    kind: StatusKind::Disconnected,
                    text: texts::STATUS_CONNECT_ERROR.to_string(),
                });
                self.system(texts::connect_error(&message));

                if auth_failure {
                    tracing::warn!(
                        "[Session] {}",
                        SessionError::TransportAuthFailure(message)
                    );
                    self.refresh_timer.cancel();
                    // Stored credentials stay for the next restore; the refused
                    // token must not be reused by a later connect.
                    self.credentials.access_token.clear();
                    self.api_key = None;
                    self.render(ViewUpdate::ApiKey(None));
                    self.alert(texts::INVALID_API_KEY);
                    self.set_state(SessionState::LoggedOut);
                    self.render(ViewUpdate::Section(Section::Login));
                } else {
                    tracing::info!(
                        "[Session] {}",
                        SessionError::TransportTransientFailure(message)
                    );
                }
            }
            TransportEvent::Message { kind, text } => {
                tracing::trace!("[Session] Inbound {}", kind.event_name());
                self.append(Message::remote(text));
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn schedule_refresh(&mut self) {
        self.refresh_timer
            .schedule(self.config.refresh_interval(), self.events_tx.clone());
    }

    /// Closes the owned transport session without reporting anything.
    fn close_connection(&mut self) -> bool {
        let Some(mut connection) = self.connection.take() else {
            return false;
        };
        connection.session.close();
        tracing::info!("[Session] Closed transport session {}", connection.id);

        if self.state.is_connected() {
            self.set_state(SessionState::Authenticated);
            self.render(ViewUpdate::InputEnabled(false));
        }
        true
    }

    fn persist(&self) {
        let stored = StoredCredentials {
            access_token: Some(self.credentials.access_token.clone()),
            refresh_token: self.credentials.refresh_token.clone(),
            api_key: self.api_key.clone(),
        };
        if let Err(e) = self.store.save(&stored) {
            tracing::warn!("[Session] Failed to persist credentials: {}", e);
        }
    }

    fn clear_credentials(&mut self) {
        self.refresh_timer.cancel();
        self.credentials = Credentials::default();
        self.api_key = None;
        if let Err(e) = self.store.clear() {
            tracing::warn!("[Session] Failed to clear stored credentials: {}", e);
        }
        self.render(ViewUpdate::ApiKey(None));
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            tracing::info!("[Session] {} -> {}", self.state, state);
            self.state = state;
        }
    }

    fn render(&self, update: ViewUpdate) {
        // A detached UI is not an error.
        let _ = self.view.send(update);
    }

    fn alert(&self, text: impl Into<String>) {
        self.render(ViewUpdate::Alert(text.into()));
    }

    fn append(&mut self, message: Message) {
        self.transcript.push(message.clone());
        self.render(ViewUpdate::MessageAppended(message));
    }

    fn system(&mut self, text: impl Into<String>) {
        self.append(Message::system(text));
    }
}
