//! WebSocket implementation of the real-time transport.
//!
//! Frames are JSON envelopes `{"event": <name>, "data": <payload>}`.
//! `connect`, `disconnect` and `connect_error` are not frames: they are
//! derived from the socket lifecycle. The access token is attached to the
//! handshake twice, as a `token` query parameter and as a bearer header.

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tether_core::session::{InboundKind, TransportEvent};
use tether_core::transport::{
    ConnectRequest, OutboundMessage, Transport, TransportSession, TransportSink,
};
use tether_core::{Result, SessionError};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::{HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_util::sync::CancellationToken;
use url::Url;

const CLIENT_DISCONNECT: &str = "io client disconnect";
const SERVER_DISCONNECT: &str = "io server disconnect";

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for WebSocketTransport {
    fn open(&self, request: ConnectRequest, sink: TransportSink) -> Box<dyn TransportSession> {
        let cancel = CancellationToken::new();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_session(request, sink, outbound_rx, cancel.clone()));

        Box::new(WebSocketSession {
            outbound: outbound_tx,
            cancel,
        })
    }
}

/// Handle to a background socket task. Dropping it closes the socket.
pub struct WebSocketSession {
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    cancel: CancellationToken,
}

impl TransportSession for WebSocketSession {
    fn emit(&self, message: OutboundMessage) -> Result<()> {
        self.outbound.send(message).map_err(|_| {
            SessionError::TransportTransientFailure("transport session closed".to_string())
        })
    }

    fn close(&mut self) {
        self.cancel.cancel();
    }
}

impl Drop for WebSocketSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_session(
    request: ConnectRequest,
    sink: TransportSink,
    mut outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    cancel: CancellationToken,
) {
    let handshake = match handshake_request(&request) {
        Ok(handshake) => handshake,
        Err(message) => {
            sink.emit(TransportEvent::ConnectError { message });
            return;
        }
    };

    let connected = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        result = connect_async(handshake) => result,
    };

    let stream = match connected {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let message = describe_connect_error(&e);
            tracing::warn!("[Transport] Connect to {} failed: {}", request.url, message);
            sink.emit(TransportEvent::ConnectError { message });
            return;
        }
    };

    tracing::info!("[Transport] Session {} connected to {}", sink.session(), request.url);
    if !sink.emit(TransportEvent::Connect) {
        return;
    }

    let (mut writer, mut reader) = stream.split();

    let reason = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = writer.send(WsMessage::Close(None)).await;
                break CLIENT_DISCONNECT.to_string();
            }
            Some(message) = outbound.recv() => {
                let frame = encode_frame("message", &message);
                if let Err(e) = writer.send(WsMessage::Text(frame.into())).await {
                    break format!("transport error: {}", e);
                }
            }
            incoming = reader.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    if let Some(event) = decode_frame(text.as_str()) {
                        sink.emit(event);
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => break SERVER_DISCONNECT.to_string(),
                Some(Ok(_)) => {}
                Some(Err(e)) => break format!("transport error: {}", e),
            }
        }
    };

    tracing::info!("[Transport] Session {} closed: {}", sink.session(), reason);
    sink.emit(TransportEvent::Disconnect { reason });
}

/// Maps `http(s)://` endpoints to `ws(s)://`; ws URLs pass through.
pub fn normalize_ws_url(raw: &str) -> std::result::Result<Url, String> {
    let raw = raw.trim();
    let mapped = if let Some(rest) = raw.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = raw.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        raw.to_string()
    };

    let url = Url::parse(&mapped).map_err(|e| format!("Invalid transport URL '{}': {}", raw, e))?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(format!("Unsupported transport scheme '{}'", other)),
    }
}

fn handshake_request(request: &ConnectRequest) -> std::result::Result<Request, String> {
    let mut url = normalize_ws_url(&request.url)?;
    url.query_pairs_mut().append_pair("token", &request.token);

    let mut handshake = url
        .as_str()
        .into_client_request()
        .map_err(|e| format!("Invalid handshake request: {}", e))?;
    let bearer = HeaderValue::from_str(&request.bearer_header())
        .map_err(|_| "Access token contains invalid header characters".to_string())?;
    handshake.headers_mut().insert(AUTHORIZATION, bearer);
    Ok(handshake)
}

fn describe_connect_error(err: &WsError) -> String {
    match err {
        WsError::Http(response) => {
            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                format!("Unauthorized (HTTP {})", status.as_u16())
            } else {
                format!("Handshake rejected (HTTP {})", status.as_u16())
            }
        }
        other => other.to_string(),
    }
}

fn encode_frame(event: &str, message: &OutboundMessage) -> String {
    serde_json::json!({ "event": event, "data": message }).to_string()
}

/// Decodes an inbound frame. Unknown events and empty payloads are dropped.
fn decode_frame(text: &str) -> Option<TransportEvent> {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("[Transport] Ignoring malformed frame: {}", e);
            return None;
        }
    };

    let Some(kind) = InboundKind::from_event_name(&envelope.event) else {
        tracing::debug!("[Transport] Ignoring event '{}'", envelope.event);
        return None;
    };

    payload_text(envelope.data).map(|text| TransportEvent::Message { kind, text })
}

/// `{text}` objects and bare strings both carry the message text.
fn payload_text(data: Value) -> Option<String> {
    match data {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Object(mut map) => match map.remove("text") {
            Some(Value::String(text)) => Some(text),
            _ => Some(Value::Object(map).to_string()),
        },
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tether_core::session::SessionEvent;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::accept_hdr_async;
    use tokio_tungstenite::tungstenite::handshake::server::{
        ErrorResponse, Request as ServerRequest, Response as ServerResponse,
    };

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> TransportEvent {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for transport event")
            .expect("channel closed");
        match event {
            SessionEvent::Transport { session, event } => {
                assert_eq!(session, 1);
                event
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_decode_frame_variants() {
        assert_eq!(
            decode_frame(r#"{"event":"message","data":{"text":"hej"}}"#),
            Some(TransportEvent::Message {
                kind: InboundKind::Message,
                text: "hej".into()
            })
        );
        assert_eq!(
            decode_frame(r#"{"event":"broadcast","data":"alla"}"#),
            Some(TransportEvent::Message {
                kind: InboundKind::Broadcast,
                text: "alla".into()
            })
        );
        assert_eq!(decode_frame(r#"{"event":"typing","data":"x"}"#), None);
        assert_eq!(decode_frame(r#"{"event":"message"}"#), None);
        assert_eq!(decode_frame("not json"), None);
    }

    #[test]
    fn test_encode_frame() {
        let frame = encode_frame("message", &OutboundMessage::new("hej"));
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value, serde_json::json!({"event": "message", "data": {"text": "hej"}}));
    }

    #[test]
    fn test_normalize_ws_url() {
        assert_eq!(
            normalize_ws_url("https://chat.example.com/").unwrap().as_str(),
            "wss://chat.example.com/"
        );
        assert_eq!(
            normalize_ws_url("http://localhost:3001").unwrap().as_str(),
            "ws://localhost:3001/"
        );
        assert!(normalize_ws_url("ftp://example.com").is_err());
        assert!(normalize_ws_url("not a url").is_err());
    }

    #[test]
    fn test_handshake_carries_token_twice() {
        let request = handshake_request(&ConnectRequest::new("ws://localhost:3001/", "A1")).unwrap();
        assert_eq!(request.uri().query(), Some("token=A1"));
        assert_eq!(request.headers().get(AUTHORIZATION).unwrap(), "Bearer A1");
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (header_tx, header_rx) = oneshot::channel();
        let (frame_tx, frame_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = move |req: &ServerRequest, resp: ServerResponse| {
                let auth = req
                    .headers()
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let query = req.uri().query().map(str::to_string);
                let _ = header_tx.send((auth, query));
                Ok::<_, ErrorResponse>(resp)
            };
            let mut ws = accept_hdr_async(stream, callback).await.unwrap();
            ws.send(WsMessage::Text(
                r#"{"event":"chat-message","data":"välkommen"}"#.into(),
            ))
            .await
            .unwrap();
            if let Some(Ok(message)) = ws.next().await {
                let _ = frame_tx.send(message.to_text().unwrap().to_string());
            }
            ws.close(None).await.ok();
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = WebSocketTransport::new();
        let session = transport.open(
            ConnectRequest::new(format!("ws://{}/", addr), "A1"),
            TransportSink::new(1, tx),
        );

        assert_eq!(next_event(&mut rx).await, TransportEvent::Connect);
        let (auth, query) = header_rx.await.unwrap();
        assert_eq!(auth.as_deref(), Some("Bearer A1"));
        assert_eq!(query.as_deref(), Some("token=A1"));

        assert_eq!(
            next_event(&mut rx).await,
            TransportEvent::Message {
                kind: InboundKind::ChatMessage,
                text: "välkommen".into()
            }
        );

        session.emit(OutboundMessage::new("hej")).unwrap();
        let frame = frame_rx.await.unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "message");
        assert_eq!(value["data"]["text"], "hej");

        assert!(matches!(
            next_event(&mut rx).await,
            TransportEvent::Disconnect { .. }
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_handshake_reports_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = |_req: &ServerRequest, _resp: ServerResponse| {
                let mut rejection = ErrorResponse::new(None);
                *rejection.status_mut() = StatusCode::UNAUTHORIZED;
                Err::<ServerResponse, ErrorResponse>(rejection)
            };
            let _ = accept_hdr_async(stream, callback).await;
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _session = WebSocketTransport::new().open(
            ConnectRequest::new(format!("ws://{}/", addr), "expired"),
            TransportSink::new(1, tx),
        );

        let event = next_event(&mut rx).await;
        assert!(event.is_auth_failure(), "unexpected event {:?}", event);
    }

    #[tokio::test]
    async fn test_close_before_connect_emits_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Nothing listens on port 9; closing first must win the race anyway.
        let mut session = WebSocketTransport::new().open(
            ConnectRequest::new("ws://10.255.255.1:9/", "A1"),
            TransportSink::new(1, tx),
        );
        session.close();

        let result = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(!matches!(result, Ok(Some(_))));
    }
}
