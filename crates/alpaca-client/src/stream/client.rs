//! Account event stream client.
//!
//! Connects to the trading host's `/stream` endpoint, authenticates, and
//! negotiates the streams the registry has listeners for. Decoded events are
//! fanned out through the [`SubscriptionRegistry`]; frames that fail to
//! decode are logged and dropped without terminating the connection.
//!
//! # Protocol
//!
//! ```json
//! -> {"action": "authenticate", "data": {"key_id": "...", "secret_key": "..."}}
//! <- {"stream": "authorization", "data": {"status": "authorized", "action": "authenticate"}}
//! -> {"action": "listen", "data": {"streams": ["trade_updates"]}}
//! <- {"stream": "listening", "data": {"streams": ["trade_updates"]}}
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, Credentials, Environment};
use crate::http::ApiError;
use crate::stream::codec::{self, StreamMessage};
use crate::stream::events::{AuthenticateRequest, EventKind, ListenRequest};
use crate::stream::registry::{EventListener, SubscriptionRegistry};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Configuration for the event stream client.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// WebSocket URL.
    pub url: String,
    /// API credentials.
    pub credentials: Credentials,
}

impl StreamConfig {
    /// Create a configuration for an arbitrary URL.
    #[must_use]
    pub const fn new(url: String, credentials: Credentials) -> Self {
        Self { url, credentials }
    }

    /// Configuration for the paper trading environment.
    #[must_use]
    pub fn paper(credentials: Credentials) -> Self {
        Self::new(Environment::Paper.stream_url().to_string(), credentials)
    }

    /// Configuration for the live trading environment.
    #[must_use]
    pub fn live(credentials: Credentials) -> Self {
        Self::new(Environment::Live.stream_url().to_string(), credentials)
    }
}

impl From<&ClientConfig> for StreamConfig {
    fn from(config: &ClientConfig) -> Self {
        Self::new(
            config.environment.stream_url().to_string(),
            config.credentials.clone(),
        )
    }
}

/// Account event stream client.
///
/// Subscribe listeners first, then [`run`](Self::run) the connection. The
/// streams negotiated with the server are exactly the kinds that have at
/// least one listener at connect time.
pub struct StreamClient {
    config: StreamConfig,
    registry: Arc<SubscriptionRegistry>,
    cancel: CancellationToken,
}

impl StreamClient {
    /// Create a new stream client.
    #[must_use]
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            registry: Arc::new(SubscriptionRegistry::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Register a listener for events of the given kind.
    pub fn subscribe(&self, kind: EventKind, listener: Arc<dyn EventListener>) {
        self.registry.subscribe(kind, listener);
    }

    /// The shared registry, for dispatch inspection and late subscription.
    #[must_use]
    pub fn registry(&self) -> Arc<SubscriptionRegistry> {
        Arc::clone(&self.registry)
    }

    /// A token that stops the connection loop when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Connect, authenticate, negotiate subscriptions, and dispatch events
    /// until the connection closes or the token is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Authentication`] when the credentials are refused,
    /// [`ApiError::Subscription`] when the server acknowledges a different
    /// stream set than requested, and [`ApiError::Internal`] for transport
    /// faults.
    pub async fn run(&self) -> Result<(), ApiError> {
        let requested = self.registry.subscribed_kinds();
        if requested.is_empty() {
            return Err(ApiError::invalid_params(
                "no listeners registered, nothing to stream",
            ));
        }

        info!(url = %self.config.url, "connecting to event stream");
        let (ws_stream, _response) = tokio_tungstenite::connect_async(&self.config.url)
            .await
            .map_err(|e| ApiError::internal(format!("WebSocket connection failed: {e}")))?;
        let (mut write, mut read) = ws_stream.split();

        self.handshake(&mut write, &mut read, &requested).await?;

        self.event_loop(&mut write, &mut read).await
    }

    /// Authenticate and negotiate the requested streams.
    async fn handshake(
        &self,
        write: &mut WsSink,
        read: &mut WsSource,
        requested: &[EventKind],
    ) -> Result<(), ApiError> {
        let auth = AuthenticateRequest::new(
            self.config.credentials.key(),
            self.config.credentials.secret(),
        );
        send_json(write, &auth).await?;

        let ack = match next_message(write, read).await? {
            StreamMessage::Authorization(ack) => ack,
            other => {
                return Err(ApiError::internal(format!(
                    "expected authorization acknowledgment, got {other:?}"
                )));
            }
        };
        if !ack.is_authorized() {
            return Err(ApiError::Authentication {
                status: 401,
                reason: "Unauthorized".to_string(),
                message: Some("stream authentication was refused".to_string()),
            });
        }
        info!("event stream authenticated");

        let listen = ListenRequest::new(requested.to_vec());
        send_json(write, &listen).await?;

        let granted = match next_message(write, read).await? {
            StreamMessage::Listening(ack) => ack.data.streams,
            other => {
                return Err(ApiError::internal(format!(
                    "expected listening acknowledgment, got {other:?}"
                )));
            }
        };

        let requested_set: HashSet<&str> =
            requested.iter().map(|kind| kind.as_str()).collect();
        let granted_set: HashSet<&str> = granted.iter().map(String::as_str).collect();
        if requested_set != granted_set {
            return Err(ApiError::Subscription { granted });
        }
        info!(streams = ?granted, "event stream listening");
        Ok(())
    }

    /// Dispatch events until cancellation or connection end.
    async fn event_loop(&self, write: &mut WsSink, read: &mut WsSource) -> Result<(), ApiError> {
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("event stream cancelled");
                    return Ok(());
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => self.handle_frame(&text),
                        Some(Ok(Message::Binary(data))) => {
                            match String::from_utf8(data.to_vec()) {
                                Ok(text) => self.handle_frame(&text),
                                Err(_) => {
                                    warn!(len = data.len(), "dropping non-UTF8 binary frame");
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write
                                .send(Message::Pong(data))
                                .await
                                .map_err(|e| ApiError::internal(format!("WebSocket error: {e}")))?;
                        }
                        Some(Ok(Message::Close(_))) => {
                            info!("server closed the event stream");
                            return Ok(());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(ApiError::internal(format!("WebSocket error: {e}")));
                        }
                        None => {
                            info!("event stream ended");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Decode one frame and fan it out. Undecodable frames are dropped.
    fn handle_frame(&self, text: &str) {
        match codec::decode(text) {
            Ok(StreamMessage::Event(update)) => {
                debug!(stream = %update.stream, "event received");
                self.registry.dispatch(&update.data);
            }
            Ok(StreamMessage::Authorization(_) | StreamMessage::Listening(_)) => {
                debug!("ignoring control frame after handshake");
            }
            Err(e) => {
                warn!(error = %e, "dropping undecodable frame");
            }
        }
    }
}

async fn send_json<T: serde::Serialize>(write: &mut WsSink, value: &T) -> Result<(), ApiError> {
    let json = serde_json::to_string(value)
        .map_err(|e| ApiError::internal(format!("failed to encode frame: {e}")))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ApiError::internal(format!("WebSocket error: {e}")))
}

/// Read frames until one decodes to a [`StreamMessage`], answering pings
/// along the way.
async fn next_message(write: &mut WsSink, read: &mut WsSource) -> Result<StreamMessage, ApiError> {
    loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => {
                return codec::decode(&text)
                    .map_err(|e| ApiError::internal(format!("handshake decode failed: {e}")));
            }
            Some(Ok(Message::Binary(data))) => {
                let text = String::from_utf8(data.to_vec())
                    .map_err(|e| ApiError::internal(format!("handshake decode failed: {e}")))?;
                return codec::decode(&text)
                    .map_err(|e| ApiError::internal(format!("handshake decode failed: {e}")));
            }
            Some(Ok(Message::Ping(data))) => {
                write
                    .send(Message::Pong(data))
                    .await
                    .map_err(|e| ApiError::internal(format!("WebSocket error: {e}")))?;
            }
            Some(Ok(Message::Close(_))) | None => {
                return Err(ApiError::internal(
                    "connection closed during handshake".to_string(),
                ));
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                return Err(ApiError::internal(format!("WebSocket error: {e}")));
            }
        }
    }
}
