use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use uuid::Uuid;

use crate::dom::Element;
use crate::events::{EventBus, PageEvent};
use crate::hooks::HookRegistry;

use super::config::SessionConfig;
use super::message::{ClientMessage, ServerMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Cloneable handle onto the live session. Sends are fire-and-forget: when
/// the transport is not connected the message is dropped, and the next
/// full-state forward restores consistency.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionShared>,
}

struct SessionShared {
    id: Uuid,
    endpoint: Url,
    state: Mutex<ConnectionState>,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    bus: EventBus,
    connected_at: Mutex<Option<DateTime<Utc>>>,
    latency_sim: Mutex<Option<Duration>>,
    debug: AtomicBool,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.lock()
    }

    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        *self.inner.connected_at.lock()
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    /// Queue a named event for the server. Returns false when the event was
    /// dropped because the transport is unavailable.
    pub fn push_event(&self, name: &str, payload: Value) -> bool {
        if self.state() != ConnectionState::Connected {
            tracing::debug!(event = name, "transport not connected, dropping event");
            return false;
        }
        let sent = self
            .inner
            .outbound
            .send(ClientMessage::event(name, payload))
            .is_ok();
        if !sent {
            tracing::debug!(event = name, "socket task gone, dropping event");
        }
        sent
    }

    /// Verbose wire logging, toggleable from the console via the debug
    /// accessor.
    pub fn enable_debug(&self) {
        self.inner.debug.store(true, Ordering::SeqCst);
    }

    pub fn disable_debug(&self) {
        self.inner.debug.store(false, Ordering::SeqCst);
    }

    pub fn debug_enabled(&self) -> bool {
        self.inner.debug.load(Ordering::SeqCst)
    }

    /// Delay every outbound send by `latency` for the rest of the session.
    pub fn enable_latency_sim(&self, latency: Duration) {
        *self.inner.latency_sim.lock() = Some(latency);
    }

    pub fn disable_latency_sim(&self) {
        *self.inner.latency_sim.lock() = None;
    }

    pub fn latency_sim(&self) -> Option<Duration> {
        *self.inner.latency_sim.lock()
    }

    /// A handle bound to no transport: state stays `Disconnected` and every
    /// push is dropped. Used by tests and offline wiring.
    pub fn disconnected() -> SessionHandle {
        let (outbound, _) = mpsc::unbounded_channel();
        SessionHandle {
            inner: Arc::new(SessionShared {
                id: Uuid::new_v4(),
                endpoint: Url::parse("ws://127.0.0.1:0/live").expect("static endpoint parses"),
                state: Mutex::new(ConnectionState::Disconnected),
                outbound,
                bus: EventBus::new(),
                connected_at: Mutex::new(None),
                latency_sim: Mutex::new(None),
                debug: AtomicBool::new(false),
            }),
        }
    }

    fn set_state(&self, state: ConnectionState) {
        *self.inner.state.lock() = state;
    }

    fn mark_connected(&self) {
        *self.inner.state.lock() = ConnectionState::Connected;
        *self.inner.connected_at.lock() = Some(Utc::now());
    }
}

/// The live session: owns the socket tasks and the hook registry. One per
/// process; torn down on drop.
pub struct LiveSession {
    handle: SessionHandle,
    hooks: Arc<HookRegistry>,
    forward: JoinHandle<()>,
    receive: JoinHandle<()>,
}

impl LiveSession {
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.handle.state()
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Bind the hook declared on `host` to it, using this session for
    /// outbound events.
    pub fn mount(&self, host: &Element) -> Result<()> {
        self.hooks.mount(host, self.handle())
    }

    pub fn unmount(&self, element_id: &str) -> bool {
        self.hooks.unmount(element_id)
    }

    pub fn close(self) {
        self.handle.set_state(ConnectionState::Disconnected);
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.forward.abort();
        self.receive.abort();
    }
}

/// Open the session: dial the endpoint within the fallback budget, queue the
/// handshake, and start the forward/receive tasks. The session counts as
/// `Connected` once the server acknowledges the handshake.
pub async fn connect(endpoint: &str, config: SessionConfig) -> Result<LiveSession> {
    let url = Url::parse(endpoint).map_err(|e| anyhow!("invalid session endpoint: {e}"))?;
    let SessionConfig {
        fallback_timeout,
        params,
        hooks,
        dev: _,
        bus,
    } = config;
    let bus = bus.unwrap_or_default();

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();
    let handle = SessionHandle {
        inner: Arc::new(SessionShared {
            id: Uuid::new_v4(),
            endpoint: url.clone(),
            state: Mutex::new(ConnectionState::Connecting),
            outbound: outbound_tx.clone(),
            bus: bus.clone(),
            connected_at: Mutex::new(None),
            latency_sim: Mutex::new(None),
            debug: AtomicBool::new(false),
        }),
    };

    bus.publish(PageEvent::LoadingStart);

    let (ws, _) = timeout(fallback_timeout, tokio_tungstenite::connect_async(url.as_str()))
        .await
        .map_err(|_| {
            anyhow!("connect to {url} exceeded fallback budget of {fallback_timeout:?}")
        })??;

    let (mut ws_tx, mut ws_rx) = ws.split();

    // Handshake goes out first; it is queued before the forwarder starts.
    let _ = outbound_tx.send(ClientMessage::handshake(handle.id(), params));

    let forward_handle = handle.clone();
    let forward = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Some(delay) = forward_handle.latency_sim() {
                tokio::time::sleep(delay).await;
            }
            if forward_handle.debug_enabled() {
                tracing::debug!(message = ?msg, "outbound");
            }
            match msg.encode() {
                Ok(frame) => {
                    if ws_tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(err) => tracing::warn!(error = %err, "failed to encode outbound message"),
            }
        }
    });

    let recv_handle = handle.clone();
    let receive = tokio::spawn(async move {
        while let Some(frame) = ws_rx.next().await {
            match frame {
                Ok(frame @ (Message::Text(_) | Message::Binary(_))) => {
                    let Some(msg) = ServerMessage::decode(&frame) else {
                        tracing::debug!("dropping unrecognized frame");
                        continue;
                    };
                    match msg {
                        ServerMessage::HandshakeAck { session_id } => {
                            tracing::info!(%session_id, "session connected");
                            recv_handle.mark_connected();
                            recv_handle.bus().publish(PageEvent::LoadingStop);
                        }
                        ServerMessage::Event { name, payload } => {
                            recv_handle
                                .bus()
                                .publish(PageEvent::ServerEvent { name, payload });
                        }
                        ServerMessage::Log { level, message } => {
                            recv_handle
                                .bus()
                                .publish(PageEvent::ServerLog { level, message });
                        }
                        ServerMessage::ReloadAttached => {
                            recv_handle.bus().publish(PageEvent::ReloadAttached);
                        }
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Err(err) => {
                    tracing::debug!(error = %err, "socket read error");
                    break;
                }
            }
        }
        recv_handle.set_state(ConnectionState::Disconnected);
    });

    Ok(LiveSession {
        handle,
        hooks: Arc::new(hooks),
        forward,
        receive,
    })
}
