//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection. The
//! reader applies inbound messages in arrival order; a separate writer
//! task drains the connection's bounded outbound queue into the socket so
//! a slow peer only ever stalls itself.

use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, watch};

use crate::config::ConnectionSettings;
use crate::domain::{Frame, PlayerId};
use crate::service::SessionService;

/// Lifecycle phase of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Handshake in progress; no player record yet.
    Connecting,
    /// Player record exists and the connection receives broadcasts.
    Live,
    /// Terminal. The player record has been (or is being) removed.
    Closed,
}

/// Tracks the phase transitions of a single connection.
///
/// `go_live` succeeds once, from `Connecting`. `close` succeeds once, and
/// reports whether the connection had been live, which is exactly when
/// the player record must be removed.
#[derive(Debug)]
pub struct ConnectionLifecycle {
    player_id: PlayerId,
    phase: ConnectionPhase,
}

impl ConnectionLifecycle {
    /// Starts a lifecycle in [`ConnectionPhase::Connecting`].
    #[must_use]
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            phase: ConnectionPhase::Connecting,
        }
    }

    /// The connection id this lifecycle belongs to.
    #[must_use]
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    /// `Connecting → Live`. Returns `false` from any other phase.
    pub fn go_live(&mut self) -> bool {
        if self.phase != ConnectionPhase::Connecting {
            return false;
        }
        self.phase = ConnectionPhase::Live;
        true
    }

    /// `* → Closed`. Returns `true` only if the connection was live, so the
    /// caller runs disconnect handling exactly once.
    pub fn close(&mut self) -> bool {
        let was_live = self.phase == ConnectionPhase::Live;
        self.phase = ConnectionPhase::Closed;
        was_live
    }
}

/// Runs one WebSocket connection from handshake to cleanup.
///
/// - Assigns a fresh connection id and joins the session.
/// - Reads client frames and hands them to the [`SessionService`].
/// - Forwards queued frames to the client from a dedicated writer task.
/// - On close, read error, writer failure or server shutdown, leaves the
///   session exactly once.
pub async fn run_connection(
    socket: WebSocket,
    service: Arc<SessionService>,
    settings: ConnectionSettings,
    shutdown: watch::Receiver<bool>,
) {
    let (ws_tx, ws_rx) = socket.split();
    drive_connection(ws_tx, ws_rx, service, settings, shutdown).await;
}

/// Drives an already split connection. `ws_tx` moves to the writer task;
/// `ws_rx` is read on the current task.
async fn drive_connection<S, R, E>(
    ws_tx: S,
    mut ws_rx: R,
    service: Arc<SessionService>,
    settings: ConnectionSettings,
    mut shutdown: watch::Receiver<bool>,
) where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display + Send,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut lifecycle = ConnectionLifecycle::new(PlayerId::generate());
    let player_id = lifecycle.player_id().clone();
    let (out_tx, out_rx) = mpsc::channel::<Frame>(settings.outbound_capacity);

    let mut writer = tokio::spawn(write_loop(ws_tx, out_rx, settings, player_id.clone()));
    let mut writer_done = false;

    let shutting_down = *shutdown.borrow();
    if shutting_down || !service.join(&player_id, out_tx).await {
        lifecycle.close();
        writer.abort();
        return;
    }
    lifecycle.go_live();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        service.handle_message(&player_id, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            service.handle_message(&player_id, text).await;
                        }
                        Err(_) => tracing::debug!(player_id = %player_id, "dropping non-utf8 binary frame"),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(player_id = %player_id, error = %err, "ws read failed");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
            _ = &mut writer, if !writer_done => {
                writer_done = true;
                break;
            }
            _ = shutdown.changed() => break,
        }
    }

    if lifecycle.close() {
        service.leave(&player_id).await;
    }

    // Leaving dropped the last sender, so the writer drains what is queued
    // and sends a close frame.
    if !writer_done && tokio::time::timeout(settings.send_timeout, &mut writer).await.is_err() {
        writer.abort();
    }

    tracing::debug!(player_id = %player_id, "ws connection closed");
}

/// Drains the outbound queue into the socket, bounding every write by the
/// configured send timeout.
async fn write_loop<S>(
    mut ws_tx: S,
    mut out_rx: mpsc::Receiver<Frame>,
    settings: ConnectionSettings,
    player_id: PlayerId,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(frame) = out_rx.recv().await {
        match tokio::time::timeout(settings.send_timeout, ws_tx.send(Message::Text(frame))).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::debug!(player_id = %player_id, error = %err, "ws write failed");
                return;
            }
            Err(_) => {
                tracing::warn!(player_id = %player_id, "ws write timed out; closing connection");
                return;
            }
        }
    }
    let _ = ws_tx.close().await;
}
