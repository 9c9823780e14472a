//! Per-connection session coordination.
//!
//! Each WebSocket connection gets one task running [`handle_socket`]. The
//! task owns the connection's entire lifecycle: `Unjoined -> Joined ->
//! {Left, Disconnected}`, with an `Idle <-> Stroking` sub-state while
//! joined. A connection belongs to at most one room at a time; joining a
//! second room leaves the first one before entering the second.
//!
//! Inbound events are handled one at a time, in arrival order. All room
//! mutation goes through the registry, which serializes writers per room,
//! and all fan-out goes through the room's broadcast channel. A failure
//! handling one event is reported to this connection only and never
//! disturbs other sessions or rooms.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use scrawl_core::{Author, StrokeData};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::{Envelope, RoomRegistry, Scope};

type WsSender = SplitSink<WebSocket, Message>;

/// Rejection of a join request. Reported to the originating connection
/// only; the connection stays unjoined and no other state is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("room id is required")]
    MissingRoom,
    #[error("display name is required")]
    MissingName,
}

/// Room id and display name must be non-empty after trimming.
pub fn validate_join(room: &str, name: &str) -> Result<(), JoinError> {
    if room.trim().is_empty() {
        return Err(JoinError::MissingRoom);
    }
    if name.trim().is_empty() {
        return Err(JoinError::MissingName);
    }
    Ok(())
}

struct Session {
    id: String,
    registry: Arc<RoomRegistry>,
    /// Room this connection is joined to, if any.
    room: Option<String>,
    /// Identity assigned at join time; present exactly while joined.
    identity: Option<Author>,
    /// Whether a stroke is currently in progress.
    stroking: bool,
    /// Subscription to the joined room's broadcast channel.
    rx: Option<broadcast::Receiver<Envelope>>,
}

/// Drive a WebSocket connection until it closes.
pub async fn handle_socket(socket: WebSocket, registry: Arc<RoomRegistry>) {
    let session_id = Uuid::new_v4().to_string();
    info!("new connection: {session_id}");

    let (mut sender, mut receiver) = socket.split();
    let mut session = Session {
        id: session_id,
        registry,
        room: None,
        identity: None,
        stroking: false,
        rx: None,
    };

    loop {
        tokio::select! {
            // Inbound events from the client
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if session.handle_message(client_msg, &mut sender).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("invalid message from {}: {e}", session.id);
                                let err = ServerMessage::Error {
                                    message: format!("invalid message: {e}"),
                                };
                                if send(&mut sender, &err).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Ignore ping/pong/binary
                    Some(Err(e)) => {
                        warn!("websocket error for {}: {e}", session.id);
                        break;
                    }
                }
            }

            // Frames fanned out by the joined room
            frame = session.recv_broadcast() => {
                if let Some((from, scope, server_msg)) = frame {
                    let deliver = scope == Scope::All || from != session.id;
                    if deliver && send(&mut sender, &server_msg).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    // A dropped connection is treated identically to an explicit leave.
    session.leave_current_room();
    info!("connection closed: {}", session.id);
}

async fn send(sender: &mut WsSender, msg: &ServerMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).unwrap();
    sender.send(Message::Text(json.into())).await
}

impl Session {
    /// Next frame from the joined room, or never when unjoined.
    async fn recv_broadcast(&mut self) -> Option<Envelope> {
        match &mut self.rx {
            Some(rx) => rx.recv().await.ok(),
            None => std::future::pending().await,
        }
    }

    /// Room id and author identity while joined.
    fn active(&self) -> Option<(String, Author)> {
        match (&self.room, &self.identity) {
            (Some(room), Some(author)) => Some((room.clone(), author.clone())),
            _ => None,
        }
    }

    async fn handle_message(
        &mut self,
        msg: ClientMessage,
        sender: &mut WsSender,
    ) -> Result<(), axum::Error> {
        match msg {
            ClientMessage::Join { room, name } => {
                if let Err(e) = validate_join(&room, &name) {
                    warn!("rejected join from {}: {e}", self.id);
                    return send(sender, &ServerMessage::Error { message: e.to_string() }).await;
                }

                // At most one membership per connection: leave first.
                self.leave_current_room();

                let room_id = room.trim().to_string();
                let outcome = self.registry.join(&room_id, &self.id, name.trim());
                self.rx = Some(outcome.rx);
                self.room = Some(room_id.clone());
                self.identity = Some(Author {
                    session_id: self.id.clone(),
                    name: outcome.member.name.clone(),
                    color: outcome.member.color.clone(),
                });

                // The registry has already queued the membership notice on
                // the room channel; the snapshot unicast still reaches the
                // joiner first because subscribed frames are only forwarded
                // once this handler returns.
                send(
                    sender,
                    &ServerMessage::CanvasState {
                        operations: outcome.operations,
                        can_undo: outcome.can_undo,
                        can_redo: outcome.can_redo,
                    },
                )
                .await?;
                info!("{} joined room {room_id}", self.id);
            }

            ClientMessage::Leave => self.leave_current_room(),

            ClientMessage::StrokeStart { tool, color, width, points } => {
                let Some((room, author)) = self.active() else {
                    return Ok(());
                };
                // A start while already stroking restarts the stroke.
                self.stroking = true;
                self.registry.broadcast(
                    &room,
                    &self.id,
                    Scope::Others,
                    ServerMessage::StrokeStarted {
                        session_id: author.session_id,
                        name: author.name,
                        tool,
                        color,
                        width,
                        points,
                    },
                );
            }

            ClientMessage::StrokeMove { points } => {
                // Moves are disposable: outside an active stroke they are
                // dropped, not relayed.
                if !self.stroking {
                    return Ok(());
                }
                let Some((room, _)) = self.active() else {
                    return Ok(());
                };
                self.registry.broadcast(
                    &room,
                    &self.id,
                    Scope::Others,
                    ServerMessage::StrokeMoved { session_id: self.id.clone(), points },
                );
            }

            ClientMessage::StrokeEnd { tool, color, width, points } => {
                let Some((room, author)) = self.active() else {
                    return Ok(());
                };
                self.stroking = false;
                let stroke = StrokeData { tool, color, width, points };
                // The registry publishes the committed operation to the
                // whole room, author included, under the room lock.
                if let Some((operation, _, _)) = self.registry.commit_stroke(&room, author, stroke)
                {
                    info!("operation {} committed in room {room}", operation.id);
                }
            }

            ClientMessage::Undo => {
                let Some((room, _)) = self.active() else {
                    return Ok(());
                };
                if let Some((Some(op), _, _)) = self.registry.undo(&room, &self.id) {
                    info!("operation {} undone in room {room}", op.id);
                }
            }

            ClientMessage::Redo => {
                let Some((room, _)) = self.active() else {
                    return Ok(());
                };
                if let Some((Some(op), _, _)) = self.registry.redo(&room, &self.id) {
                    info!("operation {} redone in room {room}", op.id);
                }
            }

            ClientMessage::Clear => {
                let Some((room, _)) = self.active() else {
                    return Ok(());
                };
                if self.registry.clear(&room, &self.id) {
                    info!("canvas cleared in room {room}");
                }
            }

            ClientMessage::CursorMove { x, y } => {
                let Some((room, _)) = self.active() else {
                    return Ok(());
                };
                let _ = self.registry.update_cursor(&room, &self.id, x, y);
            }
        }
        Ok(())
    }

    /// Leave the joined room, if any, and tell the remaining members.
    /// A no-op for unjoined connections.
    fn leave_current_room(&mut self) {
        self.stroking = false;
        self.rx = None;
        self.identity = None;
        let Some(room) = self.room.take() else {
            return;
        };
        if let Some(member) = self.registry.leave(&room, &self.id) {
            info!("{} ({}) left room {room}", member.name, self.id);
        }
    }
}
