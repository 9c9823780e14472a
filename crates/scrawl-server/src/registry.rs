//! Room registry: lifecycle, membership, presence and per-room fan-out.
//!
//! Rooms are created lazily on first join and destroyed the instant their
//! last member leaves, history and all. The backing `DashMap` locks one
//! room entry per mutation, which serializes all writes to a given room
//! while leaving unrelated rooms free to proceed concurrently.
//!
//! Every state-changing method publishes its resulting frames while the
//! room entry is still locked. Mutation and publication therefore form one
//! critical section per room, and the broadcast channel carries frames in
//! exactly the order the mutations were applied. `broadcast::Sender::send`
//! never blocks, so holding the entry across it is safe.

use dashmap::DashMap;
use scrawl_core::time::now_millis;
use scrawl_core::{Author, Member, Operation, OperationKind, Palette, Room, StrokeData};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::protocol::ServerMessage;

const CHANNEL_CAPACITY: usize = 256;

/// Fan-out scope of a broadcast frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every member of the room, the sender included.
    All,
    /// Every member except the sender.
    Others,
}

/// A frame queued on a room's broadcast channel: sender id, scope, payload.
pub type Envelope = (String, Scope, ServerMessage);

/// Everything a joiner needs, captured under a single room lock so the
/// snapshot and the subscription are mutually consistent: any operation in
/// the snapshot had its frame published before the subscription existed.
pub struct JoinOutcome {
    pub member: Member,
    pub rx: broadcast::Receiver<Envelope>,
    pub operations: Vec<Operation>,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Per-room operational counters.
#[derive(Debug, Clone, Serialize)]
pub struct RoomStats {
    pub id: String,
    pub member_count: usize,
    pub active_count: usize,
    pub redoable_count: usize,
}

/// Registry-wide operational counters.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub room_count: usize,
    pub total_members: usize,
    pub rooms: Vec<RoomStats>,
}

struct RoomState {
    room: Room,
    tx: broadcast::Sender<Envelope>,
}

impl RoomState {
    fn new(room_id: &str) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            room: Room::new(room_id),
            tx,
        }
    }
}

/// Shared server state: every active room plus the color allocator.
pub struct RoomRegistry {
    rooms: DashMap<String, RoomState>,
    palette: Palette,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            palette: Palette::new(),
        }
    }

    /// Register a session as a member of a room, creating the room on
    /// demand. Assigns the next palette color and announces the new
    /// membership to the whole room. Infallible by design: a joinable room
    /// always exists once validation has passed.
    pub fn join(&self, room_id: &str, session_id: &str, name: &str) -> JoinOutcome {
        let mut entry = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| RoomState::new(room_id));

        let member = Member {
            id: session_id.to_string(),
            name: name.to_string(),
            color: self.palette.next_color().to_string(),
            joined_at: now_millis(),
            cursor: Default::default(),
        };
        entry.room.insert_member(member.clone());

        let rx = entry.tx.subscribe();
        let _ = entry.tx.send((
            session_id.to_string(),
            Scope::All,
            ServerMessage::UserJoined {
                session_id: member.id.clone(),
                name: member.name.clone(),
                color: member.color.clone(),
                users: entry.room.members(),
            },
        ));

        JoinOutcome {
            rx,
            operations: entry.room.history.snapshot(),
            can_undo: entry.room.history.can_undo(),
            can_redo: entry.room.history.can_redo(),
            member,
        }
    }

    /// Remove a member and notify the remaining members; destroys the room
    /// once its membership is empty. `None` when the room or member did
    /// not exist.
    pub fn leave(&self, room_id: &str, session_id: &str) -> Option<Member> {
        let mut entry = self.rooms.get_mut(room_id)?;
        let member = entry.room.remove_member(session_id)?;
        if entry.room.is_empty() {
            drop(entry);
            self.rooms.remove(room_id);
        } else {
            let _ = entry.tx.send((
                session_id.to_string(),
                Scope::Others,
                ServerMessage::UserLeft {
                    session_id: member.id.clone(),
                    name: member.name.clone(),
                    users: entry.room.members(),
                },
            ));
        }
        Some(member)
    }

    /// Commit a finished stroke to the room's history and publish it to
    /// the whole room, author included, with a separate completion notice
    /// for everyone else. Returns the stored operation plus refreshed
    /// undo/redo flags.
    pub fn commit_stroke(
        &self,
        room_id: &str,
        author: Author,
        stroke: StrokeData,
    ) -> Option<(Operation, bool, bool)> {
        let mut entry = self.rooms.get_mut(room_id)?;
        let from = author.session_id.clone();
        let op = entry
            .room
            .history
            .append(author, OperationKind::Stroke(stroke));
        let can_undo = entry.room.history.can_undo();
        let can_redo = entry.room.history.can_redo();
        let _ = entry.tx.send((
            from.clone(),
            Scope::All,
            ServerMessage::OperationCommitted {
                operation: op.clone(),
                can_undo,
                can_redo,
            },
        ));
        let _ = entry.tx.send((
            from.clone(),
            Scope::Others,
            ServerMessage::StrokeFinished { session_id: from },
        ));
        Some((op, can_undo, can_redo))
    }

    /// Undo the room's most recent operation and broadcast the result,
    /// no-op included. The inner `Option` is `None` for an empty log,
    /// which is not an error.
    pub fn undo(&self, room_id: &str, session_id: &str) -> Option<(Option<Operation>, bool, bool)> {
        let mut entry = self.rooms.get_mut(room_id)?;
        let op = entry.room.history.undo();
        let can_undo = entry.room.history.can_undo();
        let can_redo = entry.room.history.can_redo();
        let _ = entry.tx.send((
            session_id.to_string(),
            Scope::All,
            ServerMessage::OperationUndone {
                operation_id: op.as_ref().map(|op| op.id),
                can_undo,
                can_redo,
            },
        ));
        Some((op, can_undo, can_redo))
    }

    /// Redo the most recently undone operation, if any, and broadcast the
    /// result, no-op included.
    pub fn redo(&self, room_id: &str, session_id: &str) -> Option<(Option<Operation>, bool, bool)> {
        let mut entry = self.rooms.get_mut(room_id)?;
        let op = entry.room.history.redo();
        let can_undo = entry.room.history.can_undo();
        let can_redo = entry.room.history.can_redo();
        let _ = entry.tx.send((
            session_id.to_string(),
            Scope::All,
            ServerMessage::OperationRedone {
                operation: op.clone(),
                can_undo,
                can_redo,
            },
        ));
        Some((op, can_undo, can_redo))
    }

    /// Irreversibly drop the room's history, redo stack included, and
    /// broadcast the zeroed counts.
    pub fn clear(&self, room_id: &str, session_id: &str) -> bool {
        match self.rooms.get_mut(room_id) {
            Some(mut entry) => {
                entry.room.history.clear();
                let _ = entry.tx.send((
                    session_id.to_string(),
                    Scope::All,
                    ServerMessage::CanvasCleared {
                        can_undo: false,
                        can_redo: false,
                    },
                ));
                true
            }
            None => false,
        }
    }

    /// Last-write-wins cursor update, relayed to the other members.
    /// Returns the refreshed member record.
    pub fn update_cursor(
        &self,
        room_id: &str,
        session_id: &str,
        x: f64,
        y: f64,
    ) -> Option<Member> {
        let mut entry = self.rooms.get_mut(room_id)?;
        let member = entry.room.update_cursor(session_id, x, y).cloned()?;
        let _ = entry.tx.send((
            session_id.to_string(),
            Scope::Others,
            ServerMessage::CursorUpdate {
                session_id: member.id.clone(),
                name: member.name.clone(),
                color: member.color.clone(),
                x,
                y,
            },
        ));
        Some(member)
    }

    /// Look up a single member.
    pub fn member(&self, room_id: &str, session_id: &str) -> Option<Member> {
        self.rooms
            .get(room_id)?
            .room
            .member(session_id)
            .cloned()
    }

    /// All members of a room; empty when the room does not exist.
    pub fn members(&self, room_id: &str) -> Vec<Member> {
        self.rooms
            .get(room_id)
            .map(|entry| entry.room.members())
            .unwrap_or_default()
    }

    /// Whether a room currently exists (i.e. has at least one member).
    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Queue a frame on a room's broadcast channel. For stateless relays
    /// (live stroke previews); state-changing frames are published by the
    /// mutating methods themselves, under the room lock. Dropped silently
    /// when the room no longer exists or has no listeners.
    pub fn broadcast(&self, room_id: &str, from: &str, scope: Scope, msg: ServerMessage) {
        if let Some(entry) = self.rooms.get(room_id) {
            let _ = entry.tx.send((from.to_string(), scope, msg));
        }
    }

    /// Counters for operational visibility.
    pub fn statistics(&self) -> Statistics {
        let mut rooms = Vec::with_capacity(self.rooms.len());
        let mut total_members = 0;
        for entry in self.rooms.iter() {
            total_members += entry.room.member_count();
            rooms.push(RoomStats {
                id: entry.room.id.clone(),
                member_count: entry.room.member_count(),
                active_count: entry.room.history.active_count(),
                redoable_count: entry.room.history.redoable_count(),
            });
        }
        Statistics {
            room_count: rooms.len(),
            total_members,
            rooms,
        }
    }
}
