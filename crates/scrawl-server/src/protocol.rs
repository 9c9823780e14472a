//! Wire protocol between clients and the room server.
//!
//! Messages are JSON with a `type` tag:
//! ```json
//! { "type": "join", "room": "room-id", "name": "alice" }
//! { "type": "stroke_end", "tool": "pen", "color": "#000", "width": 2.0, "points": [...] }
//! { "type": "undo" }
//! ```

use scrawl_core::{Member, Operation, OperationId, StrokePoint};
use serde::{Deserialize, Serialize};

/// Messages sent by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a room (implicitly leaves the current room first)
    Join { room: String, name: String },
    /// Leave the current room
    Leave,
    /// Begin a stroke; live preview only, nothing is committed
    StrokeStart {
        tool: String,
        color: String,
        width: f64,
        #[serde(default)]
        points: Vec<StrokePoint>,
    },
    /// Incremental points for the stroke in progress; disposable
    StrokeMove { points: Vec<StrokePoint> },
    /// Finish a stroke and commit it to the room history
    StrokeEnd {
        tool: String,
        color: String,
        width: f64,
        points: Vec<StrokePoint>,
    },
    /// Undo the room's most recent operation, whoever authored it
    Undo,
    /// Redo the most recently undone operation
    Redo,
    /// Drop the room's entire history
    Clear,
    /// Cursor moved
    CursorMove { x: f64, y: f64 },
}

/// Messages sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full history snapshot, sent to a joining connection only
    CanvasState {
        operations: Vec<Operation>,
        can_undo: bool,
        can_redo: bool,
    },
    /// A member joined; carries the full member list
    UserJoined {
        session_id: String,
        name: String,
        color: String,
        users: Vec<Member>,
    },
    /// A member left; carries the remaining member list
    UserLeft {
        session_id: String,
        name: String,
        users: Vec<Member>,
    },
    /// A remote member started a stroke
    StrokeStarted {
        session_id: String,
        name: String,
        tool: String,
        color: String,
        width: f64,
        points: Vec<StrokePoint>,
    },
    /// Incremental points from a remote stroke in progress
    StrokeMoved {
        session_id: String,
        points: Vec<StrokePoint>,
    },
    /// A remote member finished their stroke (the committed operation
    /// arrives separately as `OperationCommitted`)
    StrokeFinished { session_id: String },
    /// An operation was committed to the room history
    OperationCommitted {
        operation: Operation,
        can_undo: bool,
        can_redo: bool,
    },
    /// Result of an undo request; `operation_id` is absent when there was
    /// nothing to undo
    OperationUndone {
        #[serde(skip_serializing_if = "Option::is_none")]
        operation_id: Option<OperationId>,
        can_undo: bool,
        can_redo: bool,
    },
    /// Result of a redo request; `operation` is absent when there was
    /// nothing to redo
    OperationRedone {
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<Operation>,
        can_undo: bool,
        can_redo: bool,
    },
    /// The room history was cleared
    CanvasCleared { can_undo: bool, can_redo: bool },
    /// A remote member's cursor moved
    CursorUpdate {
        session_id: String,
        name: String,
        color: String,
        x: f64,
        y: f64,
    },
    /// Error message
    Error { message: String },
}
