//! Committed drawing operations.

use serde::{Deserialize, Serialize};

/// Identifier of a committed operation. Strictly increasing and unique
/// within one room's lifetime, never reused even across undo/redo.
pub type OperationId = u64;

/// A single sampled point of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Client-side capture time, unix milliseconds.
    pub timestamp: u64,
}

/// Payload of a committed stroke: the client's paint state plus the full
/// point sequence. The server never interprets `tool`; "eraser" is just
/// another tool string the clients agree on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeData {
    pub tool: String,
    pub color: String,
    pub width: f64,
    pub points: Vec<StrokePoint>,
}

/// Identity of the member that authored an operation, captured at commit
/// time so history survives the author leaving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub session_id: String,
    pub name: String,
    pub color: String,
}

/// What an operation does. Currently only freehand strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum OperationKind {
    Stroke(StrokeData),
}

/// An immutable entry in a room's committed history. Only ever removed
/// from or restored to the log, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    #[serde(flatten)]
    pub author: Author,
    #[serde(flatten)]
    pub kind: OperationKind,
    /// Server commit time, unix milliseconds.
    pub committed_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke_op() -> Operation {
        Operation {
            id: 3,
            author: Author {
                session_id: "s-1".into(),
                name: "alice".into(),
                color: "#FF6B6B".into(),
            },
            kind: OperationKind::Stroke(StrokeData {
                tool: "pen".into(),
                color: "#000000".into(),
                width: 2.0,
                points: vec![StrokePoint {
                    x: 1.0,
                    y: 2.0,
                    timestamp: 5,
                }],
            }),
            committed_at: 10,
        }
    }

    #[test]
    fn test_operation_wire_shape() {
        let json = serde_json::to_value(stroke_op()).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["session_id"], "s-1");
        assert_eq!(json["name"], "alice");
        assert_eq!(json["kind"], "stroke");
        assert_eq!(json["data"]["tool"], "pen");
        assert_eq!(json["data"]["points"][0]["x"], 1.0);
        assert_eq!(json["committed_at"], 10);
    }

    #[test]
    fn test_operation_roundtrip() {
        let op = stroke_op();
        let json = serde_json::to_string(&op).unwrap();
        let back: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }
}
