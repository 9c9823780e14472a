//! Room and member records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::history::OperationLog;
use crate::time::now_millis;

/// Cursor position of a member. Last write wins; coordinates are never
/// bounds-checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

/// A connected member of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Connection-scoped session id, unique only while connected.
    pub id: String,
    pub name: String,
    /// Palette color assigned at join time.
    pub color: String,
    /// Unix milliseconds.
    pub joined_at: u64,
    #[serde(default)]
    pub cursor: Cursor,
}

/// An ephemeral drawing room. A room exists only while it has members; the
/// whole record, history included, is dropped the moment the last member
/// leaves and is not recoverable.
#[derive(Debug)]
pub struct Room {
    pub id: String,
    members: HashMap<String, Member>,
    pub history: OperationLog,
    /// Unix milliseconds.
    pub created_at: u64,
}

impl Room {
    /// Create an empty room with a fresh history.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            members: HashMap::new(),
            history: OperationLog::new(),
            created_at: now_millis(),
        }
    }

    /// Register a member, replacing any previous record under the same id.
    pub fn insert_member(&mut self, member: Member) {
        self.members.insert(member.id.clone(), member);
    }

    /// Remove a member. Returns the removed record, `None` if the id was
    /// not a member.
    pub fn remove_member(&mut self, session_id: &str) -> Option<Member> {
        self.members.remove(session_id)
    }

    /// Look up a single member.
    pub fn member(&self, session_id: &str) -> Option<&Member> {
        self.members.get(session_id)
    }

    /// All current members. Iteration order is unspecified.
    pub fn members(&self) -> Vec<Member> {
        self.members.values().cloned().collect()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Update a member's cursor. Returns the refreshed member record so the
    /// caller can relay identity along with the position.
    pub fn update_cursor(&mut self, session_id: &str, x: f64, y: f64) -> Option<&Member> {
        let member = self.members.get_mut(session_id)?;
        member.cursor = Cursor { x, y };
        Some(member)
    }
}
