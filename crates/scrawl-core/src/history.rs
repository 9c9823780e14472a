//! Per-room ordered operation history with global undo/redo.

use crate::operation::{Author, Operation, OperationId, OperationKind};
use crate::time::now_millis;

/// Ordered history of committed operations plus a redo stack.
///
/// Undo is room-global: it always targets the most recently committed
/// operation, regardless of which member authored it. Branching history is
/// not supported; any append discards whatever was redoable.
#[derive(Debug, Default)]
pub struct OperationLog {
    operations: Vec<Operation>,
    redo_stack: Vec<Operation>,
    next_id: OperationId,
}

impl OperationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a new operation: assign the next sequence id and a commit
    /// timestamp, append it to the log and clear the redo stack.
    pub fn append(&mut self, author: Author, kind: OperationKind) -> Operation {
        let op = Operation {
            id: self.next_id,
            author,
            kind,
            committed_at: now_millis(),
        };
        self.next_id += 1;
        self.redo_stack.clear();
        self.operations.push(op.clone());
        op
    }

    /// Remove the most recently committed operation and park it on the redo
    /// stack. `None` when the log is empty; that is not an error.
    pub fn undo(&mut self) -> Option<Operation> {
        let op = self.operations.pop()?;
        self.redo_stack.push(op.clone());
        Some(op)
    }

    /// Restore the most recently undone operation to the log tail.
    /// `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Operation> {
        let op = self.redo_stack.pop()?;
        self.operations.push(op.clone());
        Some(op)
    }

    /// The full active (non-undone) history in commit order, safe to hand
    /// to a newly joined member for a deterministic redraw.
    pub fn snapshot(&self) -> Vec<Operation> {
        self.operations.clone()
    }

    /// Drop the entire history, redo stack included. Irreversible.
    pub fn clear(&mut self) {
        self.operations.clear();
        self.redo_stack.clear();
    }

    /// Number of active operations.
    pub fn active_count(&self) -> usize {
        self.operations.len()
    }

    /// Number of operations that could be redone.
    pub fn redoable_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.operations.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::StrokeData;

    fn author(name: &str) -> Author {
        Author {
            session_id: format!("sid-{name}"),
            name: name.to_string(),
            color: "#FF6B6B".to_string(),
        }
    }

    fn stroke(width: f64) -> OperationKind {
        OperationKind::Stroke(StrokeData {
            tool: "pen".to_string(),
            color: "#000000".to_string(),
            width,
            points: Vec::new(),
        })
    }

    #[test]
    fn test_empty_log() {
        let mut log = OperationLog::new();
        assert_eq!(log.active_count(), 0);
        assert!(!log.can_undo());
        assert!(!log.can_redo());
        assert!(log.undo().is_none());
        assert!(log.redo().is_none());
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let mut log = OperationLog::new();
        let a = log.append(author("alice"), stroke(1.0));
        let b = log.append(author("bob"), stroke(2.0));
        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
        assert_eq!(log.active_count(), 2);
    }

    #[test]
    fn test_undo_targets_most_recent() {
        let mut log = OperationLog::new();
        log.append(author("alice"), stroke(1.0));
        let s2 = log.append(author("bob"), stroke(2.0));
        let undone = log.undo().unwrap();
        assert_eq!(undone.id, s2.id);
        assert_eq!(log.active_count(), 1);
        assert_eq!(log.redoable_count(), 1);
    }

    #[test]
    fn test_undo_then_redo_restores_identical_content() {
        let mut log = OperationLog::new();
        log.append(author("alice"), stroke(1.0));
        log.append(author("alice"), stroke(2.0));
        let before = log.snapshot();

        let undone = log.undo().unwrap();
        let redone = log.redo().unwrap();
        assert_eq!(undone, redone);
        assert_eq!(log.snapshot(), before);
    }

    #[test]
    fn test_append_discards_redo_stack() {
        let mut log = OperationLog::new();
        log.append(author("alice"), stroke(1.0));
        log.undo().unwrap();
        assert!(log.can_redo());

        log.append(author("alice"), stroke(2.0));
        assert!(!log.can_redo());
        assert!(log.redo().is_none());
    }

    #[test]
    fn test_ids_never_reused_across_undo_redo() {
        let mut log = OperationLog::new();
        log.append(author("alice"), stroke(1.0));
        log.undo().unwrap();
        let next = log.append(author("alice"), stroke(2.0));
        // Id 0 was undone and discarded; the new commit still gets a fresh id.
        assert_eq!(next.id, 1);
    }

    #[test]
    fn test_snapshot_excludes_undone_operations() {
        let mut log = OperationLog::new();
        let s1 = log.append(author("alice"), stroke(1.0));
        log.append(author("bob"), stroke(2.0));
        log.undo().unwrap();

        let snap = log.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id, s1.id);
    }

    #[test]
    fn test_clear_is_irreversible() {
        let mut log = OperationLog::new();
        log.append(author("alice"), stroke(1.0));
        log.append(author("alice"), stroke(2.0));
        log.undo().unwrap();

        log.clear();
        assert_eq!(log.active_count(), 0);
        assert_eq!(log.redoable_count(), 0);
        assert!(log.redo().is_none());
    }

    #[test]
    fn test_affordance_flags_scenario() {
        // join -> empty; append S1; undo; redo
        let mut log = OperationLog::new();
        assert!(!log.can_undo() && !log.can_redo());

        let s1 = log.append(author("alice"), stroke(1.0));
        assert!(log.can_undo() && !log.can_redo());

        assert_eq!(log.undo().unwrap().id, s1.id);
        assert!(!log.can_undo() && log.can_redo());

        assert_eq!(log.redo().unwrap().id, s1.id);
        assert!(log.can_undo() && !log.can_redo());
    }
}
