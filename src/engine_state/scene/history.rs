//! Bounded undo/redo history for scene edits.
//!
//! Two ordered sequences of reversible entries, each capped at
//! [`HISTORY_CAP`] entries with FIFO eviction: pushing past the cap drops
//! the oldest entry rather than failing. Recording any new action clears
//! the redo sequence — redo is only valid immediately after an undo.

use std::collections::VecDeque;

use web_time::Instant;

use super::object::SceneObject;

/// Maximum number of entries kept on each of the undo and redo stacks.
pub const HISTORY_CAP: usize = 20;

/// The kind of scene-object action an entry records.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// An object was created.
    Create,
    /// An object was deleted.
    Delete,
}

/// One reversible scene edit.
#[derive(Clone, Debug)]
pub struct UndoEntry {
    /// What happened.
    pub action: ActionKind,
    /// Snapshot of the affected object, sufficient to invert or replay the
    /// action.
    pub object: SceneObject,
    /// When the action was recorded.
    pub timestamp: Instant,
}

impl UndoEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(action: ActionKind, object: SceneObject) -> Self {
        Self {
            action,
            object,
            timestamp: Instant::now(),
        }
    }
}

/// The paired, bounded undo and redo sequences.
#[derive(Debug, Default)]
pub struct EditHistory {
    undo: VecDeque<UndoEntry>,
    redo: VecDeque<UndoEntry>,
}

impl EditHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new action.
    ///
    /// Pushes onto the undo sequence (evicting the oldest entry past the
    /// cap) and clears the redo sequence, invalidating any stale redo
    /// entries.
    pub fn record(&mut self, entry: UndoEntry) {
        Self::push_capped(&mut self.undo, entry);
        self.redo.clear();
    }

    /// Pops the most recent undo entry, if any.
    pub fn pop_undo(&mut self) -> Option<UndoEntry> {
        self.undo.pop_back()
    }

    /// Pops the most recent redo entry, if any.
    pub fn pop_redo(&mut self) -> Option<UndoEntry> {
        self.redo.pop_back()
    }

    /// Pushes an undone entry onto the redo sequence (capped).
    pub fn push_redo(&mut self, entry: UndoEntry) {
        Self::push_capped(&mut self.redo, entry);
    }

    /// Pushes a redone entry back onto the undo sequence (capped) without
    /// clearing redo.
    pub fn push_undo(&mut self, entry: UndoEntry) {
        Self::push_capped(&mut self.undo, entry);
    }

    /// Number of entries available to undo.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of entries available to redo.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Drops all entries, e.g. when a scene is loaded wholesale.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_capped(stack: &mut VecDeque<UndoEntry>, entry: UndoEntry) {
        if stack.len() == HISTORY_CAP {
            stack.pop_front();
        }
        stack.push_back(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::scene::object::{ObjectId, ObjectKind, SceneObject};
    use cgmath::Point3;

    fn entry(n: u64) -> UndoEntry {
        UndoEntry::new(
            ActionKind::Create,
            SceneObject::new(ObjectId(n), ObjectKind::Cube, Point3::new(0.0, 0.0, 0.0)),
        )
    }

    #[test]
    fn record_clears_redo() {
        let mut history = EditHistory::new();
        history.record(entry(1));
        let undone = history.pop_undo().unwrap();
        history.push_redo(undone);
        assert_eq!(history.redo_len(), 1);

        history.record(entry(2));
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn undo_stack_evicts_oldest_past_cap() {
        let mut history = EditHistory::new();
        for n in 0..25 {
            history.record(entry(n));
        }
        assert_eq!(history.undo_len(), HISTORY_CAP);

        // The newest entry pops first; the five oldest are gone.
        let newest = history.pop_undo().unwrap();
        assert_eq!(newest.object.id, ObjectId(24));
        let mut oldest = newest;
        while let Some(e) = history.pop_undo() {
            oldest = e;
        }
        assert_eq!(oldest.object.id, ObjectId(5));
    }
}
