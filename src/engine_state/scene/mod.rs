//! # Scene Module
//!
//! This module provides the `SceneRegistry`, the owning store for all
//! free-standing placed objects, together with the bounded undo/redo history
//! of create/delete edits.
//!
//! ## Ownership
//!
//! Objects are owned exclusively by the registry. The 3D renderer keeps a
//! non-owning back-pointer (the object id) on its mesh instances for
//! picking; that relation is a lookup edge, never ownership.
//!
//! ## Undo model
//!
//! Create and delete are reversible and recorded in the history; partial
//! property updates are not. Transform edits being un-undoable while
//! create/delete are is a known gap carried over deliberately — see
//! DESIGN.md rather than the code for the reasoning.

use std::fmt;

use cgmath::Point3;
use log::debug;

use history::{ActionKind, EditHistory, UndoEntry};

pub mod history;
pub mod object;

pub use object::{ObjectId, ObjectKind, ObjectUpdate, SceneObject};

/// Errors produced by registry operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// The given object id is not present in the registry.
    NotFound(ObjectId),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::NotFound(id) => write!(f, "no scene object with id {}", id),
        }
    }
}

impl std::error::Error for SceneError {}

/// The owning registry of placed scene objects.
///
/// Objects are kept in insertion order. Ids come from a monotonic session
/// counter and are never reused, so an id uniquely names an object for the
/// whole session even across delete/undo cycles.
#[derive(Debug, Default)]
pub struct SceneRegistry {
    objects: Vec<SceneObject>,
    history: EditHistory,
    next_id: u64,
}

impl SceneRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new object of `kind` at `position` with the default
    /// transform, records the action, and returns the new object's id so
    /// callers can mark it selected.
    ///
    /// Recording the create clears the redo sequence.
    pub fn create_object(&mut self, kind: ObjectKind, position: Point3<f32>) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let object = SceneObject::new(id, kind, position);
        self.history
            .record(UndoEntry::new(ActionKind::Create, object.clone()));
        self.objects.push(object);
        debug!("created {} {}", kind.tag(), id);
        id
    }

    /// Deletes the object with the given id, recording the action.
    ///
    /// Recording the delete clears the redo sequence.
    ///
    /// # Errors
    /// * `NotFound` if no object with `id` exists.
    pub fn delete_object(&mut self, id: ObjectId) -> Result<(), SceneError> {
        let index = self.index_of(id).ok_or(SceneError::NotFound(id))?;
        let object = self.objects.remove(index);
        debug!("deleted {} {}", object.kind.tag(), id);
        self.history
            .record(UndoEntry::new(ActionKind::Delete, object));
        Ok(())
    }

    /// Merges the supplied partial fields into the object with the given id.
    ///
    /// Does not participate in the undo history.
    ///
    /// # Errors
    /// * `NotFound` if no object with `id` exists.
    pub fn update_properties(&mut self, id: ObjectId, update: ObjectUpdate) -> Result<(), SceneError> {
        let object = self.get_mut(id).ok_or(SceneError::NotFound(id))?;

        if let Some(position) = update.position {
            object.position = position;
        }
        if let Some(rotation) = update.rotation {
            object.rotation = rotation;
        }
        if let Some(scale) = update.scale {
            object.scale = scale;
        }
        if let Some(name) = update.name {
            object.properties.name = name;
        }
        if let Some(material) = update.material {
            object.properties.material = material;
        }
        if let Some(visible) = update.visible {
            object.properties.visible = visible;
        }
        Ok(())
    }

    /// Undoes the most recent recorded action, if any.
    ///
    /// The inverse is applied — a recorded create removes the object if it
    /// is still present, a recorded delete re-inserts the object with its
    /// original id and transform — and the entry moves to the redo
    /// sequence.
    ///
    /// # Returns
    /// The id of the affected object, or `None` if the undo stack was empty.
    pub fn undo(&mut self) -> Option<ObjectId> {
        let entry = self.history.pop_undo()?;
        let id = entry.object.id;

        match entry.action {
            ActionKind::Create => {
                if let Some(index) = self.index_of(id) {
                    self.objects.remove(index);
                }
            }
            ActionKind::Delete => {
                self.objects.push(entry.object.clone());
            }
        }

        self.history.push_redo(entry);
        debug!("undo affecting {}", id);
        Some(id)
    }

    /// Redoes the most recently undone action, if any.
    ///
    /// The original action is re-applied (not its inverse) and the entry
    /// moves back to the undo sequence without clearing redo.
    ///
    /// # Returns
    /// The id of the affected object, or `None` if the redo stack was empty.
    pub fn redo(&mut self) -> Option<ObjectId> {
        let entry = self.history.pop_redo()?;
        let id = entry.object.id;

        match entry.action {
            ActionKind::Create => {
                self.objects.push(entry.object.clone());
            }
            ActionKind::Delete => {
                if let Some(index) = self.index_of(id) {
                    self.objects.remove(index);
                }
            }
        }

        self.history.push_undo(entry);
        debug!("redo affecting {}", id);
        Some(id)
    }

    /// Returns the object with the given id, if present.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    /// Returns the object with the given id mutably, if present.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|object| object.id == id)
    }

    /// Iterates over all objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// The number of objects currently registered.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the registry holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of entries available to undo.
    pub fn undo_len(&self) -> usize {
        self.history.undo_len()
    }

    /// Number of entries available to redo.
    pub fn redo_len(&self) -> usize {
        self.history.redo_len()
    }

    /// Clears all objects and the whole history, used when a scene snapshot
    /// is loaded wholesale.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.history.clear();
    }

    /// Re-inserts an object restored from a snapshot, keeping the id
    /// counter ahead of every restored id.
    pub fn restore_object(&mut self, object: SceneObject) {
        self.next_id = self.next_id.max(object.id.0 + 1);
        self.objects.push(object);
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|object| object.id == id)
    }
}
