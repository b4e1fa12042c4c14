//! Scene registry undo/redo semantics: exact inversion, redo
//! invalidation, and the bounded-history eviction behavior.

use cgmath::{Point3, Vector3};

use voxel_sandbox::engine_state::scene::history::HISTORY_CAP;
use voxel_sandbox::engine_state::scene::{ObjectKind, ObjectUpdate, SceneError, SceneRegistry};

#[test]
fn undo_create_removes_and_redo_restores_identically() {
    let mut registry = SceneRegistry::new();
    let id = registry.create_object(ObjectKind::House, Point3::new(2.0, 0.0, -3.0));
    let original = registry.get(id).unwrap().clone();

    assert_eq!(registry.undo(), Some(id));
    assert!(registry.is_empty());
    assert!(registry.get(id).is_none());

    assert_eq!(registry.redo(), Some(id));
    let restored = registry.get(id).unwrap();
    assert_eq!(restored, &original, "same id, transform, and properties");
}

#[test]
fn undo_delete_reinserts_with_original_transform() {
    let mut registry = SceneRegistry::new();
    let id = registry.create_object(ObjectKind::Tree, Point3::new(0.0, 0.0, 0.0));
    registry
        .update_properties(
            id,
            ObjectUpdate {
                position: Some(Point3::new(5.0, 1.0, 5.0)),
                rotation: Some(Vector3::new(0.0, 1.2, 0.0)),
                ..ObjectUpdate::default()
            },
        )
        .unwrap();
    let edited = registry.get(id).unwrap().clone();

    registry.delete_object(id).unwrap();
    assert!(registry.is_empty());

    registry.undo();
    assert_eq!(registry.get(id).unwrap(), &edited);
}

#[test]
fn delete_unknown_id_fails() {
    let mut registry = SceneRegistry::new();
    let id = registry.create_object(ObjectKind::Cube, Point3::new(0.0, 0.0, 0.0));
    registry.delete_object(id).unwrap();
    assert_eq!(
        registry.delete_object(id),
        Err(SceneError::NotFound(id))
    );
}

#[test]
fn new_action_after_undo_clears_redo() {
    let mut registry = SceneRegistry::new();
    registry.create_object(ObjectKind::Cube, Point3::new(0.0, 0.0, 0.0));
    registry.undo();
    assert_eq!(registry.redo_len(), 1);

    registry.create_object(ObjectKind::Sphere, Point3::new(1.0, 0.0, 0.0));
    assert_eq!(registry.redo_len(), 0);
    assert_eq!(registry.redo(), None, "stale redo entries are gone");
    assert_eq!(registry.len(), 1);
}

#[test]
fn update_properties_is_not_undoable() {
    let mut registry = SceneRegistry::new();
    let id = registry.create_object(ObjectKind::Cylinder, Point3::new(0.0, 0.0, 0.0));
    let undo_before = registry.undo_len();

    registry
        .update_properties(
            id,
            ObjectUpdate {
                scale: Some(Vector3::new(2.0, 2.0, 2.0)),
                name: Some("big pillar".to_string()),
                ..ObjectUpdate::default()
            },
        )
        .unwrap();

    assert_eq!(registry.undo_len(), undo_before);

    // The one available undo removes the create; the edit itself was never
    // recorded.
    registry.undo();
    assert!(registry.is_empty());
}

#[test]
fn history_cap_evicts_oldest_creates() {
    let mut registry = SceneRegistry::new();
    let ids: Vec<_> = (0..25)
        .map(|n| registry.create_object(ObjectKind::Cube, Point3::new(n as f32, 0.0, 0.0)))
        .collect();
    assert_eq!(registry.undo_len(), HISTORY_CAP);

    for _ in 0..25 {
        registry.undo();
    }

    // Only the most recent 20 creates had live undo records; the redo
    // sequence holds exactly those, and the 5 oldest objects survive
    // because their records were evicted.
    assert_eq!(registry.redo_len(), HISTORY_CAP);
    assert_eq!(registry.undo_len(), 0);
    assert_eq!(registry.len(), 5);
    for id in &ids[..5] {
        assert!(registry.get(*id).is_some());
    }
    for id in &ids[5..] {
        assert!(registry.get(*id).is_none());
    }

    // Every evicted-survivor redo re-applies the most recent 20 creates.
    let mut redone = 0;
    while registry.redo().is_some() {
        redone += 1;
    }
    assert_eq!(redone, HISTORY_CAP);
    assert_eq!(registry.len(), 25);
}

#[test]
fn ids_never_collide_across_delete_and_undo_cycles() {
    let mut registry = SceneRegistry::new();
    let first = registry.create_object(ObjectKind::Cube, Point3::new(0.0, 0.0, 0.0));
    registry.delete_object(first).unwrap();
    registry.undo();

    let second = registry.create_object(ObjectKind::Cube, Point3::new(1.0, 0.0, 0.0));
    assert_ne!(first, second);
}
