//! Snapshot persistence: lossless round-trips, wholesale rejection of
//! malformed files, and missing-section tolerance.

use cgmath::{Point3, Vector3};

use voxel_sandbox::engine_state::camera_state::OrbitController;
use voxel_sandbox::engine_state::persistence::{
    export_scene, export_world, import_scene, import_world, iso8601_from_unix, SnapshotError,
};
use voxel_sandbox::engine_state::scene::{ObjectKind, ObjectUpdate, SceneRegistry};
use voxel_sandbox::engine_state::world::block_type::BlockType;
use voxel_sandbox::engine_state::world::player::{GameMode, Player};
use voxel_sandbox::engine_state::world::statistics::WorldStatistics;
use voxel_sandbox::engine_state::world::VoxelWorld;

fn populated_world() -> (VoxelWorld, Player, WorldStatistics) {
    let mut world = VoxelWorld::new();
    let mut player = Player::new();
    let mut stats = WorldStatistics::new();
    world
        .place(&mut player, &mut stats, Point3::new(0, 0, 0), BlockType::Grass)
        .unwrap();
    world
        .place(&mut player, &mut stats, Point3::new(-2, 1, 7), BlockType::Water)
        .unwrap();
    world
        .mine(&mut player, &mut stats, Point3::new(0, 0, 0))
        .unwrap();
    player.selected_block = BlockType::Water;
    player.game_mode = GameMode::Creative;
    (world, player, stats)
}

#[test]
fn world_export_import_round_trips_exactly() {
    let (world, player, stats) = populated_world();
    let json = export_world(&world, &player, &stats);

    let mut world2 = VoxelWorld::new();
    let mut player2 = Player::new();
    player2.inventory.replace(std::collections::HashMap::new());
    let mut stats2 = WorldStatistics::new();

    import_world(&json, &mut world2, &mut player2, &mut stats2).unwrap();

    assert_eq!(world2.snapshot(), world.snapshot());
    for block in BlockType::all() {
        assert_eq!(
            player2.inventory.count(block),
            player.inventory.count(block)
        );
    }
    assert_eq!(player2.selected_block, BlockType::Water);
    assert_eq!(stats2, stats);
}

#[test]
fn malformed_json_rejects_without_touching_state() {
    let (mut world, mut player, mut stats) = populated_world();
    let world_before = world.snapshot();
    let placed_before = stats.total_placed;

    let err = import_world("{not json", &mut world, &mut player, &mut stats).unwrap_err();
    assert!(matches!(err, SnapshotError::Malformed(_)));
    assert_eq!(world.snapshot(), world_before);
    assert_eq!(stats.total_placed, placed_before);
}

#[test]
fn unknown_block_tag_rejects_the_whole_import() {
    let (mut world, mut player, mut stats) = populated_world();
    let world_before = world.snapshot();

    let json = r#"{"world": {"0,0,0": "grass", "1,0,0": "lava"}}"#;
    let err = import_world(json, &mut world, &mut player, &mut stats).unwrap_err();

    assert!(matches!(err, SnapshotError::Malformed(_)));
    assert_eq!(world.snapshot(), world_before, "no partial apply");
}

#[test]
fn bad_coordinate_key_rejects_the_whole_import() {
    let (mut world, mut player, mut stats) = populated_world();
    let world_before = world.snapshot();

    let json = r#"{"world": {"0,0": "grass"}}"#;
    assert!(import_world(json, &mut world, &mut player, &mut stats).is_err());
    assert_eq!(world.snapshot(), world_before);
}

#[test]
fn missing_sections_leave_their_stores_untouched() {
    let (mut world, mut player, mut stats) = populated_world();
    let inventory_before: Vec<_> = BlockType::all()
        .map(|block| player.inventory.count(block))
        .to_vec();
    let stats_before = stats.clone();

    // Only a world section: player and statistics stay as they are.
    let json = r#"{"world": {"3,3,3": "sand"}}"#;
    import_world(json, &mut world, &mut player, &mut stats).unwrap();

    assert_eq!(world.len(), 1);
    assert_eq!(world.block_at(Point3::new(3, 3, 3)), Some(BlockType::Sand));
    let inventory_after: Vec<_> = BlockType::all()
        .map(|block| player.inventory.count(block))
        .to_vec();
    assert_eq!(inventory_after, inventory_before);
    assert_eq!(stats, stats_before);
}

#[test]
fn scene_round_trip_preserves_objects_and_clears_wholesale() {
    let mut registry = SceneRegistry::new();
    let tree = registry.create_object(ObjectKind::Tree, Point3::new(1.0, 0.0, 2.0));
    registry
        .update_properties(
            tree,
            ObjectUpdate {
                scale: Some(Vector3::new(2.0, 3.0, 2.0)),
                name: Some("old oak".to_string()),
                ..ObjectUpdate::default()
            },
        )
        .unwrap();
    registry.create_object(ObjectKind::Tower, Point3::new(-4.0, 0.0, 0.0));
    let controller = OrbitController::new();

    let json = export_scene(
        &registry,
        &controller.camera,
        "test scene",
        &iso8601_from_unix(1_700_000_000),
    );

    // Import into a registry holding unrelated leftovers.
    let mut registry2 = SceneRegistry::new();
    registry2.create_object(ObjectKind::Cube, Point3::new(9.0, 9.0, 9.0));
    let mut controller2 = OrbitController::new();

    import_scene(&json, &mut registry2, &mut controller2).unwrap();

    assert_eq!(registry2.len(), 2, "leftovers were cleared wholesale");
    let restored = registry2.get(tree).unwrap();
    assert_eq!(restored.kind, ObjectKind::Tree);
    assert_eq!(restored.scale, Vector3::new(2.0, 3.0, 2.0));
    assert_eq!(restored.properties.name, "old oak");
    assert_eq!(registry2.undo_len(), 0, "history does not survive a load");
}

#[test]
fn scene_with_duplicate_ids_is_rejected_untouched() {
    let mut registry = SceneRegistry::new();
    registry.create_object(ObjectKind::Cube, Point3::new(0.0, 0.0, 0.0));
    let len_before = registry.len();
    let mut controller = OrbitController::new();

    let json = r#"{
        "objects": [
            {"id": 1, "type": "cube", "position": [0,0,0], "rotation": [0,0,0],
             "scale": [1,1,1], "properties": {"name": "a", "material": "default", "visible": true}},
            {"id": 1, "type": "sphere", "position": [1,0,0], "rotation": [0,0,0],
             "scale": [1,1,1], "properties": {"name": "b", "material": "default", "visible": true}}
        ],
        "metadata": {"name": "dupes", "created": "2024-01-01T00:00:00Z", "version": "1.0"}
    }"#;

    let err = import_scene(json, &mut registry, &mut controller).unwrap_err();
    assert!(matches!(err, SnapshotError::Malformed(_)));
    assert_eq!(registry.len(), len_before);
}

#[test]
fn scene_restores_camera_pose_from_snapshot() {
    let mut registry = SceneRegistry::new();
    let mut controller = OrbitController::new();
    controller.camera.target = Point3::new(3.0, 1.0, -2.0);
    controller.camera.set_radius(12.0);

    let json = export_scene(
        &registry,
        &controller.camera,
        "pose",
        &iso8601_from_unix(0),
    );

    let mut controller2 = OrbitController::new();
    import_scene(&json, &mut registry, &mut controller2).unwrap();

    assert_eq!(controller2.camera.target, Point3::new(3.0, 1.0, -2.0));
    assert!((controller2.camera.radius - 12.0).abs() < 1e-3);
}
