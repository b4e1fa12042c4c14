//! World store invariants: occupancy, inventory bookkeeping, resets, and
//! the all-or-nothing failure contract.

use cgmath::Point3;
use test_case::test_case;

use voxel_sandbox::engine_state::world::block_type::BlockType;
use voxel_sandbox::engine_state::world::player::Player;
use voxel_sandbox::engine_state::world::statistics::WorldStatistics;
use voxel_sandbox::engine_state::world::{VoxelWorld, WorldError, WORLD_DEPTH, WORLD_WIDTH};

fn fresh() -> (VoxelWorld, Player, WorldStatistics) {
    (VoxelWorld::new(), Player::new(), WorldStatistics::new())
}

#[test_case(BlockType::Grass)]
#[test_case(BlockType::Stone)]
#[test_case(BlockType::Water)]
fn place_then_mine_round_trips(block: BlockType) {
    let (mut world, mut player, mut stats) = fresh();
    let coord = Point3::new(4, 2, -1);
    let count_before = player.inventory.count(block);

    world.place(&mut player, &mut stats, coord, block).unwrap();
    assert_eq!(player.inventory.count(block), count_before - 1);

    let mined = world.mine(&mut player, &mut stats, coord).unwrap();
    assert_eq!(mined, block);
    assert!(world.is_empty());
    assert_eq!(player.inventory.count(block), count_before);
}

#[test]
fn place_refuses_occupied_coordinate() {
    let (mut world, mut player, mut stats) = fresh();
    let coord = Point3::new(0, 0, 0);

    world
        .place(&mut player, &mut stats, coord, BlockType::Grass)
        .unwrap();
    let err = world
        .place(&mut player, &mut stats, coord, BlockType::Dirt)
        .unwrap_err();

    assert_eq!(err, WorldError::AlreadyOccupied(coord));
    assert_eq!(world.block_at(coord), Some(BlockType::Grass));
    // The refused placement cost nothing.
    assert_eq!(player.inventory.count(BlockType::Dirt), 30);
    assert_eq!(stats.total_placed, 1);
}

#[test]
fn single_grass_scenario() {
    let mut world = VoxelWorld::new();
    let mut player = Player::new();
    let mut stats = WorldStatistics::new();
    player.inventory.replace([(BlockType::Grass, 1)].into_iter().collect());
    let coord = Point3::new(0, 0, 0);

    world
        .place(&mut player, &mut stats, coord, BlockType::Grass)
        .unwrap();
    assert_eq!(player.inventory.count(BlockType::Grass), 0);
    assert_eq!(stats.total_placed, 1);

    let err = world
        .place(&mut player, &mut stats, coord, BlockType::Grass)
        .unwrap_err();
    assert_eq!(err, WorldError::AlreadyOccupied(coord));
    assert_eq!(player.inventory.count(BlockType::Grass), 0);
    assert_eq!(stats.total_placed, 1);
    assert_eq!(world.len(), 1);
}

#[test]
fn out_of_stock_place_changes_nothing() {
    let (mut world, mut player, mut stats) = fresh();
    player.inventory.replace(std::collections::HashMap::new());

    let err = world
        .place(&mut player, &mut stats, Point3::new(1, 1, 1), BlockType::Wood)
        .unwrap_err();

    assert_eq!(err, WorldError::OutOfStock(BlockType::Wood));
    assert!(world.is_empty());
    assert_eq!(stats.total_placed, 0);
    assert!(stats.touched_types.is_empty());
}

#[test]
fn mine_on_empty_coordinate_changes_nothing() {
    let (mut world, mut player, mut stats) = fresh();
    let before = player.inventory.count(BlockType::Grass);

    let err = world
        .mine(&mut player, &mut stats, Point3::new(5, 5, 5))
        .unwrap_err();

    assert_eq!(err, WorldError::Empty(Point3::new(5, 5, 5)));
    assert_eq!(player.inventory.count(BlockType::Grass), before);
    assert_eq!(stats.total_mined, 0);
}

#[test]
fn inventory_never_goes_negative_under_interleaving() {
    let (mut world, mut player, mut stats) = fresh();
    player
        .inventory
        .replace([(BlockType::Sand, 2)].into_iter().collect());

    for step in 0..10 {
        let coord = Point3::new(step % 3, 0, step / 3);
        let _ = world.place(&mut player, &mut stats, coord, BlockType::Sand);
        if step % 2 == 0 {
            let _ = world.mine(&mut player, &mut stats, coord);
        }
        for block in BlockType::all() {
            // Counts are unsigned; reaching here means no underflow panic
            // and no wrap-around to huge values.
            assert!(player.inventory.count(block) <= 100);
        }
    }
}

#[test]
fn statistics_track_distinct_types() {
    let (mut world, mut player, mut stats) = fresh();

    world
        .place(&mut player, &mut stats, Point3::new(0, 0, 0), BlockType::Grass)
        .unwrap();
    world
        .place(&mut player, &mut stats, Point3::new(1, 0, 0), BlockType::Dirt)
        .unwrap();
    world
        .mine(&mut player, &mut stats, Point3::new(0, 0, 0))
        .unwrap();

    assert_eq!(stats.total_placed, 2);
    assert_eq!(stats.total_mined, 1);
    assert_eq!(stats.distinct_type_count(), 2);
}

#[test]
fn terrain_reset_reproduces_layer_assignment() {
    let (mut world, mut player, mut stats) = fresh();
    world
        .place(&mut player, &mut stats, Point3::new(3, 9, 3), BlockType::Wood)
        .unwrap();

    world.fill_terrain();

    assert_eq!(
        world.len() as i32,
        WORLD_WIDTH * WORLD_DEPTH * 3,
        "three full layers and nothing else"
    );
    assert_eq!(world.block_at(Point3::new(3, 9, 3)), None);
    for (x, z) in [(0, 0), (7, 12), (WORLD_WIDTH - 1, WORLD_DEPTH - 1)] {
        assert_eq!(world.block_at(Point3::new(x, 0, z)), Some(BlockType::Stone));
        assert_eq!(world.block_at(Point3::new(x, 1, z)), Some(BlockType::Dirt));
        assert_eq!(world.block_at(Point3::new(x, 2, z)), Some(BlockType::Grass));
    }
}

#[test]
fn restore_replaces_wholesale_without_merging() {
    let (mut world, mut player, mut stats) = fresh();
    world
        .place(&mut player, &mut stats, Point3::new(9, 9, 9), BlockType::Stone)
        .unwrap();

    let mut replacement = std::collections::HashMap::new();
    replacement.insert(Point3::new(1, 2, 3), BlockType::Sand);
    world.restore(replacement);

    assert_eq!(world.len(), 1);
    assert_eq!(world.block_at(Point3::new(9, 9, 9)), None);
    assert_eq!(world.block_at(Point3::new(1, 2, 3)), Some(BlockType::Sand));
}
