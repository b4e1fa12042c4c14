//! # World Module
//!
//! This module provides the `VoxelWorld` struct, the authoritative sparse
//! store mapping integer grid coordinates to block types. It is the single
//! source of truth both renderers derive their visual representation from.
//!
//! ## Architecture
//!
//! The world uses sparse storage: only occupied coordinates are present in
//! the map, and absence of a key means air. Mutations go through `place` and
//! `mine`, which keep the acting player's inventory and the session
//! statistics consistent with the store — every operation is all-or-nothing.
//!
//! ## Lifecycle
//!
//! A fresh world is filled with a fixed three-layer terrain (stone, dirt,
//! grass). It can be cleared entirely, restored to the fixed terrain, or
//! wholesale replaced from a snapshot.

use std::collections::HashMap;
use std::fmt;

use cgmath::Point3;
use log::debug;

use block_type::BlockType;
use player::Player;
use statistics::WorldStatistics;

pub mod block_type;
pub mod player;
pub mod statistics;

/// The underlying integer type used to represent block types compactly.
pub type BlockTypeSize = u8;

/// Width of the fixed initial terrain footprint, in blocks.
pub const WORLD_WIDTH: i32 = 20;
/// Depth of the fixed initial terrain footprint, in blocks.
pub const WORLD_DEPTH: i32 = 20;

/// Layer assignment for the fixed initial terrain, by y value.
const TERRAIN_LAYERS: [(i32, BlockType); 3] = [
    (0, BlockType::Stone),
    (1, BlockType::Dirt),
    (2, BlockType::Grass),
];

/// Errors produced by world mutations.
///
/// These are non-fatal: callers report them to the user and continue. The
/// store is never left partially mutated when one is returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldError {
    /// `place` targeted a coordinate that already holds a block.
    AlreadyOccupied(Point3<i32>),
    /// `place` was attempted with zero inventory for the block type.
    OutOfStock(BlockType),
    /// `mine` targeted a coordinate with no block.
    Empty(Point3<i32>),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::AlreadyOccupied(coord) => {
                write!(f, "coordinate ({}, {}, {}) is already occupied", coord.x, coord.y, coord.z)
            }
            WorldError::OutOfStock(block) => {
                write!(f, "no {} blocks left in inventory", block.display_name())
            }
            WorldError::Empty(coord) => {
                write!(f, "no block at ({}, {}, {})", coord.x, coord.y, coord.z)
            }
        }
    }
}

impl std::error::Error for WorldError {}

/// The sparse voxel store.
///
/// Keys are unique integer grid coordinates; every key maps to exactly one
/// block type. Iteration order is irrelevant to correctness — the 2D
/// renderer imposes its own traversal order at render time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoxelWorld {
    blocks: HashMap<Point3<i32>, BlockType>,
}

impl VoxelWorld {
    /// Creates a new, completely empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a world filled with the fixed initial terrain: stone at y=0,
    /// dirt at y=1, grass at y=2, across the full width × depth footprint.
    pub fn with_terrain() -> Self {
        let mut world = Self::new();
        world.fill_terrain();
        world
    }

    /// Restores the fixed initial terrain (the soft reset).
    ///
    /// The store is cleared first; the result is exactly the layer
    /// assignment of a fresh world regardless of prior contents.
    pub fn fill_terrain(&mut self) {
        self.blocks.clear();
        for x in 0..WORLD_WIDTH {
            for z in 0..WORLD_DEPTH {
                for (y, block) in TERRAIN_LAYERS {
                    self.blocks.insert(Point3::new(x, y, z), block);
                }
            }
        }
    }

    /// Clears every block (the full reset).
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Returns the block at `coord`, if any.
    pub fn block_at(&self, coord: Point3<i32>) -> Option<BlockType> {
        self.blocks.get(&coord).copied()
    }

    /// Whether a block exists at `coord`.
    pub fn contains(&self, coord: Point3<i32>) -> bool {
        self.blocks.contains_key(&coord)
    }

    /// The number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the world holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates over all (coordinate, block type) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, BlockType)> + '_ {
        self.blocks.iter().map(|(coord, block)| (*coord, *block))
    }

    /// Places a block at `coord`, drawing it from the player's inventory.
    ///
    /// On success the mapping is inserted, the inventory count for `block`
    /// is decremented by one, and the statistics record the placement.
    ///
    /// # Errors
    /// * `AlreadyOccupied` if `coord` already holds a block
    /// * `OutOfStock` if the inventory count for `block` is zero
    ///
    /// Both failures leave world, inventory, and statistics untouched.
    pub fn place(
        &mut self,
        player: &mut Player,
        stats: &mut WorldStatistics,
        coord: Point3<i32>,
        block: BlockType,
    ) -> Result<(), WorldError> {
        if self.blocks.contains_key(&coord) {
            return Err(WorldError::AlreadyOccupied(coord));
        }
        if !player.inventory.try_take(block) {
            return Err(WorldError::OutOfStock(block));
        }

        self.blocks.insert(coord, block);
        stats.record_placed(block);
        debug!("placed {} at ({}, {}, {})", block.tag(), coord.x, coord.y, coord.z);
        Ok(())
    }

    /// Removes the block at `coord`, returning it to the player's inventory.
    ///
    /// On success the mapping is removed, the mined type's inventory count
    /// is incremented by one, and the statistics record the removal.
    ///
    /// # Errors
    /// * `Empty` if no block exists at `coord`; nothing is mutated.
    pub fn mine(
        &mut self,
        player: &mut Player,
        stats: &mut WorldStatistics,
        coord: Point3<i32>,
    ) -> Result<BlockType, WorldError> {
        let block = self.blocks.remove(&coord).ok_or(WorldError::Empty(coord))?;
        player.inventory.add(block);
        stats.record_mined(block);
        debug!("mined {} at ({}, {}, {})", block.tag(), coord.x, coord.y, coord.z);
        Ok(block)
    }

    /// Returns a structural copy of the store for persistence.
    pub fn snapshot(&self) -> HashMap<Point3<i32>, BlockType> {
        self.blocks.clone()
    }

    /// Replaces the store wholesale with `snapshot`.
    ///
    /// Existing contents are discarded entirely; restore never merges.
    pub fn restore(&mut self, snapshot: HashMap<Point3<i32>, BlockType>) {
        self.blocks = snapshot;
    }
}
