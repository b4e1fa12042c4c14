//! # Player Module
//!
//! This module defines the player entity: world position, block inventory,
//! currently selected block type, and game mode. One player exists per
//! session; it is created at world start and mutated by interaction handlers.

use std::collections::HashMap;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::block_type::BlockType;

/// The game mode tag carried by the player and persisted in snapshots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Unlimited building; the default mode.
    Creative,
    /// Reserved survival mode tag, kept for snapshot compatibility.
    Survival,
}

/// A per-block-type counter of blocks the player is carrying.
///
/// Counts are never negative: taking a block from an empty slot fails
/// rather than underflowing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    counts: HashMap<BlockType, u32>,
}

impl Inventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the starting inventory for a fresh world.
    pub fn starting() -> Self {
        let mut counts = HashMap::new();
        counts.insert(BlockType::Grass, 50);
        counts.insert(BlockType::Dirt, 30);
        counts.insert(BlockType::Stone, 25);
        counts.insert(BlockType::Wood, 20);
        counts.insert(BlockType::Water, 15);
        counts.insert(BlockType::Sand, 40);
        Self { counts }
    }

    /// Returns the count for a block type. Missing entries count as zero.
    pub fn count(&self, block: BlockType) -> u32 {
        self.counts.get(&block).copied().unwrap_or(0)
    }

    /// Adds one block of the given type.
    pub fn add(&mut self, block: BlockType) {
        *self.counts.entry(block).or_insert(0) += 1;
    }

    /// Removes one block of the given type if any are available.
    ///
    /// # Returns
    /// `true` if a block was taken, `false` if the slot was empty.
    pub fn try_take(&mut self, block: BlockType) -> bool {
        match self.counts.get_mut(&block) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Replaces the full contents of the inventory.
    pub fn replace(&mut self, counts: HashMap<BlockType, u32>) {
        self.counts = counts;
    }

    /// Iterates over the (block type, count) pairs currently stored.
    pub fn iter(&self) -> impl Iterator<Item = (BlockType, u32)> + '_ {
        self.counts.iter().map(|(block, count)| (*block, *count))
    }
}

/// The player entity.
///
/// # Fields
/// - `position`: world-space position of the player marker
/// - `inventory`: per-type block counts
/// - `selected_block`: the block type placed on the next build interaction
/// - `game_mode`: the active game mode tag
#[derive(Clone, Debug)]
pub struct Player {
    /// World-space position of the player marker.
    pub position: Point3<f32>,
    /// Per-type block counts owned by this player.
    pub inventory: Inventory,
    /// The block type placed on the next build interaction.
    pub selected_block: BlockType,
    /// The active game mode tag.
    pub game_mode: GameMode,
}

impl Player {
    /// Creates the player for a fresh world: positioned above the terrain
    /// center with the starting inventory and grass selected.
    pub fn new() -> Self {
        Self {
            position: Point3::new(10.0, 4.0, 10.0),
            inventory: Inventory::starting(),
            selected_block: BlockType::Grass,
            game_mode: GameMode::Creative,
        }
    }

    /// Resets the inventory to the starting allotment, keeping position,
    /// selection, and mode.
    pub fn reset_inventory(&mut self) {
        self.inventory = Inventory::starting();
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_from_empty_slot_fails_without_underflow() {
        let mut inventory = Inventory::new();
        assert!(!inventory.try_take(BlockType::Stone));
        assert_eq!(inventory.count(BlockType::Stone), 0);
    }

    #[test]
    fn add_then_take_round_trips() {
        let mut inventory = Inventory::new();
        inventory.add(BlockType::Wood);
        assert_eq!(inventory.count(BlockType::Wood), 1);
        assert!(inventory.try_take(BlockType::Wood));
        assert_eq!(inventory.count(BlockType::Wood), 0);
    }

    #[test]
    fn starting_inventory_matches_fresh_world_allotment() {
        let inventory = Inventory::starting();
        assert_eq!(inventory.count(BlockType::Grass), 50);
        assert_eq!(inventory.count(BlockType::Sand), 40);
        assert_eq!(inventory.count(BlockType::Water), 15);
    }
}
