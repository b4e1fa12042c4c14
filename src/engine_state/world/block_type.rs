//! # Block Type Module
//!
//! This module defines the closed set of block types available in the sandbox
//! world, together with their display metadata (name, color, translucency)
//! and the tag strings used by the snapshot format.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the sandbox world.
///
/// This is a closed set: new types are added here at design time, never
/// registered at runtime. The `FromPrimitive` derive allows conversion from
/// the compact integer representation used for storage, and the serde derives
/// map each variant to its lowercase snapshot tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Grass block, the default building material.
    Grass,

    /// Dirt block.
    Dirt,

    /// Stone block, used for the bottom terrain layer.
    Stone,

    /// Wood block.
    Wood,

    /// Water block. Renders translucent in both views.
    Water,

    /// Sand block.
    Sand,
}

/// Display colors for each block type, indexed by `BlockType as usize`.
///
/// Colors are RGBA byte tuples shared by the 2D draw list and the 3D
/// material registry.
pub static BLOCK_TYPE_COLORS: [[u8; 4]; 6] = [
    [0x4A, 0xDE, 0x80, 0xFF], // Grass
    [0x92, 0x40, 0x0E, 0xFF], // Dirt
    [0x6B, 0x72, 0x80, 0xFF], // Stone
    [0xA1, 0x62, 0x07, 0xFF], // Wood
    [0x3B, 0x82, 0xF6, 0xB2], // Water (alpha 0.7)
    [0xFC, 0xD3, 0x4D, 0xFF], // Sand
];

/// Maps snapshot tag strings to block types.
///
/// Used when decoding the `world` section of a snapshot file, where block
/// types appear as lowercase tags.
pub static BLOCK_TYPE_TAGS: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "grass" => BlockType::Grass,
    "dirt" => BlockType::Dirt,
    "stone" => BlockType::Stone,
    "wood" => BlockType::Wood,
    "water" => BlockType::Water,
    "sand" => BlockType::Sand,
};

impl BlockType {
    /// Every block type, in storage order.
    pub fn all() -> [BlockType; 6] {
        [
            BlockType::Grass,
            BlockType::Dirt,
            BlockType::Stone,
            BlockType::Wood,
            BlockType::Water,
            BlockType::Sand,
        ]
    }

    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// This is used when converting from the compact storage format to the
    /// rich enum type.
    ///
    /// # Arguments
    /// * `btype` - The block type as a `BlockTypeSize`
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `None` if the value is out of range.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Looks up a block type by its lowercase snapshot tag.
    ///
    /// # Arguments
    /// * `tag` - The tag string, e.g. `"grass"`
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `None` for an unknown tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        BLOCK_TYPE_TAGS.get(tag).copied()
    }

    /// The lowercase tag used in snapshot files.
    pub fn tag(&self) -> &'static str {
        match self {
            BlockType::Grass => "grass",
            BlockType::Dirt => "dirt",
            BlockType::Stone => "stone",
            BlockType::Wood => "wood",
            BlockType::Water => "water",
            BlockType::Sand => "sand",
        }
    }

    /// The human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            BlockType::Grass => "Grass",
            BlockType::Dirt => "Dirt",
            BlockType::Stone => "Stone",
            BlockType::Wood => "Wood",
            BlockType::Water => "Water",
            BlockType::Sand => "Sand",
        }
    }

    /// The RGBA display color for this block type.
    pub fn color(&self) -> [u8; 4] {
        BLOCK_TYPE_COLORS[*self as usize]
    }

    /// Whether the block renders with alpha blending.
    pub fn is_translucent(&self) -> bool {
        self.color()[3] < 0xFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(BlockType::Grass, "grass")]
    #[test_case(BlockType::Stone, "stone")]
    #[test_case(BlockType::Water, "water")]
    fn tag_round_trips(block: BlockType, tag: &str) {
        assert_eq!(block.tag(), tag);
        assert_eq!(BlockType::from_tag(tag), Some(block));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(BlockType::from_tag("lava"), None);
    }

    #[test]
    fn int_round_trips_for_all_types() {
        for block in BlockType::all() {
            assert_eq!(BlockType::from_int(block as u8), Some(block));
        }
        assert_eq!(BlockType::from_int(6), None);
    }

    #[test]
    fn only_water_is_translucent() {
        for block in BlockType::all() {
            assert_eq!(block.is_translucent(), block == BlockType::Water);
        }
    }
}
