//! # 2D Isometric Renderer
//!
//! Pure derivation of an ordered draw list from the voxel store, the player
//! marker, and the flat camera. No GPU state is touched here; the flat
//! presenter consumes the list, and 2D picking walks it backwards.
//!
//! ## Projection
//!
//! screen_x = (x - z) * 30 + pan_x + origin_x
//! screen_y = (x + z) * 15 - y * 35 + pan_y + origin_y
//!
//! All instructions scale uniformly by the camera zoom factor.
//!
//! ## Ordering
//!
//! Blocks sort by descending (x + y + z); later list entries draw on top
//! (painter's algorithm). Equal sums order by lexicographic (x, y, z)
//! ascending, so the list is fully deterministic for a given store.

use std::collections::HashMap;

use cgmath::Point3;

use crate::engine_state::camera_state::flat_camera::FlatCamera;
use crate::engine_state::world::block_type::BlockType;
use crate::engine_state::world::player::Player;
use crate::engine_state::world::VoxelWorld;

/// Horizontal spread per grid step.
pub const TILE_X: f32 = 30.0;
/// Vertical spread per grid step.
pub const TILE_Y: f32 = 15.0;
/// Vertical lift per layer.
pub const LAYER_Y: f32 = 35.0;
/// Screen-space origin offset for blocks, X.
pub const ORIGIN_X: f32 = 400.0;
/// Screen-space origin offset for blocks, Y.
pub const ORIGIN_Y: f32 = 300.0;
/// Screen-space origin offset for the player marker, X.
pub const PLAYER_ORIGIN_X: f32 = 396.0;
/// Screen-space origin offset for the player marker, Y.
pub const PLAYER_ORIGIN_Y: f32 = 296.0;
/// Unscaled side length of a block quad, in pixels.
pub const BLOCK_PIXEL_SIZE: f32 = 32.0;
/// Unscaled side length of the player marker quad, in pixels.
pub const PLAYER_PIXEL_SIZE: f32 = 16.0;

/// What a draw instruction paints.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawKind {
    /// A block quad.
    Block {
        /// Grid coordinate this quad represents, used by 2D picking.
        coord: Point3<i32>,
        /// The block type at that coordinate.
        block: BlockType,
        /// Resolved fill color (palette or custom-texture override).
        color: [u8; 4],
        /// Whether the hover highlight applies.
        hovered: bool,
    },
    /// The player position marker, always drawn last.
    PlayerMarker,
}

/// One ordered draw instruction.
///
/// Coordinates are unscaled screen pixels; `scale` is the uniform zoom the
/// presenter applies around the screen origin.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawInstruction {
    /// Screen-space X of the quad's top-left corner.
    pub screen_x: f32,
    /// Screen-space Y of the quad's top-left corner.
    pub screen_y: f32,
    /// Uniform scale factor from the camera zoom.
    pub scale: f32,
    /// What to paint.
    pub kind: DrawKind,
}

/// Projects a grid coordinate to unscaled screen coordinates.
pub fn project(coord: Point3<i32>, camera: &FlatCamera) -> (f32, f32) {
    let x = (coord.x - coord.z) as f32 * TILE_X + camera.pan_x + ORIGIN_X;
    let y = (coord.x + coord.z) as f32 * TILE_Y - coord.y as f32 * LAYER_Y + camera.pan_y + ORIGIN_Y;
    (x, y)
}

/// Derives the ordered draw list for the current frame.
///
/// A pure function of its inputs: the same store, camera, hover state, and
/// color overrides always produce the identical list. The player marker is
/// appended after every block so it draws on top.
///
/// # Arguments
/// * `world` - The voxel store to render
/// * `player` - Supplies the marker position
/// * `camera` - Pan/zoom state
/// * `hovered` - The grid coordinate under the pointer, if any
/// * `color_overrides` - Custom fill colors by block type, from the texture
///   library; block types not present use their built-in palette color
pub fn build_draw_list(
    world: &VoxelWorld,
    player: &Player,
    camera: &FlatCamera,
    hovered: Option<Point3<i32>>,
    color_overrides: &HashMap<BlockType, [u8; 4]>,
) -> Vec<DrawInstruction> {
    let mut blocks: Vec<(Point3<i32>, BlockType)> = world.iter().collect();
    blocks.sort_by(|(a, _), (b, _)| {
        let sum_a = a.x + a.y + a.z;
        let sum_b = b.x + b.y + b.z;
        sum_b
            .cmp(&sum_a)
            .then_with(|| (a.x, a.y, a.z).cmp(&(b.x, b.y, b.z)))
    });

    let mut list = Vec::with_capacity(blocks.len() + 1);
    for (coord, block) in blocks {
        let (screen_x, screen_y) = project(coord, camera);
        let color = color_overrides
            .get(&block)
            .copied()
            .unwrap_or_else(|| block.color());
        list.push(DrawInstruction {
            screen_x,
            screen_y,
            scale: camera.zoom,
            kind: DrawKind::Block {
                coord,
                block,
                color,
                hovered: hovered == Some(coord),
            },
        });
    }

    let marker_x = (player.position.x - player.position.z) * TILE_X + camera.pan_x + PLAYER_ORIGIN_X;
    let marker_y = (player.position.x + player.position.z) * TILE_Y - player.position.y * LAYER_Y
        + camera.pan_y
        + PLAYER_ORIGIN_Y;
    list.push(DrawInstruction {
        screen_x: marker_x,
        screen_y: marker_y,
        scale: camera.zoom,
        kind: DrawKind::PlayerMarker,
    });

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::world::player::Player;
    use crate::engine_state::world::statistics::WorldStatistics;
    use approx::assert_relative_eq;

    fn place(world: &mut VoxelWorld, coord: Point3<i32>, block: BlockType) {
        let mut player = Player::new();
        let mut stats = WorldStatistics::new();
        world.place(&mut player, &mut stats, coord, block).unwrap();
    }

    #[test]
    fn projection_matches_fixed_constants() {
        let camera = FlatCamera {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        };
        let (x, y) = project(Point3::new(2, 1, 1), &camera);
        assert_relative_eq!(x, (2 - 1) as f32 * TILE_X + ORIGIN_X);
        assert_relative_eq!(y, (2 + 1) as f32 * TILE_Y - 35.0 + ORIGIN_Y);
    }

    #[test]
    fn draw_order_is_descending_sum_then_lexicographic() {
        let mut world = VoxelWorld::new();
        place(&mut world, Point3::new(0, 0, 0), BlockType::Grass);
        place(&mut world, Point3::new(2, 0, 0), BlockType::Dirt);
        place(&mut world, Point3::new(0, 0, 2), BlockType::Stone);
        place(&mut world, Point3::new(1, 1, 0), BlockType::Sand);

        let list = build_draw_list(
            &world,
            &Player::new(),
            &FlatCamera::new(),
            None,
            &HashMap::new(),
        );
        let coords: Vec<Point3<i32>> = list
            .iter()
            .filter_map(|instruction| match instruction.kind {
                DrawKind::Block { coord, .. } => Some(coord),
                DrawKind::PlayerMarker => None,
            })
            .collect();

        // Sum-2 blocks first in lexicographic order, the origin block last.
        assert_eq!(
            coords,
            vec![
                Point3::new(0, 0, 2),
                Point3::new(1, 1, 0),
                Point3::new(2, 0, 0),
                Point3::new(0, 0, 0),
            ]
        );
    }

    #[test]
    fn player_marker_is_final_instruction() {
        let mut world = VoxelWorld::new();
        place(&mut world, Point3::new(0, 0, 0), BlockType::Grass);
        let list = build_draw_list(
            &world,
            &Player::new(),
            &FlatCamera::new(),
            None,
            &HashMap::new(),
        );
        assert_eq!(list.last().unwrap().kind, DrawKind::PlayerMarker);
    }

    #[test]
    fn hover_only_touches_metadata() {
        let mut world = VoxelWorld::new();
        let coord = Point3::new(1, 0, 1);
        place(&mut world, coord, BlockType::Grass);

        let plain = build_draw_list(
            &world,
            &Player::new(),
            &FlatCamera::new(),
            None,
            &HashMap::new(),
        );
        let hovered = build_draw_list(
            &world,
            &Player::new(),
            &FlatCamera::new(),
            Some(coord),
            &HashMap::new(),
        );

        assert_eq!(plain[0].screen_x, hovered[0].screen_x);
        assert_eq!(plain[0].screen_y, hovered[0].screen_y);
        match (&plain[0].kind, &hovered[0].kind) {
            (
                DrawKind::Block { hovered: h0, .. },
                DrawKind::Block { hovered: h1, .. },
            ) => {
                assert!(!h0);
                assert!(h1);
            }
            _ => panic!("expected block instructions"),
        }
    }

    #[test]
    fn color_override_replaces_palette_color() {
        let mut world = VoxelWorld::new();
        place(&mut world, Point3::new(0, 0, 0), BlockType::Grass);
        let mut overrides = HashMap::new();
        overrides.insert(BlockType::Grass, [1, 2, 3, 255]);

        let list = build_draw_list(
            &world,
            &Player::new(),
            &FlatCamera::new(),
            None,
            &overrides,
        );
        match list[0].kind {
            DrawKind::Block { color, .. } => assert_eq!(color, [1, 2, 3, 255]),
            _ => panic!("expected block instruction"),
        }
    }
}
