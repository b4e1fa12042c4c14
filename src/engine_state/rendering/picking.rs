//! # Object Picking & Manipulation
//!
//! Resolves screen-space interaction events to world entities.
//!
//! 3D picking casts a ray from the camera through the pointer's normalized
//! device coordinates (using the inverse view-projection the camera uniform
//! already carries) and slab-tests it against every mesh instance's
//! axis-aligned bounds; the nearest hit wins. 2D picking walks the sorted
//! draw list from the end, so the topmost (last-drawn) block at the point
//! wins — there is no ray casting in the flat projection.
//!
//! Selection state lives here too: exactly one selected and one hovered
//! target, re-applied to the mesh pool so clearing a selection resets the
//! emissive to none with no residual tint.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3, Vector4};

use crate::engine_state::scene::object::ObjectId;
use crate::engine_state::scene::{ObjectUpdate, SceneRegistry, SceneError};

use super::isometric::{DrawInstruction, DrawKind, BLOCK_PIXEL_SIZE};
use super::pool::MeshPool;

/// A world entity resolved from a pointer interaction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PickTarget {
    /// A block in the voxel store.
    Voxel(Point3<i32>),
    /// A scene object (any of its parts).
    Object(ObjectId),
}

/// A world-space picking ray.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    /// Ray origin.
    pub origin: Point3<f32>,
    /// Normalized ray direction.
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Builds the ray through a pointer position.
    ///
    /// # Arguments
    /// * `pointer_x`, `pointer_y` - Pointer position in pixels
    /// * `width`, `height` - Viewport size in pixels
    /// * `inv_view_proj` - The inverse view-projection matrix
    pub fn from_pointer(
        pointer_x: f32,
        pointer_y: f32,
        width: f32,
        height: f32,
        inv_view_proj: Matrix4<f32>,
    ) -> Self {
        let ndc_x = pointer_x / width * 2.0 - 1.0;
        let ndc_y = 1.0 - pointer_y / height * 2.0;

        let near = inv_view_proj * Vector4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inv_view_proj * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = Point3::new(near.x / near.w, near.y / near.w, near.z / near.w);
        let far = Point3::new(far.x / far.w, far.y / far.w, far.z / far.w);

        Self {
            origin: near,
            direction: (far - near).normalize(),
        }
    }

    /// Slab test against an axis-aligned box.
    ///
    /// # Returns
    /// The entry distance along the ray, or `None` if the ray misses or the
    /// box lies entirely behind the origin.
    pub fn intersect_aabb(&self, min: Point3<f32>, max: Point3<f32>) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            if direction.abs() < 1e-8 {
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }
            let t0 = (min[axis] - origin) / direction;
            let t1 = (max[axis] - origin) / direction;
            let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

/// Casts a ray against every instance in the pool.
///
/// # Returns
/// The target of the nearest intersected instance, if any.
pub fn pick_3d(pool: &MeshPool, ray: &Ray) -> Option<PickTarget> {
    let mut best: Option<(f32, PickTarget)> = None;
    for instance in pool.iter() {
        let (min, max) = instance.world_aabb();
        if let Some(distance) = ray.intersect_aabb(min, max) {
            if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, instance.source.target()));
            }
        }
    }
    best.map(|(_, target)| target)
}

/// Hit-tests a screen point against the sorted draw list.
///
/// Walks the list back-to-front so the topmost block wins. The player
/// marker never picks.
pub fn pick_2d(draw_list: &[DrawInstruction], point_x: f32, point_y: f32) -> Option<Point3<i32>> {
    for instruction in draw_list.iter().rev() {
        let DrawKind::Block { coord, .. } = instruction.kind else {
            continue;
        };
        let size = BLOCK_PIXEL_SIZE * instruction.scale;
        if point_x >= instruction.screen_x
            && point_x < instruction.screen_x + size
            && point_y >= instruction.screen_y
            && point_y < instruction.screen_y + size
        {
            return Some(coord);
        }
    }
    None
}

/// The transform-editing mode applied to the selected object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ManipulationMode {
    /// Edit position.
    Translate,
    /// Edit Euler rotation.
    Rotate,
    /// Edit per-axis scale.
    Scale,
}

/// Applies a manipulation delta to the selected object's respective field.
///
/// When `grid_snap` is set, translated position components are rounded to
/// the nearest multiple of the grid size before being committed.
///
/// # Errors
/// * `NotFound` if the object no longer exists.
pub fn apply_manipulation(
    registry: &mut SceneRegistry,
    id: ObjectId,
    mode: ManipulationMode,
    delta: Vector3<f32>,
    grid_snap: Option<f32>,
) -> Result<(), SceneError> {
    let object = registry.get(id).ok_or(SceneError::NotFound(id))?;

    let update = match mode {
        ManipulationMode::Translate => {
            let mut position = object.position + delta;
            if let Some(grid) = grid_snap {
                position = Point3::new(
                    (position.x / grid).round() * grid,
                    (position.y / grid).round() * grid,
                    (position.z / grid).round() * grid,
                );
            }
            ObjectUpdate {
                position: Some(position),
                ..ObjectUpdate::default()
            }
        }
        ManipulationMode::Rotate => ObjectUpdate {
            rotation: Some(object.rotation + delta),
            ..ObjectUpdate::default()
        },
        ManipulationMode::Scale => ObjectUpdate {
            scale: Some(object.scale + delta),
            ..ObjectUpdate::default()
        },
    };

    registry.update_properties(id, update)
}

/// The current hover/selection pair.
///
/// Changing either target re-derives every instance's emissive through
/// [`MeshPool::apply_highlights`], which resets unselected instances to
/// exactly zero.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected: Option<PickTarget>,
    hovered: Option<PickTarget>,
}

impl SelectionState {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected target, if any.
    pub fn selected(&self) -> Option<PickTarget> {
        self.selected
    }

    /// The hovered target, if any.
    pub fn hovered(&self) -> Option<PickTarget> {
        self.hovered
    }

    /// Selects a target (or clears with `None`) and refreshes highlights.
    pub fn select(&mut self, target: Option<PickTarget>, pool: &mut MeshPool) {
        self.selected = target;
        pool.apply_highlights(self.selected, self.hovered);
    }

    /// Updates the hover target and refreshes highlights.
    pub fn set_hovered(&mut self, target: Option<PickTarget>, pool: &mut MeshPool) {
        if self.hovered != target {
            self.hovered = target;
            pool.apply_highlights(self.selected, self.hovered);
        }
    }

    /// Clears both targets and all highlights, e.g. on focus change.
    pub fn clear(&mut self, pool: &mut MeshPool) {
        self.selected = None;
        self.hovered = None;
        pool.apply_highlights(None, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    fn axis_ray(origin: Point3<f32>, direction: Vector3<f32>) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    #[test]
    fn ray_hits_box_ahead() {
        let ray = axis_ray(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = ray.intersect_aabb(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert!(hit.is_some());
        assert!((hit.unwrap() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_box_behind() {
        let ray = axis_ray(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(ray
            .intersect_aabb(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
            .is_none());
    }

    #[test]
    fn parallel_ray_outside_slab_misses() {
        let ray = axis_ray(Point3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(ray
            .intersect_aabb(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
            .is_none());
    }

    #[test]
    fn pointer_ray_through_identity_matrix_points_forward() {
        let ray = Ray::from_pointer(400.0, 300.0, 800.0, 600.0, Matrix4::identity());
        assert!((ray.origin.x).abs() < 1e-5);
        assert!((ray.origin.y).abs() < 1e-5);
        assert!(ray.direction.z > 0.99);
    }

    #[test]
    fn topmost_block_wins_2d_pick() {
        use crate::engine_state::rendering::isometric::DrawInstruction;
        use crate::engine_state::world::block_type::BlockType;

        let bottom = DrawInstruction {
            screen_x: 100.0,
            screen_y: 100.0,
            scale: 1.0,
            kind: DrawKind::Block {
                coord: Point3::new(0, 0, 0),
                block: BlockType::Grass,
                color: [0; 4],
                hovered: false,
            },
        };
        let top = DrawInstruction {
            screen_x: 110.0,
            screen_y: 110.0,
            scale: 1.0,
            kind: DrawKind::Block {
                coord: Point3::new(1, 0, 0),
                block: BlockType::Dirt,
                color: [0; 4],
                hovered: false,
            },
        };
        let list = vec![bottom, top];

        // Overlap region: the later (topmost) instruction wins.
        assert_eq!(pick_2d(&list, 115.0, 115.0), Some(Point3::new(1, 0, 0)));
        // Only the bottom block covers this corner.
        assert_eq!(pick_2d(&list, 101.0, 101.0), Some(Point3::new(0, 0, 0)));
        assert_eq!(pick_2d(&list, 500.0, 500.0), None);
    }

    #[test]
    fn grid_snap_rounds_translation() {
        use crate::engine_state::scene::object::ObjectKind;
        let mut registry = SceneRegistry::new();
        let id = registry.create_object(ObjectKind::Cube, Point3::new(0.0, 0.0, 0.0));

        apply_manipulation(
            &mut registry,
            id,
            ManipulationMode::Translate,
            Vector3::new(1.2, 0.0, 2.7),
            Some(1.0),
        )
        .unwrap();

        let object = registry.get(id).unwrap();
        assert_eq!(object.position, Point3::new(1.0, 0.0, 3.0));
    }
}
