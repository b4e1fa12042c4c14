//! # Mesh Instance Pool
//!
//! The retained set of mesh instances mirrored from the voxel store and the
//! scene object registry. The pool is pure data: the renderer turns it into
//! GPU buffers at draw time, and picking walks it for hit tests.
//!
//! Instances are keyed by their source — a voxel coordinate or an
//! (object id, part index) pair — so synchronization is a straight diff:
//! ensure exactly one instance per live source, remove instances whose
//! source is gone. Running a sync twice against unchanged input performs no
//! additional mutation.
//!
//! The object-id key on instances is a non-owning back-pointer used by
//! picking; the registry remains the sole owner of scene objects.

use std::collections::HashMap;

use cgmath::{Matrix4, Point3, Vector3, Vector4};

use crate::engine_state::scene::object::ObjectId;
use crate::engine_state::scene::SceneRegistry;
use crate::engine_state::world::VoxelWorld;

use super::assets::{model_parts, GeometryKind, MaterialRegistry};
use super::picking::PickTarget;

/// Emissive intensity applied to the selected entity.
pub const SELECTED_EMISSIVE: f32 = 0.3;
/// Emissive intensity applied to the hovered entity.
pub const HOVERED_EMISSIVE: f32 = 0.15;

/// What a mesh instance mirrors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MeshSource {
    /// A block in the voxel store.
    Voxel(Point3<i32>),
    /// One primitive part of a scene object.
    ObjectPart {
        /// Back-pointer to the owning scene object (lookup only).
        id: ObjectId,
        /// Index into the object's model part list.
        part: usize,
    },
}

impl MeshSource {
    /// The pick target this instance resolves to when hit.
    pub fn target(&self) -> PickTarget {
        match self {
            MeshSource::Voxel(coord) => PickTarget::Voxel(*coord),
            MeshSource::ObjectPart { id, .. } => PickTarget::Object(*id),
        }
    }
}

/// One retained mesh instance.
#[derive(Clone, Debug)]
pub struct MeshInstance {
    /// What this instance mirrors.
    pub source: MeshSource,
    /// Which primitive geometry it draws.
    pub geometry: GeometryKind,
    /// World-space position.
    pub position: Point3<f32>,
    /// Euler rotation in radians.
    pub rotation: Vector3<f32>,
    /// Per-axis scale.
    pub scale: Vector3<f32>,
    /// Resolved base color.
    pub color: [f32; 4],
    /// Highlight intensity; managed by `apply_highlights`.
    pub emissive: f32,
}

impl MeshInstance {
    /// The world-space axis-aligned bounds of this instance.
    ///
    /// Rotation is ignored; editor picking treats every instance as its
    /// axis-aligned envelope.
    pub fn world_aabb(&self) -> (Point3<f32>, Point3<f32>) {
        let half = self.geometry.half_extents();
        let extent = Vector3::new(
            half.x * self.scale.x.abs(),
            half.y * self.scale.y.abs(),
            half.z * self.scale.z.abs(),
        );
        (self.position - extent, self.position + extent)
    }

    /// Whether the instance renders with alpha blending.
    pub fn is_translucent(&self) -> bool {
        self.color[3] < 1.0
    }
}

/// The retained mesh-instance pool.
#[derive(Debug, Default)]
pub struct MeshPool {
    instances: HashMap<MeshSource, MeshInstance>,
    created: u64,
    removed: u64,
}

impl MeshPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirrors the voxel store into the pool.
    ///
    /// Ensures exactly one instance per stored voxel with the correct block
    /// material and removes instances for coordinates no longer present.
    /// Idempotent: a second call with unchanged input mutates nothing.
    pub fn sync_from_world(&mut self, world: &VoxelWorld, materials: &MaterialRegistry) {
        let removed = &mut self.removed;
        self.instances.retain(|source, _| match source {
            MeshSource::Voxel(coord) => {
                let keep = world.contains(*coord);
                if !keep {
                    *removed += 1;
                }
                keep
            }
            MeshSource::ObjectPart { .. } => true,
        });

        for (coord, block) in world.iter() {
            let source = MeshSource::Voxel(coord);
            let color = materials.color_of(block.tag());
            match self.instances.get_mut(&source) {
                Some(instance) => {
                    // Block type may have changed under the same key after a
                    // wholesale restore.
                    instance.color = color;
                }
                None => {
                    self.created += 1;
                    self.instances.insert(
                        source,
                        MeshInstance {
                            source,
                            geometry: GeometryKind::Cube,
                            position: Point3::new(
                                coord.x as f32,
                                coord.y as f32 + 0.5,
                                coord.z as f32,
                            ),
                            rotation: Vector3::new(0.0, 0.0, 0.0),
                            scale: Vector3::new(1.0, 1.0, 1.0),
                            color,
                            emissive: 0.0,
                        },
                    );
                }
            }
        }
    }

    /// Mirrors the scene registry into the pool.
    ///
    /// Every visible object expands to its model parts; instances for
    /// deleted or hidden objects are removed. Idempotent in the same way as
    /// `sync_from_world`.
    pub fn sync_from_scene(&mut self, registry: &SceneRegistry, materials: &MaterialRegistry) {
        let mut live_parts: HashMap<ObjectId, usize> = HashMap::new();
        for object in registry.iter() {
            if object.properties.visible {
                live_parts.insert(object.id, model_parts(object.kind).len());
            }
        }

        let removed = &mut self.removed;
        self.instances.retain(|source, _| match source {
            MeshSource::Voxel(_) => true,
            MeshSource::ObjectPart { id, part } => {
                let keep = live_parts.get(id).is_some_and(|count| part < count);
                if !keep {
                    *removed += 1;
                }
                keep
            }
        });

        for object in registry.iter() {
            if !object.properties.visible {
                continue;
            }
            let rotate = Matrix4::from_angle_y(cgmath::Rad(object.rotation.y))
                * Matrix4::from_angle_x(cgmath::Rad(object.rotation.x))
                * Matrix4::from_angle_z(cgmath::Rad(object.rotation.z));

            for (index, part) in model_parts(object.kind).into_iter().enumerate() {
                let source = MeshSource::ObjectPart {
                    id: object.id,
                    part: index,
                };
                let scaled_offset = Vector3::new(
                    part.offset.x * object.scale.x,
                    part.offset.y * object.scale.y,
                    part.offset.z * object.scale.z,
                );
                let rotated = rotate * Vector4::new(scaled_offset.x, scaled_offset.y, scaled_offset.z, 1.0);
                let position = object.position + Vector3::new(rotated.x, rotated.y, rotated.z);
                let scale = Vector3::new(
                    part.scale.x * object.scale.x,
                    part.scale.y * object.scale.y,
                    part.scale.z * object.scale.z,
                );
                let rotation = Vector3::new(
                    object.rotation.x,
                    object.rotation.y + part.rotation_y,
                    object.rotation.z,
                );
                let material = match part.material {
                    Some(name) => name,
                    None => object.properties.material.as_str(),
                };
                let color = materials.color_of(material);

                match self.instances.get_mut(&source) {
                    Some(instance) => {
                        instance.position = position;
                        instance.rotation = rotation;
                        instance.scale = scale;
                        instance.color = color;
                        instance.geometry = part.geometry;
                    }
                    None => {
                        self.created += 1;
                        self.instances.insert(
                            source,
                            MeshInstance {
                                source,
                                geometry: part.geometry,
                                position,
                                rotation,
                                scale,
                                color,
                                emissive: 0.0,
                            },
                        );
                    }
                }
            }
        }
    }

    /// Re-derives every instance's emissive from the current selection.
    ///
    /// Instances matching the selected target glow at
    /// [`SELECTED_EMISSIVE`], hovered at [`HOVERED_EMISSIVE`], and every
    /// other instance is reset to exactly zero — no residual tint survives
    /// a selection change.
    pub fn apply_highlights(&mut self, selected: Option<PickTarget>, hovered: Option<PickTarget>) {
        for instance in self.instances.values_mut() {
            let target = instance.source.target();
            instance.emissive = if Some(target) == selected {
                SELECTED_EMISSIVE
            } else if Some(target) == hovered {
                HOVERED_EMISSIVE
            } else {
                0.0
            };
        }
    }

    /// Iterates over all retained instances in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &MeshInstance> {
        self.instances.values()
    }

    /// The number of retained instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Total instances ever created; with `removed_count`, lets callers
    /// observe that a redundant sync performed no mutation.
    pub fn created_count(&self) -> u64 {
        self.created
    }

    /// Total instances ever removed.
    pub fn removed_count(&self) -> u64 {
        self.removed
    }

    /// Drops every instance, as part of renderer teardown.
    pub fn clear(&mut self) {
        self.removed += self.instances.len() as u64;
        self.instances.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::scene::object::ObjectKind;
    use crate::engine_state::world::block_type::BlockType;
    use crate::engine_state::world::player::Player;
    use crate::engine_state::world::statistics::WorldStatistics;

    fn fixtures() -> (VoxelWorld, Player, WorldStatistics, MaterialRegistry) {
        (
            VoxelWorld::new(),
            Player::new(),
            WorldStatistics::new(),
            MaterialRegistry::new(),
        )
    }

    #[test]
    fn world_sync_is_idempotent() {
        let (mut world, mut player, mut stats, materials) = fixtures();
        world
            .place(&mut player, &mut stats, Point3::new(0, 0, 0), BlockType::Grass)
            .unwrap();
        world
            .place(&mut player, &mut stats, Point3::new(1, 0, 0), BlockType::Dirt)
            .unwrap();

        let mut pool = MeshPool::new();
        pool.sync_from_world(&world, &materials);
        assert_eq!(pool.len(), 2);
        let (created, removed) = (pool.created_count(), pool.removed_count());

        pool.sync_from_world(&world, &materials);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.created_count(), created);
        assert_eq!(pool.removed_count(), removed);
    }

    #[test]
    fn mined_voxel_instance_is_removed() {
        let (mut world, mut player, mut stats, materials) = fixtures();
        let coord = Point3::new(3, 1, 2);
        world
            .place(&mut player, &mut stats, coord, BlockType::Stone)
            .unwrap();

        let mut pool = MeshPool::new();
        pool.sync_from_world(&world, &materials);
        assert_eq!(pool.len(), 1);

        world.mine(&mut player, &mut stats, coord).unwrap();
        pool.sync_from_world(&world, &materials);
        assert!(pool.is_empty());
        assert_eq!(pool.removed_count(), 1);
    }

    #[test]
    fn scene_sync_expands_composites_and_tracks_deletes() {
        let (_, _, _, materials) = fixtures();
        let mut registry = SceneRegistry::new();
        let id = registry.create_object(ObjectKind::Tree, Point3::new(1.0, 0.0, 1.0));

        let mut pool = MeshPool::new();
        pool.sync_from_scene(&registry, &materials);
        assert_eq!(pool.len(), 2, "tree is trunk plus leaves");

        registry.delete_object(id).unwrap();
        pool.sync_from_scene(&registry, &materials);
        assert!(pool.is_empty());
    }

    #[test]
    fn highlights_clear_exactly() {
        let (mut world, mut player, mut stats, materials) = fixtures();
        let coord = Point3::new(0, 0, 0);
        world
            .place(&mut player, &mut stats, coord, BlockType::Grass)
            .unwrap();
        let mut pool = MeshPool::new();
        pool.sync_from_world(&world, &materials);

        let target = PickTarget::Voxel(coord);
        pool.apply_highlights(Some(target), None);
        assert!(pool.iter().all(|i| i.emissive == SELECTED_EMISSIVE));

        pool.apply_highlights(None, None);
        assert!(pool.iter().all(|i| i.emissive == 0.0));
    }
}
