//! # Rendering Assets
//!
//! Owned registries for the geometry and material resources the 3D renderer
//! draws with, plus the fixed table expanding composite object kinds into
//! primitive parts.
//!
//! Both registries are constructed at renderer init, passed by reference to
//! consumers, and disposed at renderer teardown — they are never ambient
//! global state. Every GPU buffer created here has a matching release in
//! `GeometryRegistry::dispose`.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_4, PI};

use cgmath::{Point3, Vector3};
use wgpu::util::DeviceExt;

use crate::engine_state::scene::object::ObjectKind;
use crate::engine_state::world::block_type::BlockType;

use super::instance::Vertex;

/// The closed set of primitive geometries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// Unit cube centered on the origin.
    Cube,
    /// Sphere of radius 0.5.
    Sphere,
    /// Cylinder of radius 0.3 and height 2, centered on the origin.
    Cylinder,
    /// Cone of base radius 0.5 and height 1, centered on the origin.
    Cone,
    /// Unit plane in the XZ axes, facing up.
    Plane,
}

impl GeometryKind {
    /// All primitive kinds, in registry construction order.
    pub fn all() -> [GeometryKind; 5] {
        [
            GeometryKind::Cube,
            GeometryKind::Sphere,
            GeometryKind::Cylinder,
            GeometryKind::Cone,
            GeometryKind::Plane,
        ]
    }

    /// Half-extents of the primitive in local space, used to derive
    /// picking bounds.
    pub fn half_extents(&self) -> Vector3<f32> {
        match self {
            GeometryKind::Cube => Vector3::new(0.5, 0.5, 0.5),
            GeometryKind::Sphere => Vector3::new(0.5, 0.5, 0.5),
            GeometryKind::Cylinder => Vector3::new(0.3, 1.0, 0.3),
            GeometryKind::Cone => Vector3::new(0.5, 0.5, 0.5),
            GeometryKind::Plane => Vector3::new(0.5, 0.05, 0.5),
        }
    }
}

/// CPU-side mesh data before upload.
pub struct MeshData {
    /// Vertex list.
    pub vertices: Vec<Vertex>,
    /// Triangle-list indices.
    pub indices: Vec<u32>,
}

/// Segment count used for the round primitives.
const ROUND_SEGMENTS: u32 = 16;

impl MeshData {
    /// Builds the mesh for a primitive kind.
    pub fn build(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Cube => Self::cube(),
            GeometryKind::Sphere => Self::sphere(0.5, ROUND_SEGMENTS, ROUND_SEGMENTS),
            GeometryKind::Cylinder => Self::cylinder(0.3, 2.0, ROUND_SEGMENTS),
            GeometryKind::Cone => Self::cone(0.5, 1.0, ROUND_SEGMENTS),
            GeometryKind::Plane => Self::plane(),
        }
    }

    fn cube() -> Self {
        // Six faces, four vertices each, with face normals.
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            (
                [0.0, 0.0, 1.0],
                [
                    [-0.5, -0.5, 0.5],
                    [0.5, -0.5, 0.5],
                    [0.5, 0.5, 0.5],
                    [-0.5, 0.5, 0.5],
                ],
            ),
            (
                [0.0, 0.0, -1.0],
                [
                    [0.5, -0.5, -0.5],
                    [-0.5, -0.5, -0.5],
                    [-0.5, 0.5, -0.5],
                    [0.5, 0.5, -0.5],
                ],
            ),
            (
                [1.0, 0.0, 0.0],
                [
                    [0.5, -0.5, 0.5],
                    [0.5, -0.5, -0.5],
                    [0.5, 0.5, -0.5],
                    [0.5, 0.5, 0.5],
                ],
            ),
            (
                [-1.0, 0.0, 0.0],
                [
                    [-0.5, -0.5, -0.5],
                    [-0.5, -0.5, 0.5],
                    [-0.5, 0.5, 0.5],
                    [-0.5, 0.5, -0.5],
                ],
            ),
            (
                [0.0, 1.0, 0.0],
                [
                    [-0.5, 0.5, 0.5],
                    [0.5, 0.5, 0.5],
                    [0.5, 0.5, -0.5],
                    [-0.5, 0.5, -0.5],
                ],
            ),
            (
                [0.0, -1.0, 0.0],
                [
                    [-0.5, -0.5, -0.5],
                    [0.5, -0.5, -0.5],
                    [0.5, -0.5, 0.5],
                    [-0.5, -0.5, 0.5],
                ],
            ),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = vertices.len() as u32;
            for corner in corners {
                vertices.push(Vertex::new(corner, normal));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self { vertices, indices }
    }

    fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            for segment in 0..=segments {
                let theta = 2.0 * PI * segment as f32 / segments as f32;
                let normal = [
                    phi.sin() * theta.cos(),
                    phi.cos(),
                    phi.sin() * theta.sin(),
                ];
                let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
                vertices.push(Vertex::new(position, normal));
            }
        }

        let stride = segments + 1;
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
        Self { vertices, indices }
    }

    fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        let half = height / 2.0;
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // Side wall with outward normals.
        for segment in 0..=segments {
            let theta = 2.0 * PI * segment as f32 / segments as f32;
            let (sin, cos) = theta.sin_cos();
            let normal = [cos, 0.0, sin];
            vertices.push(Vertex::new([radius * cos, -half, radius * sin], normal));
            vertices.push(Vertex::new([radius * cos, half, radius * sin], normal));
        }
        for segment in 0..segments {
            let a = segment * 2;
            indices.extend_from_slice(&[a, a + 1, a + 2, a + 2, a + 1, a + 3]);
        }

        // Caps.
        for (y, normal_y) in [(-half, -1.0), (half, 1.0)] {
            let center = vertices.len() as u32;
            vertices.push(Vertex::new([0.0, y, 0.0], [0.0, normal_y, 0.0]));
            for segment in 0..=segments {
                let theta = 2.0 * PI * segment as f32 / segments as f32;
                let (sin, cos) = theta.sin_cos();
                vertices.push(Vertex::new(
                    [radius * cos, y, radius * sin],
                    [0.0, normal_y, 0.0],
                ));
            }
            for segment in 0..segments {
                let a = center + 1 + segment;
                if normal_y > 0.0 {
                    indices.extend_from_slice(&[center, a + 1, a]);
                } else {
                    indices.extend_from_slice(&[center, a, a + 1]);
                }
            }
        }
        Self { vertices, indices }
    }

    fn cone(radius: f32, height: f32, segments: u32) -> Self {
        let half = height / 2.0;
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // Slanted wall; normals tilt outward by the slope angle.
        let slope = radius / height;
        for segment in 0..=segments {
            let theta = 2.0 * PI * segment as f32 / segments as f32;
            let (sin, cos) = theta.sin_cos();
            let normal_len = (1.0 + slope * slope).sqrt();
            let normal = [cos / normal_len, slope / normal_len, sin / normal_len];
            vertices.push(Vertex::new([radius * cos, -half, radius * sin], normal));
            vertices.push(Vertex::new([0.0, half, 0.0], normal));
        }
        for segment in 0..segments {
            let a = segment * 2;
            indices.extend_from_slice(&[a, a + 1, a + 2]);
        }

        // Base cap.
        let center = vertices.len() as u32;
        vertices.push(Vertex::new([0.0, -half, 0.0], [0.0, -1.0, 0.0]));
        for segment in 0..=segments {
            let theta = 2.0 * PI * segment as f32 / segments as f32;
            let (sin, cos) = theta.sin_cos();
            vertices.push(Vertex::new(
                [radius * cos, -half, radius * sin],
                [0.0, -1.0, 0.0],
            ));
        }
        for segment in 0..segments {
            let a = center + 1 + segment;
            indices.extend_from_slice(&[center, a, a + 1]);
        }
        Self { vertices, indices }
    }

    fn plane() -> Self {
        let normal = [0.0, 1.0, 0.0];
        let vertices = vec![
            Vertex::new([-0.5, 0.0, -0.5], normal),
            Vertex::new([-0.5, 0.0, 0.5], normal),
            Vertex::new([0.5, 0.0, 0.5], normal),
            Vertex::new([0.5, 0.0, -0.5], normal),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        Self { vertices, indices }
    }
}

/// A primitive geometry uploaded to the GPU.
pub struct Geometry {
    /// Vertex buffer for this geometry.
    pub vertex_buffer: wgpu::Buffer,
    /// Index buffer for this geometry.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices to draw.
    pub index_count: u32,
}

/// The owned registry of uploaded primitive geometries.
///
/// Constructed at renderer init; `dispose` releases every buffer it
/// created.
pub struct GeometryRegistry {
    geometries: HashMap<GeometryKind, Geometry>,
}

impl GeometryRegistry {
    /// Builds and uploads every primitive geometry.
    pub fn new(device: &wgpu::Device) -> Self {
        let mut geometries = HashMap::new();
        for kind in GeometryKind::all() {
            let data = MeshData::build(kind);
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("geometry vertices"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("geometry indices"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            geometries.insert(
                kind,
                Geometry {
                    vertex_buffer,
                    index_buffer,
                    index_count: data.indices.len() as u32,
                },
            );
        }
        Self { geometries }
    }

    /// Returns the uploaded geometry for a primitive kind.
    pub fn get(&self, kind: GeometryKind) -> &Geometry {
        &self.geometries[&kind]
    }

    /// Destroys every buffer this registry created.
    pub fn dispose(&mut self) {
        for geometry in self.geometries.values() {
            geometry.vertex_buffer.destroy();
            geometry.index_buffer.destroy();
        }
        self.geometries.clear();
    }
}

/// A named flat-shaded material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Base RGBA color.
    pub color: [f32; 4],
}

/// The owned registry of named materials.
///
/// Seeded with the block-type palette and the fixed model materials;
/// designed textures register their derived colors here at runtime. Name
/// collisions overwrite silently, matching the texture library.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: HashMap<String, Material>,
}

fn rgba_from_bytes(bytes: [u8; 4]) -> [f32; 4] {
    [
        bytes[0] as f32 / 255.0,
        bytes[1] as f32 / 255.0,
        bytes[2] as f32 / 255.0,
        bytes[3] as f32 / 255.0,
    ]
}

impl MaterialRegistry {
    /// Creates the registry with the built-in material set.
    pub fn new() -> Self {
        let mut registry = Self {
            materials: HashMap::new(),
        };
        for block in BlockType::all() {
            registry.insert(block.tag(), rgba_from_bytes(block.color()));
        }
        registry.insert("default", [0.78, 0.78, 0.78, 1.0]);
        registry.insert("leaves", rgba_from_bytes([0x22, 0x8B, 0x22, 0xFF]));
        registry.insert("roof", rgba_from_bytes([0x8B, 0x45, 0x13, 0xFF]));
        registry.insert("water-surface", rgba_from_bytes([0x00, 0x69, 0x94, 0x99]));
        registry
    }

    /// Inserts or replaces a named material.
    pub fn insert(&mut self, name: &str, color: [f32; 4]) {
        self.materials.insert(name.to_string(), Material { color });
    }

    /// Resolves a material name to its color, falling back to the default
    /// material for unknown names.
    pub fn color_of(&self, name: &str) -> [f32; 4] {
        self.materials
            .get(name)
            .or_else(|| self.materials.get("default"))
            .map(|material| material.color)
            .unwrap_or([1.0, 1.0, 1.0, 1.0])
    }

    /// Drops every registered material.
    pub fn dispose(&mut self) {
        self.materials.clear();
    }
}

/// One primitive piece of a (possibly composite) object model.
#[derive(Clone, Debug)]
pub struct ModelPart {
    /// Which primitive to draw.
    pub geometry: GeometryKind,
    /// Offset from the object origin, before the object transform.
    pub offset: Vector3<f32>,
    /// Part-local scale applied inside the object scale.
    pub scale: Vector3<f32>,
    /// Part-local Y rotation in radians.
    pub rotation_y: f32,
    /// Material name, or `None` to use the object's own material.
    pub material: Option<&'static str>,
}

impl ModelPart {
    fn new(geometry: GeometryKind) -> Self {
        Self {
            geometry,
            offset: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation_y: 0.0,
            material: None,
        }
    }

    fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.offset = Vector3::new(x, y, z);
        self
    }

    fn scaled(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Vector3::new(x, y, z);
        self
    }

    fn turned(mut self, rotation_y: f32) -> Self {
        self.rotation_y = rotation_y;
        self
    }

    fn with_material(mut self, material: &'static str) -> Self {
        self.material = Some(material);
        self
    }
}

/// Expands an object kind into its primitive parts.
///
/// This is the fixed tag-to-model mapping table; every object kind is
/// handled here and nowhere else.
pub fn model_parts(kind: ObjectKind) -> Vec<ModelPart> {
    match kind {
        ObjectKind::Cube => vec![ModelPart::new(GeometryKind::Cube)],
        ObjectKind::Sphere => vec![ModelPart::new(GeometryKind::Sphere)],
        ObjectKind::Cylinder => vec![ModelPart::new(GeometryKind::Cylinder)],
        ObjectKind::Cone => vec![ModelPart::new(GeometryKind::Cone)],
        ObjectKind::Tree => vec![
            ModelPart::new(GeometryKind::Cylinder)
                .at(0.0, 1.0, 0.0)
                .with_material("wood"),
            ModelPart::new(GeometryKind::Sphere)
                .at(0.0, 2.5, 0.0)
                .scaled(3.0, 3.0, 3.0)
                .with_material("leaves"),
        ],
        ObjectKind::House => vec![
            ModelPart::new(GeometryKind::Cube)
                .at(0.0, 1.0, 0.0)
                .scaled(3.0, 2.0, 3.0)
                .with_material("stone"),
            ModelPart::new(GeometryKind::Cone)
                .at(0.0, 3.0, 0.0)
                .scaled(5.0, 1.5, 5.0)
                .turned(FRAC_PI_4)
                .with_material("roof"),
        ],
        ObjectKind::Tower => (0..5)
            .map(|segment| {
                ModelPart::new(GeometryKind::Cylinder)
                    .at(0.0, segment as f32 * 2.0, 0.0)
                    .with_material("stone")
            })
            .collect(),
        ObjectKind::Water => vec![ModelPart::new(GeometryKind::Plane)
            .scaled(4.0, 1.0, 4.0)
            .with_material("water-surface")],
    }
}

/// The local-space bounding box of an object kind, derived from its parts.
pub fn local_bounds(kind: ObjectKind) -> (Point3<f32>, Point3<f32>) {
    let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
    let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);
    for part in model_parts(kind) {
        let half = part.geometry.half_extents();
        let extent = Vector3::new(
            half.x * part.scale.x,
            half.y * part.scale.y,
            half.z * part.scale.z,
        );
        min.x = min.x.min(part.offset.x - extent.x);
        min.y = min.y.min(part.offset.y - extent.y);
        min.z = min.z.min(part.offset.z - extent.z);
        max.x = max.x.max(part.offset.x + extent.x);
        max.y = max.y.max(part.offset.y + extent.y);
        max.z = max.z.max(part.offset.z + extent.z);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_mesh_has_six_faces() {
        let data = MeshData::build(GeometryKind::Cube);
        assert_eq!(data.vertices.len(), 24);
        assert_eq!(data.indices.len(), 36);
    }

    #[test]
    fn composite_models_expand_to_fixed_parts() {
        assert_eq!(model_parts(ObjectKind::Tree).len(), 2);
        assert_eq!(model_parts(ObjectKind::House).len(), 2);
        assert_eq!(model_parts(ObjectKind::Tower).len(), 5);
        assert_eq!(model_parts(ObjectKind::Cube).len(), 1);
    }

    #[test]
    fn tower_bounds_cover_all_segments() {
        let (min, max) = local_bounds(ObjectKind::Tower);
        assert!(min.y <= -1.0);
        assert!(max.y >= 9.0);
    }

    #[test]
    fn unknown_material_falls_back_to_default() {
        let registry = MaterialRegistry::new();
        assert_eq!(registry.color_of("no-such"), registry.color_of("default"));
    }
}
