//! Vertex and per-instance data layouts for the 3D scene pipeline.
//!
//! This module defines the vertex format shared by every geometry and the
//! per-instance format carrying the model transform, color, and highlight
//! state. Both layouts match the scene shader's expected inputs.

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};

/// A vertex in the scene rendering pipeline.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl Vertex {
    /// Creates a new vertex from a position and normal.
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Returns the vertex buffer layout description for the pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: normal (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Per-instance data: the model matrix rows, base color, and highlight.
///
/// # Memory Layout
/// - Model matrix: 4 × [f32; 4] (64 bytes)
/// - Color: [f32; 4] (16 bytes)
/// - Emissive + padding: [f32; 4] (16 bytes)
///
/// Total size: 96 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RawInstance {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    emissive: [f32; 4],
}

impl RawInstance {
    /// Builds the instance data from a decomposed transform.
    ///
    /// # Arguments
    /// * `position` - World-space translation
    /// * `rotation` - Euler rotation in radians, applied Y·X·Z
    /// * `scale` - Per-axis scale factors
    /// * `color` - Base RGBA color
    /// * `emissive` - Highlight intensity added in the shader
    pub fn new(
        position: Point3<f32>,
        rotation: Vector3<f32>,
        scale: Vector3<f32>,
        color: [f32; 4],
        emissive: f32,
    ) -> Self {
        let model = Matrix4::from_translation(position.to_vec())
            * Matrix4::from_angle_y(cgmath::Rad(rotation.y))
            * Matrix4::from_angle_x(cgmath::Rad(rotation.x))
            * Matrix4::from_angle_z(cgmath::Rad(rotation.z))
            * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z);
        Self {
            model: model.into(),
            color,
            emissive: [emissive, 0.0, 0.0, 0.0],
        }
    }

    /// Returns the instance buffer layout description for the pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 2..=5`: model matrix rows (vec4<f32> each)
    /// - `location = 6`: color (vec4<f32>)
    /// - `location = 7`: emissive (vec4<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RawInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 20]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
