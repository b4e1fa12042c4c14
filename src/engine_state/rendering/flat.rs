//! Flat quad presenter for the 2D isometric view.
//!
//! Consumes the ordered draw list produced by the isometric module and
//! turns it into colored screen-space quads, drawn in list order so the
//! painter's algorithm holds. The pipeline is the minimal position+color
//! setup also used for untextured UI work: no bind groups, alpha blending
//! over the cleared background.

use wgpu::util::DeviceExt;
use wgpu::{
    DepthStencilState, Device, RenderPass, RenderPipeline, ShaderModule, TextureFormat,
};

use super::isometric::{DrawInstruction, DrawKind, BLOCK_PIXEL_SIZE, PLAYER_PIXEL_SIZE};

/// Fill color of the player marker quad.
const PLAYER_MARKER_COLOR: [f32; 4] = [0.94, 0.27, 0.27, 1.0];
/// Color mixed into a hovered block's fill.
const HOVER_TINT: f32 = 0.25;

/// A vertex in the flat pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Renders the 2D draw list as colored quads.
pub struct FlatRenderer {
    render_pipeline: RenderPipeline,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl FlatRenderer {
    /// Creates the flat pipeline.
    ///
    /// # Arguments
    /// * `device` - The GPU device
    /// * `format` - Texture format of the surface
    /// * `depth_stencil` - Depth state shared with the scene pipeline
    /// * `shader_source` - WGSL source for the flat shader
    pub fn new(
        device: &Device,
        format: TextureFormat,
        depth_stencil: Option<DepthStencilState>,
        shader_source: &str,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Flat Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let render_pipeline = Self::create_render_pipeline(device, &shader, format, depth_stencil);

        Self {
            render_pipeline,
            vertex_buffer: None,
            index_buffer: None,
            index_count: 0,
        }
    }

    fn create_render_pipeline(
        device: &Device,
        shader: &ShaderModule,
        format: TextureFormat,
        depth_stencil: Option<DepthStencilState>,
    ) -> RenderPipeline {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Flat Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
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
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }];

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Flat Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::SrcAlpha,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Rebuilds the quad buffers from the draw list.
    ///
    /// Called once per frame before `render`; quads tessellate in list
    /// order so later instructions paint over earlier ones.
    ///
    /// # Arguments
    /// * `device` - The GPU device
    /// * `draw_list` - The ordered isometric draw list
    /// * `viewport` - Surface size in pixels, for the NDC conversion
    pub fn prepare(&mut self, device: &Device, draw_list: &[DrawInstruction], viewport: (u32, u32)) {
        let mut vertices: Vec<QuadVertex> = Vec::with_capacity(draw_list.len() * 4);
        let mut indices: Vec<u32> = Vec::with_capacity(draw_list.len() * 6);
        let (width, height) = (viewport.0 as f32, viewport.1 as f32);

        for instruction in draw_list {
            let (size, color) = match &instruction.kind {
                DrawKind::Block { color, hovered, .. } => {
                    let mut fill = [
                        color[0] as f32 / 255.0,
                        color[1] as f32 / 255.0,
                        color[2] as f32 / 255.0,
                        color[3] as f32 / 255.0,
                    ];
                    if *hovered {
                        for channel in &mut fill[0..3] {
                            *channel = *channel + (1.0 - *channel) * HOVER_TINT;
                        }
                    }
                    (BLOCK_PIXEL_SIZE * instruction.scale, fill)
                }
                DrawKind::PlayerMarker => {
                    (PLAYER_PIXEL_SIZE * instruction.scale, PLAYER_MARKER_COLOR)
                }
            };

            let left = instruction.screen_x / width * 2.0 - 1.0;
            let right = (instruction.screen_x + size) / width * 2.0 - 1.0;
            let top = 1.0 - instruction.screen_y / height * 2.0;
            let bottom = 1.0 - (instruction.screen_y + size) / height * 2.0;

            let base = vertices.len() as u32;
            vertices.push(QuadVertex { position: [left, top, 0.0], color });
            vertices.push(QuadVertex { position: [right, top, 0.0], color });
            vertices.push(QuadVertex { position: [right, bottom, 0.0], color });
            vertices.push(QuadVertex { position: [left, bottom, 0.0], color });
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        self.index_count = indices.len() as u32;
        self.release_buffers();
        if indices.is_empty() {
            return;
        }
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("flat quad vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("flat quad indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    /// Draws the prepared quads.
    pub fn render(&self, render_pass: &mut RenderPass<'_>) {
        let (Some(vertex_buffer), Some(index_buffer)) =
            (self.vertex_buffer.as_ref(), self.index_buffer.as_ref())
        else {
            return;
        };

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Destroys the per-frame quad buffers.
    pub fn dispose(&mut self) {
        self.release_buffers();
        self.index_count = 0;
    }

    fn release_buffers(&mut self) {
        if let Some(buffer) = self.vertex_buffer.take() {
            buffer.destroy();
        }
        if let Some(buffer) = self.index_buffer.take() {
            buffer.destroy();
        }
    }
}
