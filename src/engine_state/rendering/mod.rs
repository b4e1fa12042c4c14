//! # Rendering Module
//!
//! The presentation layer for both views of the world.
//!
//! ## Architecture
//!
//! - `SceneRenderer` owns the surface, device, and queue, and presents one
//!   frame per `render` call in either mode.
//! - The 3D path is retained-mode: a [`pool::MeshPool`] of mesh instances is
//!   mirrored from the voxel store and scene registry, and the pipeline
//!   draws the pool with instanced primitives, a lambert-lit directional
//!   light, and an optional shadow pass.
//! - The 2D path re-derives an ordered draw list each frame
//!   ([`isometric`]) and presents it as screen-space quads ([`flat`]).
//!
//! ## Resource lifecycle
//!
//! The geometry and material registries are constructed at renderer init
//! and disposed at teardown; every GPU buffer and texture created here has
//! a matching release in `dispose`. Nothing rendering-related lives in
//! ambient global state.
//!
//! ## Failure policy
//!
//! If the 3D pipeline cannot be created, the renderer logs the failure,
//! reports `supports_3d() == false`, and keeps presenting through the flat
//! path — losing the scene pipeline never takes the session down.

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};
use log::{error, warn};
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, Queue, RenderPipeline, Surface,
    SurfaceConfiguration,
};

use crate::engine_state::camera_state::camera::{
    CameraUniform, OrbitCamera, Projection, OPENGL_TO_WGPU_MATRIX,
};
use crate::engine_state::settings::RenderMode;

use assets::{GeometryKind, GeometryRegistry, MaterialRegistry};
use instance::RawInstance;
use isometric::DrawInstruction;
use lighting::{LightUniform, LightingQuality, LightingRig};
use pool::MeshPool;

pub mod assets;
pub mod flat;
pub mod instance;
pub mod isometric;
pub mod lighting;
pub mod picking;
pub mod pool;
mod texture;

pub use instance::Vertex;

/// Built-in flat shader used when the asset fetch came back empty; the 2D
/// fallback path must never fail to build.
const FALLBACK_FLAT_SHADER: &str = include_str!("../../../assets/shaders/flat.wgsl");

/// Sky-blue clear color behind both views.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.529,
    g: 0.808,
    b: 0.922,
    a: 1.0,
};

/// Half-size of the directional light's orthographic shadow volume.
const SHADOW_VOLUME: f32 = 30.0;

/// Errors produced while standing up or running the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// The 3D pipeline could not be created; the session falls back to the
    /// 2D presenter and 3D-mode entry is disabled.
    InitFailure(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::InitFailure(reason) => write!(f, "renderer init failed: {}", reason),
        }
    }
}

impl std::error::Error for RenderError {}

/// The 3D pipeline and every GPU resource it owns.
struct ScenePipeline {
    pipeline: RenderPipeline,
    shadow_pipeline: RenderPipeline,
    geometry: GeometryRegistry,
    camera_buffer: Buffer,
    light_buffer: Buffer,
    camera_bind_group: BindGroup,
    light_bind_group_layout: BindGroupLayout,
    light_bind_group: BindGroup,
    shadow_bind_group: BindGroup,
    shadow_map: texture::Texture,
    shadow_map_size: u32,
    instance_buffer: Option<Buffer>,
}

/// Renders both views and owns every GPU resource involved.
pub struct SceneRenderer {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    depth_texture: texture::Texture,
    flat_renderer: flat::FlatRenderer,
    scene: Option<ScenePipeline>,
    /// The retained mesh-instance pool mirrored from the stores.
    pub pool: MeshPool,
    materials: MaterialRegistry,
    camera_uniform: CameraUniform,
    lighting: LightingRig,
    last_draw_calls: u32,
}

impl SceneRenderer {
    /// Creates the renderer.
    ///
    /// The flat presenter always comes up; the 3D pipeline is attempted and
    /// a failure is downgraded to a logged [`RenderError::InitFailure`]
    /// with `supports_3d()` reporting false afterwards.
    ///
    /// # Arguments
    /// * `surface` - The configured presentation surface
    /// * `surface_config` - Surface configuration (size, format)
    /// * `device` - The GPU device
    /// * `queue` - The GPU queue
    /// * `scene_shader_source` - WGSL for the main scene pass
    /// * `shadow_shader_source` - WGSL for the shadow depth pass
    /// * `flat_shader_source` - WGSL for the 2D quad pass
    /// * `quality` - Initial lighting quality preset
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        scene_shader_source: String,
        shadow_shader_source: String,
        flat_shader_source: String,
        quality: LightingQuality,
    ) -> Self {
        let depth_texture =
            texture::Texture::create_depth_texture(&device, &surface_config, "depth texture");

        let depth_stencil = Some(wgpu::DepthStencilState {
            format: texture::Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let flat_source = if flat_shader_source.trim().is_empty() {
            FALLBACK_FLAT_SHADER.to_string()
        } else {
            flat_shader_source
        };
        let flat_renderer = flat::FlatRenderer::new(
            &device,
            surface_config.format,
            depth_stencil.clone(),
            &flat_source,
        );

        let lighting = LightingRig::new(quality);
        let scene = match Self::build_scene_pipeline(
            &device,
            surface_config.format,
            depth_stencil,
            &scene_shader_source,
            &shadow_shader_source,
            &lighting,
        ) {
            Ok(scene) => Some(scene),
            Err(err) => {
                error!("{}; continuing with the 2D presenter only", err);
                None
            }
        };

        Self {
            surface,
            surface_config,
            device,
            queue,
            depth_texture,
            flat_renderer,
            scene,
            pool: MeshPool::new(),
            materials: MaterialRegistry::new(),
            camera_uniform: CameraUniform::new(),
            lighting,
            last_draw_calls: 0,
        }
    }

    fn build_scene_pipeline(
        device: &Device,
        format: wgpu::TextureFormat,
        depth_stencil: Option<wgpu::DepthStencilState>,
        scene_shader_source: &str,
        shadow_shader_source: &str,
        lighting: &LightingRig,
    ) -> Result<ScenePipeline, RenderError> {
        if scene_shader_source.trim().is_empty() || shadow_shader_source.trim().is_empty() {
            return Err(RenderError::InitFailure(
                "scene shader sources unavailable".to_string(),
            ));
        }

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(scene_shader_source.into()),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(shadow_shader_source.into()),
        });

        let geometry = GeometryRegistry::new(device);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera uniform buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light uniform buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::from_rig(
                lighting,
                Matrix4::<f32>::from_scale(1.0).into(),
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera bind group layout"),
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera bind group"),
        });

        let light_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                ],
                label: Some("light bind group layout"),
            });

        let shadow_map_size = lighting.preset().shadow_map_size;
        let shadow_map =
            texture::Texture::create_shadow_map(device, shadow_map_size, "shadow map");
        let light_bind_group = Self::build_light_bind_group(
            device,
            &light_bind_group_layout,
            &light_buffer,
            &shadow_map,
        );

        let shadow_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("shadow bind group layout"),
            });
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shadow_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
            label: Some("shadow bind group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &light_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc(), RawInstance::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow Pipeline Layout"),
                bind_group_layouts: &[&shadow_bind_group_layout],
                push_constant_ranges: &[],
            });
        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Render Pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc(), RawInstance::desc()],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: texture::Texture::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(ScenePipeline {
            pipeline,
            shadow_pipeline,
            geometry,
            camera_buffer,
            light_buffer,
            camera_bind_group,
            light_bind_group_layout,
            light_bind_group,
            shadow_bind_group,
            shadow_map,
            shadow_map_size,
            instance_buffer: None,
        })
    }

    fn build_light_bind_group(
        device: &Device,
        layout: &BindGroupLayout,
        light_buffer: &Buffer,
        shadow_map: &texture::Texture,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
            ],
            label: Some("light bind group"),
        })
    }

    /// Whether the 3D pipeline is available.
    pub fn supports_3d(&self) -> bool {
        self.scene.is_some()
    }

    /// Mirrors the voxel store into the retained pool.
    pub fn sync_from_world(&mut self, world: &crate::engine_state::world::VoxelWorld) {
        self.pool.sync_from_world(world, &self.materials);
    }

    /// Mirrors the scene registry into the retained pool.
    pub fn sync_from_scene(&mut self, registry: &crate::engine_state::scene::SceneRegistry) {
        self.pool.sync_from_scene(registry, &self.materials);
    }

    /// The material registry, for pool syncs and designed-texture
    /// registration.
    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    /// Mutable access to the material registry.
    pub fn materials_mut(&mut self) -> &mut MaterialRegistry {
        &mut self.materials
    }

    /// Current surface size in pixels.
    pub fn viewport(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// The camera uniform currently uploaded, carrying the inverse
    /// view-projection used for picking rays.
    pub fn camera_uniform(&self) -> &CameraUniform {
        &self.camera_uniform
    }

    /// Draw calls issued by the most recent frame.
    pub fn last_draw_calls(&self) -> u32 {
        self.last_draw_calls
    }

    /// Handles window resize: reconfigures the surface and recreates the
    /// depth buffer.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_texture.dispose();
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, &self.surface_config, "depth texture");
    }

    /// Uploads fresh camera matrices.
    pub fn update_camera(&mut self, camera: &OrbitCamera, projection: &Projection) {
        self.camera_uniform.update_view_proj_and_pos(camera, projection);
        if let Some(scene) = &self.scene {
            self.queue.write_buffer(
                &scene.camera_buffer,
                0,
                bytemuck::cast_slice(&[self.camera_uniform]),
            );
        }
    }

    /// Switches the lighting quality preset, recreating the shadow map at
    /// the preset's resolution when it changes.
    pub fn set_lighting_quality(&mut self, quality: LightingQuality) {
        self.lighting.set_quality(quality);
        let Some(scene) = &mut self.scene else {
            return;
        };
        let size = self.lighting.preset().shadow_map_size;
        if size != scene.shadow_map_size {
            scene.shadow_map.dispose();
            scene.shadow_map = texture::Texture::create_shadow_map(&self.device, size, "shadow map");
            scene.shadow_map_size = size;
            scene.light_bind_group = Self::build_light_bind_group(
                &self.device,
                &scene.light_bind_group_layout,
                &scene.light_buffer,
                &scene.shadow_map,
            );
        }
    }

    /// The active lighting rig.
    pub fn lighting(&self) -> &LightingRig {
        &self.lighting
    }

    /// Presents one frame.
    ///
    /// Side-effect-free with respect to world state: the pool and draw list
    /// are read, never written. A mode of `ThreeD` without an available
    /// scene pipeline silently presents the flat path instead.
    pub fn render(&mut self, mode: RenderMode, draw_list: &[DrawInstruction]) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                warn!("skipping frame, surface unavailable: {:?}", err);
                return;
            }
        };
        let view = frame.texture.create_view(&Default::default());

        let use_scene = mode == RenderMode::ThreeD && self.scene.is_some();
        if use_scene {
            self.render_scene(&view);
        } else {
            self.render_flat(&view, draw_list);
        }

        frame.present();
    }

    fn render_flat(&mut self, view: &wgpu::TextureView, draw_list: &[DrawInstruction]) {
        self.flat_renderer.prepare(
            &self.device,
            draw_list,
            (self.surface_config.width, self.surface_config.height),
        );

        let mut encoder = self.device.create_command_encoder(&Default::default());
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            self.flat_renderer.render(&mut rpass);
        }
        self.queue.submit([encoder.finish()]);
        self.last_draw_calls = 1;
    }

    fn render_scene(&mut self, view: &wgpu::TextureView) {
        let light_view_proj = self.light_view_proj();
        let Some(scene) = &mut self.scene else {
            return;
        };

        self.queue.write_buffer(
            &scene.light_buffer,
            0,
            bytemuck::cast_slice(&[LightUniform::from_rig(&self.lighting, light_view_proj)]),
        );

        // Batch instances per geometry, opaque groups before translucent
        // ones so alpha blending composes over the lit scene.
        let mut raw: Vec<RawInstance> = Vec::with_capacity(self.pool.len());
        let mut groups: Vec<(GeometryKind, std::ops::Range<u32>)> = Vec::new();
        for translucent in [false, true] {
            for kind in GeometryKind::all() {
                let start = raw.len() as u32;
                for mesh in self
                    .pool
                    .iter()
                    .filter(|mesh| mesh.geometry == kind && mesh.is_translucent() == translucent)
                {
                    raw.push(RawInstance::new(
                        mesh.position,
                        mesh.rotation,
                        mesh.scale,
                        mesh.color,
                        mesh.emissive,
                    ));
                }
                let end = raw.len() as u32;
                if end > start {
                    groups.push((kind, start..end));
                }
            }
        }

        if let Some(buffer) = scene.instance_buffer.take() {
            buffer.destroy();
        }
        if !raw.is_empty() {
            scene.instance_buffer = Some(self.device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("scene instances"),
                    contents: bytemuck::cast_slice(&raw),
                    usage: wgpu::BufferUsages::VERTEX,
                },
            ));
        }

        let mut encoder = self.device.create_command_encoder(&Default::default());
        let mut draw_calls = 0;

        if self.lighting.preset().shadows_enabled {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &scene.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            if let Some(instance_buffer) = &scene.instance_buffer {
                shadow_pass.set_pipeline(&scene.shadow_pipeline);
                shadow_pass.set_bind_group(0, &scene.shadow_bind_group, &[]);
                shadow_pass.set_vertex_buffer(1, instance_buffer.slice(..));
                for (kind, range) in &groups {
                    let geometry = scene.geometry.get(*kind);
                    shadow_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                    shadow_pass
                        .set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    shadow_pass.draw_indexed(0..geometry.index_count, 0, range.clone());
                }
            }
        }

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            if let Some(instance_buffer) = &scene.instance_buffer {
                rpass.set_pipeline(&scene.pipeline);
                rpass.set_bind_group(0, &scene.camera_bind_group, &[]);
                rpass.set_bind_group(1, &scene.light_bind_group, &[]);
                rpass.set_vertex_buffer(1, instance_buffer.slice(..));
                for (kind, range) in &groups {
                    let geometry = scene.geometry.get(*kind);
                    rpass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                    rpass
                        .set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..geometry.index_count, 0, range.clone());
                    draw_calls += 1;
                }
            }
        }

        self.queue.submit([encoder.finish()]);
        self.last_draw_calls = draw_calls;
    }

    /// The light-space view-projection used by both shadow passes.
    fn light_view_proj(&self) -> [[f32; 4]; 4] {
        let eye = Point3::from_vec(self.lighting.directional_position * 3.0);
        let view = Matrix4::look_at_rh(eye, Point3::new(0.0, 0.0, 0.0), Vector3::unit_y());
        let projection = cgmath::ortho(
            -SHADOW_VOLUME,
            SHADOW_VOLUME,
            -SHADOW_VOLUME,
            SHADOW_VOLUME,
            0.1,
            100.0,
        );
        (OPENGL_TO_WGPU_MATRIX * projection * view).into()
    }

    /// Tears the renderer down, releasing every GPU resource it created.
    ///
    /// Mandatory pair to `new`; the pool is emptied and both registries are
    /// disposed.
    pub fn dispose(&mut self) {
        self.pool.clear();
        self.flat_renderer.dispose();
        self.materials.dispose();
        self.depth_texture.dispose();
        if let Some(mut scene) = self.scene.take() {
            scene.geometry.dispose();
            scene.camera_buffer.destroy();
            scene.light_buffer.destroy();
            scene.shadow_map.dispose();
            if let Some(buffer) = scene.instance_buffer.take() {
                buffer.destroy();
            }
        }
    }
}
