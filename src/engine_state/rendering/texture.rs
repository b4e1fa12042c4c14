//! Texture handling for the rendering pipeline.
//!
//! This module provides functionality for creating and managing GPU
//! textures: the depth buffer used by the main pass and the square shadow
//! map rendered by the directional light's depth-only pass.

/// Represents a GPU texture with associated view and sampler.
///
/// This struct wraps a texture along with its view and sampler, providing a
/// convenient way to manage texture resources in the rendering pipeline.
pub struct Texture {
    /// The underlying texture resource.
    pub texture: wgpu::Texture,
    /// The texture view used for binding the texture to the pipeline.
    pub view: wgpu::TextureView,
    /// The sampler used for texture filtering and comparison.
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// The texture format used for depth buffers.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a new depth texture matching the surface size.
    ///
    /// # Arguments
    /// * `device` - The GPU device
    /// * `config` - The surface configuration containing dimensions
    /// * `label` - Debug label for the texture
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        Self::create_depth_sized(device, config.width.max(1), config.height.max(1), label)
    }

    /// Creates a square shadow map at the given per-side resolution.
    ///
    /// The resolution comes from the active lighting preset; switching
    /// presets recreates the map at the new size.
    pub fn create_shadow_map(device: &wgpu::Device, size: u32, label: &str) -> Self {
        Self::create_depth_sized(device, size, size, label)
    }

    fn create_depth_sized(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };

        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Releases the underlying GPU texture.
    ///
    /// Paired with creation; the renderer calls this from its own
    /// `dispose`.
    pub fn dispose(&self) {
        self.texture.destroy();
    }
}
