//! # Graphics Resources Builder
//!
//! This module handles the creation of the graphics resources required by
//! the application. It provides platform-agnostic initialization of the
//! GPU context and surface, and carries the shader sources the renderer
//! compiles its pipelines from.
//!
//! The main components are:
//! - `Graphics`: Holds all graphics-related resources
//! - `GraphicsBuilder`: Helper for asynchronous graphics initialization
//! - `MaybeGraphics`: Represents the states of graphics initialization

use std::future::Future;
use std::sync::Arc;

use log::error;
use wgpu::{Adapter, Device, Features, Instance, Queue, Surface, SurfaceConfiguration};
use winit::{
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

#[cfg(target_family = "wasm")]
use crate::CANVAS_ID;

/// Contains all graphics-related resources required by the application.
///
/// Created during initialization and consumed by the engine state. When
/// `init_error` is set the GPU context could not be created at all and the
/// application reports the failure instead of starting.
#[allow(dead_code)]
#[derive(Default)]
pub struct Graphics {
    pub window: Option<Arc<Window>>,
    pub instance: Option<Instance>,
    pub surface: Option<Surface<'static>>,
    pub surface_config: Option<SurfaceConfiguration>,
    pub adapter: Option<Adapter>,
    pub device: Option<Device>,
    pub queue: Option<Queue>,
    pub scene_shader_source: String,
    pub shadow_shader_source: String,
    pub flat_shader_source: String,
    pub is_surface_configured: bool,
    pub init_error: Option<String>,
}

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        /// Loads the three shader sources.
        ///
        /// Web builds embed them at compile time; there is no asset
        /// directory to fetch from.
        fn load_shader_sources() -> (String, String, String) {
            (
                include_str!("../../assets/shaders/scene.wgsl").to_string(),
                include_str!("../../assets/shaders/shadow.wgsl").to_string(),
                include_str!("../../assets/shaders/flat.wgsl").to_string(),
            )
        }
    } else {
        /// Loads the three shader sources from the assets directory.
        ///
        /// A missing file degrades to an empty source, which the renderer
        /// treats as a 3D init failure and answers with the 2D fallback.
        fn load_shader_sources() -> (String, String, String) {
            let read = |name: &str| -> String {
                match std::fs::read_to_string(format!("assets/shaders/{}", name)) {
                    Ok(source) => source,
                    Err(err) => {
                        error!("could not read shader '{}': {}", name, err);
                        String::new()
                    }
                }
            };
            (read("scene.wgsl"), read("shadow.wgsl"), read("flat.wgsl"))
        }
    }
}

/// Asynchronously creates and initializes all required graphics resources.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window and
///   surface
///
/// # Returns
/// A `Future` that resolves to the initialized `Graphics` when complete
fn create_graphics(event_loop: &ActiveEventLoop) -> impl Future<Output = Graphics> + 'static {
    #[allow(unused_mut)]
    let mut window_attrs = Window::default_attributes();

    #[cfg(target_family = "wasm")]
    {
        use web_sys::wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        let window = web_sys::window().expect("no browser window");
        let document = window.document().expect("no document");
        let canvas = document
            .get_element_by_id(CANVAS_ID)
            .expect("canvas element missing");
        let html_canvas_element = canvas.unchecked_into();
        window_attrs = window_attrs.with_canvas(Some(html_canvas_element));
    }

    let window = Arc::new(event_loop.create_window(window_attrs).unwrap());

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        #[cfg(not(target_family = "wasm"))]
        backends: wgpu::Backends::PRIMARY,
        #[cfg(target_family = "wasm")]
        backends: wgpu::Backends::GL | wgpu::Backends::BROWSER_WEBGPU,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone()).unwrap();

    async move {
        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(err) => {
                return Graphics {
                    window: Some(window),
                    init_error: Some(format!("no compatible adapter: {}", err)),
                    ..Graphics::default()
                };
            }
        };

        let required_features = Features::empty();
        let required_limits = if cfg!(target_family = "wasm") {
            wgpu::Limits::downlevel_webgl2_defaults()
        } else {
            wgpu::Limits::default()
        };

        let (device, queue) = match adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features,
                required_limits,
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
        {
            Ok(pair) => pair,
            Err(err) => {
                return Graphics {
                    window: Some(window),
                    init_error: Some(format!("device creation failed: {}", err)),
                    ..Graphics::default()
                };
            }
        };

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let (scene_shader_source, shadow_shader_source, flat_shader_source) =
            load_shader_sources();

        let is_surface_configured = cfg!(not(target_family = "wasm"));
        if is_surface_configured {
            surface.configure(&device, &surface_config);
        }

        Graphics {
            window: Some(window),
            instance: Some(instance),
            surface: Some(surface),
            surface_config: Some(surface_config),
            adapter: Some(adapter),
            device: Some(device),
            queue: Some(queue),
            scene_shader_source,
            shadow_shader_source,
            flat_shader_source,
            is_surface_configured,
            init_error: None,
        }
    }
}

/// Helper struct for managing the asynchronous initialization of graphics
/// resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// Initial state before any initialization has been attempted
    #[allow(dead_code)]
    Uninitialized,

    /// State during asynchronous graphics initialization
    Builder(GraphicsBuilder),

    /// State when graphics resources are fully initialized
    Graphics(Graphics),

    /// State after graphics resources have been moved to another owner
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Initiates the asynchronous graphics initialization process.
    ///
    /// The resulting `Graphics` is delivered back to the event loop as a
    /// user event.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // Already spent; Graphics was constructed earlier.
            return;
        };

        #[cfg(target_family = "wasm")]
        {
            let gfx_fut = create_graphics(event_loop);
            wasm_bindgen_futures::spawn_local(async move {
                let gfx = gfx_fut.await;
                assert!(event_loop_proxy.send_event(gfx).is_ok());
            });
        }

        #[cfg(not(target_family = "wasm"))]
        {
            let gfx = pollster::block_on(create_graphics(event_loop));
            assert!(event_loop_proxy.send_event(gfx).is_ok());
        }
    }
}
