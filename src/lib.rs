#![warn(missing_docs)]

//! # Voxel Sandbox
//!
//! A voxel building toy with a dual-renderer world model, built with Rust
//! and WGPU for native and WebAssembly targets.
//!
//! One logical world — a sparse voxel grid plus a registry of free-standing
//! placed objects — stays consistent across two presentation engines: a 2D
//! isometric draw-list renderer and a 3D retained-mode scene renderer. On
//! top of that sit interactive mutation (place/mine/select/transform),
//! bounded undo/redo, JSON snapshot round-trips, an orbit camera state
//! machine, a 16×16 texture designer, and a rolling performance monitor.
//!
//! ## Key Modules
//!
//! * `application_state` - Window lifecycle, graphics bootstrap, raw input
//! * `engine_state` - The stores, cameras, renderers, and everything the
//!   sandbox simulates
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     voxel_sandbox::run();
//! }
//! ```

use application_state::{graphics_resources_builder::GraphicsBuilder, ApplicationState};
#[cfg(target_family = "wasm")]
use wasm_bindgen::prelude::wasm_bindgen;

use winit::event_loop::EventLoop;

#[cfg(not(target_family = "wasm"))]
use log::info;

pub mod application_state;
pub mod engine_state;

#[cfg(target_family = "wasm")]
const CANVAS_ID: &str = "wgpu-canvas";

/// Initializes logging and runs the sandbox on a native window.
#[cfg(not(target_family = "wasm"))]
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
    let event_loop = EventLoop::with_user_event().build().unwrap();

    let mut state = ApplicationState::new(GraphicsBuilder::new(event_loop.create_proxy()));

    let _ = event_loop.run_app(&mut state);
}

/// Initializes logging and runs the sandbox inside the browser canvas.
#[cfg(target_family = "wasm")]
#[wasm_bindgen]
pub fn run_web() {
    use winit::platform::web::EventLoopExtWebSys;

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Info).expect("Couldn't initialize logger");

    let event_loop = EventLoop::with_user_event().build().unwrap();

    let state = ApplicationState::new(GraphicsBuilder::new(event_loop.create_proxy()));

    let _ = event_loop.spawn_app(state);
}
