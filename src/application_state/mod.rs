//! # Application State Management
//!
//! This module handles the application's lifecycle, including:
//! - Window and graphics initialization
//! - Raw input intake
//! - State transitions between initialization and running states
//!
//! The render loop is cooperative: every `about_to_wait` processes the
//! frame's input, advances the engine, and requests the next redraw — run
//! to completion per callback, then yield.

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, MaybeGraphics};
use input_manager::InputManager;
use log::error;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::engine_state::settings::SettingsStore;
use crate::engine_state::EngineState;

/// File the graphics-settings blob persists to.
const SETTINGS_FILE: &str = "graphics_settings.json";

/// The main application state container that manages the application's
/// lifecycle.
pub struct ApplicationState {
    /// The current graphics state, which may be uninitialized,
    /// initializing, or ready
    pub graphics: MaybeGraphics,

    /// The initialized application state, once the engine has started
    pub state: Option<InitializedApplicationState>,

    /// Cached window size for web platforms during initialization
    pub web_window_size: Option<PhysicalSize<u32>>,
}

/// The fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The core engine state and logic
    pub engine_state: EngineState,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

impl ApplicationState {
    /// Creates the application in its pre-initialization state.
    pub fn new(builder: graphics_resources_builder::GraphicsBuilder) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(builder),
            state: None,
            web_window_size: None,
        }
    }

    /// Handles window resize events during the initialization phase.
    fn resized(&mut self, size: PhysicalSize<u32>) {
        let MaybeGraphics::Graphics(gfx) = &mut self.graphics else {
            return;
        };
        if gfx.init_error.is_some() {
            return;
        }

        gfx.surface_config.as_mut().unwrap().width = size.width.max(1);
        gfx.surface_config.as_mut().unwrap().height = size.height.max(1);
        gfx.surface.as_mut().unwrap().configure(
            gfx.device.as_ref().unwrap(),
            gfx.surface_config.as_ref().unwrap(),
        );
        gfx.is_surface_configured = true;
        self.initialize_application_state();
    }

    /// Transitions from the initialization phase to the running state.
    fn initialize_application_state(&mut self) {
        if let MaybeGraphics::Graphics(gfx) = &mut self.graphics {
            let taken_gfx = std::mem::take(gfx);
            let window = taken_gfx.window.expect("Window is missing");

            let engine_state = EngineState::new(
                taken_gfx.surface.expect("Surface is missing"),
                taken_gfx
                    .surface_config
                    .expect("Surface configuration is missing"),
                taken_gfx.device.expect("Device is missing"),
                taken_gfx.queue.expect("Queue is missing"),
                taken_gfx.scene_shader_source,
                taken_gfx.shadow_shader_source,
                taken_gfx.flat_shader_source,
                SettingsStore::new(SETTINGS_FILE),
            );

            self.state = Some(InitializedApplicationState {
                engine_state,
                window,
                input_manager: InputManager::new(),
                last_wait_time: web_time::Instant::now(),
            });

            self.graphics = MaybeGraphics::Moved;
        }
    }
}

impl ApplicationHandler<Graphics> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and
    /// input events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(state) = &mut self.state {
            let input_manager = &mut state.input_manager;
            let engine_state = &mut state.engine_state;

            input_manager.intake_input(&event);

            match event {
                WindowEvent::Resized(size) => {
                    engine_state.resize_surface(size.width, size.height);
                }
                WindowEvent::Focused(is_focused) => {
                    if !is_focused {
                        input_manager.reset_inputs();
                    }
                }
                WindowEvent::RedrawRequested => {
                    engine_state.render();
                }
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            physical_key: PhysicalKey::Code(KeyCode::Escape),
                            ..
                        },
                    ..
                } => {
                    engine_state.dispose();
                    event_loop.exit();
                }
                _ => (),
            }
        } else {
            match event {
                WindowEvent::Resized(size) => {
                    self.web_window_size = Some(size);
                    self.resized(size);
                }
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            physical_key: PhysicalKey::Code(KeyCode::Escape),
                            ..
                        },
                    ..
                } => event_loop.exit(),
                _ => (),
            }
        }
    }

    /// Handles device-level input events such as raw mouse motion.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Starts graphics initialization when the application is resumed.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    /// Receives the initialized graphics resources.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: Graphics) {
        if let Some(reason) = &graphics.init_error {
            error!("graphics initialization failed: {}", reason);
            event_loop.exit();
            return;
        }

        let is_surface_configured = graphics.is_surface_configured;
        self.graphics = MaybeGraphics::Graphics(graphics);

        if is_surface_configured {
            self.initialize_application_state();
        } else if let Some(size) = self.web_window_size {
            self.resized(size);
        }
    }

    /// Advances the engine once per tick and schedules the next frame.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            let now = web_time::Instant::now();
            let wait_dt = now - state.last_wait_time;

            if let Some(processed_input) = state.input_manager.get_and_reset_processed_input() {
                state.engine_state.set_input_commands(processed_input);
            }

            state.engine_state.process_input(wait_dt);
            state.last_wait_time = now;

            state.window.request_redraw();
        }
    }
}
