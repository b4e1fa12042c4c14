//! # Engine State Module
//!
//! The core module wiring the sandbox together.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container and single writer of all
//!   world/scene state
//! * `world` - The sparse voxel store, player, and statistics
//! * `scene` - The scene object registry and undo/redo history
//! * `camera_state` - The orbit controller state machine and flat camera
//! * `rendering` - Both presenters, picking, and the mesh-instance pool
//! * `texture_designer` - The 16×16 pattern editor and library
//! * `performance` - The rolling frame sampler
//! * `persistence` - Snapshot import/export
//! * `settings` - The graphics-settings blob
//!
//! ## Data flow
//!
//! Input events become a `PlayerAction` once per frame; `process_input`
//! routes them through the camera state machine or the picking layer into
//! store mutations, the history records deltas, and both renderers
//! re-derive their presentation from the stores on the next render pass.
//! All of this happens on the single event thread; there is no second
//! writer.

use cgmath::Point3;
use log::{debug, info, warn};
use web_time::Duration;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::application_state::input_state::ProcessedInputState;

use camera_state::flat_camera::{FlatCamera, PAN_STEP};
use camera_state::{MoveCommand, OrbitController, PointerButton};
use performance::PerformanceMonitor;
use rendering::isometric::{self, DrawInstruction};
use rendering::picking::{self, ManipulationMode, PickTarget, Ray, SelectionState};
use rendering::SceneRenderer;
use scene::{ObjectKind, SceneRegistry};
use settings::{GraphicsSettings, RenderMode, SettingsStore};
use texture_designer::TextureLibrary;
use world::block_type::BlockType;
use world::player::Player;
use world::statistics::WorldStatistics;
use world::VoxelWorld;

pub mod camera_state;
pub mod performance;
pub mod persistence;
pub mod rendering;
pub mod scene;
pub mod settings;
pub mod texture_designer;
pub mod world;

/// Default grid size for snapped transforms.
const DEFAULT_GRID_SIZE: f32 = 1.0;

/// The main state container for the sandbox.
///
/// Owns every store and both presenters, and coordinates their
/// interactions: input processing, mutation routing, history recording,
/// and frame production.
pub struct EngineState {
    /// The authoritative voxel store.
    pub world: VoxelWorld,
    /// The player entity.
    pub player: Player,
    /// Session edit statistics.
    pub statistics: WorldStatistics,
    /// The scene object registry with its undo/redo history.
    pub scene: SceneRegistry,
    /// The 3D camera state machine.
    pub orbit: OrbitController,
    /// The 2D pan/zoom camera.
    pub flat_camera: FlatCamera,
    /// Perspective projection for the 3D view.
    pub projection: camera_state::camera::Projection,
    /// Current hover/selection pair.
    pub selection: SelectionState,
    /// Designed texture library.
    pub texture_library: TextureLibrary,
    /// Rolling performance sampler.
    pub monitor: PerformanceMonitor,
    /// Active graphics settings.
    pub settings: GraphicsSettings,
    renderer: SceneRenderer,
    settings_store: SettingsStore,
    player_actions: PlayerAction,
    /// Designed-texture assignments per block type.
    texture_overrides: std::collections::HashMap<BlockType, String>,
    hovered_block: Option<Point3<i32>>,
    building_mode: bool,
    grid_snap: Option<f32>,
    manipulation_mode: ManipulationMode,
    last_draw_list: Vec<DrawInstruction>,
}

impl EngineState {
    /// Creates the engine with a fresh terrain-filled world.
    ///
    /// # Arguments
    /// * `surface` - The configured presentation surface
    /// * `surface_config` - Surface configuration
    /// * `device` - The GPU device
    /// * `queue` - The GPU queue
    /// * `scene_shader` - WGSL source for the 3D pass
    /// * `shadow_shader` - WGSL source for the shadow pass
    /// * `flat_shader` - WGSL source for the 2D pass
    /// * `settings_store` - The persisted graphics-settings blob
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        scene_shader: String,
        shadow_shader: String,
        flat_shader: String,
        settings_store: SettingsStore,
    ) -> Self {
        let mut settings = settings_store.load();

        let projection = camera_state::camera::Projection::new(
            surface_config.width,
            surface_config.height,
            cgmath::Deg(45.0),
            0.1,
            1000.0,
        );

        let renderer = SceneRenderer::new(
            surface,
            surface_config,
            device,
            queue,
            scene_shader,
            shadow_shader,
            flat_shader,
            settings.lighting_quality,
        );

        if settings.render_mode == RenderMode::ThreeD && !renderer.supports_3d() {
            warn!("3D mode unavailable, staying in the 2D view");
            settings.render_mode = RenderMode::TwoD;
        }

        let world = VoxelWorld::with_terrain();
        info!("world initialized with {} terrain blocks", world.len());

        let mut state = Self {
            world,
            player: Player::new(),
            statistics: WorldStatistics::new(),
            scene: SceneRegistry::new(),
            orbit: OrbitController::new(),
            flat_camera: FlatCamera::new(),
            projection,
            selection: SelectionState::new(),
            texture_library: TextureLibrary::new(),
            monitor: PerformanceMonitor::new(),
            settings,
            renderer,
            settings_store,
            player_actions: PlayerAction::default(),
            texture_overrides: std::collections::HashMap::new(),
            hovered_block: None,
            building_mode: true,
            grid_snap: Some(DEFAULT_GRID_SIZE),
            manipulation_mode: ManipulationMode::Translate,
            last_draw_list: Vec::new(),
        };
        state.renderer.sync_from_world(&state.world);
        state
    }

    /// The renderer, for teardown and capability queries.
    pub fn renderer(&self) -> &SceneRenderer {
        &self.renderer
    }

    /// The render mode actually in effect (3D requests fall back to 2D when
    /// the scene pipeline is unavailable).
    pub fn effective_render_mode(&self) -> RenderMode {
        if self.settings.render_mode == RenderMode::ThreeD && self.renderer.supports_3d() {
            RenderMode::ThreeD
        } else {
            RenderMode::TwoD
        }
    }

    /// Translates the frame's processed input into commands for the next
    /// `process_input`.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = Self::translate_processed_input(&input);
    }

    /// Stores pre-built input commands directly; the programmatic
    /// equivalent of `set_input_commands`.
    pub fn set_player_actions(&mut self, actions: PlayerAction) {
        self.player_actions = actions;
    }

    fn translate_processed_input(input: &ProcessedInputState) -> PlayerAction {
        let mut action = PlayerAction::default();

        let key_moves = [
            (KeyCode::KeyW, MoveCommand::Forward),
            (KeyCode::KeyS, MoveCommand::Backward),
            (KeyCode::KeyA, MoveCommand::Left),
            (KeyCode::KeyD, MoveCommand::Right),
            (KeyCode::KeyQ, MoveCommand::Up),
            (KeyCode::KeyE, MoveCommand::Down),
        ];
        for (key, command) in key_moves {
            if input.get_key_state(key).is_just_pressed() {
                action.camera_moves.push(command);
            }
        }

        action.reset_camera = input.get_key_state(KeyCode::KeyR).is_just_pressed();
        action.undo = input.get_key_state(KeyCode::KeyZ).is_just_pressed();
        action.redo = input.get_key_state(KeyCode::KeyY).is_just_pressed();
        action.toggle_build_mode = input.get_key_state(KeyCode::KeyB).is_just_pressed();

        let slots = [
            (KeyCode::Digit1, BlockType::Grass),
            (KeyCode::Digit2, BlockType::Dirt),
            (KeyCode::Digit3, BlockType::Stone),
            (KeyCode::Digit4, BlockType::Wood),
            (KeyCode::Digit5, BlockType::Water),
            (KeyCode::Digit6, BlockType::Sand),
        ];
        for (key, block) in slots {
            if input.get_key_state(key).is_just_pressed() {
                action.select_slot = Some(block);
            }
        }

        let left = input.get_mouse_button_state(MouseButton::Left);
        let right = input.get_mouse_button_state(MouseButton::Right);
        let middle = input.get_mouse_button_state(MouseButton::Middle);

        action.primary_pressed = left.is_just_pressed();
        action.secondary_pressed = right.is_just_pressed();
        action.middle_pressed = middle.is_just_pressed();
        action.any_released =
            left.is_just_released() || right.is_just_released() || middle.is_just_released();
        action.primary_click = left.is_just_pressed();
        action.secondary_click = right.is_just_pressed();

        if left.is_active() || right.is_active() || middle.is_active() {
            action.pointer_delta = input.mouse_delta;
        }
        action.cursor = input.cursor_position;
        action.wheel = input.wheel_notches;
        action.pinch_start = input.pinch_started;
        action.pinch_move = input.pinch_moved;
        action.touch_ended = input.touch_ended;

        action
    }

    /// Processes the pending input and advances time-based state.
    ///
    /// # Arguments
    /// * `dt` - Time elapsed since the previous frame
    pub fn process_input(&mut self, dt: Duration) {
        let actions = std::mem::take(&mut self.player_actions);
        let mode = self.effective_render_mode();

        self.apply_global_actions(&actions);
        match mode {
            RenderMode::ThreeD => self.apply_pointer_actions_3d(&actions),
            RenderMode::TwoD => self.apply_pointer_actions_2d(&actions),
        }

        self.orbit.update(dt);
        self.renderer.sync_from_world(&self.world);
        self.renderer.sync_from_scene(&self.scene);
    }

    fn apply_global_actions(&mut self, actions: &PlayerAction) {
        if actions.undo {
            if self.scene.undo().is_some() {
                self.selection.clear(&mut self.renderer.pool);
            }
        }
        if actions.redo {
            self.scene.redo();
        }
        if actions.toggle_build_mode {
            self.building_mode = !self.building_mode;
            debug!(
                "{} mode",
                if self.building_mode { "building" } else { "mining" }
            );
        }
        if let Some(block) = actions.select_slot {
            self.player.selected_block = block;
        }
        if actions.reset_camera {
            self.orbit.command(MoveCommand::Reset);
            self.flat_camera.reset();
        }
    }

    fn apply_pointer_actions_3d(&mut self, actions: &PlayerAction) {
        for command in &actions.camera_moves {
            self.orbit.command(*command);
        }
        if actions.primary_pressed {
            self.orbit.pointer_down(PointerButton::Primary);
        }
        if actions.secondary_pressed {
            self.orbit.pointer_down(PointerButton::Secondary);
        }
        if actions.middle_pressed {
            self.orbit.pointer_down(PointerButton::Middle);
        }
        if actions.any_released {
            self.orbit.pointer_up();
        }
        if let Some((dx, dy)) = actions.pointer_delta {
            self.orbit.pointer_delta(dx as f32, dy as f32);
        }
        if let Some(notches) = actions.wheel {
            self.orbit.wheel(notches);
        }
        if let Some(distance) = actions.pinch_start {
            self.orbit.pinch_start(distance);
        }
        if let Some(distance) = actions.pinch_move {
            self.orbit.pinch_move(distance);
        }
        if actions.touch_ended {
            self.orbit.touch_end();
        }

        // Hover tracking and click picking share one ray per event.
        if let Some((x, y)) = actions.cursor {
            let (width, height) = self.renderer.viewport();
            let ray = Ray::from_pointer(
                x,
                y,
                width as f32,
                height as f32,
                self.renderer.camera_uniform().view_proj_inverse(),
            );
            let target = picking::pick_3d(&self.renderer.pool, &ray);
            self.selection.set_hovered(target, &mut self.renderer.pool);

            if actions.primary_click {
                self.selection.select(target, &mut self.renderer.pool);
                if let Some(PickTarget::Object(id)) = target {
                    if let Some(object) = self.scene.get(id) {
                        self.orbit.focus_on(object.position, None);
                    }
                }
            }
            if actions.secondary_click {
                if let Some(PickTarget::Voxel(coord)) = target {
                    self.mine_block(coord);
                }
            }
        }
    }

    fn apply_pointer_actions_2d(&mut self, actions: &PlayerAction) {
        for command in &actions.camera_moves {
            let (dx, dy) = match command {
                MoveCommand::Left => (-PAN_STEP, 0.0),
                MoveCommand::Right => (PAN_STEP, 0.0),
                MoveCommand::Forward | MoveCommand::Up => (0.0, -PAN_STEP),
                MoveCommand::Backward | MoveCommand::Down => (0.0, PAN_STEP),
                MoveCommand::Reset => {
                    self.flat_camera.reset();
                    continue;
                }
            };
            self.flat_camera.pan(dx, dy);
        }
        if let Some(notches) = actions.wheel {
            // Wheel-away zooms the flat view out, mirroring the 3D sense.
            self.flat_camera.zoom_by_notches(-notches);
        }

        if let Some((x, y)) = actions.cursor {
            self.hovered_block = picking::pick_2d(&self.last_draw_list, x, y);

            if actions.primary_click {
                if let Some(coord) = self.hovered_block {
                    if self.building_mode {
                        // Build interactions stack onto the clicked column.
                        self.place_block(coord + cgmath::Vector3::new(0, 1, 0));
                    } else {
                        self.mine_block(coord);
                    }
                }
            }
            if actions.secondary_click {
                if let Some(coord) = self.hovered_block {
                    self.mine_block(coord);
                }
            }
        }
    }

    /// Places the selected block at `coord`, reporting failures as
    /// non-fatal notifications.
    pub fn place_block(&mut self, coord: Point3<i32>) {
        let block = self.player.selected_block;
        match self
            .world
            .place(&mut self.player, &mut self.statistics, coord, block)
        {
            Ok(()) => {}
            Err(err) => warn!("{}", err),
        }
    }

    /// Mines the block at `coord`, reporting failures as non-fatal
    /// notifications.
    pub fn mine_block(&mut self, coord: Point3<i32>) {
        match self.world.mine(&mut self.player, &mut self.statistics, coord) {
            Ok(_) => {}
            Err(err) => warn!("{}", err),
        }
    }

    /// Creates a scene object and selects it.
    pub fn create_object(&mut self, kind: ObjectKind, position: Point3<f32>) {
        let id = self.scene.create_object(kind, position);
        self.renderer.sync_from_scene(&self.scene);
        self.selection
            .select(Some(PickTarget::Object(id)), &mut self.renderer.pool);
    }

    /// Deletes the selected scene object, if any.
    pub fn delete_selected(&mut self) {
        if let Some(PickTarget::Object(id)) = self.selection.selected() {
            match self.scene.delete_object(id) {
                Ok(()) => self.selection.clear(&mut self.renderer.pool),
                Err(err) => warn!("{}", err),
            }
        }
    }

    /// Applies a manipulation delta to the selected object in the current
    /// mode, snapping to the grid when enabled.
    pub fn manipulate_selected(&mut self, delta: cgmath::Vector3<f32>) {
        if let Some(PickTarget::Object(id)) = self.selection.selected() {
            if let Err(err) = picking::apply_manipulation(
                &mut self.scene,
                id,
                self.manipulation_mode,
                delta,
                self.grid_snap,
            ) {
                warn!("{}", err);
            }
        }
    }

    /// Switches the transform-editing mode.
    pub fn set_manipulation_mode(&mut self, mode: ManipulationMode) {
        self.manipulation_mode = mode;
    }

    /// Enables or disables grid snapping.
    pub fn set_grid_snap(&mut self, grid: Option<f32>) {
        self.grid_snap = grid;
    }

    /// Soft reset: restores the fixed initial terrain, the starting
    /// inventory, and zeroed statistics.
    pub fn reset_world_terrain(&mut self) {
        self.world.fill_terrain();
        self.player.reset_inventory();
        self.statistics.reset();
        self.renderer.sync_from_world(&self.world);
        info!("world reset to initial terrain");
    }

    /// Full reset: clears every block, the starting inventory, and zeroed
    /// statistics.
    pub fn reset_world_empty(&mut self) {
        self.world.clear();
        self.player.reset_inventory();
        self.statistics.reset();
        self.renderer.sync_from_world(&self.world);
        info!("world cleared");
    }

    /// Exports the world snapshot JSON.
    pub fn export_world(&self) -> String {
        persistence::export_world(&self.world, &self.player, &self.statistics)
    }

    /// Imports a world snapshot, leaving all state untouched on failure.
    pub fn import_world(&mut self, json: &str) -> Result<(), persistence::SnapshotError> {
        persistence::import_world(json, &mut self.world, &mut self.player, &mut self.statistics)?;
        self.selection.clear(&mut self.renderer.pool);
        self.renderer.sync_from_world(&self.world);
        Ok(())
    }

    /// Exports the scene snapshot JSON.
    ///
    /// # Arguments
    /// * `name` - Scene name for the metadata block
    /// * `created` - ISO-8601 creation timestamp
    pub fn export_scene(&self, name: &str, created: &str) -> String {
        persistence::export_scene(&self.scene, &self.orbit.camera, name, created)
    }

    /// Imports a scene snapshot, clearing the registry wholesale on
    /// success and leaving all state untouched on failure.
    pub fn import_scene(&mut self, json: &str) -> Result<(), persistence::SnapshotError> {
        persistence::import_scene(json, &mut self.scene, &mut self.orbit)?;
        self.selection.clear(&mut self.renderer.pool);
        self.renderer.sync_from_scene(&self.scene);
        Ok(())
    }

    /// Assigns a designed texture as the fill pattern for a block type and
    /// registers its derived color as the block's material.
    pub fn assign_block_texture(&mut self, block: BlockType, texture_name: &str) {
        let Some(texture) = self.texture_library.get(texture_name) else {
            warn!("no designed texture named '{}'", texture_name);
            return;
        };
        let average = texture.grid.average_color();
        self.renderer.materials_mut().insert(
            block.tag(),
            [
                average[0] as f32 / 255.0,
                average[1] as f32 / 255.0,
                average[2] as f32 / 255.0,
                average[3] as f32 / 255.0,
            ],
        );
        self.texture_overrides
            .insert(block, texture_name.to_string());
    }

    /// Applies new graphics settings and persists the blob.
    pub fn apply_settings(&mut self, mut settings: GraphicsSettings) {
        if settings.render_mode == RenderMode::ThreeD && !self.renderer.supports_3d() {
            warn!("3D mode unavailable, staying in the 2D view");
            settings.render_mode = RenderMode::TwoD;
        }
        self.renderer.set_lighting_quality(settings.lighting_quality);
        if let Err(err) = self.settings_store.save(&settings) {
            warn!("could not persist graphics settings: {}", err);
        }
        self.settings = settings;
    }

    /// Handles window resize.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
        self.renderer.resize_surface(width, height);
    }

    /// Renders one frame and feeds the performance sampler.
    pub fn render(&mut self) {
        self.monitor.record_frame();

        let mode = self.effective_render_mode();
        if mode == RenderMode::TwoD {
            let overrides = self.block_color_overrides();
            self.last_draw_list = isometric::build_draw_list(
                &self.world,
                &self.player,
                &self.flat_camera,
                self.hovered_block,
                &overrides,
            );
        } else {
            self.renderer.update_camera(&self.orbit.camera, &self.projection);
            self.last_draw_list.clear();
        }

        self.renderer.render(mode, &self.last_draw_list);
        self.monitor
            .record_render(self.renderer.last_draw_calls(), self.renderer.pool.len());

        if let Some(spike) = self.monitor.detect_spike() {
            debug!(
                "frame spike: {:.1}ms against a {:.1}ms average",
                spike.frame_time_ms, spike.average_ms
            );
        }
    }

    /// Tears down the renderer, releasing every GPU resource.
    pub fn dispose(&mut self) {
        self.renderer.dispose();
    }

    fn block_color_overrides(&self) -> std::collections::HashMap<BlockType, [u8; 4]> {
        self.texture_overrides
            .iter()
            .filter_map(|(block, name)| {
                self.texture_library
                    .get(name)
                    .map(|texture| (*block, texture.grid.average_color()))
            })
            .collect()
    }
}

/// Input commands derived for one frame.
///
/// Built by the input layer from the raw event stream and consumed by
/// `process_input`; the engine, not the event handlers, owns all transition
/// logic.
#[derive(Debug, Default)]
pub struct PlayerAction {
    /// Keyboard camera commands held or pressed this frame.
    pub camera_moves: Vec<MoveCommand>,
    /// Primary button went down this frame.
    pub primary_pressed: bool,
    /// Secondary button went down this frame.
    pub secondary_pressed: bool,
    /// Middle button went down this frame.
    pub middle_pressed: bool,
    /// Any pointer button came up this frame.
    pub any_released: bool,
    /// Primary click (press) for place/pick semantics.
    pub primary_click: bool,
    /// Secondary click (press) for mine/context semantics.
    pub secondary_click: bool,
    /// Pointer movement delta this frame.
    pub pointer_delta: Option<(f64, f64)>,
    /// Cursor position in surface pixels.
    pub cursor: Option<(f32, f32)>,
    /// Wheel notches this frame (positive away from the user).
    pub wheel: Option<f32>,
    /// Two-finger gesture began with this inter-finger distance.
    pub pinch_start: Option<f32>,
    /// Two-finger gesture continued with this inter-finger distance.
    pub pinch_move: Option<f32>,
    /// A touch ended this frame.
    pub touch_ended: bool,
    /// Camera reset requested.
    pub reset_camera: bool,
    /// Undo requested.
    pub undo: bool,
    /// Redo requested.
    pub redo: bool,
    /// Build/mine mode toggle requested.
    pub toggle_build_mode: bool,
    /// Inventory slot selection.
    pub select_slot: Option<BlockType>,
}
