//! # Camera State Module
//!
//! This module owns the camera concept for both renderers: the 3D orbit
//! camera with its pointer/touch/keyboard state machine, and the flat
//! pan/zoom camera used by the 2D isometric view.
//!
//! ## State machine
//!
//! All pointer transition logic is centralized in `OrbitController` rather
//! than scattered across event handlers. The controller is fed
//! already-differenced pointer deltas and pinch distances by the input
//! layer; it owns every transition:
//!
//! - primary button down: `Idle -> Orbiting`
//! - secondary/middle button down: `Idle -> Panning`
//! - two-finger touch start: `Idle -> Zooming` (tracks the inter-finger
//!   distance)
//! - pointer up / pointer leave / touch end: `* -> Idle`
//! - wheel events are single-shot zoom deltas and never change state
//! - keyboard move commands are orthogonal to the pointer state and apply
//!   in any state

use cgmath::Point3;
use web_time::Duration;

use camera::{OrbitCamera, DEFAULT_RADIUS};

pub mod camera;
pub mod flat_camera;

/// Scale applied to raw pointer deltas before the speed factors.
const POINTER_SCALE: f32 = 0.01;
/// Scale applied to pinch-distance deltas before the zoom speed factor.
const PINCH_SCALE: f32 = 0.01;
/// Duration of a smoothed focus transition, in seconds.
const FOCUS_DURATION: f32 = 0.6;

/// Default orbit sensitivity.
pub const ROTATE_SPEED: f32 = 1.0;
/// Default pan sensitivity.
pub const PAN_SPEED: f32 = 2.0;
/// Default wheel/pinch zoom sensitivity.
pub const ZOOM_SPEED: f32 = 0.1;
/// Distance moved per keyboard nudge.
pub const MOVE_DISTANCE: f32 = 2.0;

/// Which pointer button started an interaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Left mouse button or single-finger touch.
    Primary,
    /// Right mouse button.
    Secondary,
    /// Middle mouse button.
    Middle,
}

/// The pointer interaction state of the controller.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ControllerState {
    /// No pointer interaction in progress.
    Idle,
    /// Primary-button drag orbiting the camera.
    Orbiting,
    /// Secondary/middle-button drag panning the target.
    Panning,
    /// Two-finger pinch zoom; carries the last observed inter-finger
    /// distance in pixels.
    Zooming {
        /// The inter-finger distance at the previous pinch sample.
        last_pinch_distance: f32,
    },
}

/// Keyboard camera commands, always available regardless of pointer state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveCommand {
    /// Move the target forward along the view direction.
    Forward,
    /// Move the target backward along the view direction.
    Backward,
    /// Move the target to the left.
    Left,
    /// Move the target to the right.
    Right,
    /// Raise the target.
    Up,
    /// Lower the target.
    Down,
    /// Deterministic reset of target and spherical coordinates.
    Reset,
}

/// A smoothed transition of target and radius toward a new value.
///
/// Each animation carries the generation it was created under; a superseded
/// animation observes the stamp mismatch on its next step and never writes
/// again.
#[derive(Clone, Copy, Debug)]
struct FocusAnimation {
    generation: u64,
    from_target: Point3<f32>,
    to_target: Point3<f32>,
    from_radius: f32,
    to_radius: f32,
    elapsed: f32,
    duration: f32,
}

/// Cubic ease-in-out curve on [0, 1].
fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// The orbit camera controller state machine.
///
/// Translates pointer/touch/keyboard input into spherical-coordinate and
/// pan-target updates on the owned [`OrbitCamera`].
#[derive(Debug)]
pub struct OrbitController {
    /// The camera driven by this controller.
    pub camera: OrbitCamera,
    state: ControllerState,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
    move_distance: f32,
    focus: Option<FocusAnimation>,
    focus_generation: u64,
}

impl OrbitController {
    /// Creates a controller with the default speeds and a camera at the
    /// reset pose.
    pub fn new() -> Self {
        Self {
            camera: OrbitCamera::new(),
            state: ControllerState::Idle,
            rotate_speed: ROTATE_SPEED,
            pan_speed: PAN_SPEED,
            zoom_speed: ZOOM_SPEED,
            move_distance: MOVE_DISTANCE,
            focus: None,
            focus_generation: 0,
        }
    }

    /// The current pointer interaction state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Handles a pointer-button press.
    ///
    /// Primary enters `Orbiting`, secondary/middle enter `Panning`. Presses
    /// during an existing interaction are ignored; the active drag wins.
    pub fn pointer_down(&mut self, button: PointerButton) {
        if self.state != ControllerState::Idle {
            return;
        }
        self.state = match button {
            PointerButton::Primary => ControllerState::Orbiting,
            PointerButton::Secondary | PointerButton::Middle => ControllerState::Panning,
        };
    }

    /// Handles pointer release or the pointer leaving the surface: any
    /// interaction returns to `Idle`.
    pub fn pointer_up(&mut self) {
        self.state = ControllerState::Idle;
    }

    /// Applies a pointer movement delta according to the current state.
    ///
    /// Orbiting rotates the spherical coordinates; panning translates the
    /// look-at target along the camera basis. Idle and pinch states ignore
    /// pointer deltas.
    pub fn pointer_delta(&mut self, delta_x: f32, delta_y: f32) {
        match self.state {
            ControllerState::Orbiting => {
                self.camera.rotate(
                    delta_x * POINTER_SCALE * self.rotate_speed,
                    delta_y * POINTER_SCALE * self.rotate_speed,
                );
            }
            ControllerState::Panning => {
                self.camera.pan(
                    delta_x * POINTER_SCALE * self.pan_speed,
                    delta_y * POINTER_SCALE * self.pan_speed,
                );
            }
            ControllerState::Idle | ControllerState::Zooming { .. } => {}
        }
    }

    /// Applies a single-shot wheel zoom. Does not change state.
    ///
    /// # Arguments
    /// * `notches` - Positive values zoom out, negative zoom in.
    pub fn wheel(&mut self, notches: f32) {
        self.camera.zoom(notches * self.zoom_speed);
    }

    /// Handles a single-finger touch start, which behaves like a
    /// primary-button press.
    pub fn single_touch_start(&mut self) {
        self.pointer_down(PointerButton::Primary);
    }

    /// Handles a two-finger touch start, entering the pinch-zoom state.
    ///
    /// # Arguments
    /// * `distance` - The initial inter-finger distance in pixels.
    pub fn pinch_start(&mut self, distance: f32) {
        self.state = ControllerState::Zooming {
            last_pinch_distance: distance,
        };
    }

    /// Handles a pinch update, zooming by the change in inter-finger
    /// distance since the previous sample.
    pub fn pinch_move(&mut self, distance: f32) {
        if let ControllerState::Zooming { last_pinch_distance } = self.state {
            let delta = last_pinch_distance - distance;
            self.camera.zoom(delta * PINCH_SCALE * self.zoom_speed);
            self.state = ControllerState::Zooming {
                last_pinch_distance: distance,
            };
        }
    }

    /// Handles any touch ending: every touch interaction returns to `Idle`.
    pub fn touch_end(&mut self) {
        self.state = ControllerState::Idle;
    }

    /// Applies a keyboard camera command. Available in every state.
    pub fn command(&mut self, command: MoveCommand) {
        match command {
            MoveCommand::Forward => self.camera.move_forward(self.move_distance),
            MoveCommand::Backward => self.camera.move_forward(-self.move_distance),
            MoveCommand::Left => self.camera.move_right(-self.move_distance),
            MoveCommand::Right => self.camera.move_right(self.move_distance),
            MoveCommand::Up => self.camera.move_up(self.move_distance),
            MoveCommand::Down => self.camera.move_up(-self.move_distance),
            MoveCommand::Reset => self.reset(),
        }
    }

    /// Deterministic reset: target to the origin, spherical coordinates to
    /// (20, pi/4, pi/4). Also drops any in-flight focus animation.
    pub fn reset(&mut self) {
        self.focus = None;
        self.camera.reset();
    }

    /// Starts a smoothed transition of target and radius toward the given
    /// values over a fixed duration.
    ///
    /// A new animation supersedes any in-flight one; the superseded
    /// animation's generation stamp no longer matches and it never applies
    /// another step.
    pub fn focus_on(&mut self, target: Point3<f32>, radius: Option<f32>) {
        self.focus_generation += 1;
        self.focus = Some(FocusAnimation {
            generation: self.focus_generation,
            from_target: self.camera.target,
            to_target: target,
            from_radius: self.camera.radius,
            to_radius: radius.unwrap_or(DEFAULT_RADIUS),
            elapsed: 0.0,
            duration: FOCUS_DURATION,
        });
    }

    /// Advances the in-flight focus animation, if any.
    ///
    /// Called once per tick; a finished animation pins the camera exactly
    /// on its destination and is dropped.
    pub fn update(&mut self, dt: Duration) {
        let Some(mut focus) = self.focus else {
            return;
        };
        if focus.generation != self.focus_generation {
            self.focus = None;
            return;
        }

        focus.elapsed += dt.as_secs_f32();
        let t = (focus.elapsed / focus.duration).min(1.0);
        let eased = ease_in_out_cubic(t);

        self.camera.target = focus.from_target + (focus.to_target - focus.from_target) * eased;
        self.camera
            .set_radius(focus.from_radius + (focus.to_radius - focus.from_radius) * eased);

        self.focus = if t >= 1.0 { None } else { Some(focus) };
    }

    /// Whether a focus animation is currently in flight.
    pub fn is_focusing(&self) -> bool {
        self.focus.is_some()
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{EuclideanSpace, InnerSpace, Point3};

    #[test]
    fn primary_button_orbits_and_release_idles() {
        let mut controller = OrbitController::new();
        controller.pointer_down(PointerButton::Primary);
        assert_eq!(controller.state(), ControllerState::Orbiting);
        controller.pointer_up();
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn secondary_button_pans() {
        let mut controller = OrbitController::new();
        controller.pointer_down(PointerButton::Secondary);
        assert_eq!(controller.state(), ControllerState::Panning);
    }

    #[test]
    fn active_drag_ignores_other_buttons() {
        let mut controller = OrbitController::new();
        controller.pointer_down(PointerButton::Primary);
        controller.pointer_down(PointerButton::Secondary);
        assert_eq!(controller.state(), ControllerState::Orbiting);
    }

    #[test]
    fn pinch_tracks_distance_and_zooms() {
        let mut controller = OrbitController::new();
        let before = controller.camera.radius;
        controller.pinch_start(100.0);
        controller.pinch_move(60.0);
        assert!(controller.camera.radius > before, "fingers closing zooms out");
        controller.touch_end();
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn idle_pointer_deltas_do_nothing() {
        let mut controller = OrbitController::new();
        let before = controller.camera;
        controller.pointer_delta(40.0, -25.0);
        assert_eq!(controller.camera, before);
    }

    #[test]
    fn reset_is_deterministic_after_arbitrary_input() {
        let mut controller = OrbitController::new();
        controller.pointer_down(PointerButton::Primary);
        controller.pointer_delta(123.0, -45.0);
        controller.pointer_up();
        controller.pointer_down(PointerButton::Secondary);
        controller.pointer_delta(-60.0, 80.0);
        controller.pointer_up();
        controller.wheel(3.0);
        controller.command(MoveCommand::Up);

        controller.command(MoveCommand::Reset);
        assert_relative_eq!(controller.camera.radius, camera::DEFAULT_RADIUS);
        assert_relative_eq!(controller.camera.theta, camera::DEFAULT_THETA);
        assert_relative_eq!(controller.camera.phi, camera::DEFAULT_PHI);
        assert_relative_eq!(
            controller.camera.target.to_vec().magnitude(),
            0.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn focus_eases_to_destination_and_finishes() {
        let mut controller = OrbitController::new();
        controller.focus_on(Point3::new(4.0, 0.0, 4.0), Some(10.0));
        assert!(controller.is_focusing());

        for _ in 0..120 {
            controller.update(Duration::from_millis(16));
        }
        assert!(!controller.is_focusing());
        assert_relative_eq!(controller.camera.target.x, 4.0, epsilon = 1e-4);
        assert_relative_eq!(controller.camera.radius, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn new_focus_supersedes_in_flight_one() {
        let mut controller = OrbitController::new();
        controller.focus_on(Point3::new(100.0, 0.0, 0.0), Some(50.0));
        controller.update(Duration::from_millis(100));
        controller.focus_on(Point3::new(0.0, 0.0, 2.0), Some(8.0));

        for _ in 0..120 {
            controller.update(Duration::from_millis(16));
        }
        assert_relative_eq!(controller.camera.target.z, 2.0, epsilon = 1e-4);
        assert_relative_eq!(controller.camera.radius, 8.0, epsilon = 1e-4);
    }
}
