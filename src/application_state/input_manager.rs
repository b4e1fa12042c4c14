//! # Input Manager
//!
//! This module handles raw input intake for the application:
//! - Keyboard key state tracking
//! - Mouse button, wheel, and cursor tracking
//! - Touch tracking, with single-touch drags synthesized into pointer
//!   input and two-finger gestures reported as pinch distances
//!
//! The manager only records state; every behavioral decision lives in the
//! engine's single input state machine.

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{MouseInput, ProcessedInputState, RawInputState};

const KEY_CODES: [KeyCode; 16] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::KeyQ,
    KeyCode::KeyE,
    KeyCode::KeyR,
    KeyCode::KeyZ,
    KeyCode::KeyY,
    KeyCode::KeyB,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
];

/// Manages the state of all input devices and processes input events.
pub struct InputManager {
    /// Previous state of all tracked keyboard keys
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,

    /// Current state of mouse inputs
    pub mouse_inputs: MouseInput,

    /// Active touches by finger id, with their latest positions
    touches: HashMap<u64, (f32, f32)>,
    /// Pinch distance reported at gesture start this frame
    pinch_started: Option<f32>,
    /// Pinch distance reported on gesture movement this frame
    pinch_moved: Option<f32>,
    /// A touch ended this frame
    touch_ended: bool,
}

impl InputManager {
    /// Creates a new InputManager with every tracked input released.
    pub fn new() -> Self {
        let mut keyboard_inputs_old = HashMap::new();
        let mut keyboard_inputs_new = HashMap::new();
        for key_code in KEY_CODES {
            keyboard_inputs_old.insert(key_code, false);
            keyboard_inputs_new.insert(key_code, false);
        }

        let mouse_buttons = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

        let mut mouse_button_inputs_old = HashMap::new();
        let mut mouse_button_inputs_new = HashMap::new();
        for button in mouse_buttons {
            mouse_button_inputs_old.insert(button, false);
            mouse_button_inputs_new.insert(button, false);
        }

        let mouse_inputs = MouseInput {
            mouse_button_inputs_old,
            mouse_button_inputs_new,
            wheel_notches: None,
            mouse_delta: None,
            cursor_position: None,
        };

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
            mouse_inputs,
            touches: HashMap::new(),
            pinch_started: None,
            pinch_moved: None,
            touch_ended: false,
        }
    }

    /// Updates the old state with the current state for the next frame's
    /// transition derivation.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }

        for (button, new_state) in self.mouse_inputs.mouse_button_inputs_new.iter() {
            if let Some(old_state) = self.mouse_inputs.mouse_button_inputs_old.get_mut(button) {
                *old_state = *new_state;
            }
        }
    }

    /// Processes a window event and updates internal input state.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => {
                if let Some(key_state) = self.keyboard_inputs_new.get_mut(key) {
                    *key_state = *state == ElementState::Pressed;
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(position) => -(position.y as f32) / 40.0,
                };
                *self.mouse_inputs.wheel_notches.get_or_insert(0.0) += notches;
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button_state) = self.mouse_inputs.mouse_button_inputs_new.get_mut(button)
                {
                    *button_state = *state == ElementState::Pressed;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_inputs.cursor_position = Some((position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_inputs.cursor_position = None;
            }
            WindowEvent::Touch(touch) => self.intake_touch(touch),
            _ => {}
        }
    }

    /// Updates the pointer movement delta from raw device motion.
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        self.mouse_inputs.mouse_delta = Some(delta);
    }

    fn intake_touch(&mut self, touch: &Touch) {
        let position = (touch.location.x as f32, touch.location.y as f32);
        match touch.phase {
            TouchPhase::Started => {
                self.touches.insert(touch.id, position);
                match self.touches.len() {
                    // Single-finger drags act as the primary pointer.
                    1 => {
                        if let Some(pressed) = self
                            .mouse_inputs
                            .mouse_button_inputs_new
                            .get_mut(&MouseButton::Left)
                        {
                            *pressed = true;
                        }
                        self.mouse_inputs.cursor_position = Some(position);
                    }
                    2 => self.pinch_started = Some(self.pinch_distance()),
                    _ => {}
                }
            }
            TouchPhase::Moved => {
                let previous = self.touches.insert(touch.id, position);
                match self.touches.len() {
                    1 => {
                        if let Some((prev_x, prev_y)) = previous {
                            let delta = (
                                (position.0 - prev_x) as f64,
                                (position.1 - prev_y) as f64,
                            );
                            self.mouse_inputs.mouse_delta = Some(delta);
                        }
                        self.mouse_inputs.cursor_position = Some(position);
                    }
                    2 => self.pinch_moved = Some(self.pinch_distance()),
                    _ => {}
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.remove(&touch.id);
                self.touch_ended = true;
                if let Some(pressed) = self
                    .mouse_inputs
                    .mouse_button_inputs_new
                    .get_mut(&MouseButton::Left)
                {
                    *pressed = false;
                }
            }
        }
    }

    fn pinch_distance(&self) -> f32 {
        let mut positions = self.touches.values();
        match (positions.next(), positions.next()) {
            (Some(a), Some(b)) => ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt(),
            _ => 0.0,
        }
    }

    /// Creates the processed input state from the current raw states.
    pub fn create_processed_input_state(&mut self) -> ProcessedInputState {
        let mut keyboard_states = HashMap::new();
        let mut mouse_button_states = HashMap::new();

        for (key, &new_state) in self.keyboard_inputs_new.iter() {
            let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
            keyboard_states.insert(*key, RawInputState::from_raw_states(old_state, new_state));
        }

        for (button, &new_state) in self.mouse_inputs.mouse_button_inputs_new.iter() {
            let old_state = self
                .mouse_inputs
                .mouse_button_inputs_old
                .get(button)
                .copied()
                .unwrap_or(false);
            mouse_button_states.insert(*button, RawInputState::from_raw_states(old_state, new_state));
        }

        ProcessedInputState {
            keyboard_states,
            mouse_button_states,
            mouse_delta: self.mouse_inputs.mouse_delta,
            cursor_position: self.mouse_inputs.cursor_position,
            wheel_notches: self.mouse_inputs.wheel_notches,
            pinch_started: self.pinch_started,
            pinch_moved: self.pinch_moved,
            touch_ended: self.touch_ended,
        }
    }

    /// Returns the processed input state and resets per-frame deltas.
    pub fn get_and_reset_processed_input(&mut self) -> Option<ProcessedInputState> {
        let processed_input = Some(self.create_processed_input_state());
        self.reset_inputs();
        processed_input
    }

    /// Advances transition tracking and clears per-frame accumulators.
    ///
    /// Also called when the window loses focus to prevent stuck keys.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();
        self.mouse_inputs.wheel_notches = None;
        self.mouse_inputs.mouse_delta = None;
        self.pinch_started = None;
        self.pinch_moved = None;
        self.touch_ended = false;
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
