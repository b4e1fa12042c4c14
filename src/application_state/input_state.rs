//! # Input State
//!
//! This module defines the input state types used by the input manager.
//! It provides enums and structs for representing the state of input
//! devices, including the per-frame transition states the engine's action
//! translation consumes.

use std::collections::HashMap;
use winit::{event::MouseButton, keyboard::KeyCode};

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed this frame
    Pressed,
    /// Key/button has been held down for multiple frames
    Held,
    /// Key/button was just released this frame
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Determines if the input was just pressed this frame
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Determines if the input was just released this frame
    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
    }

    /// Derives the transition state from the previous and current raw
    /// pressed flags.
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of the processed input states for one frame.
pub struct ProcessedInputState {
    /// Transition state of all tracked keyboard keys
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// Transition state of the mouse buttons
    pub mouse_button_states: HashMap<MouseButton, RawInputState>,

    /// Pointer movement delta since the last frame (x, y)
    pub mouse_delta: Option<(f64, f64)>,

    /// Cursor position in surface pixels, if the cursor is over the window
    pub cursor_position: Option<(f32, f32)>,

    /// Wheel notches this frame; positive zooms out
    pub wheel_notches: Option<f32>,

    /// A two-finger gesture began with this inter-finger distance
    pub pinch_started: Option<f32>,

    /// A two-finger gesture continued with this inter-finger distance
    pub pinch_moved: Option<f32>,

    /// A touch ended this frame
    pub touch_ended: bool,
}

impl ProcessedInputState {
    /// Gets the transition state of a keyboard key.
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// Gets the transition state of a mouse button.
    pub fn get_mouse_button_state(&self, button: MouseButton) -> RawInputState {
        self.mouse_button_states
            .get(&button)
            .copied()
            .unwrap_or_default()
    }
}

/// Tracks the raw state of mouse inputs between frames.
pub struct MouseInput {
    /// Previous pressed flag of each mouse button
    pub mouse_button_inputs_old: HashMap<MouseButton, bool>,
    /// Current pressed flag of each mouse button
    pub mouse_button_inputs_new: HashMap<MouseButton, bool>,

    /// Accumulated wheel notches since the last frame
    pub wheel_notches: Option<f32>,

    /// Pointer movement delta since the last frame (x, y)
    pub mouse_delta: Option<(f64, f64)>,

    /// Cursor position in surface pixels
    pub cursor_position: Option<(f32, f32)>,
}
