//! Input handling for the simulation.
//!
//! This module provides a platform-independent snapshot of one frame of
//! input: movement axes, the set of keys that went down this frame, mouse
//! state, and edge-triggered actions. The embedding layer (window/engine)
//! fills one [`Input`] per frame and hands it to the simulation.

use clockout_common::Vec2;
use serde::{Deserialize, Serialize};

/// Key codes for keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// 0 key
    Num0,
    /// 1 key
    Num1,
    /// 2 key
    Num2,
    /// 3 key
    Num3,
    /// 4 key
    Num4,
    /// 5 key
    Num5,
    /// 6 key
    Num6,
    /// 7 key
    Num7,
    /// 8 key
    Num8,
    /// 9 key
    Num9,
    /// Space bar
    Space,
    /// Enter/Return
    Enter,
    /// Escape
    Escape,
    /// Tab
    Tab,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

impl KeyCode {
    /// Human-readable name of the key, suitable for embedding in prompts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            KeyCode::A => "A",
            KeyCode::B => "B",
            KeyCode::C => "C",
            KeyCode::D => "D",
            KeyCode::E => "E",
            KeyCode::F => "F",
            KeyCode::G => "G",
            KeyCode::H => "H",
            KeyCode::I => "I",
            KeyCode::J => "J",
            KeyCode::K => "K",
            KeyCode::L => "L",
            KeyCode::M => "M",
            KeyCode::N => "N",
            KeyCode::O => "O",
            KeyCode::P => "P",
            KeyCode::Q => "Q",
            KeyCode::R => "R",
            KeyCode::S => "S",
            KeyCode::T => "T",
            KeyCode::U => "U",
            KeyCode::V => "V",
            KeyCode::W => "W",
            KeyCode::X => "X",
            KeyCode::Y => "Y",
            KeyCode::Z => "Z",
            KeyCode::Num0 => "0",
            KeyCode::Num1 => "1",
            KeyCode::Num2 => "2",
            KeyCode::Num3 => "3",
            KeyCode::Num4 => "4",
            KeyCode::Num5 => "5",
            KeyCode::Num6 => "6",
            KeyCode::Num7 => "7",
            KeyCode::Num8 => "8",
            KeyCode::Num9 => "9",
            KeyCode::Space => "Space",
            KeyCode::Enter => "Enter",
            KeyCode::Escape => "Escape",
            KeyCode::Tab => "Tab",
            KeyCode::Up => "Up",
            KeyCode::Down => "Down",
            KeyCode::Left => "Left",
            KeyCode::Right => "Right",
        }
    }
}

/// Mouse button codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button (scroll wheel click)
    Middle,
}

/// State of a button (pressed, just pressed, released).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    /// Whether the button is currently held down
    pub pressed: bool,
    /// Whether the button was just pressed this frame
    pub just_pressed: bool,
    /// Whether the button was just released this frame
    pub just_released: bool,
}

impl ButtonState {
    /// Create a new button state (not pressed).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pressed: false,
            just_pressed: false,
            just_released: false,
        }
    }

    /// Update the button state based on whether it's currently pressed.
    pub fn update(&mut self, is_pressed: bool) {
        self.just_pressed = is_pressed && !self.pressed;
        self.just_released = !is_pressed && self.pressed;
        self.pressed = is_pressed;
    }

    /// Clear the frame-specific state (just_pressed, just_released).
    pub fn clear_frame(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }
}

/// Processed input state for one simulation frame.
#[derive(Debug, Clone, Default)]
pub struct Input {
    /// Movement direction (-1 to 1 on each axis)
    pub movement: Vec2,
    /// Keys that went down this frame
    keys_just_pressed: Vec<KeyCode>,
    /// Primary action (left click) was just pressed this frame
    pub primary_just_pressed: bool,
    /// Pause key (Escape) was just pressed this frame
    pub pause_just_pressed: bool,
    /// Mouse position in screen coordinates
    pub mouse_screen_pos: Vec2,
    /// Mouse position in world coordinates
    pub mouse_world_pos: Vec2,
}

impl Input {
    /// Create an empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mouse button going down this frame.
    pub fn press_button(&mut self, button: MouseButton) {
        if button == MouseButton::Left {
            self.primary_just_pressed = true;
        }
    }

    /// Record a key going down this frame.
    pub fn press_key(&mut self, key: KeyCode) {
        if !self.keys_just_pressed.contains(&key) {
            self.keys_just_pressed.push(key);
        }
        if key == KeyCode::Escape {
            self.pause_just_pressed = true;
        }
    }

    /// Check if a specific key went down this frame.
    #[must_use]
    pub fn key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    /// Check if any key at all went down this frame.
    #[must_use]
    pub fn any_key_just_pressed(&self) -> bool {
        !self.keys_just_pressed.is_empty()
    }

    /// Keys that went down this frame.
    #[must_use]
    pub fn keys_just_pressed(&self) -> &[KeyCode] {
        &self.keys_just_pressed
    }

    /// Check if any movement input is active.
    #[must_use]
    pub fn has_movement(&self) -> bool {
        self.movement.x != 0.0 || self.movement.y != 0.0
    }

    /// Returns the movement direction, normalized so diagonals aren't faster.
    #[must_use]
    pub fn move_direction(&self) -> Vec2 {
        self.movement.normalized()
    }
}
