//! Per-frame input snapshot

use crate::foundation::math::Vec2;

/// Keys the demo reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Quit
    Escape,
    /// Cycle the render mode
    F3,
    /// Toggle fullscreen
    F,
}

/// Everything the window reported since the previous frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor movement in pixels
    pub mouse_delta: Vec2,
    /// Wheel notches, positive away from the user
    pub wheel_delta: f32,
    /// Left mouse button held
    pub left_button: bool,
    /// Keys pressed this frame, in order
    pub keys_pressed: Vec<Key>,
    /// Current framebuffer size in pixels
    pub framebuffer_size: (u32, u32),
    /// The window is being closed
    pub close_requested: bool,
}

impl FrameInput {
    /// No input on a framebuffer of the given size
    pub fn idle(framebuffer_size: (u32, u32)) -> Self {
        Self {
            framebuffer_size,
            ..Self::default()
        }
    }

    /// Builder: press `key`
    pub fn with_key(mut self, key: Key) -> Self {
        self.keys_pressed.push(key);
        self
    }

    /// Builder: drag with the left button held
    pub fn with_drag(mut self, dx: f32, dy: f32) -> Self {
        self.mouse_delta = Vec2::new(dx, dy);
        self.left_button = true;
        self
    }

    /// Builder: scroll the wheel
    pub fn with_wheel(mut self, notches: f32) -> Self {
        self.wheel_delta = notches;
        self
    }

    /// Whether `key` was pressed this frame
    pub fn pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }
}
