//! Animated point light

use crate::foundation::math::Vec3;

/// The scene's single shadow-casting point light
///
/// Circles the garage on an ellipse while bobbing slowly up and down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Current world-space position
    pub position: Vec3,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 0.0),
        }
    }
}

impl PointLight {
    /// Move the light to its position at time `t` seconds
    pub fn animate(&mut self, t: f32) {
        self.position = Vec3::new(8.0 * t.cos(), 10.0 + 2.0 * (0.2 * t).cos(), 10.0 * t.sin());
    }
}
