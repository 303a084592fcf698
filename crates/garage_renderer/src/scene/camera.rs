//! Orbit camera
//!
//! The camera circles the origin. Its position is `(0, 0, -distance)`
//! rotated by `pitch` around X and then by `yaw` around Y, and it always
//! looks back at the origin.

use crate::config::CameraConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec2, Vec3};

/// Spherical-coordinate camera around the origin
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    distance: f32,
    pitch: f32,
    yaw: f32,
    settings: CameraConfig,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl OrbitCamera {
    /// Create a camera at the configured initial distance and angles
    pub fn new(settings: CameraConfig) -> Self {
        Self {
            distance: settings.distance,
            pitch: settings.pitch,
            yaw: settings.yaw,
            settings,
        }
    }

    /// Current distance from the origin
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Current pitch in radians
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Current yaw in radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Move closer or further by `wheel_delta` notches, clamped to the allowed range
    pub fn zoom(&mut self, wheel_delta: f32, delta_time: f32) {
        self.distance = (self.distance - self.settings.zoom_speed * delta_time * wheel_delta)
            .clamp(self.settings.min_distance, self.settings.max_distance);
    }

    /// Orbit by a mouse drag of `drag` pixels
    ///
    /// Vertical motion changes pitch (clamped so the camera stays above the
    /// floor and never flips over the pole); horizontal motion changes yaw.
    pub fn rotate(&mut self, drag: Vec2) {
        self.pitch = (self.pitch + self.settings.rotate_speed * drag.y)
            .clamp(self.settings.min_pitch, self.settings.max_pitch);
        self.yaw += self.settings.rotate_speed * drag.x;
    }

    /// World-space eye position
    pub fn position(&self) -> Vec3 {
        let eye = Vec3::new(0.0, 0.0, -self.distance);
        let eye = utils::rotate_vector(eye, Vec3::x(), self.pitch);
        utils::rotate_vector(eye, Vec3::y(), self.yaw)
    }

    /// Unit viewing direction, towards the origin
    pub fn direction(&self) -> Vec3 {
        (-self.position()).normalize()
    }

    /// View matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_along(self.position(), self.direction(), Vec3::y())
    }

    /// View-projection matrix for a viewport of the given aspect ratio
    pub fn view_projection(&self, fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective(fov_y, aspect, near, far) * self.view_matrix()
    }
}
