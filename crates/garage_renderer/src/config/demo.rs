//! # Demo Configuration
//!
//! Configuration tree for the garage demo. Every value defaults to the
//! constants the demo was tuned with, so an empty or partial file is valid.
//!
//! ```toml
//! log_level = "debug"
//!
//! [render]
//! shadow_map_resolution = 1024
//!
//! [camera]
//! distance = 12.0
//! ```

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::constants::PI;

/// Initial window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial framebuffer width
    pub width: u32,
    /// Initial framebuffer height
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Car Demo".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Frame pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Edge length of each shadow cube map face
    pub shadow_map_resolution: u32,
    /// Edge length of each reflection cube map face
    pub reflection_map_resolution: u32,
    /// Near plane of the cube map projections
    pub near_plane: f32,
    /// Far plane of the cube map projections (also the shadow depth range)
    pub far_plane: f32,
    /// Vertical field of view of the forward camera in degrees
    pub field_of_view_degrees: f32,
    /// Near plane of the forward camera
    pub forward_near_plane: f32,
    /// Far plane of the forward camera
    pub forward_far_plane: f32,
    /// Materials with alpha above this value are drawn as opaque
    pub opacity_cutoff: f32,
    /// How strongly the car reflects the reflection probe
    pub reflection_strength: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shadow_map_resolution: 512,
            reflection_map_resolution: 256,
            near_plane: 0.01,
            far_plane: 100.0,
            field_of_view_degrees: 60.0,
            forward_near_plane: 0.001,
            forward_far_plane: 1000.0,
            opacity_cutoff: 0.95,
            reflection_strength: 0.2,
        }
    }
}

/// Orbit camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial distance from the origin
    pub distance: f32,
    /// Initial pitch in radians
    pub pitch: f32,
    /// Initial yaw in radians
    pub yaw: f32,
    /// Closest allowed distance
    pub min_distance: f32,
    /// Farthest allowed distance
    pub max_distance: f32,
    /// Distance change per wheel notch per second
    pub zoom_speed: f32,
    /// Radians per pixel of mouse drag
    pub rotate_speed: f32,
    /// Lowest allowed pitch in radians
    pub min_pitch: f32,
    /// Highest allowed pitch in radians
    pub max_pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 10.0,
            pitch: 45.0_f32.to_radians(),
            yaw: 180.0_f32.to_radians(),
            min_distance: 8.0,
            max_distance: 20.0,
            zoom_speed: 20.0,
            rotate_speed: 0.01,
            min_pitch: 0.05,
            max_pitch: 0.499 * PI,
        }
    }
}

/// Asset locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Binary car model
    pub car_model: String,
    /// Binary stage light model (optional in the scene)
    pub stage_light_model: Option<String>,
    /// Directory containing the GLSL shaders
    pub shader_dir: String,
    /// Garage wall diffuse texture
    pub wall_diffuse: String,
    /// Garage wall normal map
    pub wall_normal: String,
    /// Garage floor/ceiling diffuse texture
    pub floor_diffuse: String,
    /// Garage floor/ceiling normal map
    pub floor_normal: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            car_model: "assets/models/car.model".to_string(),
            stage_light_model: Some("assets/models/stage-light.model".to_string()),
            shader_dir: "assets/shaders".to_string(),
            wall_diffuse: "assets/textures/brick-diffuse.png".to_string(),
            wall_normal: "assets/textures/brick-norm.png".to_string(),
            floor_diffuse: "assets/textures/concrete-diffuse.png".to_string(),
            floor_normal: "assets/textures/concrete-norm.png".to_string(),
        }
    }
}

/// # Demo Configuration
///
/// Root of the configuration tree loaded by the demo binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Fallback log level when `RUST_LOG` is not set
    pub log_level: String,
    /// Window settings
    pub window: WindowConfig,
    /// Frame pipeline settings
    pub render: RenderConfig,
    /// Orbit camera settings
    pub camera: CameraConfig,
    /// Asset locations
    pub assets: AssetConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl Config for DemoConfig {}

impl DemoConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let render = &self.render;
        if render.shadow_map_resolution == 0 || render.reflection_map_resolution == 0 {
            return Err(ConfigError::Invalid("cube map resolutions must be non-zero".to_string()));
        }
        if render.near_plane <= 0.0 || render.far_plane <= render.near_plane {
            return Err(ConfigError::Invalid(format!(
                "cube map planes must satisfy 0 < near < far (got {} / {})",
                render.near_plane, render.far_plane
            )));
        }
        if render.forward_near_plane <= 0.0 || render.forward_far_plane <= render.forward_near_plane {
            return Err(ConfigError::Invalid(format!(
                "forward planes must satisfy 0 < near < far (got {} / {})",
                render.forward_near_plane, render.forward_far_plane
            )));
        }
        if !(0.0..=1.0).contains(&render.opacity_cutoff) {
            return Err(ConfigError::Invalid("opacity cutoff must be within [0, 1]".to_string()));
        }

        let camera = &self.camera;
        if camera.min_distance <= 0.0 || camera.max_distance < camera.min_distance {
            return Err(ConfigError::Invalid("camera distance clamp is inverted".to_string()));
        }
        if camera.max_pitch < camera.min_pitch {
            return Err(ConfigError::Invalid("camera pitch clamp is inverted".to_string()));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".to_string()));
        }

        Ok(())
    }
}
