//! # Garage Renderer
//!
//! Car-in-a-garage demo renderer with dynamic cube-mapped shadows and
//! reflections.
//!
//! ## Features
//!
//! - **Binary model cache**: `.model` files converted once from OBJ and
//!   loaded without text parsing
//! - **Composite models**: a root transform with independently transformed
//!   sub-objects, deep-copyable
//! - **Frame pipeline**: shadow cube map, reflection cube map, forward
//!   opaque pass and sorted transparent pass
//! - **Headless backend**: records every device command for tests and
//!   display-less runs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use garage_renderer::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DemoConfig::load_or_default("garage.toml")?;
//!     let mut window = HeadlessWindow::new(1280, 720, 1.0 / 60.0).with_idle_frames(120);
//!     let frames = launch(&config, HeadlessDevice::new().without_recording(), &mut window)?;
//!     println!("rendered {frames} frames");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod app;
pub mod assets;
pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        app::{launch, run, AppError, FrameInput, GarageDemo, HeadlessWindow, Key, WindowBackend},
        assets::{convert, load_model, load_model_or_log, ModelFile, ModelFormatError},
        config::{Config, DemoConfig},
        foundation::math::{Mat4, Transform, Vec3},
        render::{
            backends::HeadlessDevice, FramePipeline, FrameStats, GraphicsDevice, RenderContext, RenderError,
            RenderMode, SceneView,
        },
        scene::{CompositeModel, OrbitCamera, PointLight, StageLights},
    };
}
