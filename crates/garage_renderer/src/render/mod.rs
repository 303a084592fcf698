//! Rendering system
//!
//! Backend-agnostic frame pipeline for the garage scene:
//!
//! 1. Six depth-only faces rendered from the light into the shadow probe
//! 2. Six color faces rendered from the car centre into the reflection probe
//! 3. Forward pass: static geometry, opaque sub-objects, then transparent
//!    sub-objects sorted back to front
//!
//! The pipeline issues commands through [`GraphicsDevice`]; the
//! [`backends::HeadlessDevice`] implementation records them in memory.

pub mod backends;
pub mod context;
pub mod device;
pub mod light_probe;
pub mod pipeline;
pub mod transparency;

pub use context::RenderContext;
pub use device::{
    acquire_or_null, BlendMode, BufferHandle, ClearFlags, CubeFace, CubeMapFormat, CubeMapHandle,
    DrawUniforms, FrameUniforms, FramebufferHandle, GraphicsDevice, Material, MeshHandle,
    PolygonMode, RenderTarget, ShaderHandle, Vertex,
};
pub use light_probe::LightProbe;
pub use pipeline::{FramePipeline, FrameStats, PassStats, RenderMode, SceneView};
pub use transparency::{TransparentEntry, TransparentQueue};

use thiserror::Error;

/// Result type for device operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Rendering system errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A GPU resource (buffer, cube map, framebuffer, program) could not be created
    ///
    /// Callers on the frame path turn this into a null handle with
    /// [`acquire_or_null`] and keep running.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// The backend was handed a resource it does not know
    #[error("Backend error: {0}")]
    BackendError(String),

    /// The render configuration is unusable
    #[error("Invalid render configuration: {0}")]
    InvalidConfiguration(String),
}
