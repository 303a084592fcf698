//! Graphics device abstraction
//!
//! The frame pipeline never talks to a graphics API directly. Everything it
//! needs (buffers, cube maps, framebuffers, programs, draw calls) goes through
//! the [`GraphicsDevice`] trait using opaque handles.
//!
//! Every handle type has a `NULL` value. Creating a resource can fail; the
//! caller logs the failure and carries the null handle forward, and devices
//! treat any use of a null handle as a no-op.

use std::path::Path;

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use super::BackendResult;
use crate::foundation::math::{Mat4, Vec3};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub u64);

        impl $name {
            /// Inert handle returned when acquisition fails
            pub const NULL: Self = Self(0);

            /// Whether this is the null handle
            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

define_handle!(
    /// Handle to a GPU vertex buffer
    BufferHandle
);
define_handle!(
    /// Handle to an index list drawn from a shared vertex buffer
    MeshHandle
);
define_handle!(
    /// Handle to a cube map texture (color or depth)
    CubeMapHandle
);
define_handle!(
    /// Handle to a framebuffer attaching one cube map face
    FramebufferHandle
);
define_handle!(
    /// Handle to a linked shader program
    ShaderHandle
);

/// Vertex layout shared by every mesh
///
/// Only position and normal are stored in `.model` files; the remaining
/// attributes keep their defaults on that path.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in mesh space
    pub position: [f32; 3],
    /// Surface normal
    pub normal: [f32; 3],
    /// Tangent for normal mapping
    pub tangent: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
    /// Vertex color
    pub color: [f32; 4],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: [0.0; 3],
            tangent: [0.0; 3],
            uv: [0.0; 2],
            color: [1.0; 4],
        }
    }
}

impl Vertex {
    /// Create a vertex from position and normal only
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            ..Default::default()
        }
    }

    /// Builder: set tangent and texture coordinates
    pub fn with_surface(mut self, tangent: [f32; 3], uv: [f32; 2]) -> Self {
        self.tangent = tangent;
        self.uv = uv;
        self
    }
}

/// Phong-style material
///
/// Immutable once loaded. Sub-objects refer to materials by index so a
/// material is never duplicated per object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Specular exponent
    pub specular_exponent: f32,
    /// Opacity, 1.0 is fully opaque
    pub alpha: f32,
}

impl Default for Material {
    /// Material assigned to faces that reference no material
    fn default() -> Self {
        Self {
            ambient: Vec3::zeros(),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            specular: Vec3::new(1.0, 1.0, 1.0),
            specular_exponent: 1.0,
            alpha: 1.0,
        }
    }
}

impl Material {
    /// Whether this material is drawn in the opaque passes
    ///
    /// Strictly greater than the cutoff; a material exactly at the cutoff is
    /// treated as transparent.
    pub fn is_opaque(&self, opacity_cutoff: f32) -> bool {
        self.alpha > opacity_cutoff
    }
}

/// One face of a cube map, in the GL face order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// +X
    PositiveX,
    /// -X
    NegativeX,
    /// +Y
    PositiveY,
    /// -Y
    NegativeY,
    /// +Z
    PositiveZ,
    /// -Z
    NegativeZ,
}

impl CubeFace {
    /// All faces in render order
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Face index, 0..6
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction a camera looks along when rendering this face
    pub fn direction(self) -> Vec3 {
        match self {
            CubeFace::PositiveX => Vec3::new(1.0, 0.0, 0.0),
            CubeFace::NegativeX => Vec3::new(-1.0, 0.0, 0.0),
            CubeFace::PositiveY => Vec3::new(0.0, 1.0, 0.0),
            CubeFace::NegativeY => Vec3::new(0.0, -1.0, 0.0),
            CubeFace::PositiveZ => Vec3::new(0.0, 0.0, 1.0),
            CubeFace::NegativeZ => Vec3::new(0.0, 0.0, -1.0),
        }
    }

    /// Up vector matching the cube map face orientation convention
    pub fn up(self) -> Vec3 {
        match self {
            CubeFace::PositiveY => Vec3::new(0.0, 0.0, 1.0),
            CubeFace::NegativeY => Vec3::new(0.0, 0.0, -1.0),
            _ => Vec3::new(0.0, -1.0, 0.0),
        }
    }
}

/// Storage format of a cube map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeMapFormat {
    /// RGB color
    Color,
    /// Depth component, sampled with comparison for shadows
    Depth,
}

/// Where draws land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// The window's default framebuffer
    Window,
    /// An offscreen framebuffer; a null handle makes draws inert
    Framebuffer(FramebufferHandle),
}

bitflags! {
    /// Buffers to clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Color buffer
        const COLOR = 1 << 0;
        /// Depth buffer
        const DEPTH = 1 << 1;
    }
}

/// Blend state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// No blending
    #[default]
    Disabled,
    /// `src * alpha + dst * (1 - alpha)`
    Alpha,
}

/// Rasterization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    /// Filled triangles
    #[default]
    Fill,
    /// Triangle edges only
    Line,
}

/// Uniforms shared by every draw in a pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Combined view-projection matrix
    pub view_projection: Mat4,
    /// Eye position (camera or probe origin)
    pub eye_position: Vec3,
    /// Eye viewing direction
    pub eye_direction: Vec3,
    /// Point light position
    pub light_position: Vec3,
    /// Depth range of the shadow cube map
    pub shadow_far_plane: f32,
    /// How strongly reflective surfaces mix in the reflection probe
    pub reflection_strength: f32,
    /// Whether the shadow map is sampled
    pub shadows_enabled: bool,
}

impl FrameUniforms {
    /// Uniforms for a pass with the given view-projection and no lighting extras
    pub fn new(view_projection: Mat4, eye_position: Vec3, eye_direction: Vec3) -> Self {
        Self {
            view_projection,
            eye_position,
            eye_direction,
            light_position: Vec3::zeros(),
            shadow_far_plane: 0.0,
            reflection_strength: 0.0,
            shadows_enabled: false,
        }
    }

    /// Builder: set point light parameters
    pub fn with_light(mut self, light_position: Vec3, shadow_far_plane: f32) -> Self {
        self.light_position = light_position;
        self.shadow_far_plane = shadow_far_plane;
        self
    }

    /// Builder: set reflection strength
    pub fn with_reflection_strength(mut self, strength: f32) -> Self {
        self.reflection_strength = strength;
        self
    }

    /// Builder: enable shadow map sampling
    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.shadows_enabled = enabled;
        self
    }
}

/// Per-draw uniforms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    /// Model (world) matrix
    pub model: Mat4,
    /// Model-view-projection matrix
    pub model_view_projection: Mat4,
    /// Material of the drawn mesh
    pub material: Material,
    /// Output normals instead of shading
    pub show_normals: bool,
}

/// Graphics resource and command interface
///
/// State-setting and draw calls are infallible: a device ignores commands that
/// reference null handles or are issued while a null framebuffer is bound.
pub trait GraphicsDevice {
    /// Upload a vertex buffer
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> BackendResult<BufferHandle>;

    /// Create an indexed mesh drawing from an existing vertex buffer
    fn create_mesh(&mut self, vertex_buffer: BufferHandle, indices: &[u32]) -> BackendResult<MeshHandle>;

    /// Create an empty cube map with square faces of `resolution` texels
    fn create_cube_map(&mut self, resolution: u32, format: CubeMapFormat) -> BackendResult<CubeMapHandle>;

    /// Load a color cube map from six images, in [`CubeFace::ALL`] order
    fn load_cube_map(&mut self, faces: [&Path; 6]) -> BackendResult<CubeMapHandle>;

    /// Create a framebuffer attaching `face` of the given cube maps
    ///
    /// Either attachment may be null (depth-only shadow framebuffers have no color).
    fn create_framebuffer(
        &mut self,
        face: CubeFace,
        color: CubeMapHandle,
        depth: CubeMapHandle,
    ) -> BackendResult<FramebufferHandle>;

    /// Compile and link a program from vertex and fragment sources
    fn load_shader(&mut self, vertex_path: &Path, fragment_path: &Path) -> BackendResult<ShaderHandle>;

    /// Route subsequent draws to `target`
    fn bind_target(&mut self, target: RenderTarget);

    /// Set the viewport size in pixels
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear the bound target
    fn clear(&mut self, flags: ClearFlags);

    /// Enable or disable depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Set the blend state
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Set the rasterization mode
    fn set_polygon_mode(&mut self, mode: PolygonMode);

    /// Make `program` current
    fn use_program(&mut self, program: ShaderHandle);

    /// Upload per-pass uniforms to the current program
    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms);

    /// Bind a cube map to a texture slot of the current program
    fn bind_cube_map(&mut self, slot: u32, cube_map: CubeMapHandle);

    /// Draw `mesh` with the current program and target
    fn draw_mesh(&mut self, mesh: MeshHandle, uniforms: &DrawUniforms);

    /// Present the window's framebuffer
    fn present(&mut self);
}

/// Unwrap a resource acquisition, logging and substituting the null handle on failure
pub fn acquire_or_null<H: Default>(what: &str, result: BackendResult<H>) -> H {
    match result {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("Failed to acquire {}: {}", what, e);
            H::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderError;

    #[test]
    fn test_null_handles() {
        assert!(MeshHandle::NULL.is_null());
        assert!(!MeshHandle(3).is_null());
        assert_eq!(CubeMapHandle::default(), CubeMapHandle::NULL);
    }

    #[test]
    fn test_acquire_or_null_substitutes_null() {
        let failed: BackendResult<FramebufferHandle> =
            Err(RenderError::ResourceCreationFailed("out of memory".to_string()));
        assert!(acquire_or_null("framebuffer", failed).is_null());
        assert_eq!(acquire_or_null("framebuffer", Ok(FramebufferHandle(7))), FramebufferHandle(7));
    }

    #[test]
    fn test_cube_face_orientation() {
        for face in CubeFace::ALL {
            assert_eq!(face.direction().dot(&face.up()), 0.0);
        }
        assert_eq!(CubeFace::NegativeZ.index(), 5);
        assert_eq!(CubeFace::PositiveY.up(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_opacity_cutoff_is_strict() {
        let mut material = Material::default();
        assert!(material.is_opaque(0.95));
        material.alpha = 0.95;
        assert!(!material.is_opaque(0.95));
    }

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 15 * 4);
        let vertex = Vertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0]);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&vertex));
        assert_eq!(&floats[..6], &[1.0, 2.0, 3.0, 0.0, 1.0, 0.0]);
    }
}
