//! Headless recording backend
//!
//! Allocates sequential handles, keeps uploaded geometry in memory and
//! records every command it receives. Used by the demo when no window is
//! available and by tests that assert on pass ordering.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::render::device::{
    BlendMode, BufferHandle, ClearFlags, CubeFace, CubeMapFormat, CubeMapHandle, DrawUniforms,
    FrameUniforms, FramebufferHandle, GraphicsDevice, MeshHandle, PolygonMode, RenderTarget,
    ShaderHandle, Vertex,
};
use crate::render::{BackendResult, RenderError};

/// Resource categories that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Vertex buffers
    VertexBuffer,
    /// Index lists
    Mesh,
    /// Cube maps, created or loaded
    CubeMap,
    /// Framebuffers
    Framebuffer,
    /// Shader programs
    Shader,
}

/// A recorded device command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Render target change
    BindTarget(RenderTarget),
    /// Viewport change
    Viewport {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Clear of the bound target
    Clear(ClearFlags),
    /// Depth test toggle
    DepthTest(bool),
    /// Blend state change
    Blend(BlendMode),
    /// Rasterization mode change
    Polygon(PolygonMode),
    /// Program change
    UseProgram(ShaderHandle),
    /// Per-pass uniform upload
    FrameUniforms(FrameUniforms),
    /// Cube map bound to a texture slot
    BindCubeMap {
        /// Texture slot
        slot: u32,
        /// Bound cube map
        cube_map: CubeMapHandle,
    },
    /// A draw that reached a live target with a live program
    Draw {
        /// Drawn mesh
        mesh: MeshHandle,
        /// Program in use
        program: ShaderHandle,
        /// Target in use
        target: RenderTarget,
        /// Blend state in effect
        blend: BlendMode,
        /// Per-draw uniforms
        uniforms: DrawUniforms,
    },
    /// Frame presentation
    Present,
}

#[derive(Debug, Clone)]
struct MeshRecord {
    vertex_buffer: BufferHandle,
    indices: Vec<u32>,
}

#[derive(Debug, Clone, Copy)]
struct CubeMapRecord {
    resolution: Option<u32>,
    format: CubeMapFormat,
}

#[derive(Debug, Clone, Copy)]
struct FramebufferRecord {
    face: CubeFace,
    color: CubeMapHandle,
    depth: CubeMapHandle,
}

/// In-memory [`GraphicsDevice`]
#[derive(Debug)]
pub struct HeadlessDevice {
    next_handle: u64,
    failing: HashSet<ResourceKind>,
    recording: bool,

    vertex_buffers: HashMap<BufferHandle, Vec<Vertex>>,
    meshes: HashMap<MeshHandle, MeshRecord>,
    cube_maps: HashMap<CubeMapHandle, CubeMapRecord>,
    framebuffers: HashMap<FramebufferHandle, FramebufferRecord>,
    shaders: HashMap<ShaderHandle, (PathBuf, PathBuf)>,

    target: RenderTarget,
    program: ShaderHandle,
    blend: BlendMode,

    commands: Vec<Command>,
    draw_count: u64,
    skipped_draws: u64,
    present_count: u64,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Create a device with nothing allocated
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            failing: HashSet::new(),
            recording: true,
            vertex_buffers: HashMap::new(),
            meshes: HashMap::new(),
            cube_maps: HashMap::new(),
            framebuffers: HashMap::new(),
            shaders: HashMap::new(),
            target: RenderTarget::Window,
            program: ShaderHandle::NULL,
            blend: BlendMode::Disabled,
            commands: Vec::new(),
            draw_count: 0,
            skipped_draws: 0,
            present_count: 0,
        }
    }

    /// Builder: keep counters but do not store commands
    ///
    /// Long headless runs would otherwise grow the command list without bound.
    pub fn without_recording(mut self) -> Self {
        self.recording = false;
        self
    }

    /// Make every subsequent allocation of `kind` fail
    pub fn fail_allocations(&mut self, kind: ResourceKind) {
        self.failing.insert(kind);
    }

    /// Let allocations of `kind` succeed again
    pub fn restore_allocations(&mut self, kind: ResourceKind) {
        self.failing.remove(&kind);
    }

    /// Commands recorded so far
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drain the recorded commands
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Number of draws that reached a live target
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// Number of draws dropped because a handle was null
    pub fn skipped_draws(&self) -> u64 {
        self.skipped_draws
    }

    /// Number of presented frames
    pub fn present_count(&self) -> u64 {
        self.present_count
    }

    /// Vertices uploaded to `buffer`
    pub fn vertex_buffer(&self, buffer: BufferHandle) -> Option<&[Vertex]> {
        self.vertex_buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Number of vertex buffers allocated
    pub fn vertex_buffer_count(&self) -> usize {
        self.vertex_buffers.len()
    }

    /// Vertex buffer a mesh draws from
    pub fn mesh_vertex_buffer(&self, mesh: MeshHandle) -> Option<BufferHandle> {
        self.meshes.get(&mesh).map(|record| record.vertex_buffer)
    }

    /// Index list of a mesh
    pub fn mesh_indices(&self, mesh: MeshHandle) -> Option<&[u32]> {
        self.meshes.get(&mesh).map(|record| record.indices.as_slice())
    }

    /// Face resolution and format of a cube map; loaded cube maps have no fixed resolution
    pub fn cube_map_info(&self, cube_map: CubeMapHandle) -> Option<(Option<u32>, CubeMapFormat)> {
        self.cube_maps.get(&cube_map).map(|record| (record.resolution, record.format))
    }

    /// Face and attachments of a framebuffer
    pub fn framebuffer_info(&self, framebuffer: FramebufferHandle) -> Option<(CubeFace, CubeMapHandle, CubeMapHandle)> {
        self.framebuffers
            .get(&framebuffer)
            .map(|record| (record.face, record.color, record.depth))
    }

    /// Source paths of a program
    pub fn shader_sources(&self, program: ShaderHandle) -> Option<(&Path, &Path)> {
        self.shaders
            .get(&program)
            .map(|(vertex, fragment)| (vertex.as_path(), fragment.as_path()))
    }

    fn allocate(&mut self, kind: ResourceKind) -> BackendResult<u64> {
        if self.failing.contains(&kind) {
            return Err(RenderError::ResourceCreationFailed(format!("{:?} allocation refused", kind)));
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        Ok(handle)
    }

    fn record(&mut self, command: Command) {
        if self.recording {
            self.commands.push(command);
        }
    }

    fn target_is_live(&self) -> bool {
        match self.target {
            RenderTarget::Window => true,
            RenderTarget::Framebuffer(framebuffer) => self.framebuffers.contains_key(&framebuffer),
        }
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> BackendResult<BufferHandle> {
        let handle = BufferHandle(self.allocate(ResourceKind::VertexBuffer)?);
        self.vertex_buffers.insert(handle, vertices.to_vec());
        log::trace!("Created vertex buffer {:?} with {} vertices", handle, vertices.len());
        Ok(handle)
    }

    fn create_mesh(&mut self, vertex_buffer: BufferHandle, indices: &[u32]) -> BackendResult<MeshHandle> {
        if !self.vertex_buffers.contains_key(&vertex_buffer) {
            return Err(RenderError::BackendError(format!(
                "mesh references unknown vertex buffer {:?}",
                vertex_buffer
            )));
        }
        let handle = MeshHandle(self.allocate(ResourceKind::Mesh)?);
        self.meshes.insert(
            handle,
            MeshRecord {
                vertex_buffer,
                indices: indices.to_vec(),
            },
        );
        Ok(handle)
    }

    fn create_cube_map(&mut self, resolution: u32, format: CubeMapFormat) -> BackendResult<CubeMapHandle> {
        if resolution == 0 {
            return Err(RenderError::ResourceCreationFailed("cube map resolution is zero".to_string()));
        }
        let handle = CubeMapHandle(self.allocate(ResourceKind::CubeMap)?);
        self.cube_maps.insert(
            handle,
            CubeMapRecord {
                resolution: Some(resolution),
                format,
            },
        );
        Ok(handle)
    }

    fn load_cube_map(&mut self, faces: [&Path; 6]) -> BackendResult<CubeMapHandle> {
        let handle = CubeMapHandle(self.allocate(ResourceKind::CubeMap)?);
        log::trace!("Loaded cube map {:?} from {}", handle, faces[0].display());
        self.cube_maps.insert(
            handle,
            CubeMapRecord {
                resolution: None,
                format: CubeMapFormat::Color,
            },
        );
        Ok(handle)
    }

    fn create_framebuffer(
        &mut self,
        face: CubeFace,
        color: CubeMapHandle,
        depth: CubeMapHandle,
    ) -> BackendResult<FramebufferHandle> {
        if color.is_null() && depth.is_null() {
            return Err(RenderError::ResourceCreationFailed(
                "framebuffer has no attachments".to_string(),
            ));
        }
        let handle = FramebufferHandle(self.allocate(ResourceKind::Framebuffer)?);
        self.framebuffers.insert(handle, FramebufferRecord { face, color, depth });
        Ok(handle)
    }

    fn load_shader(&mut self, vertex_path: &Path, fragment_path: &Path) -> BackendResult<ShaderHandle> {
        let handle = ShaderHandle(self.allocate(ResourceKind::Shader)?);
        self.shaders
            .insert(handle, (vertex_path.to_path_buf(), fragment_path.to_path_buf()));
        Ok(handle)
    }

    fn bind_target(&mut self, target: RenderTarget) {
        self.target = target;
        self.record(Command::BindTarget(target));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.record(Command::Viewport { width, height });
    }

    fn clear(&mut self, flags: ClearFlags) {
        if self.target_is_live() {
            self.record(Command::Clear(flags));
        }
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.record(Command::DepthTest(enabled));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
        self.record(Command::Blend(mode));
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.record(Command::Polygon(mode));
    }

    fn use_program(&mut self, program: ShaderHandle) {
        self.program = program;
        self.record(Command::UseProgram(program));
    }

    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms) {
        if !self.program.is_null() {
            self.record(Command::FrameUniforms(*uniforms));
        }
    }

    fn bind_cube_map(&mut self, slot: u32, cube_map: CubeMapHandle) {
        if !cube_map.is_null() {
            self.record(Command::BindCubeMap { slot, cube_map });
        }
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, uniforms: &DrawUniforms) {
        if mesh.is_null() || self.program.is_null() || !self.target_is_live() {
            self.skipped_draws += 1;
            return;
        }
        self.draw_count += 1;
        self.record(Command::Draw {
            mesh,
            program: self.program,
            target: self.target,
            blend: self.blend,
            uniforms: *uniforms,
        });
    }

    fn present(&mut self) {
        self.present_count += 1;
        self.record(Command::Present);
    }
}
