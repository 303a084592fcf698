//! Frame pipeline
//!
//! Runs the passes of one frame in strict order:
//!
//! 1. Shadow: six depth-only faces rendered from the point light
//! 2. Reflection: six color faces of the garage rendered from the car centre
//! 3. Forward opaque: garage, opaque car parts, opaque stage light parts
//! 4. Forward transparent: everything with alpha at or below the cutoff,
//!    farthest first, with alpha blending
//!
//! Missing resources never stop a frame. Failed acquisitions leave null
//! handles behind and the device treats draws through them as no-ops.

use std::path::Path;

use crate::config::{AssetConfig, RenderConfig};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::device::{
    acquire_or_null, BlendMode, ClearFlags, CubeFace, CubeMapHandle, DrawUniforms, FrameUniforms,
    GraphicsDevice, Material, MeshHandle, PolygonMode, RenderTarget, ShaderHandle,
};
use crate::render::light_probe::LightProbe;
use crate::render::transparency::{TransparentEntry, TransparentQueue};
use crate::render::{BackendResult, RenderError};
use crate::scene::camera::OrbitCamera;
use crate::scene::composite_model::{CompositeModel, SubObjectView};
use crate::scene::culling::frustum_cull_aabb;
use crate::scene::light::PointLight;
use crate::scene::static_model::StaticModel;

/// Field of view of every cube map face
const CUBE_FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_2;

/// Garage program texture slots
const GARAGE_DIFFUSE_SLOT: u32 = 0;
const GARAGE_NORMAL_SLOT: u32 = 1;
const GARAGE_SHADOW_SLOT: u32 = 2;

/// Car program texture slots
const CAR_REFLECTION_SLOT: u32 = 0;
const CAR_SHADOW_SLOT: u32 = 1;

/// How the forward pass shades geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Full lighting
    #[default]
    Shaded,
    /// Triangle edges only
    Wireframe,
    /// Surface normals as colors
    Normals,
}

impl RenderMode {
    /// The mode after this one, wrapping around
    pub fn next(self) -> Self {
        match self {
            RenderMode::Shaded => RenderMode::Wireframe,
            RenderMode::Wireframe => RenderMode::Normals,
            RenderMode::Normals => RenderMode::Shaded,
        }
    }

    /// Rasterization mode for the whole frame
    pub fn polygon_mode(self) -> PolygonMode {
        match self {
            RenderMode::Wireframe => PolygonMode::Line,
            RenderMode::Shaded | RenderMode::Normals => PolygonMode::Fill,
        }
    }

    /// Whether forward draws output normals
    pub fn shows_normals(self) -> bool {
        self == RenderMode::Normals
    }
}

/// Draw and cull counts of one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassStats {
    /// Draw calls issued
    pub draws: u32,
    /// Objects skipped by the visibility test
    pub culled: u32,
}

/// Per-pass statistics of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// All six shadow faces
    pub shadow: PassStats,
    /// All six reflection faces
    pub reflection: PassStats,
    /// Forward opaque pass
    pub opaque: PassStats,
    /// Forward transparent pass
    pub transparent: PassStats,
    /// Sub-objects sorted into the transparent pass
    pub transparent_objects: usize,
}

impl FrameStats {
    /// Draw calls across every pass
    pub fn total_draws(&self) -> u32 {
        self.shadow.draws + self.reflection.draws + self.opaque.draws + self.transparent.draws
    }

    /// Culled objects across every pass
    pub fn total_culled(&self) -> u32 {
        self.shadow.culled + self.reflection.culled + self.opaque.culled + self.transparent.culled
    }
}

/// Everything a frame reads from the scene
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    /// Forward camera
    pub camera: &'a OrbitCamera,
    /// Shadow casting light
    pub light: PointLight,
    /// Static room geometry; receives shadows, is captured by the reflection probe
    pub garage: &'a StaticModel,
    /// The shadow casting, reflective model
    pub car: Option<&'a CompositeModel>,
    /// Additional models drawn only in the forward passes
    pub props: &'a [CompositeModel],
    /// Forward shading mode
    pub mode: RenderMode,
    /// Window framebuffer size in pixels
    pub viewport: (u32, u32),
}

/// Programs used by the passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineShaders {
    /// Writes light distance into the shadow cube map
    pub shadow: ShaderHandle,
    /// Textured, shadowed garage walls
    pub garage: ShaderHandle,
    /// Material-lit models with reflections
    pub car: ShaderHandle,
}

/// Owns the probes, programs and garage textures, and renders frames
#[derive(Debug)]
pub struct FramePipeline {
    settings: RenderConfig,
    cube_projection: Mat4,
    shaders: PipelineShaders,
    shadow_probe: LightProbe,
    reflection_probe: LightProbe,
    garage_diffuse: CubeMapHandle,
    garage_normal: CubeMapHandle,
    transparent: TransparentQueue,
}

impl FramePipeline {
    /// Create probes, load programs and garage textures
    ///
    /// Only an unusable configuration is an error. Resources that fail to
    /// load are logged and left null.
    pub fn new<D: GraphicsDevice>(device: &mut D, settings: &RenderConfig, assets: &AssetConfig) -> BackendResult<Self> {
        if settings.shadow_map_resolution == 0 || settings.reflection_map_resolution == 0 {
            return Err(RenderError::InvalidConfiguration(
                "cube map resolutions must be non-zero".to_string(),
            ));
        }
        if settings.near_plane <= 0.0 || settings.far_plane <= settings.near_plane {
            return Err(RenderError::InvalidConfiguration(format!(
                "cube map planes must satisfy 0 < near < far (got {} / {})",
                settings.near_plane, settings.far_plane
            )));
        }

        let shader_dir = Path::new(&assets.shader_dir);
        let mut load_program = |vertex: &str, fragment: &str| {
            acquire_or_null(
                fragment,
                device.load_shader(&shader_dir.join(vertex), &shader_dir.join(fragment)),
            )
        };
        let shaders = PipelineShaders {
            shadow: load_program("shadow.vert.glsl", "shadow.frag.glsl"),
            garage: load_program("garage.vert.glsl", "garage.frag.glsl"),
            car: load_program("common.vert.glsl", "car.frag.glsl"),
        };

        // Walls on the X and Z faces, floor and ceiling on Y
        let (wall, floor) = (Path::new(&assets.wall_diffuse), Path::new(&assets.floor_diffuse));
        let garage_diffuse = acquire_or_null(
            "garage diffuse cube map",
            device.load_cube_map([wall, wall, floor, floor, wall, wall]),
        );
        let (wall, floor) = (Path::new(&assets.wall_normal), Path::new(&assets.floor_normal));
        let garage_normal = acquire_or_null(
            "garage normal cube map",
            device.load_cube_map([wall, wall, floor, floor, wall, wall]),
        );

        let shadow_probe = LightProbe::create_shadow_probe(device, settings.shadow_map_resolution);
        let reflection_probe = LightProbe::create_reflection_probe(device, settings.reflection_map_resolution);

        log::info!(
            "Frame pipeline ready: shadow {}px, reflection {}px",
            settings.shadow_map_resolution,
            settings.reflection_map_resolution
        );

        Ok(Self {
            cube_projection: Mat4::perspective(CUBE_FIELD_OF_VIEW, 1.0, settings.near_plane, settings.far_plane),
            settings: settings.clone(),
            shaders,
            shadow_probe,
            reflection_probe,
            garage_diffuse,
            garage_normal,
            transparent: TransparentQueue::new(),
        })
    }

    /// Settings the pipeline was built with
    pub fn settings(&self) -> &RenderConfig {
        &self.settings
    }

    /// Programs used by the passes
    pub fn shaders(&self) -> PipelineShaders {
        self.shaders
    }

    /// Depth cube map rendered from the light
    pub fn shadow_probe(&self) -> &LightProbe {
        &self.shadow_probe
    }

    /// Color cube map rendered from the car
    pub fn reflection_probe(&self) -> &LightProbe {
        &self.reflection_probe
    }

    /// View-projection of one cube face seen from `origin`
    pub fn cube_view_projection(&self, origin: Vec3, face: CubeFace) -> Mat4 {
        self.cube_projection * Mat4::look_along(origin, face.direction(), face.up())
    }

    /// Render every pass of one frame
    pub fn render_frame<D: GraphicsDevice>(&mut self, device: &mut D, scene: &SceneView<'_>) -> FrameStats {
        device.set_polygon_mode(scene.mode.polygon_mode());
        device.set_depth_test(true);
        device.set_blend_mode(BlendMode::Disabled);

        let shadow = self.shadow_pass(device, scene);
        let reflection = self.reflection_pass(device, scene);
        let (opaque, transparent) = self.forward_pass(device, scene);

        device.set_depth_test(false);

        let stats = FrameStats {
            shadow,
            reflection,
            opaque,
            transparent,
            transparent_objects: self.transparent.len(),
        };
        log::trace!("Frame rendered: {:?}", stats);
        stats
    }

    fn shadow_pass<D: GraphicsDevice>(&self, device: &mut D, scene: &SceneView<'_>) -> PassStats {
        let mut stats = PassStats::default();
        let light = scene.light.position;
        let resolution = self.settings.shadow_map_resolution;

        device.use_program(self.shaders.shadow);
        device.set_viewport(resolution, resolution);

        for face in CubeFace::ALL {
            let view_projection = self.cube_view_projection(light, face);
            device.bind_target(RenderTarget::Framebuffer(self.shadow_probe.framebuffer(face)));
            device.clear(ClearFlags::DEPTH);
            device.set_frame_uniforms(
                &FrameUniforms::new(view_projection, light, face.direction()).with_light(light, self.settings.far_plane),
            );

            if let Some(car) = scene.car {
                for sub in car.sub_objects().filter(|sub| sub.material.is_opaque(self.settings.opacity_cutoff)) {
                    let model_view_projection = view_projection * sub.world_matrix;
                    if frustum_cull_aabb(sub.bounds.min, sub.bounds.max, &model_view_projection) {
                        stats.culled += 1;
                        continue;
                    }
                    draw_sub_object(device, &sub, &view_projection, false);
                    stats.draws += 1;
                }
            }

            // The room encloses every face's view volume and would always be culled
            draw_static(device, scene.garage, &view_projection, false);
            stats.draws += 1;
        }

        log::trace!("Shadow pass: {:?}", stats);
        stats
    }

    fn reflection_pass<D: GraphicsDevice>(&self, device: &mut D, scene: &SceneView<'_>) -> PassStats {
        let mut stats = PassStats::default();
        let origin = scene.car.map_or_else(Vec3::zeros, CompositeModel::center);
        let resolution = self.settings.reflection_map_resolution;

        device.use_program(self.shaders.garage);
        self.bind_garage_maps(device);
        device.set_viewport(resolution, resolution);

        for face in CubeFace::ALL {
            let view_projection = self.cube_view_projection(origin, face);
            device.bind_target(RenderTarget::Framebuffer(self.reflection_probe.framebuffer(face)));
            device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
            device.set_frame_uniforms(
                &FrameUniforms::new(view_projection, origin, face.direction())
                    .with_light(scene.light.position, self.settings.far_plane),
            );
            draw_static(device, scene.garage, &view_projection, false);
            stats.draws += 1;
        }

        log::trace!("Reflection pass: {:?}", stats);
        stats
    }

    fn forward_pass<D: GraphicsDevice>(&mut self, device: &mut D, scene: &SceneView<'_>) -> (PassStats, PassStats) {
        let mut opaque = PassStats::default();
        let mut transparent = PassStats::default();

        let (width, height) = scene.viewport;
        // A minimized window reports 0x0
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let eye = scene.camera.position();
        let view_projection = scene.camera.view_projection(
            utils::deg_to_rad(self.settings.field_of_view_degrees),
            aspect,
            self.settings.forward_near_plane,
            self.settings.forward_far_plane,
        );
        let show_normals = scene.mode.shows_normals();
        let uniforms = FrameUniforms::new(view_projection, eye, scene.camera.direction())
            .with_light(scene.light.position, self.settings.far_plane)
            .with_shadows(true);
        let reflective = uniforms.with_reflection_strength(self.settings.reflection_strength);

        device.set_blend_mode(BlendMode::Alpha);
        device.bind_target(RenderTarget::Window);
        device.set_viewport(width, height);
        device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        device.use_program(self.shaders.garage);
        device.set_frame_uniforms(&uniforms);
        self.bind_garage_maps(device);
        draw_static(device, scene.garage, &view_projection, show_normals);
        opaque.draws += 1;

        self.transparent.clear();
        device.use_program(self.shaders.car);
        self.bind_car_maps(device);

        device.set_frame_uniforms(&reflective);
        if let Some(car) = scene.car {
            opaque.draws += self.draw_or_queue(device, car, &view_projection, eye, show_normals);
        }

        device.set_frame_uniforms(&uniforms);
        for prop in scene.props {
            opaque.draws += self.draw_or_queue(device, prop, &view_projection, eye, show_normals);
        }

        self.transparent.sort_back_to_front();
        device.set_frame_uniforms(&reflective);
        for entry in self.transparent.entries() {
            device.draw_mesh(
                entry.mesh,
                &DrawUniforms {
                    model: entry.world_matrix,
                    model_view_projection: view_projection * entry.world_matrix,
                    material: entry.material,
                    show_normals,
                },
            );
            transparent.draws += 1;
        }

        log::trace!("Forward pass: opaque {:?}, transparent {:?}", opaque, transparent);
        (opaque, transparent)
    }

    /// Draw the opaque sub-objects of `model` now and queue the rest
    fn draw_or_queue<D: GraphicsDevice>(
        &mut self,
        device: &mut D,
        model: &CompositeModel,
        view_projection: &Mat4,
        eye: Vec3,
        show_normals: bool,
    ) -> u32 {
        let mut draws = 0;
        for sub in model.sub_objects() {
            if sub.material.is_opaque(self.settings.opacity_cutoff) {
                draw_sub_object(device, &sub, view_projection, show_normals);
                draws += 1;
            } else {
                let center = sub.bounds.transformed_center(&sub.world_matrix);
                self.transparent
                    .push(TransparentEntry::new(sub.mesh, sub.world_matrix, sub.material, eye, center));
            }
        }
        draws
    }

    fn bind_garage_maps<D: GraphicsDevice>(&self, device: &mut D) {
        device.bind_cube_map(GARAGE_DIFFUSE_SLOT, self.garage_diffuse);
        device.bind_cube_map(GARAGE_NORMAL_SLOT, self.garage_normal);
        device.bind_cube_map(GARAGE_SHADOW_SLOT, self.shadow_probe.depth);
    }

    fn bind_car_maps<D: GraphicsDevice>(&self, device: &mut D) {
        device.bind_cube_map(CAR_REFLECTION_SLOT, self.reflection_probe.color);
        device.bind_cube_map(CAR_SHADOW_SLOT, self.shadow_probe.depth);
    }
}

fn draw_sub_object<D: GraphicsDevice>(device: &mut D, sub: &SubObjectView, view_projection: &Mat4, show_normals: bool) {
    draw(device, sub.mesh, sub.world_matrix, sub.material, view_projection, show_normals);
}

fn draw_static<D: GraphicsDevice>(device: &mut D, model: &StaticModel, view_projection: &Mat4, show_normals: bool) {
    draw(device, model.mesh, model.world_matrix(), model.material, view_projection, show_normals);
}

fn draw<D: GraphicsDevice>(
    device: &mut D,
    mesh: MeshHandle,
    model: Mat4,
    material: Material,
    view_projection: &Mat4,
    show_normals: bool,
) {
    device.draw_mesh(
        mesh,
        &DrawUniforms {
            model,
            model_view_projection: view_projection * model,
            material,
            show_normals,
        },
    );
}
