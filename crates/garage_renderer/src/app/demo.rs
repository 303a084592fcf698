//! Garage demo scene state

use crate::assets::load_model_or_log;
use crate::config::DemoConfig;
use crate::render::device::GraphicsDevice;
use crate::render::pipeline::{RenderMode, SceneView};
use crate::scene::{create_garage, CompositeModel, OrbitCamera, PointLight, StageLights, StaticModel};

use super::input::{FrameInput, Key};

/// The car in the garage, with its camera, light and stage lights
#[derive(Debug)]
pub struct GarageDemo {
    camera: OrbitCamera,
    light: PointLight,
    garage: StaticModel,
    car: Option<CompositeModel>,
    stage_lights: Option<StageLights>,
    mode: RenderMode,
    viewport: (u32, u32),
    quit_requested: bool,
}

impl GarageDemo {
    /// Build the scene, loading the configured models
    ///
    /// Models that fail to load are logged and left out of the scene.
    pub fn new<D: GraphicsDevice>(device: &mut D, config: &DemoConfig) -> Self {
        let garage = create_garage(device);
        let car = load_model_or_log(device, &config.assets.car_model);
        let stage_lights = config
            .assets
            .stage_light_model
            .as_ref()
            .and_then(|path| load_model_or_log(device, path))
            .map(StageLights::new);

        Self::from_parts(
            OrbitCamera::new(config.camera.clone()),
            garage,
            car,
            stage_lights,
            (config.window.width, config.window.height),
        )
    }

    /// Assemble a scene from already created parts
    pub fn from_parts(
        camera: OrbitCamera,
        garage: StaticModel,
        car: Option<CompositeModel>,
        stage_lights: Option<StageLights>,
        viewport: (u32, u32),
    ) -> Self {
        Self {
            camera,
            light: PointLight::default(),
            garage,
            car,
            stage_lights,
            mode: RenderMode::default(),
            viewport,
            quit_requested: false,
        }
    }

    /// Apply one frame of input
    pub fn handle_input(&mut self, input: &FrameInput, delta_time: f32) {
        let (width, height) = input.framebuffer_size;
        if width > 0 && height > 0 {
            self.viewport = (width, height);
        }
        self.camera.zoom(input.wheel_delta, delta_time);
        if input.left_button {
            self.camera.rotate(input.mouse_delta);
        }

        for key in &input.keys_pressed {
            match key {
                Key::Escape => self.quit_requested = true,
                Key::F3 => {
                    self.mode = self.mode.next();
                    log::info!("Render mode: {:?}", self.mode);
                }
                Key::F => {}
            }
        }
    }

    /// Animate the light and aim the stage lights at the car
    pub fn update(&mut self, time: f32) {
        self.light.animate(time);
        if let (Some(car), Some(stage_lights)) = (&self.car, &mut self.stage_lights) {
            stage_lights.aim_at(car.center());
        }
    }

    /// What the pipeline renders this frame
    pub fn scene_view(&self) -> SceneView<'_> {
        SceneView {
            camera: &self.camera,
            light: self.light,
            garage: &self.garage,
            car: self.car.as_ref(),
            props: self.stage_lights.as_ref().map(StageLights::fixtures).unwrap_or_default(),
            mode: self.mode,
            viewport: self.viewport,
        }
    }

    /// Escape was pressed
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Current render mode
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// The orbit camera
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// The point light
    pub fn light(&self) -> PointLight {
        self.light
    }

    /// The car, if it loaded
    pub fn car(&self) -> Option<&CompositeModel> {
        self.car.as_ref()
    }

    /// The stage lights, if they loaded
    pub fn stage_lights(&self) -> Option<&StageLights> {
        self.stage_lights.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessDevice;
    use approx::assert_relative_eq;

    fn demo() -> GarageDemo {
        let mut device = HeadlessDevice::new();
        let garage = create_garage(&mut device);
        GarageDemo::from_parts(OrbitCamera::default(), garage, None, None, (1280, 720))
    }

    #[test]
    fn test_keys() {
        let mut demo = demo();
        demo.handle_input(&FrameInput::idle((1280, 720)).with_key(Key::F3), 0.016);
        assert_eq!(demo.mode(), RenderMode::Wireframe);
        assert!(!demo.quit_requested());

        demo.handle_input(&FrameInput::idle((1280, 720)).with_key(Key::Escape), 0.016);
        assert!(demo.quit_requested());
    }

    #[test]
    fn test_drag_needs_left_button() {
        let mut demo = demo();
        let yaw = demo.camera().yaw();

        let mut input = FrameInput::idle((1280, 720));
        input.mouse_delta = crate::foundation::math::Vec2::new(50.0, 0.0);
        demo.handle_input(&input, 0.016);
        assert_eq!(demo.camera().yaw(), yaw);

        demo.handle_input(&FrameInput::idle((1280, 720)).with_drag(50.0, 0.0), 0.016);
        assert_relative_eq!(demo.camera().yaw(), yaw + 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut demo = demo();
        demo.handle_input(&FrameInput::idle((1280, 720)).with_wheel(100.0), 1.0);
        assert_eq!(demo.camera().distance(), 8.0);
        demo.handle_input(&FrameInput::idle((1280, 720)).with_wheel(-100.0), 1.0);
        assert_eq!(demo.camera().distance(), 20.0);
    }

    #[test]
    fn test_missing_models_leave_scene_empty() {
        let mut device = HeadlessDevice::new();
        let mut config = DemoConfig::default();
        config.assets.car_model = "does/not/exist.model".to_string();
        config.assets.stage_light_model = None;

        let demo = GarageDemo::new(&mut device, &config);
        assert!(demo.car().is_none());
        assert!(demo.stage_lights().is_none());
        assert!(demo.scene_view().props.is_empty());
        assert!(!demo.scene_view().garage.mesh.is_null());
    }

    #[test]
    fn test_minimized_window_keeps_last_viewport() {
        let config = DemoConfig::default();
        let mut context =
            crate::render::RenderContext::new(HeadlessDevice::new(), &config.render, &config.assets).unwrap();
        let garage = create_garage(context.device_mut());
        let mut demo = GarageDemo::from_parts(OrbitCamera::default(), garage, None, None, (1280, 720));

        demo.handle_input(&FrameInput::idle((0, 0)), 0.016);
        assert_eq!(demo.scene_view().viewport, (1280, 720));
        context.render(&demo.scene_view());

        demo.handle_input(&FrameInput::idle((800, 600)), 0.016);
        assert_eq!(demo.scene_view().viewport, (800, 600));
    }

    #[test]
    fn test_update_moves_light() {
        let mut demo = demo();
        demo.update(0.0);
        assert_relative_eq!(demo.light().position, crate::foundation::math::Vec3::new(8.0, 12.0, 0.0));
    }
}
