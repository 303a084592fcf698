//! Application run loop
//!
//! A blocking poll, update, render cycle. The render context presents each
//! frame through the device. The quit flag is checked once per iteration;
//! a window close request ends the loop before the frame is rendered.

pub mod demo;
pub mod input;
pub mod window;

pub use demo::GarageDemo;
pub use input::{FrameInput, Key};
pub use window::{HeadlessWindow, WindowBackend};

use thiserror::Error;

use crate::config::{ConfigError, DemoConfig};
use crate::foundation::time::FrameTimer;
use crate::render::device::GraphicsDevice;
use crate::render::{RenderContext, RenderError};

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Renderer setup failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Run frames until the demo quits or the window closes
///
/// Returns the number of frames rendered.
pub fn run<D, W>(demo: &mut GarageDemo, context: &mut RenderContext<D>, window: &mut W) -> u64
where
    D: GraphicsDevice,
    W: WindowBackend,
{
    let mut timer = FrameTimer::new();
    let mut frames = 0;
    log::info!("Starting main loop...");

    while !demo.quit_requested() {
        let input = window.poll_input();
        if input.close_requested {
            break;
        }
        let delta_time = timer.tick(window.time());

        if input.pressed(Key::F) {
            window.toggle_fullscreen();
        }
        demo.handle_input(&input, delta_time);
        demo.update(timer.total_time() as f32);

        let stats = context.render(&demo.scene_view());
        frames += 1;

        log::debug!(
            "Frame {}: {} draws, {} culled, {} transparent ({:.1} fps)",
            frames,
            stats.total_draws(),
            stats.total_culled(),
            stats.transparent_objects,
            timer.current_fps()
        );
    }

    log::info!("Main loop finished after {} frames", frames);
    frames
}

/// Build the scene and renderer on `device` and run until done
pub fn launch<D, W>(config: &DemoConfig, device: D, window: &mut W) -> Result<u64, AppError>
where
    D: GraphicsDevice,
    W: WindowBackend,
{
    config.validate()?;
    let mut context = RenderContext::new(device, &config.render, &config.assets)?;
    let mut demo = GarageDemo::new(context.device_mut(), config);
    Ok(run(&mut demo, &mut context, window))
}
