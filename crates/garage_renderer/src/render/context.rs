//! Render context
//!
//! Owns the graphics device and the frame pipeline so every stage receives
//! its state explicitly instead of reaching for globals.

use crate::config::{AssetConfig, RenderConfig};
use crate::render::device::GraphicsDevice;
use crate::render::pipeline::{FramePipeline, FrameStats, SceneView};
use crate::render::BackendResult;

/// Device plus pipeline, alive for the whole run
#[derive(Debug)]
pub struct RenderContext<D: GraphicsDevice> {
    device: D,
    pipeline: FramePipeline,
    last_stats: FrameStats,
    frames_rendered: u64,
}

impl<D: GraphicsDevice> RenderContext<D> {
    /// Build the pipeline's resources on `device` and take ownership of it
    pub fn new(mut device: D, settings: &RenderConfig, assets: &AssetConfig) -> BackendResult<Self> {
        let pipeline = FramePipeline::new(&mut device, settings, assets)?;
        Ok(Self {
            device,
            pipeline,
            last_stats: FrameStats::default(),
            frames_rendered: 0,
        })
    }

    /// Render all passes of one frame and hand it to the device
    pub fn render(&mut self, scene: &SceneView<'_>) -> FrameStats {
        let stats = self.pipeline.render_frame(&mut self.device, scene);
        self.device.present();
        self.last_stats = stats;
        self.frames_rendered += 1;
        stats
    }

    /// The device, for resource creation
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable device access, for loading models between frames
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The frame pipeline
    pub fn pipeline(&self) -> &FramePipeline {
        &self.pipeline
    }

    /// Statistics of the most recent frame
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Frames rendered so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Give the device back, ending the context
    pub fn into_device(self) -> D {
        self.device
    }
}
