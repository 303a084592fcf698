//! Window backends
//!
//! The run loop only needs input snapshots and a clock; presentation goes
//! through the graphics device. [`HeadlessWindow`] provides them from a
//! script with a fixed timestep.

use std::collections::VecDeque;

use super::input::FrameInput;

/// What the run loop needs from a window
pub trait WindowBackend {
    /// Process pending events and return this frame's input
    fn poll_input(&mut self) -> FrameInput;

    /// Seconds since the window was created
    fn time(&self) -> f64;

    /// Switch between windowed and fullscreen on the primary monitor
    ///
    /// The new framebuffer size shows up in the next [`FrameInput`].
    fn toggle_fullscreen(&mut self) {
        log::debug!("Fullscreen is not supported by this window backend");
    }
}

/// Scripted window for tests and runs without a display
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    script: VecDeque<FrameInput>,
    idle_frames: u64,
    framebuffer_size: (u32, u32),
    windowed_size: (u32, u32),
    monitor_size: (u32, u32),
    timestep: f64,
    time: f64,
    fullscreen: bool,
}

/// Work area of the simulated monitor
pub const DEFAULT_MONITOR_SIZE: (u32, u32) = (1920, 1080);

impl HeadlessWindow {
    /// Window that closes on its first poll
    pub fn new(width: u32, height: u32, timestep: f64) -> Self {
        Self {
            script: VecDeque::new(),
            idle_frames: 0,
            framebuffer_size: (width, height),
            windowed_size: (width, height),
            monitor_size: DEFAULT_MONITOR_SIZE,
            timestep,
            time: 0.0,
            fullscreen: false,
        }
    }

    /// Builder: run `frames` frames without input after the script
    pub fn with_idle_frames(mut self, frames: u64) -> Self {
        self.idle_frames = frames;
        self
    }

    /// Builder: replay `inputs`, one per frame, before any idle frames
    pub fn with_script(mut self, inputs: impl IntoIterator<Item = FrameInput>) -> Self {
        self.script.extend(inputs);
        self
    }

    /// Builder: size of the monitor work area used when fullscreen
    pub fn with_monitor_size(mut self, width: u32, height: u32) -> Self {
        self.monitor_size = (width, height);
        self
    }

    /// Whether fullscreen is currently on
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}

impl WindowBackend for HeadlessWindow {
    fn poll_input(&mut self) -> FrameInput {
        self.time += self.timestep;

        if let Some(input) = self.script.pop_front() {
            if input.framebuffer_size != (0, 0) {
                self.framebuffer_size = input.framebuffer_size;
                if !self.fullscreen {
                    self.windowed_size = input.framebuffer_size;
                }
            }
            return FrameInput {
                framebuffer_size: self.framebuffer_size,
                ..input
            };
        }

        if self.idle_frames > 0 {
            self.idle_frames -= 1;
            return FrameInput::idle(self.framebuffer_size);
        }

        FrameInput {
            close_requested: true,
            ..FrameInput::idle(self.framebuffer_size)
        }
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        self.framebuffer_size = if self.fullscreen {
            self.monitor_size
        } else {
            self.windowed_size
        };
        log::debug!("Fullscreen {}", if self.fullscreen { "on" } else { "off" });
    }
}
