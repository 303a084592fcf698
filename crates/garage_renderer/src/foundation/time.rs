//! Time management utilities

/// Frame timer fed by the window's clock
///
/// The window backend owns the clock (a real timer or a scripted one), so
/// the timer only turns successive timestamps into per-frame deltas.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last_time: Option<f64>,
    delta_time: f32,
    total_time: f64,
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_time: None,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance to `now` (seconds) and return the delta since the previous tick
    ///
    /// The first tick yields a zero delta. A clock that goes backwards is
    /// treated as a zero-length frame.
    pub fn tick(&mut self, now: f64) -> f32 {
        let delta = self.last_time.map_or(0.0, |last| (now - last).max(0.0));
        self.last_time = Some(now);
        self.delta_time = delta as f32;
        self.total_time = now;
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the timestamp of the last tick
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut timer = FrameTimer::new();
        assert_eq!(timer.tick(3.0), 0.0);
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn test_delta_between_ticks() {
        let mut timer = FrameTimer::new();
        timer.tick(1.0);
        assert_relative_eq!(timer.tick(1.25), 0.25);
        assert_relative_eq!(timer.current_fps(), 4.0);
        assert_relative_eq!(timer.total_time(), 1.25);
    }

    #[test]
    fn test_clock_going_backwards() {
        let mut timer = FrameTimer::new();
        timer.tick(2.0);
        assert_eq!(timer.tick(1.0), 0.0);
    }
}
