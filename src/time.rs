use std::time::{Duration, Instant};

/// Seconds since the previous tick, clamped so a stalled or minimised window
/// does not fling the camera across the scene.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    max_delta: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_delta(Duration::from_millis(250))
    }

    pub fn with_max_delta(max_delta: Duration) -> Self {
        Self {
            last: Instant::now(),
            max_delta,
        }
    }

    /// Restarts the baseline, e.g. after the window regains focus.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last).min(self.max_delta);
        self.last = now;
        delta.as_secs_f32()
    }
}
