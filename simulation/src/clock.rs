use std::time::Duration;

use tokio::time::Instant;

/// Monotonic delta-time source that can be reset after a pause.
///
/// Frames longer than `max_step` are clamped so a stalled host does not
/// produce one enormous simulation step.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    last: Instant,
    max_step: Duration,
}

impl FrameClock {
    /// Clamp applied by [`FrameClock::default`].
    pub const DEFAULT_MAX_STEP: Duration = Duration::from_millis(250);

    /// Creates a clock whose first frame is measured from now.
    #[must_use]
    pub fn new(max_step: Duration) -> Self {
        Self {
            last: Instant::now(),
            max_step,
        }
    }

    /// Forgets the time elapsed since the previous frame.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Time elapsed since the previous frame or reset, clamped to `max_step`.
    pub fn frame(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed.min(self.max_step)
    }

    /// Longest step a single frame may report.
    #[must_use]
    pub fn max_step(&self) -> Duration {
        self.max_step
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_STEP)
    }
}
