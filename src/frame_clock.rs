use log::{debug, trace};
use std::time::{Duration, Instant};

/// Measures wall clock time between frames. This is the only time source for
/// animation and the attach countdown, read once per frame.
pub struct FrameClock {
    loop_start: Option<Instant>,
    previous: Option<Instant>,
    frame_count: u64,
    max_delta: Option<f32>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loop_start: None,
            previous: None,
            frame_count: 0,
            max_delta: None,
        }
    }

    /// Limits the delta for a single frame, so a long stall such as a
    /// debugger break doesn't jump the animation forward
    #[must_use]
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = Some(max_delta);
        self
    }

    /// Seconds since the previous call. The first call returns 0.
    pub fn delta(&mut self) -> f32 {
        self.delta_at(Instant::now())
    }

    /// Seconds between the previous frame and `now`
    pub fn delta_at(&mut self, now: Instant) -> f32 {
        self.loop_start.get_or_insert(now);
        let delta = self
            .previous
            .map_or(0.0, |previous| {
                now.saturating_duration_since(previous).as_secs_f32()
            });
        self.previous = Some(now);
        self.frame_count += 1;
        trace!("frame {} delta={}", self.frame_count, delta);
        match self.max_delta {
            Some(max) if delta > max => {
                debug!("frame delta {} clamped to {}", delta, max);
                max
            }
            _ => delta,
        }
    }

    /// Elapsed time since the first frame
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.loop_start.map(|loop_start| loop_start.elapsed())
    }

    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
