//! Time management utilities

use std::time::Instant;

/// Monotonic frame timer
///
/// `tick` returns the seconds elapsed since the previous `tick`. The very
/// first call returns zero, so the clock effectively starts on the first
/// frame rather than at construction.
#[derive(Debug, Default)]
pub struct FrameTimer {
    last_frame: Option<Instant>,
    delta_time: f64,
    total_time: f64,
    frame_count: u64,
}

impl FrameTimer {
    /// Create a new timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the timer and return the delta in seconds
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Advance the timer to a caller supplied instant
    ///
    /// Instants earlier than the previous tick produce a zero delta.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        self.delta_time = self
            .last_frame
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f64());
        self.last_frame = Some(now);
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time between the last two ticks in seconds
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Get the total elapsed time since the first tick
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Get the number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since the first tick
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f64 {
        if self.total_time > 0.0 {
            self.frame_count.saturating_sub(1) as f64 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_tick_is_zero() {
        let mut timer = FrameTimer::new();
        assert_eq!(timer.tick_at(Instant::now()), 0.0);
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn test_tick_measures_since_previous() {
        let mut timer = FrameTimer::new();
        let start = Instant::now();
        timer.tick_at(start);
        let delta = timer.tick_at(start + Duration::from_millis(250));
        assert!((delta - 0.25).abs() < 1e-9);
        let delta = timer.tick_at(start + Duration::from_millis(500));
        assert!((delta - 0.25).abs() < 1e-9);
        assert!((timer.total_time() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_tick_never_goes_backwards() {
        let mut timer = FrameTimer::new();
        let start = Instant::now() + Duration::from_secs(1);
        timer.tick_at(start);
        assert_eq!(timer.tick_at(start - Duration::from_millis(10)), 0.0);
    }
}
