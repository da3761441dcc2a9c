//! Frame timing.
//!
//! [`FrameClock`] measures the inter-frame delta fed to update logic and,
//! independently, the wall-clock cost of the frame body (draw + present).
//! Keeping the two apart decouples simulation speed from render cost: a slow
//! draw does not inflate the next physics timestep beyond what actually
//! elapsed between frames.

use std::time::{Duration, Instant};

/// Per-frame timing bookkeeping for a single render thread.
///
/// Call [`begin_frame`](Self::begin_frame) at the top of each frame and
/// [`end_frame`](Self::end_frame) once the frame body has completed. Not
/// thread-safe; the scheduler owns exactly one clock per window.
pub struct FrameClock {
    started: Instant,
    last_tick: Instant,
    last_fps_tick: Instant,
    frame_stopwatch: Option<Instant>,

    frames_in_window: u32,
    total_frames: u64,
    frames_per_second: f32,
    duration_since_last_frame: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Creates a clock starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_tick: now,
            last_fps_tick: now,
            frame_stopwatch: None,
            frames_in_window: 0,
            total_frames: 0,
            frames_per_second: 0.0,
            duration_since_last_frame: Duration::ZERO,
        }
    }

    /// Begins a frame and returns the elapsed time since the previous
    /// `begin_frame` call, in seconds.
    ///
    /// Side effects: restarts the intra-frame stopwatch and folds the last
    /// second's frame count into [`frames_per_second`](Self::frames_per_second).
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        self.frame_stopwatch = Some(now);

        let window = now - self.last_fps_tick;
        if window >= Duration::from_secs(1) {
            self.frames_per_second = self.frames_in_window as f32 / window.as_secs_f32();
            self.last_fps_tick = now;
            self.frames_in_window = 0;
        }

        let dt = (now - self.last_tick).as_secs_f32();
        self.last_tick = now;
        dt
    }

    /// Ends the current frame: stops the stopwatch, records the frame-body
    /// duration, and advances the frame counters.
    pub fn end_frame(&mut self) {
        if let Some(start) = self.frame_stopwatch.take() {
            self.duration_since_last_frame = start.elapsed();
        }
        self.frames_in_window += 1;
        self.total_frames += 1;
    }

    /// Smoothed frames-per-second, refreshed once per ≥1-second window.
    #[inline]
    #[must_use]
    pub fn frames_per_second(&self) -> f32 {
        self.frames_per_second
    }

    /// Total frames completed since the clock was created.
    #[inline]
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Wall-clock duration of the most recently completed frame body.
    #[inline]
    #[must_use]
    pub fn duration_since_last_frame(&self) -> Duration {
        self.duration_since_last_frame
    }

    /// Total elapsed time since the clock was created.
    #[inline]
    #[must_use]
    pub fn duration_since_start(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_time_between_begin_calls() {
        let mut clock = FrameClock::new();
        let _ = clock.begin_frame();
        std::thread::sleep(Duration::from_millis(5));
        let dt = clock.begin_frame();
        assert!(dt >= 0.005);
    }

    #[test]
    fn end_frame_advances_counters() {
        let mut clock = FrameClock::new();
        let _ = clock.begin_frame();
        clock.end_frame();
        let _ = clock.begin_frame();
        clock.end_frame();
        assert_eq!(clock.total_frames(), 2);
    }

    #[test]
    fn frame_body_duration_is_measured_independently() {
        let mut clock = FrameClock::new();
        let _ = clock.begin_frame();
        std::thread::sleep(Duration::from_millis(5));
        clock.end_frame();
        assert!(clock.duration_since_last_frame() >= Duration::from_millis(5));

        // The next delta covers begin-to-begin, not just the frame body.
        std::thread::sleep(Duration::from_millis(5));
        let dt = clock.begin_frame();
        assert!(dt >= 0.010);
    }
}
