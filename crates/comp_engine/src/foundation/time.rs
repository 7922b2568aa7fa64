//! Time management utilities
//!
//! The scene never reads the wall clock. `FrameClock` produces the
//! `(delta, absolute)` pairs fed into `Scene::update`, either from a fixed
//! step or from externally measured deltas.

use std::time::{Duration, Instant};

/// Scene-relative frame clock
#[derive(Debug, Clone)]
pub struct FrameClock {
    fixed_step: f32,
    delta_time: f32,
    total_time: f32,
    anchor: f32,
    fixed_ticks: u64,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl FrameClock {
    /// Create a clock advancing by `fixed_step` seconds per tick
    pub fn new(fixed_step: f32) -> Self {
        Self {
            fixed_step,
            delta_time: 0.0,
            total_time: 0.0,
            anchor: 0.0,
            fixed_ticks: 0,
            frame_count: 0,
        }
    }

    /// Advance by the fixed step and return `(delta, absolute)`
    pub fn tick(&mut self) -> (f32, f32) {
        self.fixed_ticks += 1;
        self.frame_count += 1;
        self.delta_time = self.fixed_step;
        // recompute from the tick count so long fixed-step runs don't drift
        self.total_time = self.anchor + self.fixed_step * self.fixed_ticks as f32;
        (self.delta_time, self.total_time)
    }

    /// Advance by an externally measured delta and return `(delta, absolute)`
    pub fn advance(&mut self, delta: f32) -> (f32, f32) {
        self.frame_count += 1;
        self.delta_time = delta;
        self.total_time += delta;
        self.anchor = self.total_time;
        self.fixed_ticks = 0;
        (self.delta_time, self.total_time)
    }

    /// Get the fixed step in seconds
    pub fn fixed_step(&self) -> f32 {
        self.fixed_step
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed scene time
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Simple stopwatch for measuring elapsed wall time (diagnostics only)
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }
}
