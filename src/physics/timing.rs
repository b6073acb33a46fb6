//! Frame-delta smoothing and the fixed-step accumulator

use crate::consts::*;

/// Weight of the previous smoothed delta in the running average
const DELTA_SMOOTHING: f64 = 0.9;
/// Slack when comparing the accumulator to a step (seconds); `f32` steps
/// such as 1/60 round slightly above a frame of the same nominal length
const STEP_EPSILON: f64 = 1e-6;

/// Reconciles variable host frame times with fixed simulation steps
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTimer {
    last_frame_ms: Option<f64>,
    smoothed_delta_ms: f64,
    /// Unsimulated time (seconds)
    accumulator: f64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last_frame_ms: None,
            smoothed_delta_ms: DEFAULT_FRAME_DELTA_MS,
            accumulator: 0.0,
        }
    }

    /// Forget elapsed time so the next frame doesn't see a stale spike
    pub fn resync(&mut self, now_ms: f64) {
        self.last_frame_ms = Some(now_ms);
        self.smoothed_delta_ms = DEFAULT_FRAME_DELTA_MS;
        self.accumulator = 0.0;
    }

    /// Feed a frame timestamp; returns the smoothed delta (ms) added
    ///
    /// The raw delta is clamped to [0, MAX_FRAME_DELTA_MS] so a clock going
    /// backwards or an app-suspend gap cannot flood the accumulator.
    pub fn advance(&mut self, now_ms: f64) -> f64 {
        let raw = match self.last_frame_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => DEFAULT_FRAME_DELTA_MS,
        };
        self.last_frame_ms = Some(now_ms);
        self.smoothed_delta_ms =
            self.smoothed_delta_ms * DELTA_SMOOTHING + raw * (1.0 - DELTA_SMOOTHING);
        self.accumulator += self.smoothed_delta_ms / 1000.0;
        self.smoothed_delta_ms
    }

    /// Take one step's worth of time if available
    pub fn consume(&mut self, step: f32) -> bool {
        let step = step as f64;
        if self.accumulator + STEP_EPSILON >= step {
            self.accumulator = (self.accumulator - step).max(0.0);
            true
        } else {
            false
        }
    }

    /// Drop all pending time (stepping ended early this frame)
    pub fn discard(&mut self) {
        self.accumulator = 0.0;
    }

    /// Cap the leftover carried into the next frame at two steps
    pub fn clamp_carry(&mut self, step: f32) {
        self.accumulator = self.accumulator.min(2.0 * step as f64);
    }

    /// Interpolation factor between the previous and current step
    pub fn alpha(&self, step: f32) -> f32 {
        (self.accumulator / step as f64).clamp(0.0, 1.0) as f32
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn smoothed_delta_ms(&self) -> f64 {
        self.smoothed_delta_ms
    }
}
