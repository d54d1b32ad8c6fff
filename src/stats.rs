//! Frame statistics for debugging and performance analysis.
//!
//! The app records every drawn frame and logic tick. With `debug` enabled a
//! summary is logged once per second, showing:
//! - Frames drawn and logic ticks run in that second
//! - Smoothed frames per second

use std::time::{Duration, Instant};

/// Weight kept from the previous average on each new sample.
const FPS_SMOOTHING: f32 = 0.9;

const LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Snapshot of accumulated frame statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub frames: u64,
    pub logic_ticks: u64,
    pub avg_fps: f32,
}

#[derive(Debug, Clone)]
pub struct FrameStats {
    frames: u64,
    logic_ticks: u64,
    last_frame: Option<Instant>,
    avg_fps: f32,
    // Counters for the periodic log line
    interval_start: Option<Instant>,
    interval_frames: u64,
    interval_ticks: u64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frames: 0,
            logic_ticks: 0,
            last_frame: None,
            avg_fps: 0.0,
            interval_start: None,
            interval_frames: 0,
            interval_ticks: 0,
        }
    }

    /// Record a drawn frame at `now` and update the average frame rate.
    /// Returns the time since the previous frame.
    pub fn record_frame(&mut self, now: Instant) -> Option<Duration> {
        self.frames += 1;
        self.interval_frames += 1;

        let delta = self.last_frame.map(|last| now.saturating_duration_since(last));
        self.last_frame = Some(now);

        if let Some(delta) = delta {
            let secs = delta.as_secs_f32();
            if secs > 0.0 {
                let fps = 1.0 / secs;
                self.avg_fps = if self.avg_fps == 0.0 {
                    fps
                } else {
                    self.avg_fps * FPS_SMOOTHING + fps * (1.0 - FPS_SMOOTHING)
                };
            }
        }
        delta
    }

    pub fn record_logic_tick(&mut self) {
        self.logic_ticks += 1;
        self.interval_ticks += 1;
    }

    /// Log a summary when a full interval has passed since the last one.
    pub fn log_if_due(&mut self, now: Instant) {
        let start = *self.interval_start.get_or_insert(now);
        if now.saturating_duration_since(start) < LOG_INTERVAL {
            return;
        }
        log::debug!(
            "[Frame Stats] frames={} ticks={} avg_fps={:.1}",
            self.interval_frames,
            self.interval_ticks,
            self.avg_fps
        );
        self.interval_start = Some(now);
        self.interval_frames = 0;
        self.interval_ticks = 0;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn logic_ticks(&self) -> u64 {
        self.logic_ticks
    }

    pub fn avg_fps(&self) -> f32 {
        self.avg_fps
    }

    pub fn last_frame(&self) -> Option<Instant> {
        self.last_frame
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames: self.frames,
            logic_ticks: self.logic_ticks,
            avg_fps: self.avg_fps,
        }
    }

    /// Reset all stats to zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}
