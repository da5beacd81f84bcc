use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub overloads: u32,
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    steps: u32,
    overloads: u32,
    frame_time_sum: Duration,
    latest: LoopMetricsSnapshot,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval_start: now,
            interval,
            frames: 0,
            steps: 0,
            overloads: 0,
            frame_time_sum: Duration::ZERO,
            latest: LoopMetricsSnapshot::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    pub(crate) fn record_steps(&mut self, steps: u32, overloaded: bool) {
        self.steps = self.steps.saturating_add(steps);
        if overloaded {
            self.overloads = self.overloads.saturating_add(1);
        }
    }

    pub(crate) fn latest(&self) -> LoopMetricsSnapshot {
        self.latest
    }

    /// Publishes a fresh snapshot once the interval has elapsed.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.steps as f32 / elapsed_seconds,
            frame_time_ms,
            overloads: self.overloads,
        };

        self.interval_start = now;
        self.frames = 0;
        self.steps = 0;
        self.overloads = 0;
        self.frame_time_sum = Duration::ZERO;
        self.latest = snapshot;

        Some(snapshot)
    }
}
