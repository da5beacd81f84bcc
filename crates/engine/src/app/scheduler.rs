use std::time::Duration;

pub const DEFAULT_TARGET_FPS: u32 = 60;
/// Upper bound on `target_fps`; keeps the interval at one millisecond or more.
pub const MAX_TARGET_FPS: u32 = 1000;
/// Share of the interval a single step may take before catch-up stops.
/// Heuristic; tune freely.
pub const DEFAULT_OVERLOAD_FRACTION: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    pub target_fps: u32,
    pub overload_fraction: f32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            overload_fraction: DEFAULT_OVERLOAD_FRACTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    PausedForResize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    PausedForResize,
    Ran { steps: u32, overloaded: bool },
}

impl FrameOutcome {
    pub fn steps(&self) -> u32 {
        match self {
            FrameOutcome::PausedForResize => 0,
            FrameOutcome::Ran { steps, .. } => *steps,
        }
    }

    pub fn should_render_world(&self) -> bool {
        self.steps() > 0
    }
}

/// Fixed-timestep scheduler. Timestamps are offsets from an arbitrary
/// monotonic origin; the baseline is the time the next step is due from.
#[derive(Debug, Clone)]
pub struct FixedStepScheduler {
    state: SchedulerState,
    baseline: Duration,
    interval: Duration,
    overload_budget: Duration,
}

impl FixedStepScheduler {
    pub fn new(config: SchedulerConfig, now: Duration) -> Self {
        let target_fps = config.target_fps.clamp(1, MAX_TARGET_FPS);
        let interval = Duration::from_nanos(1_000_000_000 / u64::from(target_fps));
        let fraction = if config.overload_fraction.is_finite() && config.overload_fraction > 0.0
        {
            config.overload_fraction
        } else {
            DEFAULT_OVERLOAD_FRACTION
        };
        Self {
            state: SchedulerState::Running,
            baseline: now,
            interval,
            overload_budget: interval.mul_f64(f64::from(fraction)),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn baseline(&self) -> Duration {
        self.baseline
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn half_interval(&self) -> Duration {
        self.interval / 2
    }

    /// Steps the next tick would run if none of them overloads.
    pub fn pending_steps(&self, now: Duration) -> u32 {
        let mut elapsed = now.saturating_sub(self.baseline);
        let mut steps = 0u32;
        while elapsed >= self.half_interval() {
            elapsed = elapsed.saturating_sub(self.interval);
            steps = steps.saturating_add(1);
        }
        steps
    }

    /// Runs catch-up steps for one frame. `run_step` performs a single
    /// simulation step and returns how long it took.
    pub fn tick<F>(&mut self, now: Duration, viewport_ok: bool, mut run_step: F) -> FrameOutcome
    where
        F: FnMut() -> Duration,
    {
        if !viewport_ok {
            self.pause_for_resize();
            return FrameOutcome::PausedForResize;
        }
        if self.state == SchedulerState::PausedForResize {
            self.resume(now);
        }

        let mut elapsed = now.saturating_sub(self.baseline);
        let mut steps = 0u32;
        let mut overloaded = false;
        while elapsed >= self.half_interval() {
            let cost = run_step();
            steps = steps.saturating_add(1);
            self.baseline = self.baseline.saturating_add(self.interval);
            elapsed = elapsed.saturating_sub(self.interval);

            if cost > self.overload_budget {
                overloaded = true;
                let floor = now.saturating_sub(self.interval);
                if self.baseline < floor {
                    self.baseline = floor;
                }
                break;
            }
        }

        FrameOutcome::Ran { steps, overloaded }
    }

    fn pause_for_resize(&mut self) {
        self.state = SchedulerState::PausedForResize;
    }

    fn resume(&mut self, now: Duration) {
        self.state = SchedulerState::Running;
        self.baseline = now;
    }
}
