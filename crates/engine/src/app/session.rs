use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::content::Stage;

use super::{
    FixedStepScheduler, FrameOutcome, InputLatch, KeyBindings, KeyDisposition, KeyName,
    NavigationRequest, SchedulerConfig, SchedulerState, Simulation, SizeCheck,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TitleMenu {
    selected: usize,
}

impl TitleMenu {
    pub fn new(selected: usize) -> Self {
        Self { selected }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn move_up(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = (self.selected + len - 1) % len;
    }

    fn move_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1) % len;
    }
}

#[derive(Debug, Clone)]
pub struct PlaySession {
    stage_index: usize,
    simulation: Simulation,
    scheduler: FixedStepScheduler,
}

impl PlaySession {
    fn start(stage_index: usize, stage: Stage, config: SchedulerConfig, now: Duration) -> Self {
        Self {
            stage_index,
            simulation: Simulation::new(stage),
            scheduler: FixedStepScheduler::new(config, now),
        }
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn scheduler(&self) -> &FixedStepScheduler {
        &self.scheduler
    }
}

#[derive(Debug, Clone)]
pub enum GameMode {
    Title(TitleMenu),
    Playing(PlaySession),
}

/// What the event loop should draw for the frame that was just advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePlan {
    Title,
    SizeWarning(SizeCheck),
    World,
    /// No simulation step ran; the previous frame stays on screen.
    Nothing,
}

#[derive(Debug)]
pub struct AppController {
    stages: Vec<Stage>,
    bindings: KeyBindings,
    latch: InputLatch,
    mode: GameMode,
    scheduler_config: SchedulerConfig,
    min_viewport: (u32, u32),
    last_outcome: Option<FrameOutcome>,
}

impl AppController {
    pub fn new(
        stages: Vec<Stage>,
        bindings: KeyBindings,
        scheduler_config: SchedulerConfig,
        min_viewport: (u32, u32),
    ) -> Self {
        let latch = InputLatch::with_toggle_keys(bindings.toggle_keys());
        Self {
            stages,
            bindings,
            latch,
            mode: GameMode::Title(TitleMenu::default()),
            scheduler_config,
            min_viewport,
            last_outcome: None,
        }
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn latch(&self) -> &InputLatch {
        &self.latch
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name.as_str()).collect()
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        match &self.mode {
            GameMode::Playing(session) => Some(&session.simulation),
            GameMode::Title(_) => None,
        }
    }

    pub fn title_selection(&self) -> Option<usize> {
        match &self.mode {
            GameMode::Title(menu) => Some(menu.selected()),
            GameMode::Playing(_) => None,
        }
    }

    pub fn debug_overlay_enabled(&self) -> bool {
        self.latch.is_toggled(&self.bindings.debug_overlay)
    }

    pub fn help_overlay_enabled(&self) -> bool {
        self.latch.is_toggled(&self.bindings.help_overlay)
    }

    /// Outcome of the scheduler tick in the most recent `advance_frame`, if a
    /// stage was being played.
    pub fn last_outcome(&self) -> Option<FrameOutcome> {
        self.last_outcome
    }

    pub fn start_stage(&mut self, index: usize, now: Duration) -> bool {
        let Some(stage) = self.stages.get(index) else {
            warn!(index, stages = self.stages.len(), "stage_index_out_of_range");
            return false;
        };
        info!(stage = stage.name.as_str(), index, "stage_started");
        self.mode = GameMode::Playing(PlaySession::start(
            index,
            stage.clone(),
            self.scheduler_config,
            now,
        ));
        true
    }

    pub fn start_stage_by_name(&mut self, name: &str, now: Duration) -> bool {
        match self.stages.iter().position(|stage| stage.name == name) {
            Some(index) => self.start_stage(index, now),
            None => {
                warn!(stage = name, "stage_not_found");
                false
            }
        }
    }

    pub fn return_to_title(&mut self) {
        let selected = match &self.mode {
            GameMode::Playing(session) => session.stage_index,
            GameMode::Title(menu) => menu.selected(),
        };
        info!(selected, "returned_to_title");
        self.mode = GameMode::Title(TitleMenu::new(selected));
    }

    /// Feeds a key-down into the latch. OS auto-repeat presses are dropped
    /// so a held toggle key flips once. Keys whose default action is
    /// suppressed, and toggle keys, never reach the shortcut handling.
    pub fn handle_key_down(
        &mut self,
        key: &KeyName,
        repeat: bool,
        now: Duration,
    ) -> KeyDisposition {
        if repeat {
            return key.disposition();
        }
        let disposition = self.latch.press(key);
        if disposition == KeyDisposition::SuppressDefault || self.latch.is_toggle_key(key) {
            return disposition;
        }

        let stage_count = self.stages.len();
        match &mut self.mode {
            GameMode::Title(menu) => {
                if *key == self.bindings.menu_up {
                    menu.move_up(stage_count);
                } else if *key == self.bindings.menu_down {
                    menu.move_down(stage_count);
                } else if *key == self.bindings.menu_confirm {
                    let selected = menu.selected();
                    self.start_stage(selected, now);
                }
            }
            GameMode::Playing(session) => {
                if *key == self.bindings.return_to_title {
                    session
                        .simulation
                        .request_navigation(NavigationRequest::ReturnToTitle);
                } else if *key == self.bindings.reload {
                    session
                        .simulation
                        .request_navigation(NavigationRequest::Reload);
                }
            }
        }
        disposition
    }

    pub fn handle_key_up(&mut self, key: &KeyName) {
        self.latch.release(key);
    }

    pub fn handle_focus_lost(&mut self) {
        self.latch.release_all();
    }

    /// Runs the frame's catch-up steps and decides what to draw.
    /// `logical_viewport` is the window's inner size in logical pixels.
    /// `step_delay` is slept inside every step to simulate a slow machine.
    pub fn advance_frame(
        &mut self,
        now: Duration,
        logical_viewport: (u32, u32),
        step_delay: Duration,
    ) -> FramePlan {
        let GameMode::Playing(session) = &mut self.mode else {
            self.last_outcome = None;
            return FramePlan::Title;
        };

        let check = SizeCheck::new(logical_viewport, self.min_viewport);
        let was_paused = session.scheduler.state() == SchedulerState::PausedForResize;
        let latch = &self.latch;
        let bindings = &self.bindings;
        let stage_index = session.stage_index;
        let simulation = &mut session.simulation;
        let scheduler = &mut session.scheduler;
        let outcome = scheduler.tick(now, check.passes(), || {
            let started = Instant::now();
            if !step_delay.is_zero() {
                thread::sleep(step_delay);
            }
            simulation.step(latch, bindings);
            started.elapsed()
        });

        match outcome {
            FrameOutcome::PausedForResize if !was_paused => {
                info!(
                    width = %check.width.text(),
                    height = %check.height.text(),
                    "sim_paused_for_resize"
                );
            }
            FrameOutcome::Ran { .. } if was_paused => {
                info!(
                    baseline_ms = scheduler.baseline().as_secs_f64() * 1000.0,
                    "sim_resumed"
                );
            }
            _ => {}
        }
        if let FrameOutcome::Ran {
            steps,
            overloaded: true,
        } = outcome
        {
            warn!(
                steps,
                baseline_ms = scheduler.baseline().as_secs_f64() * 1000.0,
                now_ms = now.as_secs_f64() * 1000.0,
                "sim_overload_clamp"
            );
        }
        self.last_outcome = Some(outcome);

        let navigation = simulation.take_navigation();
        match navigation {
            Some(NavigationRequest::ReturnToTitle) => {
                self.return_to_title();
                return FramePlan::Title;
            }
            Some(NavigationRequest::Reload) => {
                self.start_stage(stage_index, now);
                return FramePlan::World;
            }
            None => {}
        }

        match outcome {
            FrameOutcome::PausedForResize => FramePlan::SizeWarning(check),
            outcome if outcome.should_render_world() => FramePlan::World,
            _ => FramePlan::Nothing,
        }
    }
}
