use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::content::{load_stages, StageLoadError};
use crate::{resolve_app_paths, StartupError};

use super::metrics::MetricsAccumulator;
use super::{
    AppController, FrameOutcome, FramePlan, KeyBindings, KeyName, Renderer, SchedulerConfig,
    WorldOverlays, DEFAULT_MIN_VIEWPORT,
};

pub const SLOW_STEP_ENV_VAR: &str = "SPLITJUMP_SLOW_STEP_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub scheduler: SchedulerConfig,
    pub min_viewport: (u32, u32),
    pub metrics_log_interval: Duration,
    pub simulated_slow_step_ms: u64,
    pub bindings: KeyBindings,
    /// Stage to open immediately instead of the title screen.
    pub start_stage: Option<String>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Split Jump".to_string(),
            window_width: 1320,
            window_height: 720,
            scheduler: SchedulerConfig::default(),
            min_viewport: DEFAULT_MIN_VIEWPORT,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_step_ms: 0,
            bindings: KeyBindings::default(),
            start_stage: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    StageLoad(#[from] StageLoadError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig) -> Result<(), AppError> {
    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        stages_dir = %app_paths.stages_dir.display(),
        "startup"
    );
    let stages = load_stages(&app_paths.stages_dir)?;

    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let step_delay = resolve_slow_step_delay(config.simulated_slow_step_ms);
    info!(
        target_fps = config.scheduler.target_fps,
        overload_fraction = config.scheduler.overload_fraction,
        min_viewport_width = config.min_viewport.0,
        min_viewport_height = config.min_viewport.1,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_step_delay_ms = step_delay.as_millis() as u64,
        "loop_config"
    );

    let mut controller = AppController::new(
        stages,
        config.bindings.clone(),
        config.scheduler,
        config.min_viewport,
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let asset_root = app_paths.root.join("assets");
    let mut renderer =
        Renderer::new(Arc::clone(&window), asset_root).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let loop_start = Instant::now();
    if let Some(name) = config.start_stage.as_deref() {
        controller.start_stage_by_name(name, loop_start.elapsed());
    }
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, last_frame_instant);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => {
                    controller.handle_focus_lost();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let Some(key) = KeyName::from_logical(&event.logical_key) else {
                        return;
                    };
                    match event.state {
                        ElementState::Pressed => {
                            controller.handle_key_down(&key, event.repeat, loop_start.elapsed());
                        }
                        ElementState::Released => controller.handle_key_up(&key),
                    }
                }
                WindowEvent::RedrawRequested => {
                    let frame_instant = Instant::now();
                    let frame_dt = frame_instant.saturating_duration_since(last_frame_instant);
                    last_frame_instant = frame_instant;

                    let now = frame_instant.saturating_duration_since(loop_start);
                    let viewport = logical_viewport(&window);
                    let plan = controller.advance_frame(now, viewport, step_delay);
                    if let Some(outcome) = controller.last_outcome() {
                        let overloaded = matches!(
                            outcome,
                            FrameOutcome::Ran {
                                overloaded: true,
                                ..
                            }
                        );
                        metrics_accumulator.record_steps(outcome.steps(), overloaded);
                    }

                    let rendered = match plan {
                        FramePlan::Title => {
                            let names = controller.stage_names();
                            let selected = controller.title_selection().unwrap_or(0);
                            renderer.render_title(&names, selected, controller.bindings())
                        }
                        FramePlan::SizeWarning(check) => renderer.render_size_warning(&check),
                        FramePlan::World => match controller.simulation() {
                            Some(simulation) => {
                                let overlays = WorldOverlays {
                                    debug: controller
                                        .debug_overlay_enabled()
                                        .then(|| metrics_accumulator.latest()),
                                    help: controller
                                        .help_overlay_enabled()
                                        .then(|| controller.bindings()),
                                };
                                renderer.render_world(simulation, overlays)
                            }
                            None => Ok(()),
                        },
                        FramePlan::Nothing => Ok(()),
                    };
                    if let Err(error) = rendered {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    metrics_accumulator.record_frame(frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(frame_instant) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            overloads = snapshot.overloads,
                            stage = controller
                                .simulation()
                                .map(|simulation| simulation.stage().name.as_str())
                                .unwrap_or("<title>"),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn logical_viewport(window: &Window) -> (u32, u32) {
    let size = window.inner_size().to_logical::<u32>(window.scale_factor());
    (size.width, size.height)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_slow_step_delay(config_slow_step_ms: u64) -> Duration {
    slow_step_delay_from(env::var(SLOW_STEP_ENV_VAR), config_slow_step_ms)
}

fn slow_step_delay_from(
    value: Result<String, env::VarError>,
    config_slow_step_ms: u64,
) -> Duration {
    match value {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_STEP_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-step env var value; falling back to config"
                );
                Duration::from_millis(config_slow_step_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_step_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_STEP_ENV_VAR,
                error = %err,
                "unable to read slow-step env var; falling back to config"
            );
            Duration::from_millis(config_slow_step_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_metrics_interval_falls_back() {
        let fallback = Duration::from_secs(1);
        assert_eq!(normalize_non_zero_duration(Duration::ZERO, fallback), fallback);
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(250), fallback),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn slow_step_env_value_overrides_config() {
        assert_eq!(
            slow_step_delay_from(Ok(" 12 ".to_string()), 0),
            Duration::from_millis(12)
        );
    }

    #[test]
    fn missing_or_invalid_slow_step_uses_config() {
        assert_eq!(
            slow_step_delay_from(Err(env::VarError::NotPresent), 3),
            Duration::from_millis(3)
        );
        assert_eq!(
            slow_step_delay_from(Ok("fast".to_string()), 5),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn default_config_targets_sixty_fps_with_split_minimum() {
        let config = LoopConfig::default();
        assert_eq!(config.scheduler.target_fps, 60);
        assert_eq!(config.min_viewport, (1300, 600));
        assert!(config.window_width >= config.min_viewport.0);
        assert!(config.start_stage.is_none());
    }
}
