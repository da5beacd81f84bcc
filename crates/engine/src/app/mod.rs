mod bindings;
mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod physics;
mod rendering;
mod scheduler;
mod session;
mod simulation;
mod viewport;

pub use bindings::{KeyBindings, PlayerControls};
pub use geometry::{Aabb, Vec2};
pub use input::{InputLatch, KeyDisposition, KeyName};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_STEP_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use physics::{step_player, PhysicsParams, Player, PlayerIntent, Support};
pub use rendering::{Renderer, Viewport, WorldOverlays};
pub use scheduler::{
    FixedStepScheduler, FrameOutcome, SchedulerConfig, SchedulerState, DEFAULT_OVERLOAD_FRACTION,
    DEFAULT_TARGET_FPS, MAX_TARGET_FPS,
};
pub use session::{AppController, FramePlan, GameMode, PlaySession, TitleMenu};
pub use simulation::{Navigation, NavigationRequest, Simulation, FALL_MARGIN};
pub use viewport::{Comparison, SizeCheck, DEFAULT_MIN_VIEWPORT};
