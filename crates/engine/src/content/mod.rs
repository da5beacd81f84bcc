mod loader;
mod stage;

pub use loader::{load_stage_file, load_stages, parse_stage, StageLoadError};
pub use stage::{parse_color, Gimmick, Lane, LaneSide, Rgba, Stage, StaticObject};
