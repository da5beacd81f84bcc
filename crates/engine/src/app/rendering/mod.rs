mod canvas;
mod font;
mod overlay;
mod renderer;
mod transform;

pub use renderer::{Renderer, WorldOverlays};
pub use transform::Viewport;
