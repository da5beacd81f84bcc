use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{KeyBindings, LoopMetricsSnapshot, Player, SizeCheck, Simulation, Vec2};
use crate::content::{Lane, LaneSide, Rgba};

use super::canvas::{Canvas, RgbaImage};
use super::overlay::{
    debug_overlay_lines, draw_panel, draw_size_warning, draw_title, help_overlay_lines,
};
use super::transform::{LaneView, Viewport};

const DIVIDER_COLOR: Rgba = [6, 7, 10, 255];
const DIVIDER_THICKNESS: i32 = 2;
const OBJECT_EDGE_SHADE: u8 = 28;

/// Overlays requested for a world frame. `None` hides the panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldOverlays<'a> {
    pub debug: Option<LoopMetricsSnapshot>,
    pub help: Option<&'a KeyBindings>,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    asset_root: PathBuf,
    sprite_cache: HashMap<String, Option<RgbaImage>>,
    warned_missing_sprite_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, asset_root: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            asset_root,
            sprite_cache: HashMap::new(),
            warned_missing_sprite_keys: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn render_world(
        &mut self,
        simulation: &Simulation,
        overlays: WorldOverlays<'_>,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        for side in LaneSide::ALL {
            if let Some(key) = simulation.stage().lane(side).sprite.as_deref() {
                ensure_sprite_cached(
                    &mut self.sprite_cache,
                    &mut self.warned_missing_sprite_keys,
                    &self.asset_root,
                    key,
                );
            }
        }

        let Viewport { width, height } = self.viewport;
        let sprite_cache = &self.sprite_cache;
        let mut canvas = Canvas::new(self.pixels.frame_mut(), width, height);
        draw_split_world(&mut canvas, simulation, |key| {
            sprite_cache.get(key).and_then(Option::as_ref)
        });
        draw_world_overlays(&mut canvas, simulation, overlays);
        self.pixels.render()
    }

    pub fn render_size_warning(&mut self, check: &SizeCheck) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let Viewport { width, height } = self.viewport;
        let mut canvas = Canvas::new(self.pixels.frame_mut(), width, height);
        draw_size_warning(&mut canvas, check);
        self.pixels.render()
    }

    pub fn render_title(
        &mut self,
        stage_names: &[&str],
        selected: usize,
        bindings: &KeyBindings,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let Viewport { width, height } = self.viewport;
        let mut canvas = Canvas::new(self.pixels.frame_mut(), width, height);
        draw_title(&mut canvas, stage_names, selected, bindings);
        self.pixels.render()
    }
}

/// Top lane in the upper half, bottom lane in the lower half. Each half only
/// ever sees its own rows of the frame.
pub(crate) fn draw_split_world<'s, F>(
    canvas: &mut Canvas<'_>,
    simulation: &Simulation,
    sprite_for: F,
) where
    F: Fn(&str) -> Option<&'s RgbaImage>,
{
    let width = canvas.width();
    let height = canvas.height();
    let half = height / 2;
    let (mut upper, mut lower) = canvas.reborrow().split_rows(half);

    for (side, surface) in [(LaneSide::Top, &mut upper), (LaneSide::Bottom, &mut lower)] {
        let lane = simulation.stage().lane(side);
        let sprite = lane.sprite.as_deref().and_then(&sprite_for);
        draw_lane(surface, lane, simulation.player(side), sprite);
    }

    let divider_top = half as i32 - DIVIDER_THICKNESS / 2;
    canvas.fill_rect(0, divider_top, width as i32, DIVIDER_THICKNESS, DIVIDER_COLOR);
}

fn draw_world_overlays(
    canvas: &mut Canvas<'_>,
    simulation: &Simulation,
    overlays: WorldOverlays<'_>,
) {
    let mut top = 0;
    if let Some(metrics) = overlays.debug {
        let lines = debug_overlay_lines(simulation, metrics);
        top = draw_panel(canvas, 0, top, &lines);
    }
    if let Some(bindings) = overlays.help {
        draw_panel(canvas, 0, top, &help_overlay_lines(bindings));
    }
}

/// Draws one lane onto its own surface: background, static objects, then the
/// player as a sprite when one is loaded and as a filled rectangle otherwise.
pub(crate) fn draw_lane(
    canvas: &mut Canvas<'_>,
    lane: &Lane,
    player: &Player,
    sprite: Option<&RgbaImage>,
) {
    canvas.clear(lane.background);
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }
    let view = LaneView::new(
        Vec2::new(lane.width, lane.height),
        Viewport {
            width: canvas.width(),
            height: canvas.height(),
        },
        player.position.x + player.size.x * 0.5,
    );

    for object in &lane.objects {
        let (x, y, w, h) = view.to_screen_rect(object.rect);
        canvas.fill_rect(x, y, w, h, object.color);
        canvas.outline_rect(x, y, w, h, shade(object.color));
    }

    let (x, y, w, h) = view.to_screen_rect(player.bounds());
    match sprite {
        Some(image) => canvas.blit_scaled(image, x, y, w, h),
        None => canvas.fill_rect(x, y, w, h, lane.player_color),
    }
}

fn shade(color: Rgba) -> Rgba {
    [
        color[0].saturating_sub(OBJECT_EDGE_SHADE),
        color[1].saturating_sub(OBJECT_EDGE_SHADE),
        color[2].saturating_sub(OBJECT_EDGE_SHADE),
        color[3],
    ]
}

fn ensure_sprite_cached(
    cache: &mut HashMap<String, Option<RgbaImage>>,
    warned_missing_sprite_keys: &mut HashSet<String>,
    asset_root: &Path,
    key: &str,
) {
    if cache.contains_key(key) {
        return;
    }
    let sprite = match sprite_image_path(asset_root, key) {
        Ok(path) => match load_sprite_rgba(&path) {
            Ok(sprite) => Some(sprite),
            Err(reason) => {
                warn_sprite_load_once(warned_missing_sprite_keys, key, Some(&path), &reason);
                None
            }
        },
        Err(reason) => {
            warn_sprite_load_once(warned_missing_sprite_keys, key, None, &reason);
            None
        }
    };
    cache.insert(key.to_string(), sprite);
}

/// Sprite keys are relative names under `assets/sprites`, without extension.
fn sprite_image_path(asset_root: &Path, key: &str) -> Result<PathBuf, String> {
    if key.is_empty() {
        return Err("invalid_key:empty".to_string());
    }
    if key.starts_with('/') || key.contains('\\') || key.contains("..") {
        return Err(format!("invalid_key:escapes_sprite_dir:{key}"));
    }
    let allowed = |ch: char| ch.is_ascii_lowercase() || ch.is_ascii_digit() || "_/-".contains(ch);
    if let Some(ch) = key.chars().find(|ch| !allowed(*ch)) {
        return Err(format!("invalid_key:character:{ch}"));
    }
    Ok(asset_root.join("sprites").join(format!("{key}.png")))
}

fn load_sprite_rgba(path: &Path) -> Result<RgbaImage, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(RgbaImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_sprite_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        sprite_key = key,
        path = %path_display,
        reason = reason,
        "sprite_load_failed_using_rectangle"
    );
}
