use crate::app::{KeyBindings, LoopMetricsSnapshot, SizeCheck, Simulation, Support};
use crate::content::{LaneSide, Rgba};

use super::canvas::Canvas;
use super::font::{draw_text, TextStyle};

const OVERLAY_SCALE: i32 = 2;
const OVERLAY_PADDING: i32 = 6 * OVERLAY_SCALE;
const PANEL_INSET_X: i32 = 4 * OVERLAY_SCALE;
const PANEL_INSET_Y: i32 = 3 * OVERLAY_SCALE;
const TEXT_PRIMARY_COLOR: Rgba = [244, 248, 252, 255];
const TEXT_DIM_COLOR: Rgba = [176, 198, 220, 255];
const PANEL_BG_COLOR: Rgba = [10, 12, 16, 210];
const PANEL_BORDER_COLOR: Rgba = [92, 106, 126, 255];
const WARNING_BG_COLOR: Rgba = [14, 14, 18, 255];
pub(crate) const PASS_COLOR: Rgba = [96, 210, 120, 255];
pub(crate) const FAIL_COLOR: Rgba = [235, 80, 80, 255];
const TITLE_BG_COLOR: Rgba = [18, 20, 28, 255];
const TITLE_ACCENT_COLOR: Rgba = [240, 196, 64, 255];
const WARNING_SCALE: i32 = 4;
const TITLE_SCALE: i32 = 6;
const MENU_SCALE: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OverlayLine {
    pub text: String,
    pub color: Rgba,
}

impl OverlayLine {
    fn primary(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: TEXT_PRIMARY_COLOR,
        }
    }

    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: TEXT_DIM_COLOR,
        }
    }
}

pub(crate) fn debug_overlay_lines(
    simulation: &Simulation,
    metrics: LoopMetricsSnapshot,
) -> Vec<OverlayLine> {
    let mut lines = vec![
        OverlayLine::heading("Perf"),
        OverlayLine::primary(format!("FPS: {:.0}", metrics.fps)),
        OverlayLine::primary(format!("TPS: {:.1}", metrics.tps)),
        OverlayLine::primary(format!("Frame: {:.2} ms", metrics.frame_time_ms)),
        OverlayLine::primary(format!("Overloads: {}", metrics.overloads)),
        OverlayLine::primary(String::new()),
        OverlayLine::heading("Stage"),
        OverlayLine::primary(format!("name: {}", simulation.stage().name)),
        OverlayLine::primary(format!("steps: {}", simulation.step_count())),
    ];
    for side in LaneSide::ALL {
        let player = simulation.player(side);
        lines.push(OverlayLine::primary(format!(
            "{} pos {:.1},{:.1} vel {:.1},{:.1} {}",
            side.label(),
            player.position.x,
            player.position.y,
            player.velocity.x,
            player.velocity.y,
            support_text(player.support)
        )));
    }
    lines
}

fn support_text(support: Support) -> &'static str {
    match support {
        Support::Grounded => "grounded",
        Support::Airborne => "airborne",
    }
}

pub(crate) fn help_overlay_lines(bindings: &KeyBindings) -> Vec<OverlayLine> {
    vec![
        OverlayLine::heading("Controls"),
        OverlayLine::primary(format!(
            "top: {} / {} move, {} jump",
            bindings.top.left, bindings.top.right, bindings.top.jump
        )),
        OverlayLine::primary(format!(
            "bottom: {} / {} move, {} jump",
            bindings.bottom.left, bindings.bottom.right, bindings.bottom.jump
        )),
        OverlayLine::primary(format!("{}: reload stage", bindings.reload)),
        OverlayLine::primary(format!("{}: back to title", bindings.return_to_title)),
        OverlayLine::primary(format!(
            "{}: debug  {}: this help",
            bindings.debug_overlay, bindings.help_overlay
        )),
    ]
}

pub(crate) fn size_warning_lines(check: &SizeCheck) -> Vec<OverlayLine> {
    let status_color = |passes: bool| if passes { PASS_COLOR } else { FAIL_COLOR };
    vec![
        OverlayLine::primary("Window too small"),
        OverlayLine {
            text: format!("width: {}", check.width.text()),
            color: status_color(check.width.passes()),
        },
        OverlayLine {
            text: format!("height: {}", check.height.text()),
            color: status_color(check.height.passes()),
        },
        OverlayLine::heading("Resize the window to continue"),
    ]
}

/// Draws lines on a translucent panel anchored at `(left, top)` and returns
/// the y coordinate just below the panel.
pub(crate) fn draw_panel(
    canvas: &mut Canvas<'_>,
    left: i32,
    top: i32,
    lines: &[OverlayLine],
) -> i32 {
    if lines.is_empty() || canvas.width() == 0 || canvas.height() == 0 {
        return top;
    }
    let style = TextStyle::new(OVERLAY_SCALE, TEXT_PRIMARY_COLOR);
    let longest = lines
        .iter()
        .map(|line| style.text_width(&line.text))
        .max()
        .unwrap_or(0);
    let panel_width = longest + PANEL_INSET_X * 2;
    let panel_height = lines.len() as i32 * style.line_height() + PANEL_INSET_Y * 2;
    let panel_left = left + OVERLAY_PADDING - PANEL_INSET_X;
    let panel_top = top + OVERLAY_PADDING - PANEL_INSET_Y;
    canvas.fill_rect(panel_left, panel_top, panel_width, panel_height, PANEL_BG_COLOR);
    canvas.outline_rect(
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        PANEL_BORDER_COLOR,
    );

    let mut y = top + OVERLAY_PADDING;
    for line in lines {
        draw_text(
            canvas,
            left + OVERLAY_PADDING,
            y,
            &line.text,
            TextStyle::new(OVERLAY_SCALE, line.color),
        );
        y += style.line_height();
    }
    panel_top + panel_height
}

pub(crate) fn draw_size_warning(canvas: &mut Canvas<'_>, check: &SizeCheck) {
    canvas.clear(WARNING_BG_COLOR);
    let lines = size_warning_lines(check);
    let line_height = TextStyle::new(WARNING_SCALE, TEXT_PRIMARY_COLOR).line_height();
    let block_height = lines.len() as i32 * line_height;
    let mut y = (canvas.height() as i32 - block_height) / 2;
    for line in &lines {
        let style = TextStyle::new(WARNING_SCALE, line.color);
        let x = (canvas.width() as i32 - style.text_width(&line.text)) / 2;
        draw_text(canvas, x.max(0), y, &line.text, style);
        y += line_height;
    }
}

pub(crate) fn draw_title(
    canvas: &mut Canvas<'_>,
    stage_names: &[&str],
    selected: usize,
    bindings: &KeyBindings,
) {
    canvas.clear(TITLE_BG_COLOR);
    let title_style = TextStyle::new(TITLE_SCALE, TITLE_ACCENT_COLOR);
    let title = "SPLIT JUMP";
    let canvas_width = canvas.width() as i32;
    let center_x =
        |style: TextStyle, text: &str| ((canvas_width - style.text_width(text)) / 2).max(0);
    let mut y = (canvas.height() as i32 / 5).max(OVERLAY_PADDING);
    let title_x = center_x(title_style, title);
    draw_text(canvas, title_x, y, title, title_style);
    y += title_style.line_height() * 2;

    for (index, name) in stage_names.iter().enumerate() {
        let is_selected = index == selected;
        let style = TextStyle::new(
            MENU_SCALE,
            if is_selected {
                TEXT_PRIMARY_COLOR
            } else {
                TEXT_DIM_COLOR
            },
        );
        let entry = if is_selected {
            format!("> {name} <")
        } else {
            name.to_string()
        };
        let x = center_x(style, &entry);
        draw_text(canvas, x, y, &entry, style);
        y += style.line_height();
    }

    let hint = format!(
        "{} / {} select   {} start",
        bindings.menu_up, bindings.menu_down, bindings.menu_confirm
    );
    let hint_style = TextStyle::new(OVERLAY_SCALE, TEXT_DIM_COLOR);
    y += hint_style.line_height();
    let hint_x = center_x(hint_style, &hint);
    draw_text(canvas, hint_x, y, &hint, hint_style);
}
