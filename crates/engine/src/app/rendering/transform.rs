use crate::app::{Aabb, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Maps lane coordinates onto one split surface. The lane height is scaled
/// to fill the surface; horizontally the view follows a focus point and is
/// clamped to the lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LaneView {
    scale: f32,
    offset_x: f32,
}

impl LaneView {
    pub(crate) fn new(lane_size: Vec2, surface: Viewport, focus_x: f32) -> Self {
        let scale = if lane_size.y > 0.0 {
            surface.height as f32 / lane_size.y
        } else {
            1.0
        };
        let visible_width = surface.width as f32 / scale;
        let max_offset = (lane_size.x - visible_width).max(0.0);
        let offset_x = (focus_x - visible_width * 0.5).clamp(0.0, max_offset);
        Self { scale, offset_x }
    }

    #[cfg(test)]
    fn scale(&self) -> f32 {
        self.scale
    }

    pub(crate) fn to_screen(&self, point: Vec2) -> (i32, i32) {
        let x = (point.x - self.offset_x) * self.scale;
        let y = point.y * self.scale;
        (x.round() as i32, y.round() as i32)
    }

    /// Screen rectangle as (x, y, width, height). Edges are rounded
    /// independently so adjacent tiles never leave gaps.
    pub(crate) fn to_screen_rect(&self, rect: Aabb) -> (i32, i32, i32, i32) {
        let (left, top) = self.to_screen(Vec2::new(rect.left(), rect.top()));
        let (right, bottom) = self.to_screen(Vec2::new(rect.right(), rect.bottom()));
        (left, top, right - left, bottom - top)
    }
}
