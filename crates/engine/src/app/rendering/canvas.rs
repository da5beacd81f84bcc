use crate::content::Rgba;

/// Tightly packed RGBA8 image, e.g. a decoded sprite.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Mutable view over a packed RGBA8 frame. All drawing is clipped to the
/// view, so out-of-range coordinates are safe.
pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        let rows_available = if width == 0 {
            0
        } else {
            (frame.len() / 4 / width as usize) as u32
        };
        Self {
            frame,
            width,
            height: height.min(rows_available),
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn reborrow(&mut self) -> Canvas<'_> {
        Canvas {
            frame: &mut *self.frame,
            width: self.width,
            height: self.height,
        }
    }

    /// Splits into two disjoint canvases: rows `[0, row)` and `[row, height)`.
    pub(crate) fn split_rows(self, row: u32) -> (Canvas<'a>, Canvas<'a>) {
        let row = row.min(self.height);
        let split_at = row as usize * self.width as usize * 4;
        let (upper, lower) = self.frame.split_at_mut(split_at);
        (
            Canvas {
                frame: upper,
                width: self.width,
                height: row,
            },
            Canvas {
                frame: lower,
                width: self.width,
                height: self.height - row,
            },
        )
    }

    pub(crate) fn clear(&mut self, color: Rgba) {
        let used = self.width as usize * self.height as usize * 4;
        for chunk in self.frame[..used].chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub(crate) fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        if color[3] == 255 {
            self.frame[offset..offset + 4].copy_from_slice(&color);
        } else {
            let dst = &mut self.frame[offset..offset + 4];
            blend_into(dst, color);
        }
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(out)
    }

    pub(crate) fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        color: Rgba,
    ) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(rect_width).min(self.width as i32);
        let end_y = y.saturating_add(rect_height).min(self.height as i32);
        if end_x <= start_x || end_y <= start_y {
            return;
        }
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.put_pixel(px, py, color);
            }
        }
    }

    pub(crate) fn outline_rect(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        color: Rgba,
    ) {
        if rect_width <= 1 || rect_height <= 1 {
            return;
        }
        self.fill_rect(x, y, rect_width, 1, color);
        self.fill_rect(x, y + rect_height - 1, rect_width, 1, color);
        self.fill_rect(x, y, 1, rect_height, color);
        self.fill_rect(x + rect_width - 1, y, 1, rect_height, color);
    }

    /// Nearest-neighbour scaled blit into the target rectangle. Fully
    /// transparent texels are skipped.
    pub(crate) fn blit_scaled(
        &mut self,
        image: &RgbaImage,
        x: i32,
        y: i32,
        target_width: i32,
        target_height: i32,
    ) {
        if image.width == 0 || image.height == 0 || target_width <= 0 || target_height <= 0 {
            return;
        }
        for ty in 0..target_height {
            let sy = (ty as i64 * image.height as i64 / target_height as i64) as usize;
            for tx in 0..target_width {
                let sx = (tx as i64 * image.width as i64 / target_width as i64) as usize;
                let offset = (sy * image.width as usize + sx) * 4;
                let Some(texel) = image.rgba.get(offset..offset + 4) else {
                    continue;
                };
                if texel[3] == 0 {
                    continue;
                }
                self.put_pixel(x + tx, y + ty, [texel[0], texel[1], texel[2], texel[3]]);
            }
        }
    }
}

fn blend_into(dst: &mut [u8], src: Rgba) {
    let alpha = u16::from(src[3]);
    let inverse = 255 - alpha;
    for channel in 0..3 {
        let mixed = (u16::from(src[channel]) * alpha + u16::from(dst[channel]) * inverse) / 255;
        dst[channel] = mixed as u8;
    }
    dst[3] = 255;
}
