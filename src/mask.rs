// The scratch-off layer: an off-screen ARGB buffer that strokes punch holes into.
// Visual: the opaque gray (or chosen color) card face; every drag leaves a
// round-capped transparent trail through it.
// Pixels are packed 0xAARRGGBB and an erased pixel is always exactly 0.
// Erasing only lowers alpha; opacity returns only through resize or full_reset.

use std::sync::Arc;

use crate::error::MaskError;
use crate::percent;
use crate::types::{Argb, Point};
use crate::watermark::Watermark;

/// Off-screen mask buffer plus the paint settings used to (re)fill it.
#[derive(Debug)]
pub struct MaskSurface {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    mask_color: Argb,
    watermark: Option<Watermark>,
}

impl MaskSurface {
    /// An uninitialized (0×0) surface; call [`resize`](Self::resize) once the view size is known.
    pub fn new(mask_color: Argb, watermark: Option<Watermark>) -> Self {
        Self { width: 0, height: 0, pixels: Vec::new(), mask_color, watermark }
    }

    pub fn is_initialized(&self) -> bool {
        !self.pixels.is_empty()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn mask_color(&self) -> Argb {
        self.mask_color
    }

    /// Takes effect on the next resize/reset; already painted pixels keep their color.
    pub fn set_mask_color(&mut self, color: Argb) {
        self.mask_color = color;
    }

    pub fn watermark(&self) -> Option<&Watermark> {
        self.watermark.as_ref()
    }

    /// Takes effect on the next resize/reset.
    pub fn set_watermark(&mut self, watermark: Option<Watermark>) {
        self.watermark = watermark;
    }

    /// Allocate a fresh, fully opaque buffer of `width`×`height`.
    ///
    /// Any prior erase progress is discarded. Zero-sized requests are rejected
    /// and leave the current buffer (or the uninitialized state) untouched.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), MaskError> {
        if width == 0 || height == 0 {
            return Err(MaskError::InvalidDimension { width, height });
        }

        let mut pixels = vec![self.mask_color.0; width * height];
        if let Some(wm) = &self.watermark {
            wm.tile_over(&mut pixels, width, height);
        }

        self.width = width;
        self.height = height;
        self.pixels = pixels;
        tracing::debug!(
            width,
            height,
            color = %self.mask_color,
            watermark = self.watermark.is_some(),
            "mask repainted"
        );
        Ok(())
    }

    /// Repaint at the current size. No-op on an uninitialized surface.
    pub fn full_reset(&mut self) {
        if !self.is_initialized() {
            return;
        }
        let (w, h) = (self.width, self.height);
        // dimensions came from a successful resize, so this cannot fail
        let _ = self.resize(w, h);
    }

    /// Erase every pixel without changing the size.
    pub fn fully_clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Punch a round-capped, round-joined transparent stroke along `polyline`.
    ///
    /// Pixels whose centre lies within `width / 2 - 0.5` of the polyline become
    /// fully transparent; the one-pixel rim beyond that loses alpha in
    /// proportion to its coverage. A single point stamps a round dot.
    /// Returns how many pixels changed.
    pub fn apply_stroke(&mut self, polyline: &[Point], stroke_width: f32) -> usize {
        if !self.is_initialized() || !stroke_width.is_finite() || stroke_width <= 0.0 {
            return 0;
        }
        let radius = stroke_width * 0.5;

        match polyline {
            [] => 0,
            [p] => self.erase_segment(*p, *p, radius),
            _ => polyline.windows(2).map(|seg| self.erase_segment(seg[0], seg[1], radius)).sum(),
        }
    }

    fn erase_segment(&mut self, a: Point, b: Point, radius: f32) -> usize {
        if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
            return 0;
        }

        let pad = radius + 1.0;
        let x0 = ((a.x.min(b.x) - pad).floor().max(0.0)) as usize;
        let y0 = ((a.y.min(b.y) - pad).floor().max(0.0)) as usize;
        let x1 = ((a.x.max(b.x) + pad).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((a.y.max(b.y) + pad).ceil().max(0.0) as usize).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return 0;
        }

        let mut changed = 0;
        for y in y0..y1 {
            let row = y * self.width;
            for x in x0..x1 {
                let px = &mut self.pixels[row + x];
                if *px == 0 {
                    continue;
                }
                let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let dist = point_segment_distance_sq(centre, a, b).sqrt();
                let coverage = (radius + 0.5 - dist).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }

                let alpha = (*px >> 24) as f32;
                let kept = (alpha * (1.0 - coverage)).floor() as u32;
                let next = if kept == 0 { 0 } else { (*px & 0x00FF_FFFF) | (kept << 24) };
                if next != *px {
                    *px = next;
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Live pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Immutable copy of the current buffer, safe to hand to another thread.
    pub fn snapshot(&self) -> MaskSnapshot {
        MaskSnapshot { width: self.width, height: self.height, pixels: Arc::from(self.pixels.as_slice()) }
    }

    /// Number of fully erased pixels right now.
    pub fn erased_count(&self) -> usize {
        percent::count_erased(&self.pixels)
    }
}

/// A frozen copy of the mask taken at one point in time.
#[derive(Clone, Debug)]
pub struct MaskSnapshot {
    width: usize,
    height: usize,
    pixels: Arc<[u32]>,
}

impl MaskSnapshot {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn erased_count(&self) -> usize {
        percent::count_erased(&self.pixels)
    }

    /// Percent of erased pixels in [0, 100]; 0 for an empty snapshot.
    pub fn erase_percent(&self) -> f32 {
        percent::scan_percent(&self.pixels)
    }
}

fn point_segment_distance_sq(p: Point, a: Point, b: Point) -> f32 {
    let vx = b.x - a.x;
    let vy = b.y - a.y;
    let wx = p.x - a.x;
    let wy = p.y - a.y;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = p.x - (a.x + vx * t);
    let dy = p.y - (a.y + vy * t);
    dx * dx + dy * dy
}
