// The scratch card as a host-facing component.
// Visual: one card that repaints when told to, follows the window size, and
// reports how much of it has been scratched away.
// ScratchView owns the mask, the gesture controller and the percent tracker.
// It is driven from one thread; only percentage scans leave it.

use std::time::Duration;

use crate::compose;
use crate::gamma::GammaLut;
use crate::gesture::{GestureController, GestureResponse};
use crate::mask::{MaskSnapshot, MaskSurface};
use crate::percent::ErasePercentTracker;
use crate::types::{Argb, FrameBuffer, Point};
use crate::watermark::Watermark;

/// Default eraser width in device-independent units.
pub const DEFAULT_ERASER_SIZE: f32 = 60.0;
/// Default touch threshold in device-independent units.
pub const DEFAULT_TOUCH_SLOP: f32 = 8.0;
/// Default mask color: opaque gray.
pub const DEFAULT_MASK_COLOR: Argb = Argb::GRAY;

/// Initial settings of a [`ScratchView`].
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub mask_color: Argb,
    /// Eraser width in device-independent units.
    pub eraser_size: f32,
    pub watermark: Option<Watermark>,
    /// Pixels per device-independent unit.
    pub density: f32,
    /// Minimum per-axis pointer travel in device-independent units.
    pub touch_slop: f32,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            mask_color: DEFAULT_MASK_COLOR,
            eraser_size: DEFAULT_ERASER_SIZE,
            watermark: None,
            density: 1.0,
            touch_slop: DEFAULT_TOUCH_SLOP,
        }
    }
}

#[derive(Debug)]
pub struct ScratchView {
    surface: MaskSurface,
    gesture: GestureController,
    tracker: ErasePercentTracker,
    eraser_size: f32,
    density: f32,
    redraw: bool,
}

impl ScratchView {
    pub fn new(options: ViewOptions) -> Self {
        let density = if options.density.is_finite() && options.density > 0.0 { options.density } else { 1.0 };
        let eraser_size = if options.eraser_size.is_finite() && options.eraser_size > 0.0 {
            options.eraser_size
        } else {
            DEFAULT_ERASER_SIZE
        };
        Self {
            surface: MaskSurface::new(options.mask_color, options.watermark),
            gesture: GestureController::new(options.touch_slop * density),
            tracker: ErasePercentTracker::new(),
            eraser_size,
            density,
            redraw: false,
        }
    }

    /* ---------- settings ---------- */

    /// Mask color for the next `reset`/resize.
    pub fn set_mask_color(&mut self, color: Argb) {
        self.surface.set_mask_color(color);
    }

    pub fn mask_color(&self) -> Argb {
        self.surface.mask_color()
    }

    /// Eraser width in device-independent units; non-positive or non-finite sizes are ignored.
    pub fn set_eraser_size(&mut self, size: f32) -> bool {
        if !size.is_finite() || size <= 0.0 {
            tracing::warn!(size, "ignoring invalid eraser size");
            return false;
        }
        self.eraser_size = size;
        true
    }

    pub fn eraser_size(&self) -> f32 {
        self.eraser_size
    }

    /// Eraser width in buffer pixels.
    pub fn stroke_width(&self) -> f32 {
        self.eraser_size * self.density
    }

    /// Watermark for the next `reset`/resize; `None` removes it.
    pub fn set_watermark(&mut self, watermark: Option<Watermark>) {
        self.surface.set_watermark(watermark);
    }

    pub fn has_watermark(&self) -> bool {
        self.surface.watermark().is_some()
    }

    /* ---------- actions ---------- */

    /// Restore the full mask and recompute the percentage.
    pub fn reset(&mut self) {
        self.gesture.cancel();
        if self.surface.is_initialized() {
            self.surface.full_reset();
        } else {
            tracing::debug!("reset before the view has a size, nothing to repaint");
        }
        tracing::info!(color = %self.surface.mask_color(), watermark = self.has_watermark(), "mask reset");
        self.redraw = true;
        self.schedule_scan();
    }

    /// Erase the whole mask (same size) and recompute the percentage.
    pub fn clear(&mut self) {
        self.gesture.cancel();
        self.surface.fully_clear();
        tracing::info!("mask cleared");
        self.redraw = true;
        self.schedule_scan();
    }

    /* ---------- events ---------- */

    /// The host's drawable size changed: rebuild the mask, losing all progress.
    pub fn size_changed(&mut self, width: usize, height: usize) {
        if self.surface.is_initialized() && self.surface.dimensions() == (width, height) {
            return;
        }
        match self.surface.resize(width, height) {
            Ok(()) => {
                self.gesture.cancel();
                self.redraw = true;
                tracing::info!(width, height, "mask resized");
            }
            Err(err) => tracing::warn!(%err, "ignoring size change"),
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let response = self.gesture.pointer_down(Point::new(x, y));
        self.handle(response);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let width = self.stroke_width();
        let response = self.gesture.pointer_move(Point::new(x, y), &mut self.surface, width);
        self.handle(response);
    }

    pub fn pointer_up(&mut self) {
        let response = self.gesture.pointer_up();
        self.handle(response);
    }

    fn handle(&mut self, response: GestureResponse) {
        if response.needs_redraw() {
            self.redraw = true;
        }
        if response.needs_scan() {
            self.schedule_scan();
        }
    }

    fn schedule_scan(&mut self) {
        self.tracker.schedule_scan(self.surface.snapshot());
    }

    /* ---------- outputs ---------- */

    /// Single subscriber for percent updates; a new one replaces the old.
    pub fn set_on_percent_change(&mut self, listener: impl FnMut(f32) + 'static) {
        self.tracker.set_listener(listener);
    }

    pub fn clear_on_percent_change(&mut self) {
        self.tracker.clear_listener();
    }

    /// Deliver finished scans to the listener (call once per frame).
    pub fn dispatch_percent(&mut self) -> usize {
        self.tracker.dispatch()
    }

    /// Deliver finished scans, waiting up to `timeout` for in-flight ones.
    pub fn dispatch_percent_blocking(&mut self, timeout: Duration) -> usize {
        self.tracker.dispatch_blocking(timeout)
    }

    pub fn pending_scans(&self) -> usize {
        self.tracker.in_flight()
    }

    /// True once after every change to the mask.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn snapshot(&self) -> MaskSnapshot {
        self.surface.snapshot()
    }

    pub fn surface(&self) -> &MaskSurface {
        &self.surface
    }

    pub fn is_erasing(&self) -> bool {
        self.gesture.is_erasing()
    }

    /// Draw the mask over `picture` into `out`.
    pub fn composite_into(&self, picture: &FrameBuffer, out: &mut FrameBuffer, lut: &GammaLut) {
        compose::composite_mask(picture, self.surface.pixels(), out, lut);
    }
}

impl Default for ScratchView {
    fn default() -> Self {
        Self::new(ViewOptions::default())
    }
}
