// Pointer gesture state machine: turns down/move/up into erase strokes.
// Visual: pressing does nothing yet; dragging past the touch threshold starts
// cutting, and releasing is when the erased percentage gets recomputed.

use crate::mask::MaskSurface;
use crate::types::Point;

/// The polyline of the drag in progress plus the eraser width it is cut with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EraseStroke {
    points: Vec<Point>,
    width: f32,
}

impl EraseStroke {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    fn reset(&mut self) {
        self.points.clear();
    }
}

/// Where the controller is in the drag lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    /// No pointer is down.
    Idle,
    /// A drag is in progress.
    Erasing {
        /// Where the stroke started.
        start: Point,
        /// Last point a segment was applied to (or the start).
        last: Point,
    },
}

/// What the host should do after feeding an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureResponse {
    /// The event did not belong to a gesture; nothing to do.
    Ignored,
    /// Repaint the view.
    Redraw,
    /// Repaint and recompute the erase percentage (the stroke ended).
    RedrawAndScan,
}

impl GestureResponse {
    pub fn needs_redraw(self) -> bool {
        !matches!(self, Self::Ignored)
    }

    pub fn needs_scan(self) -> bool {
        matches!(self, Self::RedrawAndScan)
    }
}

/// Converts pointer events into [`MaskSurface::apply_stroke`] calls.
#[derive(Debug, Clone)]
pub struct GestureController {
    state: GestureState,
    stroke: EraseStroke,
    touch_slop: f32,
}

impl GestureController {
    /// `touch_slop` is the minimum per-axis travel, in pixels, for a move to count.
    pub fn new(touch_slop: f32) -> Self {
        Self { state: GestureState::Idle, stroke: EraseStroke::default(), touch_slop: touch_slop.max(0.0) }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_erasing(&self) -> bool {
        matches!(self.state, GestureState::Erasing { .. })
    }

    pub fn stroke(&self) -> &EraseStroke {
        &self.stroke
    }

    pub fn touch_slop(&self) -> f32 {
        self.touch_slop
    }

    pub fn set_touch_slop(&mut self, touch_slop: f32) {
        self.touch_slop = touch_slop.max(0.0);
    }

    /// Begin a stroke at `p`. A down during an active drag restarts the stroke.
    pub fn pointer_down(&mut self, p: Point) -> GestureResponse {
        if self.is_erasing() {
            tracing::debug!("pointer down during active stroke, restarting");
        }
        self.stroke.reset();
        self.stroke.points.push(p);
        self.state = GestureState::Erasing { start: p, last: p };
        GestureResponse::Redraw
    }

    /// Extend the stroke to `p` if it moved far enough, erasing the new segment.
    pub fn pointer_move(&mut self, p: Point, surface: &mut MaskSurface, eraser_width: f32) -> GestureResponse {
        let GestureState::Erasing { start, last } = self.state else {
            return GestureResponse::Ignored;
        };

        let dx = (p.x - last.x).abs();
        let dy = (p.y - last.y).abs();
        if dx >= self.touch_slop || dy >= self.touch_slop {
            self.stroke.width = eraser_width;
            self.stroke.points.push(p);
            let n = self.stroke.points.len();
            surface.apply_stroke(&self.stroke.points[n - 2..], eraser_width);
            self.state = GestureState::Erasing { start, last: p };
        }
        GestureResponse::Redraw
    }

    /// Finish the stroke; the host should rescan the mask.
    pub fn pointer_up(&mut self) -> GestureResponse {
        if !self.is_erasing() {
            return GestureResponse::Ignored;
        }
        if let GestureState::Erasing { start, last } = self.state {
            tracing::debug!(
                segments = self.stroke.points.len().saturating_sub(1),
                start = ?(start.x, start.y),
                end = ?(last.x, last.y),
                "stroke finished"
            );
        }
        self.stroke.reset();
        self.state = GestureState::Idle;
        GestureResponse::RedrawAndScan
    }

    /// Drop any drag in progress without requesting a scan.
    pub fn cancel(&mut self) {
        self.stroke.reset();
        self.state = GestureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Argb;

    const SLOP: f32 = 8.0;

    fn setup() -> (GestureController, MaskSurface) {
        let mut surface = MaskSurface::new(Argb::GRAY, None);
        surface.resize(100, 100).unwrap();
        (GestureController::new(SLOP), surface)
    }

    #[test]
    fn starts_idle() {
        let (g, _) = setup();
        assert_eq!(g.state(), GestureState::Idle);
        assert!(g.stroke().points().is_empty());
    }

    #[test]
    fn down_starts_erasing_without_touching_mask() {
        let (mut g, surface) = setup();
        assert_eq!(g.pointer_down(Point::new(5.0, 6.0)), GestureResponse::Redraw);
        assert_eq!(
            g.state(),
            GestureState::Erasing { start: Point::new(5.0, 6.0), last: Point::new(5.0, 6.0) }
        );
        assert_eq!(g.stroke().points(), &[Point::new(5.0, 6.0)]);
        assert_eq!(surface.erased_count(), 0);
    }

    #[test]
    fn move_below_threshold_is_ignored() {
        let (mut g, mut surface) = setup();
        g.pointer_down(Point::new(50.0, 50.0));
        for i in 1..5 {
            let p = Point::new(50.0 + i as f32, 50.0 + SLOP - 1.0);
            assert_eq!(g.pointer_move(p, &mut surface, 20.0), GestureResponse::Redraw);
        }
        assert_eq!(surface.erased_count(), 0);
        assert_eq!(g.stroke().points().len(), 1);
    }

    #[test]
    fn move_at_threshold_applies_segment() {
        let (mut g, mut surface) = setup();
        g.pointer_down(Point::new(50.0, 50.0));
        g.pointer_move(Point::new(50.0 + SLOP, 50.0), &mut surface, 20.0);
        assert!(surface.erased_count() > 0);
        assert_eq!(g.stroke().points().len(), 2);
        assert_eq!(g.stroke().width(), 20.0);
    }

    #[test]
    fn last_point_tracks_both_axes() {
        let (mut g, mut surface) = setup();
        g.pointer_down(Point::new(10.0, 10.0));
        g.pointer_move(Point::new(30.0, 60.0), &mut surface, 4.0);
        assert_eq!(
            g.state(),
            GestureState::Erasing { start: Point::new(10.0, 10.0), last: Point::new(30.0, 60.0) }
        );
        // a small step from the new last point stays below the threshold
        let before = surface.pixels().to_vec();
        g.pointer_move(Point::new(32.0, 62.0), &mut surface, 4.0);
        assert_eq!(surface.pixels(), before.as_slice());
    }

    #[test]
    fn slow_drift_accumulates_against_last_applied_point() {
        let (mut g, mut surface) = setup();
        g.pointer_down(Point::new(10.0, 50.0));
        // each step is 3px, but after three steps the total travel reaches 9px
        g.pointer_move(Point::new(13.0, 50.0), &mut surface, 6.0);
        g.pointer_move(Point::new(16.0, 50.0), &mut surface, 6.0);
        assert_eq!(surface.erased_count(), 0);
        g.pointer_move(Point::new(19.0, 50.0), &mut surface, 6.0);
        assert!(surface.erased_count() > 0);
    }

    #[test]
    fn up_ends_stroke_and_requests_scan() {
        let (mut g, mut surface) = setup();
        g.pointer_down(Point::new(10.0, 10.0));
        g.pointer_move(Point::new(40.0, 10.0), &mut surface, 10.0);
        assert_eq!(g.pointer_up(), GestureResponse::RedrawAndScan);
        assert_eq!(g.state(), GestureState::Idle);
        assert!(g.stroke().points().is_empty());
    }

    #[test]
    fn move_and_up_without_down_are_noops() {
        let (mut g, mut surface) = setup();
        assert_eq!(g.pointer_move(Point::new(90.0, 90.0), &mut surface, 30.0), GestureResponse::Ignored);
        assert_eq!(g.pointer_up(), GestureResponse::Ignored);
        assert_eq!(surface.erased_count(), 0);
        assert!(!GestureResponse::Ignored.needs_redraw());
    }

    #[test]
    fn second_down_restarts_stroke() {
        let (mut g, mut surface) = setup();
        g.pointer_down(Point::new(10.0, 10.0));
        g.pointer_move(Point::new(40.0, 10.0), &mut surface, 10.0);
        g.pointer_down(Point::new(70.0, 70.0));
        assert_eq!(g.stroke().points(), &[Point::new(70.0, 70.0)]);
    }

    #[test]
    fn cancel_returns_to_idle_without_scan() {
        let (mut g, _) = setup();
        g.pointer_down(Point::new(1.0, 1.0));
        g.cancel();
        assert!(!g.is_erasing());
        assert_eq!(g.pointer_up(), GestureResponse::Ignored);
    }

    #[test]
    fn negative_slop_is_clamped() {
        let mut g = GestureController::new(-3.0);
        assert_eq!(g.touch_slop(), 0.0);
        g.set_touch_slop(12.5);
        assert_eq!(g.touch_slop(), 12.5);
    }
}
