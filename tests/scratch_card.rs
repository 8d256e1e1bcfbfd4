// End-to-end behaviour of the scratch card engine through its public API.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use scratch_card::gesture::{GestureController, GestureResponse};
use scratch_card::mask::MaskSurface;
use scratch_card::percent::{ErasePercentTracker, scan_percent};
use scratch_card::view::DEFAULT_TOUCH_SLOP;
use scratch_card::{Argb, Point, ScratchView, ViewOptions};

const WAIT: Duration = Duration::from_secs(5);

fn listen(view: &mut ScratchView) -> Rc<RefCell<Vec<f32>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    view.set_on_percent_change(move |p| sink.borrow_mut().push(p));
    seen
}

#[test]
fn fresh_mask_is_zero_percent_for_many_sizes() {
    for (w, h) in [(1, 1), (3, 7), (64, 1), (100, 100), (333, 17)] {
        let mut surface = MaskSurface::new(Argb::GRAY, None);
        surface.resize(w, h).unwrap();
        assert!(scan_percent(surface.pixels()).abs() < 1e-6, "{w}x{h}");
    }
}

#[test]
fn fully_clear_is_one_hundred_percent_from_any_state() {
    let mut surface = MaskSurface::new(Argb::GRAY, None);
    surface.resize(30, 20).unwrap();
    surface.apply_stroke(&[Point::new(0.0, 0.0), Point::new(29.0, 19.0)], 7.0);
    surface.fully_clear();
    assert_eq!(surface.snapshot().erase_percent(), 100.0);
}

#[test]
fn zero_sized_scan_is_zero_not_nan() {
    let p = scan_percent(&[]);
    assert_eq!(p, 0.0);
    assert!(p.is_finite());
}

#[test]
fn horizontal_stroke_erases_about_eight_percent() {
    let mut surface = MaskSurface::new(Argb::GRAY, None);
    surface.resize(100, 100).unwrap();
    assert_eq!(surface.snapshot().erase_percent(), 0.0);

    surface.apply_stroke(&[Point::new(10.0, 10.0), Point::new(90.0, 10.0)], 10.0);
    let erased = surface.erased_count();
    // 80 x 10 body plus round caps, minus the antialiased rim
    assert!((700..=950).contains(&erased), "erased {erased}");
    let pct = surface.snapshot().erase_percent();
    assert!((7.0..=9.5).contains(&pct), "percent {pct}");
}

#[test]
fn clear_through_view_reports_exactly_one_hundred() {
    let mut view = ScratchView::default();
    view.size_changed(50, 50);
    let seen = listen(&mut view);
    view.clear();
    view.dispatch_percent_blocking(WAIT);
    assert_eq!(*seen.borrow(), vec![100.0]);
}

#[test]
fn jitter_below_threshold_leaves_mask_untouched() {
    let slop = DEFAULT_TOUCH_SLOP;
    let mut view = ScratchView::new(ViewOptions { touch_slop: slop, ..ViewOptions::default() });
    view.size_changed(100, 100);
    let seen = listen(&mut view);
    view.reset();
    view.dispatch_percent_blocking(WAIT);
    let baseline = view.surface().pixels().to_vec();

    view.pointer_down(5.0, 5.0);
    view.pointer_move(5.0, 5.0 + slop - 1.0);
    view.pointer_up();
    view.dispatch_percent_blocking(WAIT);

    assert_eq!(view.surface().pixels(), baseline.as_slice());
    assert_eq!(*seen.borrow(), vec![0.0, 0.0]);
}

#[test]
fn move_at_threshold_changes_mask() {
    let mut surface = MaskSurface::new(Argb::GRAY, None);
    surface.resize(100, 100).unwrap();
    let mut gesture = GestureController::new(DEFAULT_TOUCH_SLOP);

    gesture.pointer_down(Point::new(50.0, 50.0));
    gesture.pointer_move(Point::new(50.0, 50.0 + DEFAULT_TOUCH_SLOP), &mut surface, 12.0);
    assert!(surface.erased_count() > 0);
    assert_eq!(gesture.pointer_up(), GestureResponse::RedrawAndScan);
}

#[test]
fn reset_twice_equals_reset_once() {
    let mut view = ScratchView::new(ViewOptions {
        watermark: Some(scratch_card::watermark::Watermark::builtin()),
        ..ViewOptions::default()
    });
    view.size_changed(64, 48);
    view.pointer_down(0.0, 0.0);
    view.pointer_move(60.0, 40.0);
    view.pointer_up();

    view.reset();
    let once = view.surface().pixels().to_vec();
    view.reset();
    assert_eq!(view.surface().pixels(), once.as_slice());
    view.dispatch_percent_blocking(WAIT);
}

#[test]
fn long_drag_only_ever_grows_erased_area() {
    let mut view = ScratchView::new(ViewOptions { eraser_size: 14.0, ..ViewOptions::default() });
    view.size_changed(120, 80);
    view.pointer_down(5.0, 5.0);

    let mut last = 0;
    for i in 1..40 {
        let t = i as f32;
        view.pointer_move(5.0 + t * 3.0, 40.0 + (t * 0.5).sin() * 30.0);
        let now = view.surface().erased_count();
        assert!(now >= last, "erased count dropped from {last} to {now}");
        last = now;
    }
    view.pointer_up();
    assert!(last > 0);
}

#[test]
fn resize_mid_scan_still_reports_stale_value() {
    let mut view = ScratchView::default();
    view.size_changed(40, 40);
    let seen = listen(&mut view);
    view.clear(); // scan of the cleared buffer is now in flight
    view.size_changed(80, 60); // fresh opaque buffer
    view.dispatch_percent_blocking(WAIT);
    assert_eq!(*seen.borrow(), vec![100.0]);
    assert_eq!(view.surface().erased_count(), 0);
}

#[test]
fn events_without_down_are_absorbed() {
    let mut view = ScratchView::default();
    view.size_changed(30, 30);
    view.take_redraw();
    view.pointer_move(10.0, 10.0);
    view.pointer_up();
    assert!(!view.take_redraw());
    assert_eq!(view.pending_scans(), 0);
    assert_eq!(view.surface().erased_count(), 0);
}

#[test]
fn tracker_can_be_used_standalone() {
    let mut surface = MaskSurface::new(Argb::BLUE, None);
    surface.resize(10, 10).unwrap();
    surface.apply_stroke(&[Point::new(5.0, 0.0), Point::new(5.0, 10.0)], 4.0);
    let expected = surface.snapshot().erase_percent();

    let got = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&got);
    let mut tracker = ErasePercentTracker::new();
    tracker.set_listener(move |p| *sink.borrow_mut() = Some(p));
    tracker.schedule_scan(surface.snapshot());
    tracker.dispatch_blocking(WAIT);
    assert_eq!(*got.borrow(), Some(expected));
}
