// What you SEE:
// • A gray card (or the color you picked) covering a picture.
// • Hold Left Mouse and drag: the card is scratched away under the ring.
// • The HUD shows how much of the card is gone, updated when you let go.
// • 1-4 pick the card color, W toggles the watermark (both start over),
//   [ and ] change the eraser size, C scratches everything, R starts over.
//   ESC quits.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;
use scratch_card::compose::{self, fit_picture, load_picture};
use scratch_card::config::{Cli, Settings};
use scratch_card::draw::{
    Command, Drawer, HUD_KEYS, PointerEvent, PointerTracker, draw_ring, draw_text_5x7, draw_text_scaled, hud_line,
    text_width,
};
use scratch_card::gamma::GammaLut;
use scratch_card::watermark::Watermark;
use scratch_card::{Error, FrameBuffer, ScratchView, logging};

/// Seek bar range of the eraser size control.
const ERASER_MIN: f32 = 1.0;
const ERASER_MAX: f32 = 100.0;
const ERASER_STEP: f32 = 5.0;

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let settings = Settings::resolve(&cli)?;
    logging::init(settings.debug);
    tracing::info!(?settings, "starting scratch card");

    /* --- Picture under the mask + window ---
       Visual: window opens showing the gray card. */
    let source = match &settings.image {
        Some(path) => Some(load_picture(path)?),
        None => None,
    };
    let mut drawer = Drawer::new("Scratch Card", settings.width, settings.height)?;

    /* --- The scratch view ---
       Visual: the card itself; the listener feeds the HUD readout. */
    let options = settings.view_options()?;
    // W toggles between the configured watermark and none; with none configured it offers the built-in tile
    let toggle_mark = options.watermark.clone().unwrap_or_else(Watermark::builtin);
    let mut view = ScratchView::new(options);

    let percent = Rc::new(Cell::new(0.0f32));
    let readout = Rc::clone(&percent);
    view.set_on_percent_change(move |p| readout.set(p));

    let lut = GammaLut::new();
    let (mut w, mut h) = drawer.size();
    view.size_changed(w, h);
    let mut picture = make_picture(source.as_ref(), w, h);
    let mut screen = FrameBuffer::new(w, h);
    let mut pointer = PointerTracker::default();
    let mut hud_dirty = true;

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Follow the window size (a new size starts a fresh card). */
        let size = drawer.size();
        if size != (w, h) && size.0 > 0 && size.1 > 0 {
            (w, h) = size;
            view.size_changed(w, h);
            picture = make_picture(source.as_ref(), w, h);
            screen = FrameBuffer::new(w, h);
        }

        /* 2) Controls */
        for cmd in drawer.commands() {
            match cmd {
                Command::MaskColor(color) => {
                    view.set_mask_color(color);
                    view.reset();
                }
                Command::ToggleWatermark => {
                    let next = if view.has_watermark() { None } else { Some(toggle_mark.clone()) };
                    view.set_watermark(next);
                    view.reset();
                }
                Command::GrowEraser | Command::ShrinkEraser => {
                    let step = if cmd == Command::GrowEraser { ERASER_STEP } else { -ERASER_STEP };
                    let size = (view.eraser_size() + step).clamp(ERASER_MIN, ERASER_MAX);
                    view.set_eraser_size(size);
                    tracing::debug!(size, "eraser size");
                    hud_dirty = true;
                }
                Command::Clear => view.clear(),
                Command::Reset => view.reset(),
            }
        }

        /* 3) Mouse → pointer events → strokes */
        let mouse = drawer.mouse_pos();
        match pointer.update(drawer.left_mouse_down(), mouse) {
            Some(PointerEvent::Down(x, y)) => view.pointer_down(x, y),
            Some(PointerEvent::Move(x, y)) => view.pointer_move(x, y),
            Some(PointerEvent::Up) => view.pointer_up(),
            None => {}
        }

        /* 4) Finished scans → HUD readout */
        let before = percent.get();
        if view.dispatch_percent() > 0 && percent.get() != before {
            hud_dirty = true;
        }

        /* 5) Repaint when something changed (the ring follows the mouse every frame). */
        let redraw = view.take_redraw() | hud_dirty | mouse.is_some();
        if redraw {
            view.composite_into(&picture, &mut screen, &lut);
            if let Some((mx, my)) = mouse {
                let r = (view.stroke_width() * 0.5).round() as i32;
                draw_ring(&mut screen, mx as i32, my as i32, r, 0x00FF_CC33);
            }
            let hud = hud_line(percent.get(), view.eraser_size(), view.has_watermark());
            draw_text_5x7(&mut screen, 8, 8, &hud, 0x00FF_FFFF);
            draw_text_5x7(&mut screen, 8, 18, HUD_KEYS, 0x00DD_DDDD);
            drawer.present(&screen)?;
            hud_dirty = false;
        } else {
            drawer.idle();
        }

        /* 6) FPS in the debug log once per second */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            tracing::debug!(fps = frames_this_second as f32 / secs, pending_scans = view.pending_scans(), "frame rate");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    tracing::info!(erased = percent.get(), "bye");
    Ok(())
}

/// The hidden picture at window size: the configured image, or a placeholder with a prize line.
fn make_picture(source: Option<&image::RgbaImage>, w: usize, h: usize) -> FrameBuffer {
    if let Some(img) = source {
        return fit_picture(img, w, h);
    }
    let mut fb = compose::placeholder_picture(w, h);
    let text = "YOU WIN!";
    let scale = ((w as i32 - 40) / text_width(text, 1)).clamp(1, 8);
    let x = (w as i32 - text_width(text, scale)) / 2;
    let y = (h as i32 - 7 * scale) / 2;
    draw_text_scaled(&mut fb, x, y, text, 0x00FF_FFFF, scale);
    fb
}
