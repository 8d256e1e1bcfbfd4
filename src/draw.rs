// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the scratch card (mask over the hidden picture).
// 2) A ring that follows your mouse, sized like the eraser.
// 3) A tiny 5x7 bitmap font to render the HUD readout on top.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::Error;
use crate::types::{Argb, FrameBuffer};

/// One host-level control, mirroring the original activity's widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// A mask color radio button (1-4).
    MaskColor(Argb),
    /// The watermark radio group (W).
    ToggleWatermark,
    /// Eraser size seek bar up (`]` / Up).
    GrowEraser,
    /// Eraser size seek bar down (`[` / Down).
    ShrinkEraser,
    /// Clear button (C).
    Clear,
    /// Reset button (R).
    Reset,
}

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window of the requested size.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options).map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Pump window events without new pixels (nothing changed this frame).
    pub fn idle(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we’ll exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current client-area size; the mask follows it.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Mouse position in window pixel coordinates (clamped to the window).
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Clamp)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Controls pressed since the previous frame.
    pub fn commands(&self) -> Vec<Command> {
        let pressed = |k| self.window.is_key_pressed(k, KeyRepeat::No);
        let repeat = |k| self.window.is_key_pressed(k, KeyRepeat::Yes);
        let mut out = Vec::new();

        if pressed(Key::Key1) {
            out.push(Command::MaskColor(Argb::GRAY));
        }
        if pressed(Key::Key2) {
            out.push(Command::MaskColor(Argb::RED));
        }
        if pressed(Key::Key3) {
            out.push(Command::MaskColor(Argb::GREEN));
        }
        if pressed(Key::Key4) {
            out.push(Command::MaskColor(Argb::BLUE));
        }
        if pressed(Key::W) {
            out.push(Command::ToggleWatermark);
        }
        if repeat(Key::RightBracket) || repeat(Key::Up) {
            out.push(Command::GrowEraser);
        }
        if repeat(Key::LeftBracket) || repeat(Key::Down) {
            out.push(Command::ShrinkEraser);
        }
        if pressed(Key::C) {
            out.push(Command::Clear);
        }
        if pressed(Key::R) {
            out.push(Command::Reset);
        }
        out
    }
}

/* ---------- Pointer edge detection ---------- */

/// A pointer transition derived from polling the mouse each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(f32, f32),
    Move(f32, f32),
    Up,
}

/// Turns "is the button held + where is the mouse" into down/move/up events.
#[derive(Debug, Default)]
pub struct PointerTracker {
    pressed: bool,
    last: Option<(f32, f32)>,
}

impl PointerTracker {
    pub fn update(&mut self, button_down: bool, pos: Option<(f32, f32)>) -> Option<PointerEvent> {
        match (self.pressed, button_down) {
            (false, true) => {
                let (x, y) = pos?; // wait until the pointer is over the window
                self.pressed = true;
                self.last = Some((x, y));
                Some(PointerEvent::Down(x, y))
            }
            (true, true) => {
                let p = pos?;
                if self.last == Some(p) {
                    return None;
                }
                self.last = Some(p);
                Some(PointerEvent::Move(p.0, p.1))
            }
            (true, false) => {
                self.pressed = false;
                self.last = None;
                Some(PointerEvent::Up)
            }
            (false, false) => None,
        }
    }
}

/* ---------- Software drawing: pixels, eraser ring, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a 1-pixel circle outline (midpoint algorithm).
/// Visual: shows where and how wide the eraser will cut.
pub fn draw_ring(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32) {
    if radius <= 0 {
        put_pixel(fb, cx, cy, color);
        return;
    }
    let (mut x, mut y) = (radius, 0);
    let mut err = 1 - radius;
    while x >= y {
        for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            put_pixel(fb, cx + dx, cy + dy, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

/// Key hints drawn under the readout.
pub const HUD_KEYS: &str = "1-4 COLOR  W MARK  [ ] SIZE  C CLEAR  R RESET";

/// The HUD readout: erase percentage with two decimals, eraser size, watermark.
pub fn hud_line(percent: f32, eraser_size: f32, watermark: bool) -> String {
    let mark = if watermark { "ON" } else { "OFF" };
    format!("ERASED: {percent:.2}% | SIZE: {eraser_size:.0} | MARK: {mark}")
}

/* ---------- 5x7 bitmap font ---------- */

/// Return a 5x7 glyph bitmap. Lowercase letters use the uppercase glyphs.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '%' => g!(0b11000,0b11001,0b00010,0b00100,0b01000,0b10011,0b00011),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '/' => g!(0b00000,0b00001,0b00010,0b00100,0b01000,0b10000,0b00000),
        '[' => g!(0b01110,0b01000,0b01000,0b01000,0b01000,0b01000,0b01110),
        ']' => g!(0b01110,0b00010,0b00010,0b00010,0b00010,0b00010,0b01110),
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),

        _ => None,
    }
}

/// Fill a `scale`×`scale` block (one font pixel).
fn put_block(fb: &mut FrameBuffer, x: i32, y: i32, scale: i32, color: u32) {
    for by in 0..scale {
        for bx in 0..scale {
            put_pixel(fb, x + bx, y + by, color);
        }
    }
}

/// Draw a single 5x7 character at (x,y), magnified by `scale`.
/// Visual: the glyph gets a 1-font-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32, scale: i32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (pass_color, offset) in [(0x0000_0000, scale), (color, 0)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    let px = x + rx * scale + offset;
                    let py = y + ry as i32 * scale + offset;
                    put_block(fb, px, py, scale, pass_color);
                }
            }
        }
    }
}

/// Pixel width of `text` at `scale` (5 px glyph + 1 px spacing per char).
pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * 6 * scale
}

/// Draw a text string using 5x7 glyphs.
pub fn draw_text_5x7(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, color: u32) {
    draw_text_scaled(fb, x, y, text, color, 1);
}

/// Draw a text string using 5x7 glyphs magnified by `scale`.
pub fn draw_text_scaled(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32, scale: i32) {
    let scale = scale.max(1);
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color, scale);
        x += 6 * scale;
    }
}
