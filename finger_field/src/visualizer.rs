//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┬──────────┐
//! │                                                      │  CAMERA  │
//! │            particles (perspective, depth-shaded)     │  inset   │
//! │                       ◆ control point                └──────────┤
//! │                                                                 │
//! │  status bar                                                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The window is resizable; the projection is rebuilt whenever the size
//! reported by the window changes.

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use particle_field::{Landmark, ParticleField, Vec3, HAND_SKELETON};

use crate::error::AppError;
use crate::projection::{Projection, EYE_Z};

// ════════════════════════════════════════════════════════════════════════════
// Palette / layout
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:       u32 = 0xFF05070F;
const PARTICLE_COLOR: u32 = 0xFF3FA7FF;
const FAST_COLOR:     u32 = 0xFFFFFFFF;
const MARKER_COLOR:   u32 = 0xFFFF4060;
const INSET_BG:       u32 = 0xFF10182A;
const INSET_BORDER:   u32 = 0xFF44507A;
const BONE_COLOR:     u32 = 0xFF7CFFB2;
const TIP_COLOR:      u32 = 0xFFFFD700;
const TEXT_BG:        u32 = 0xFF0F1E3C;
const TEXT_COLOR:     u32 = 0xFFEEEEEE;
const WARN_COLOR:     u32 = 0xFFFF8A3D;
const STATUS_H:       usize = 36;
const INSET_W:        usize = 192;
const INSET_H:        usize = 144;
const FONT_SCALE:     usize = 2;

#[cfg(not(feature = "leap"))]
const LEGEND: &str = "move pointer = fingertip   Q/Esc = quit";
#[cfg(feature = "leap")]
const LEGEND: &str = "index finger over device = fingertip   Q/Esc = quit";

/// Speed (units/frame) at which a particle is drawn fully white.
const FAST_SPEED: f32 = 0.6;

// ════════════════════════════════════════════════════════════════════════════
// Canvas — pixel buffer and drawing primitives
// ════════════════════════════════════════════════════════════════════════════

/// An ARGB framebuffer with clipped drawing helpers.
pub struct Canvas {
    pub buf:    Vec<u32>,
    pub width:  usize,
    pub height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; width * height], width, height }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width  = width;
        self.height = height;
        self.buf.resize(width * height, BG_COLOR);
    }

    pub fn clear(&mut self, color: u32) { self.buf.fill(color); }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        let (x, y) = (x as isize, y as isize);
        let (x1, y1) = (x + w as isize - 1, y + h as isize - 1);
        for col in x..=x1 {
            self.set_pixel(col, y,  color);
            self.set_pixel(col, y1, color);
        }
        for row in y..=y1 {
            self.set_pixel(x,  row, color);
            self.set_pixel(x1, row, color);
        }
    }

    /// Bresenham line.
    pub fn draw_line(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    pub fn draw_diamond(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            let span = r - dy.abs();
            for dx in -span..=span {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    /// Text in the 3×5 bitmap font, scaled by `scale`.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            if cx + 3 * scale > self.width { break; }
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene drawing (window-independent)
// ════════════════════════════════════════════════════════════════════════════

/// Everything drawn in one frame besides the particles.
pub struct Overlay<'a> {
    pub control: Vec3,
    /// Most recent detected hand, drawn in the camera inset.
    pub hand:    Option<&'a [Landmark]>,
    pub status:  &'a str,
    /// Drawn in the warning colour (degraded mode).
    pub warning: bool,
    /// Control marker is only shown once tracking is live.
    pub active:  bool,
}

/// Draw the particle field, control marker, camera inset and status bar.
pub fn draw_scene(canvas: &mut Canvas, proj: &Projection, field: &ParticleField, overlay: &Overlay) {
    canvas.clear(BG_COLOR);

    for (pos, vel) in field.positions().iter().zip(field.velocities()) {
        let Some((x, y, depth)) = proj.project(*pos) else { continue };
        // Nearer particles brighter, faster particles whiter.
        let near  = ((EYE_Z + 20.0 - depth) / 40.0).clamp(0.15, 1.0);
        let speed = (vel.length() / FAST_SPEED).clamp(0.0, 1.0);
        let color = scale(blend(PARTICLE_COLOR, FAST_COLOR, speed), near);
        let (px, py) = (x as isize, y as isize);
        canvas.set_pixel(px, py, color);
        if depth < EYE_Z {
            canvas.set_pixel(px + 1, py, color);
            canvas.set_pixel(px, py + 1, color);
            canvas.set_pixel(px + 1, py + 1, color);
        }
    }

    if overlay.active {
        if let Some((x, y, _)) = proj.project(overlay.control) {
            canvas.draw_diamond(x as isize, y as isize, 6, MARKER_COLOR);
        }
    }

    draw_inset(canvas, overlay.hand);

    let status_y = canvas.height.saturating_sub(STATUS_H);
    canvas.fill_rect(0, status_y, canvas.width, STATUS_H, TEXT_BG);
    let color = if overlay.warning { WARN_COLOR } else { TEXT_COLOR };
    canvas.draw_label(overlay.status, 10, status_y + 6, FONT_SCALE, color);
    canvas.draw_label(LEGEND, 10, status_y + 24, 1, 0xFF888888);
}

/// The "camera" picture-in-picture: landmarks drawn in image space.
fn draw_inset(canvas: &mut Canvas, hand: Option<&[Landmark]>) {
    if canvas.width < INSET_W + 20 || canvas.height < INSET_H + STATUS_H + 20 { return; }
    let x0 = canvas.width - INSET_W - 10;
    let y0 = 10;
    canvas.fill_rect(x0, y0, INSET_W, INSET_H, INSET_BG);
    canvas.draw_border(x0, y0, INSET_W, INSET_H, INSET_BORDER);
    canvas.draw_label("CAMERA", x0 + 6, y0 + 6, 1, INSET_BORDER);

    let Some(hand) = hand else { return };
    // Selfie view: mirror x so the inset moves with the hand.
    let to_px = |lm: &Landmark| (
        x0 as isize + ((1.0 - lm.x) * INSET_W as f32) as isize,
        y0 as isize + (lm.y * INSET_H as f32) as isize,
    );
    let inside = |lm: &Landmark| lm.in_frame();

    for &(a, b) in HAND_SKELETON.iter() {
        let (Some(la), Some(lb)) = (hand.get(a), hand.get(b)) else { continue };
        if !(inside(la) && inside(lb)) { continue; }
        let ((ax, ay), (bx, by)) = (to_px(la), to_px(lb));
        canvas.draw_line(ax, ay, bx, by, BONE_COLOR);
    }
    if let Some(tip) = hand.get(particle_field::INDEX_TIP).filter(|lm| inside(*lm)) {
        let (tx, ty) = to_px(tip);
        canvas.draw_diamond(tx, ty, 3, TIP_COLOR);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer — the window
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    proj:   Projection,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, target_fps: usize) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Finger Field",
            width, height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(target_fps);

        Ok(Visualizer {
            window,
            canvas: Canvas::new(width, height),
            proj:   Projection::new(width, height),
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keys.  Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }
        let quit = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        !(quit(Key::Q) || quit(Key::Escape))
    }

    /// Pointer position normalized to [0, 1] over the window, or `None`
    /// when it is outside.
    pub fn pointer(&self) -> Option<(f32, f32)> {
        let (w, h) = self.window.get_size();
        let (x, y) = self.window.get_mouse_pos(MouseMode::Discard)?;
        if w == 0 || h == 0 { return None; }
        Some((x / w as f32, y / h as f32))
    }

    /// Render one frame and present it.
    pub fn render(&mut self, field: &ParticleField, overlay: &Overlay) -> Result<(), AppError> {
        let (w, h) = self.window.get_size();
        if w > 0 && h > 0 && self.proj.resize(w, h) {
            self.canvas.resize(w, h);
        }
        draw_scene(&mut self.canvas, &self.proj, field, overlay);
        self.window.update_with_buffer(&self.canvas.buf, self.canvas.width, self.canvas.height)?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Linear blend of two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// Darken an ARGB color by `k` (0–1).
fn scale(c: u32, k: f32) -> u32 {
    blend(BG_COLOR, c, k)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use particle_field::FieldParams;

    fn overlay<'a>(status: &'a str) -> Overlay<'a> {
        Overlay { control: Vec3::ZERO, hand: None, status, warning: false, active: true }
    }

    #[test]
    fn set_pixel_clips() {
        let mut c = Canvas::new(4, 4);
        c.set_pixel(-1, 2, 0xFFFFFFFF);
        c.set_pixel(4, 0, 0xFFFFFFFF);
        assert!(c.buf.iter().all(|&p| p == BG_COLOR));
        c.set_pixel(3, 3, 0xFFFFFFFF);
        assert_eq!(c.pixel(3, 3), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(4, 3), None);
    }

    #[test]
    fn line_hits_both_ends() {
        let mut c = Canvas::new(20, 20);
        c.draw_line(2, 3, 15, 11, 0xFF00FF00);
        assert_eq!(c.pixel(2, 3), Some(0xFF00FF00));
        assert_eq!(c.pixel(15, 11), Some(0xFF00FF00));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn resize_keeps_buffer_consistent() {
        let mut c = Canvas::new(10, 10);
        c.resize(30, 7);
        assert_eq!(c.buf.len(), 30 * 7);
    }

    #[test]
    fn particle_at_origin_lights_centre() {
        let mut c = Canvas::new(640, 480);
        let proj = Projection::new(640, 480);
        let field = ParticleField::from_positions(vec![Vec3::new(0.0, 0.0, 5.0)], FieldParams::default());
        let ov = Overlay { active: false, ..overlay("") };
        draw_scene(&mut c, &proj, &field, &ov);
        let (x, y, _) = proj.project(Vec3::new(0.0, 0.0, 5.0)).unwrap();
        assert_ne!(c.pixel(x as usize, y as usize), Some(BG_COLOR));
    }

    #[test]
    fn control_marker_drawn_when_active() {
        let mut c = Canvas::new(640, 480);
        let proj = Projection::new(640, 480);
        let field = ParticleField::from_positions(vec![], FieldParams::default());
        draw_scene(&mut c, &proj, &field, &overlay(""));
        assert_eq!(c.pixel(320, 240), Some(MARKER_COLOR));

        let ov = Overlay { active: false, ..overlay("") };
        draw_scene(&mut c, &proj, &field, &ov);
        assert_eq!(c.pixel(320, 240), Some(BG_COLOR));
    }

    #[test]
    fn inset_shows_fingertip() {
        let mut c = Canvas::new(640, 480);
        let proj = Projection::new(640, 480);
        let field = ParticleField::from_positions(vec![], FieldParams::default());
        let mut hand = vec![Landmark::new(0.5, 0.5, 0.0); particle_field::LANDMARK_COUNT];
        hand[particle_field::INDEX_TIP] = Landmark::new(0.25, 0.5, 0.0);
        let ov = Overlay { hand: Some(&hand), ..overlay("") };
        draw_scene(&mut c, &proj, &field, &ov);
        let x = 640 - INSET_W - 10 + (0.75 * INSET_W as f32) as usize;
        let y = 10 + INSET_H / 2;
        assert_eq!(c.pixel(x, y), Some(TIP_COLOR));
    }

    #[test]
    fn status_text_is_drawn() {
        let mut c = Canvas::new(320, 240);
        let proj = Projection::new(320, 240);
        let field = ParticleField::from_positions(vec![], FieldParams::default());
        draw_scene(&mut c, &proj, &field, &overlay("888"));
        let status_y = 240 - STATUS_H;
        let row = &c.buf[(status_y + 6) * 320..(status_y + 7) * 320];
        assert!(row.iter().any(|&p| p == TEXT_COLOR));
    }
}
