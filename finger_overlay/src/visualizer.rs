//! Software-rendered overlay window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┬──────────────────┐
//! │  · particles ·            ·                  │   JUMLAH JARI    │
//! │  ┌────────────────────────────────────────┐  │  ┌────────────┐  │
//! │  │  STAGE                                 │  │  │     3      │  │
//! │  │  detected hand skeletons               │  │  └────────────┘  │
//! │  │                                        │  │      TIGA        │
//! │  └────────────────────────────────────────┘  │   key legend     │
//! │  status bar                                  │                  │
//! └──────────────────────────────────────────────┴──────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Instant;

use finger_posture::{HandObservation, Point2, HAND_CONNECTIONS};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::error::OverlayError;
use crate::particles::ParticleField;
use crate::readout::ReadoutState;
use crate::source::{SimHand, SimInput};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 960;
pub const WIN_H:     usize = 560;
const STAGE_X:       usize = 20;
const STAGE_Y:       usize = 40;
const STAGE_W:       usize = 640;
const STAGE_H:       usize = 480;
const PANEL_X:       usize = STAGE_X + STAGE_W + 20;
const PANEL_W:       usize = WIN_W - PANEL_X - 20;
const BOX_Y:         usize = 80;
const BOX_H:         usize = 180;
const STATUS_Y:      usize = STAGE_Y + STAGE_H + 8;
const BG_COLOR:      u32   = 0xFF0B0F1A;
const STAGE_BG:      u32   = 0xFF05070D;
const CYAN:          u32   = 0xFF00F2FF;
const PULSE_GREEN:   u32   = 0xFF00FF88;
const JOINT_COLOR:   u32   = 0xFFFFFFFF;
const TEXT_COLOR:    u32   = 0xFFEEEEEE;
const DIM_TEXT:      u32   = 0xFF888888;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    /// Present only when the keyboard simulator is the frame source.
    sim_tx: Option<Sender<SimInput>>,
}

/// Keys the window handles itself, whatever the frame source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowInput {
    ToggleCamera,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyAction {
    Sim(SimInput),
    Window(WindowInput),
}

/// Everything drawn in one frame.
pub struct Scene<'a> {
    pub particles: &'a ParticleField,
    pub hands:     &'a [HandObservation],
    pub readout:   &'a ReadoutState,
    pub camera_on: bool,
    pub status:    &'a str,
    pub now:       Instant,
}

impl Visualizer {
    pub fn new(sim_tx: Option<Sender<SimInput>>) -> Result<Self, OverlayError> {
        let mut window = Window::new(
            "Finger Count Overlay",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| OverlayError::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Mouse position in window pixels, `None` when outside.
    pub fn pointer(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    /// Poll the keyboard.  Simulator keys go straight to the simulator;
    /// window-level keys are returned in press order.
    pub fn poll_input(&mut self) -> Vec<WindowInput> {
        let mut out = Vec::new();
        for key in self.window.get_keys_pressed(KeyRepeat::No) {
            match key_action(key) {
                Some(KeyAction::Window(input)) => out.push(input),
                Some(KeyAction::Sim(input)) => {
                    if let Some(tx) = &self.sim_tx {
                        let _ = tx.send(input);
                    }
                }
                None => {}
            }
        }
        out
    }

    pub fn render(&mut self, scene: &Scene<'_>) {
        self.buf.fill(BG_COLOR);

        self.draw_particles(scene.particles);

        // ── Stage ─────────────────────────────────────────────────────────
        if scene.camera_on {
            self.fill_rect(STAGE_X, STAGE_Y, STAGE_W, STAGE_H, STAGE_BG);
            for hand in scene.hands {
                self.draw_hand(hand);
            }
        } else {
            self.fill_rect(STAGE_X, STAGE_Y, STAGE_W, STAGE_H, 0xFF000000);
            self.draw_text("CAMERA OFF", STAGE_X + STAGE_W / 2 - 80, STAGE_Y + STAGE_H / 2 - 10, 4, DIM_TEXT);
        }
        self.draw_border(STAGE_X, STAGE_Y, STAGE_W, STAGE_H, 0xFF1F3A4D);

        // ── Count box ─────────────────────────────────────────────────────
        self.draw_readout(scene.readout, scene.now);

        // ── Status bar + legend ──────────────────────────────────────────
        self.draw_text(scene.status, STAGE_X, STATUS_Y + 6, 2, TEXT_COLOR);
        let sim_legend = [
            "1-5 RIGHT FINGERS",
            "6-0 LEFT FINGERS",
            "R/L SHOW HAND",
            "C CLEAR  W SWAP",
        ];
        let common_legend = ["SPACE CAMERA", "Q QUIT"];
        let sim_lines = if self.sim_tx.is_some() { &sim_legend[..] } else { &[][..] };
        for (i, line) in sim_lines.iter().chain(common_legend.iter()).enumerate() {
            self.draw_text(line, PANEL_X, BOX_Y + BOX_H + 90 + i * 16, 2, DIM_TEXT);
        }

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Particles ─────────────────────────────────────────────────────────

    fn draw_particles(&mut self, field: &ParticleField) {
        for link in field.links() {
            let (a, b) = (&field.particles[link.a], &field.particles[link.b]);
            self.draw_line(a.x, a.y, b.x, b.y, CYAN, link.opacity.clamp(0.0, 1.0) * 0.35);
        }
        for p in &field.particles {
            let r = p.size as usize;
            let (cx, cy) = (p.x as isize, p.y as isize);
            for dy in -(r as isize)..=r as isize {
                for dx in -(r as isize)..=r as isize {
                    if dx * dx + dy * dy <= (r * r) as isize && cx + dx >= 0 && cy + dy >= 0 {
                        self.set_pixel((cx + dx) as usize, (cy + dy) as usize, CYAN);
                    }
                }
            }
        }
    }

    // ── Hand skeleton ─────────────────────────────────────────────────────

    fn draw_hand(&mut self, hand: &HandObservation) {
        let to_px = |p: Point2| {
            (
                STAGE_X as f32 + p.x.clamp(0.0, 1.0) * STAGE_W as f32,
                STAGE_Y as f32 + p.y.clamp(0.0, 1.0) * STAGE_H as f32,
            )
        };
        for &(a, b) in HAND_CONNECTIONS.iter() {
            let (ax, ay) = to_px(hand.landmarks[a]);
            let (bx, by) = to_px(hand.landmarks[b]);
            self.draw_line(ax, ay, bx, by, CYAN, 1.0);
        }
        for &p in hand.landmarks.iter() {
            let (x, y) = to_px(p);
            self.fill_rect((x as usize).saturating_sub(3), (y as usize).saturating_sub(3), 7, 7, JOINT_COLOR);
        }
        let (wx, wy) = to_px(hand.landmarks[0]);
        self.draw_text(hand.handedness.label(), (wx as usize).saturating_sub(20), wy as usize + 10, 2, DIM_TEXT);
    }

    // ── Readout ───────────────────────────────────────────────────────────

    fn draw_readout(&mut self, readout: &ReadoutState, now: Instant) {
        self.draw_text("JUMLAH JARI", PANEL_X, BOX_Y - 28, 3, DIM_TEXT);

        let pulse = readout.pulse.filter(|p| !p.done(now));
        let (border, number_color) = match pulse {
            Some(_) => (PULSE_GREEN, PULSE_GREEN),
            None    => (CYAN, 0xFFFFFFFF),
        };
        self.fill_rect(PANEL_X, BOX_Y, PANEL_W, BOX_H, 0xFF0F1E2E);
        self.draw_border(PANEL_X, BOX_Y, PANEL_W, BOX_H, border);
        if pulse.is_some() {
            self.draw_border(PANEL_X + 1, BOX_Y + 1, PANEL_W - 2, BOX_H - 2, border);
            self.draw_border(PANEL_X + 2, BOX_Y + 2, PANEL_W - 4, BOX_H - 4, border);
        }

        let scale = 24;
        let text_w = readout.number.chars().count() * 4 * scale;
        let nx = PANEL_X + PANEL_W.saturating_sub(text_w) / 2;
        self.draw_text(&readout.number, nx, BOX_Y + (BOX_H - 5 * scale) / 2, scale, number_color);

        let word_w = readout.text.chars().count() * 4 * 5;
        let wx = PANEL_X + PANEL_W.saturating_sub(word_w) / 2;
        self.draw_text(&readout.text, wx, BOX_Y + BOX_H + 24, 5, TEXT_COLOR);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y+h).min(WIN_H) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Bresenham line, alpha-blended over what is already drawn.
    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: u32, alpha: f32) {
        if alpha <= 0.0 { return; }
        let (mut x, mut y) = (x0 as isize, y0 as isize);
        let (x1, y1) = (x1 as isize, y1 as isize);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
                let idx = y as usize * WIN_W + x as usize;
                self.buf[idx] = blend(self.buf[idx], color, alpha);
            }
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// 3×5 bitmap font scaled by `scale`.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

/// Keyboard → simulator or window input.
fn key_action(key: Key) -> Option<KeyAction> {
    let finger = |hand, finger| Some(KeyAction::Sim(SimInput::ToggleFinger { hand, finger }));
    match key {
        Key::Key1 => finger(SimHand::Right, 0),
        Key::Key2 => finger(SimHand::Right, 1),
        Key::Key3 => finger(SimHand::Right, 2),
        Key::Key4 => finger(SimHand::Right, 3),
        Key::Key5 => finger(SimHand::Right, 4),
        Key::Key6 => finger(SimHand::Left, 0),
        Key::Key7 => finger(SimHand::Left, 1),
        Key::Key8 => finger(SimHand::Left, 2),
        Key::Key9 => finger(SimHand::Left, 3),
        Key::Key0 => finger(SimHand::Left, 4),
        Key::R     => Some(KeyAction::Sim(SimInput::ToggleHand(SimHand::Right))),
        Key::L     => Some(KeyAction::Sim(SimInput::ToggleHand(SimHand::Left))),
        Key::C     => Some(KeyAction::Sim(SimInput::ClearHands)),
        Key::W     => Some(KeyAction::Sim(SimInput::SwapOrder)),
        Key::Space => Some(KeyAction::Window(WindowInput::ToggleCamera)),
        Key::Q | Key::Escape => Some(KeyAction::Window(WindowInput::Quit)),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
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
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_map_to_fingers() {
        assert_eq!(
            key_action(Key::Key1),
            Some(KeyAction::Sim(SimInput::ToggleFinger { hand: SimHand::Right, finger: 0 }))
        );
        assert_eq!(
            key_action(Key::Key0),
            Some(KeyAction::Sim(SimInput::ToggleFinger { hand: SimHand::Left, finger: 4 }))
        );
        assert_eq!(key_action(Key::F1), None);
    }

    #[test]
    fn camera_and_quit_belong_to_the_window() {
        assert_eq!(key_action(Key::Space), Some(KeyAction::Window(WindowInput::ToggleCamera)));
        assert_eq!(key_action(Key::Escape), Some(KeyAction::Window(WindowInput::Quit)));
        assert_eq!(key_action(Key::Q), Some(KeyAction::Window(WindowInput::Quit)));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn glyphs_are_case_insensitive() {
        assert_eq!(char_glyph('s'), char_glyph('S'));
    }
}
