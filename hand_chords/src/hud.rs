//! Software-rendered HUD using `minifb`.
//!
//! The window doubles as the simulated detector: once per frame the held
//! finger keys are sampled into a [`SimFrame`] and sent down the sim
//! channel, and discrete commands (cycle instrument, quit) are returned to
//! the frame loop.
//!
//! Layout:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  HAND CHORDS                [Instrument: Nylon Guitar]    │
//! │                                                           │
//! │   LEFT HAND                    RIGHT HAND                 │
//! │  ▌▌▌▌▌  (five finger bars)    ▌▌▌▌▌                       │
//! │   A S D F G                    H J K L ;                  │
//! │                                                           │
//! │  status line                                              │
//! │  key legend                                               │
//! └───────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use chord_engine::{FingerId, HandSide};

use crate::instrument::Instrument;
use crate::source::SimFrame;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 880;
pub const WIN_H: usize = 420;

const BAR_W:        usize = 52;
const BAR_H:        usize = 150;
const BAR_GAP:      usize = 16;
const BAR_BASE_Y:   usize = 280;
const LEFT_PANEL_X: usize = 70;
const RIGHT_PANEL_X: usize = 480;
const STATUS_Y:     usize = WIN_H - 60;

const BG_COLOR:     u32 = 0xFF1A1A2E;
const PANEL_LABEL:  u32 = 0xFFAADDFF;
const BAR_IDLE:     u32 = 0xFF2E2E4E;
const BAR_SOUNDING: u32 = 0xFF3ADB76;
const BAR_BORDER:   u32 = 0xFF000000;
const OVERLAY_TEXT: u32 = 0xFFFFFFFF;
const LOST_COLOR:   u32 = 0xFFE94560;
const TEXT_BG:      u32 = 0xFF0F3460;

// Finger keys, thumb first, matching `FingerId::index`.
const LEFT_KEYS:  [Key; 5] = [Key::A, Key::S, Key::D, Key::F, Key::G];
const RIGHT_KEYS: [Key; 5] = [Key::H, Key::J, Key::K, Key::L, Key::Semicolon];

const LEFT_KEY_LABELS:  [&str; 5] = ["A", "S", "D", "F", "G"];
const RIGHT_KEY_LABELS: [&str; 5] = ["H", "J", "K", "L", ";"];

// ════════════════════════════════════════════════════════════════════════════
// UiCommand
// ════════════════════════════════════════════════════════════════════════════

/// Discrete one-shot commands from the keyboard.  Everything not listed here
/// is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    CycleInstrument, // Space
    Quit,            // Q
}

// ════════════════════════════════════════════════════════════════════════════
// Hud
// ════════════════════════════════════════════════════════════════════════════

pub struct Hud {
    window: Window,
    buf:    Vec<u32>,
    sim_tx: Sender<SimFrame>,
    lost:   bool, // last sampled tracking-lost state, for the overlay
}

impl Hud {
    pub fn new(sim_tx: Sender<SimFrame>) -> Result<Self, String> {
        let mut window = Window::new(
            "Hand Chords — gesture MIDI controller",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Hud {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            lost: false,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Sample the keyboard once: send the held finger keys to the sim
    /// channel as one detector frame, and collect discrete commands.
    ///
    /// A frame is sent unconditionally — the sim source does a blocking
    /// read per cycle and must never be starved.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut commands = Vec::new();

        let mut frame = SimFrame::default();
        for (i, key) in LEFT_KEYS.iter().enumerate() {
            frame.fingers[HandSide::Left.index()][i] = self.window.is_key_down(*key);
        }
        for (i, key) in RIGHT_KEYS.iter().enumerate() {
            frame.fingers[HandSide::Right.index()][i] = self.window.is_key_down(*key);
        }
        frame.tracking_lost = self.window.is_key_down(Key::Tab);
        self.lost = frame.tracking_lost;
        let _ = self.sim_tx.send(frame);

        if self.window.is_key_pressed(Key::Space, KeyRepeat::No) {
            commands.push(UiCommand::CycleInstrument);
        }
        if self.window.is_key_pressed(Key::Q, KeyRepeat::No) {
            commands.push(UiCommand::Quit);
        }
        commands
    }

    /// Render one frame.
    ///
    /// `sounding` is `[side][finger]`; `display` is the transient
    /// instrument announcement, already gated by the selector's window.
    pub fn render(
        &mut self,
        sounding: [[bool; 5]; 2],
        display:  Option<&Instrument>,
        status:   &str,
    ) {
        self.buf.fill(BG_COLOR);

        self.draw_label("HAND CHORDS", 16, 14, 2, PANEL_LABEL);

        // ── Instrument announcement (transient) ───────────────────────────
        if let Some(inst) = display {
            let text = format!("Instrument: {}", inst.name);
            self.draw_label(&text, 320, 14, 2, OVERLAY_TEXT);
        }

        // ── Hand panels ───────────────────────────────────────────────────
        self.draw_hand_panel("LEFT HAND", LEFT_PANEL_X,
                             &sounding[HandSide::Left.index()], &LEFT_KEY_LABELS);
        self.draw_hand_panel("RIGHT HAND", RIGHT_PANEL_X,
                             &sounding[HandSide::Right.index()], &RIGHT_KEY_LABELS);

        // ── Tracking-lost banner ──────────────────────────────────────────
        if self.lost {
            self.draw_label("TRACKING LOST", 340, 200, 3, LOST_COLOR);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, 24, TEXT_BG);
        self.draw_label(status, 12, STATUS_Y + 8, 1, OVERLAY_TEXT);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "hold ASDFG/HJKL; = raise fingers  Tab=lose tracking  Space=instrument  Q=quit",
            12, WIN_H - 20, 1, 0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Hand panel ────────────────────────────────────────────────────────

    fn draw_hand_panel(&mut self, title: &str, x: usize, sounding: &[bool; 5], keys: &[&str; 5]) {
        self.draw_label(title, x, BAR_BASE_Y - BAR_H - 30, 2, PANEL_LABEL);

        for finger in FingerId::ALL {
            let i  = finger.index();
            let bx = x + i * (BAR_W + BAR_GAP);
            let by = BAR_BASE_Y - BAR_H;

            let color = if sounding[i] { BAR_SOUNDING } else { BAR_IDLE };
            self.fill_rect(bx, by, BAR_W, BAR_H, color);
            self.draw_border(bx, by, BAR_W, BAR_H, BAR_BORDER);

            // Finger name inside the bar, key label beneath it.
            self.draw_label(finger.name(), bx + 4, by + 6, 1, 0xFFCCCCCC);
            self.draw_label(keys[i], bx + BAR_W / 2 - 4, BAR_BASE_Y + 10, 2, 0xFFBBBBBB);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for col in x..(x + w).min(WIN_W) {
            if y < WIN_H       { self.buf[y * WIN_W + col] = color; }
            if y + h - 1 < WIN_H { self.buf[(y + h - 1) * WIN_W + col] = color; }
        }
        for row in y..(y + h).min(WIN_H) {
            if x < WIN_W       { self.buf[row * WIN_W + x] = color; }
            if x + w - 1 < WIN_W { self.buf[row * WIN_W + x + w - 1] = color; }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Scaled 3×5 bitmap text.  `scale` 1 → 3×5 px glyphs, 2 → 6×10, …
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.set_pixel(cx + col * scale + dx, y + row * scale + dy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W {
                break;
            }
        }
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
        ';' => [0b000, 0b010, 0b000, 0b010, 0b100],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    // Window creation needs a display, so only the pure parts are tested.

    #[test]
    fn every_legend_character_has_a_glyph() {
        for ch in "HAND CHORDS Instrument: Tab=lose tracking Space Q;/".chars() {
            // Must not panic; fallback glyph is acceptable for unknowns.
            let _ = char_glyph(ch);
        }
    }

    #[test]
    fn finger_keys_cover_all_five_fingers() {
        assert_eq!(LEFT_KEYS.len(), FingerId::ALL.len());
        assert_eq!(RIGHT_KEYS.len(), FingerId::ALL.len());
    }
}
