//! MIDI output sink — midir backend plus a null fallback.
//!
//! The sink is the one resource shared between the frame loop, the sustain
//! worker and the instrument selector, so it lives behind [`SharedSink`];
//! every wire write takes the lock.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

/// Velocity for every note-on and note-off (the controller is not
/// velocity-sensitive).
pub const VELOCITY: u8 = 127;

// ════════════════════════════════════════════════════════════════════════════
// SinkError
// ════════════════════════════════════════════════════════════════════════════

/// A MIDI device call failed.  Recoverable: the event is lost, the loop and
/// any pending sustain timers carry on.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("MIDI send failed: {0}")]
    Send(String),
}

// ════════════════════════════════════════════════════════════════════════════
// MidiSink trait — abstraction over midir / null / test recorders
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiSink: Send {
    fn note_on(&mut self, note: u8, velocity: u8) -> Result<(), SinkError>;
    fn note_off(&mut self, note: u8, velocity: u8) -> Result<(), SinkError>;
    fn set_instrument(&mut self, program: u8) -> Result<(), SinkError>;
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirSink {
    conn:    midir::MidiOutputConnection,
    channel: u8,
}

impl MidiSink for MidirSink {
    fn note_on(&mut self, note: u8, velocity: u8) -> Result<(), SinkError> {
        self.send(&[0x90 | (self.channel & 0x0F), note, velocity])
    }
    fn note_off(&mut self, note: u8, velocity: u8) -> Result<(), SinkError> {
        self.send(&[0x80 | (self.channel & 0x0F), note, velocity])
    }
    fn set_instrument(&mut self, program: u8) -> Result<(), SinkError> {
        self.send(&[0xC0 | (self.channel & 0x0F), program])
    }
}

impl MidirSink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.conn.send(bytes).map_err(|e| SinkError::Send(e.to_string()))
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

pub struct NullSink;

impl MidiSink for NullSink {
    fn note_on(&mut self, _note: u8, _vel: u8) -> Result<(), SinkError> { Ok(()) }
    fn note_off(&mut self, _note: u8, _vel: u8) -> Result<(), SinkError> { Ok(()) }
    fn set_instrument(&mut self, _program: u8) -> Result<(), SinkError> { Ok(()) }
}

// ════════════════════════════════════════════════════════════════════════════
// SharedSink — lock-guarded handle cloned across threads
// ════════════════════════════════════════════════════════════════════════════

/// Clonable handle serialising all access to the underlying sink.
#[derive(Clone)]
pub struct SharedSink {
    inner: Arc<Mutex<Box<dyn MidiSink>>>,
}

impl SharedSink {
    pub fn new(sink: Box<dyn MidiSink>) -> Self {
        SharedSink { inner: Arc::new(Mutex::new(sink)) }
    }

    pub fn note_on(&self, note: u8, velocity: u8) -> Result<(), SinkError> {
        self.lock().note_on(note, velocity)
    }

    pub fn note_off(&self, note: u8, velocity: u8) -> Result<(), SinkError> {
        self.lock().note_off(note, velocity)
    }

    pub fn set_instrument(&self, program: u8) -> Result<(), SinkError> {
        self.lock().set_instrument(program)
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn MidiSink>> {
        // A panic while holding the lock poisons it; keep playing anyway.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output — enumerate ports and pick first available
// ════════════════════════════════════════════════════════════════════════════

/// Try to open the first available MIDI output port on the given channel.
/// Falls back to [`NullSink`] with a warning if none is found.
pub fn open_midi_output(channel: u8) -> SharedSink {
    let midi_out = match midir::MidiOutput::new("hand_chords") {
        Ok(m)  => m,
        Err(e) => {
            log::warn!("MIDI init error: {} — using null output", e);
            return SharedSink::new(Box::new(NullSink));
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        log::warn!("no MIDI output ports found — using null output");
        log::warn!("install a MIDI synthesiser such as:");
        log::warn!("  macOS: built-in CoreMIDI (always available)");
        log::warn!("  Linux: `timidity -iA` or `fluidsynth`");
        log::warn!("  Windows: built-in GS Wavetable Synth");
        return SharedSink::new(Box::new(NullSink));
    }

    // Prefer a softsynth if visible
    let port_idx = ports.iter().enumerate()
        .find(|(_, p)| {
            midi_out.port_name(p).map(|n| {
                let n = n.to_lowercase();
                n.contains("fluid") || n.contains("timidity") ||
                n.contains("microsoft") || n.contains("gm") ||
                n.contains("synth")
            }).unwrap_or(false)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port)
        .unwrap_or_else(|_| "Unknown".to_string());
    log::info!("opening MIDI port: {}", name);

    match midi_out.connect(port, "hand-chords-out") {
        Ok(conn) => SharedSink::new(Box::new(MidirSink { conn, channel })),
        Err(e) => {
            log::warn!("failed to connect: {} — using null output", e);
            SharedSink::new(Box::new(NullSink))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Test support
// ════════════════════════════════════════════════════════════════════════════


// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
