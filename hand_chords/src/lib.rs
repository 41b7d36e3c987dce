//! # hand_chords
//!
//! Hand-gesture MIDI chord controller.  An external hand-pose detector
//! (keyboard-simulated by default) reports which fingers are raised; each
//! finger is bound to a chord from [`chord_engine`]'s table.  Raising a
//! finger sends note-on for every note in its chord, lowering it sends
//! note-off after a sustain delay, and losing hand tracking stops
//! everything.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Finger raised | Chord note-ons, immediately, velocity 127 |
//! | Finger lowered | Chord note-offs after SUSTAIN_TIME (2.0 s) |
//! | Hands leave view | Every sounding chord stops (fail-safe) |
//! | Cycle command | Next instrument preset + program change |
//!
//! ## Simulation keyboard shortcuts
//!
//! | Key | Meaning |
//! |---|---|
//! | `A S D F G` (hold) | Left-hand thumb…pinky raised |
//! | `H J K L ;` (hold) | Right-hand thumb…pinky raised |
//! | `Tab` (hold) | Simulate tracking loss |
//! | `Space` | Cycle instrument preset |
//! | `Q` | Quit |
//!
//! The sustain worker never blocks the frame loop; pending note-offs are
//! force-flushed on exit so no note rings past shutdown.

pub mod app;
pub mod hud;
pub mod instrument;
pub mod midi;
pub mod source;
pub mod sustain;
