//! # chord_engine
//!
//! The pure core of the hand-gesture chord controller: a static
//! finger→chord table and an edge-detecting gesture state tracker.
//!
//! No I/O lives here.  The tracker turns per-frame finger snapshots into
//! [`EdgeKind::Rose`] / [`EdgeKind::Fell`] events; what those events *do*
//! (MIDI note-on, delayed note-off) is the application's business.
//!
//! ## Chord assignment
//!
//! Each of the ten (hand, finger) slots is bound to one chord.  The default
//! table plays the D major scale:
//!
//! | Finger | Chord | Notes |
//! |---|---|---|
//! | Thumb  | D Major  | 62 66 69 |
//! | Index  | E Minor  | 64 67 71 |
//! | Middle | F♯ Minor | 66 69 73 |
//! | Ring   | G Major  | 67 71 74 |
//! | Pinky  | A Major  | 69 73 76 |
//!
//! ## Quick start
//!
//! ```rust
//! use chord_engine::{ChordTable, GestureTracker, HandSnapshot, HandSide, EdgeKind};
//!
//! let table = ChordTable::d_major();
//! let mut tracker = GestureTracker::new();
//!
//! // Right thumb goes up — one rising edge.
//! let snap = HandSnapshot { side: HandSide::Right, fingers_up: [true, false, false, false, false] };
//! let edges = tracker.update(&[snap]);
//! assert_eq!(edges.len(), 1);
//! assert_eq!(edges[0].1, EdgeKind::Rose);
//!
//! let (side, finger) = edges[0].0;
//! assert_eq!(table.lookup(side, finger).notes(), &[62, 66, 69]);
//! ```

pub mod chords;
pub mod tracker;

pub use chords::{Chord, ChordKey, ChordTable, ConfigError, FingerId, HandSide};
pub use tracker::{EdgeKind, GestureTracker, HandSnapshot};
