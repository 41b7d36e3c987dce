//! Gesture state tracking — rising/falling edge detection per finger.
//!
//! The tracker owns the only mutable gesture state in the system: one
//! "sounding" flag per (hand, finger) slot.  Feeding it one detector frame
//! yields the edges since the previous frame; identical consecutive frames
//! yield nothing, so rapid flicker can never double-trigger a chord.

use crate::chords::{ChordKey, FingerId, HandSide};

// ════════════════════════════════════════════════════════════════════════════
// HandSnapshot / EdgeKind
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame detector output for one hand: which fingers are raised.
///
/// `fingers_up` is ordered thumb-first, matching [`FingerId::index`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandSnapshot {
    pub side:       HandSide,
    pub fingers_up: [bool; 5],
}

impl HandSnapshot {
    /// A hand with every finger down.
    pub fn lowered(side: HandSide) -> Self {
        HandSnapshot { side, fingers_up: [false; 5] }
    }

    /// A hand with exactly the given fingers raised.
    pub fn raised(side: HandSide, fingers: &[FingerId]) -> Self {
        let mut up = [false; 5];
        for f in fingers {
            up[f.index()] = true;
        }
        HandSnapshot { side, fingers_up: up }
    }
}

/// A transition of one slot's sounding flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    /// false → true: the chord should start now.
    Rose,
    /// true → false: the chord should stop after the sustain delay.
    Fell,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureTracker
// ════════════════════════════════════════════════════════════════════════════

/// Edge detector over the ten (hand, finger) sounding flags.
///
/// Pure state transition: no I/O, deterministic given current flags and the
/// incoming snapshot list.
#[derive(Clone, Debug, Default)]
pub struct GestureTracker {
    // [side][finger]
    sounding: [[bool; 5]; 2],
}

impl GestureTracker {
    /// All slots start silent.
    pub fn new() -> Self {
        GestureTracker::default()
    }

    /// Current sounding flag for one slot (used by the HUD).
    pub fn is_sounding(&self, side: HandSide, finger: FingerId) -> bool {
        self.sounding[side.index()][finger.index()]
    }

    /// Compare one detector frame against the stored flags and return the
    /// edges, updating the flags as it goes.
    ///
    /// An empty `snapshots` slice means the detector lost both hands: every
    /// sounding slot emits [`EdgeKind::Fell`] and all flags clear, so losing
    /// tracking can never leave a chord ringing forever.
    ///
    /// A side reported more than once in a single frame is undefined
    /// detector behavior; the first snapshot wins.
    pub fn update(&mut self, snapshots: &[HandSnapshot]) -> Vec<(ChordKey, EdgeKind)> {
        let mut edges = Vec::new();

        if snapshots.is_empty() {
            for side in HandSide::BOTH {
                for finger in FingerId::ALL {
                    let flag = &mut self.sounding[side.index()][finger.index()];
                    if *flag {
                        *flag = false;
                        edges.push(((side, finger), EdgeKind::Fell));
                    }
                }
            }
            return edges;
        }

        let mut seen = [false; 2];
        for snap in snapshots {
            let s = snap.side.index();
            if seen[s] {
                continue;
            }
            seen[s] = true;

            for finger in FingerId::ALL {
                let up   = snap.fingers_up[finger.index()];
                let flag = &mut self.sounding[s][finger.index()];
                if up && !*flag {
                    *flag = true;
                    edges.push(((snap.side, finger), EdgeKind::Rose));
                } else if !up && *flag {
                    *flag = false;
                    edges.push(((snap.side, finger), EdgeKind::Fell));
                }
            }
        }

        edges
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
