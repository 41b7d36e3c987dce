//! Static chord assignment — (hand, finger) → MIDI notes.
//!
//! A [`ChordTable`] is total: once constructed it resolves *every*
//! (hand, finger) pair without failure.  All validation happens eagerly in
//! [`ChordTable::new`], so a malformed table is rejected at startup rather
//! than mid-performance.

use std::collections::HashMap;
use thiserror::Error;

/// Highest valid MIDI pitch.
pub const NOTE_MAX: u8 = 127;

// ════════════════════════════════════════════════════════════════════════════
// HandSide / FingerId / ChordKey
// ════════════════════════════════════════════════════════════════════════════

/// Which hand a snapshot or chord slot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub const BOTH: [HandSide; 2] = [HandSide::Left, HandSide::Right];

    pub fn index(self) -> usize {
        match self {
            HandSide::Left  => 0,
            HandSide::Right => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HandSide::Left  => "left",
            HandSide::Right => "right",
        }
    }
}

/// One of the five fingers, in detector order (thumb first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FingerId {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerId {
    pub const ALL: [FingerId; 5] = [
        FingerId::Thumb,
        FingerId::Index,
        FingerId::Middle,
        FingerId::Ring,
        FingerId::Pinky,
    ];

    /// Position in a detector `fingers_up` array.
    pub fn index(self) -> usize {
        match self {
            FingerId::Thumb  => 0,
            FingerId::Index  => 1,
            FingerId::Middle => 2,
            FingerId::Ring   => 3,
            FingerId::Pinky  => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FingerId::Thumb  => "thumb",
            FingerId::Index  => "index",
            FingerId::Middle => "middle",
            FingerId::Ring   => "ring",
            FingerId::Pinky  => "pinky",
        }
    }
}

/// One assignable chord slot.
pub type ChordKey = (HandSide, FingerId);

// ════════════════════════════════════════════════════════════════════════════
// Chord
// ════════════════════════════════════════════════════════════════════════════

/// An ordered set of MIDI pitches triggered together by one finger.
///
/// Duplicates are kept as given; a chord listing the same note twice sends
/// that note twice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chord {
    notes: Vec<u8>,
}

impl Chord {
    pub fn new(notes: Vec<u8>) -> Self {
        Chord { notes }
    }

    pub fn notes(&self) -> &[u8] {
        &self.notes
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ConfigError
// ════════════════════════════════════════════════════════════════════════════

/// A malformed chord table.  Fatal at startup; never raised after
/// construction succeeds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no chord assigned to {side} {finger}")]
    MissingChord { side: &'static str, finger: &'static str },

    #[error("note {note} on {side} {finger} outside MIDI range 0-127")]
    NoteOutOfRange { side: &'static str, finger: &'static str, note: i16 },
}

// ════════════════════════════════════════════════════════════════════════════
// ChordTable
// ════════════════════════════════════════════════════════════════════════════

/// Total mapping from every [`ChordKey`] to its [`Chord`].
///
/// Stored as a dense 2×5 array so that [`ChordTable::lookup`] is infallible
/// by construction.
#[derive(Clone, Debug)]
pub struct ChordTable {
    // [side][finger]
    chords: [[Chord; 5]; 2],
}

impl ChordTable {
    /// Build a validated table from an explicit key→chord map.
    ///
    /// Every one of the ten (side, finger) keys must be present and every
    /// note must be ≤ 127, otherwise the first problem found is returned.
    pub fn new(mut map: HashMap<ChordKey, Chord>) -> Result<Self, ConfigError> {
        let mut take = |side: HandSide, finger: FingerId| -> Result<Chord, ConfigError> {
            let chord = map.remove(&(side, finger)).ok_or(ConfigError::MissingChord {
                side:   side.name(),
                finger: finger.name(),
            })?;
            if let Some(&note) = chord.notes().iter().find(|&&n| n > NOTE_MAX) {
                return Err(ConfigError::NoteOutOfRange {
                    side:   side.name(),
                    finger: finger.name(),
                    note:   note as i16,
                });
            }
            Ok(chord)
        };

        let mut row = |side| -> Result<[Chord; 5], ConfigError> {
            Ok([
                take(side, FingerId::Thumb)?,
                take(side, FingerId::Index)?,
                take(side, FingerId::Middle)?,
                take(side, FingerId::Ring)?,
                take(side, FingerId::Pinky)?,
            ])
        };

        Ok(ChordTable {
            chords: [row(HandSide::Left)?, row(HandSide::Right)?],
        })
    }

    /// The default D major scale assignment, identical on both hands.
    pub fn d_major() -> Self {
        let row = || {
            [
                Chord::new(vec![62, 66, 69]), // D Major  (D, F#, A)
                Chord::new(vec![64, 67, 71]), // E Minor  (E, G, B)
                Chord::new(vec![66, 69, 73]), // F# Minor (F#, A, C#)
                Chord::new(vec![67, 71, 74]), // G Major  (G, B, D)
                Chord::new(vec![69, 73, 76]), // A Major  (A, C#, E)
            ]
        };
        ChordTable { chords: [row(), row()] }
    }

    /// The D major table shifted by `semitones`, rejected if any note
    /// leaves the MIDI range.
    pub fn d_major_transposed(semitones: i8) -> Result<Self, ConfigError> {
        let base = ChordTable::d_major();
        let mut map = HashMap::new();
        for side in HandSide::BOTH {
            for finger in FingerId::ALL {
                let mut notes = Vec::new();
                for &n in base.lookup(side, finger).notes() {
                    let shifted = n as i16 + semitones as i16;
                    if !(0..=NOTE_MAX as i16).contains(&shifted) {
                        return Err(ConfigError::NoteOutOfRange {
                            side:   side.name(),
                            finger: finger.name(),
                            note:   shifted,
                        });
                    }
                    notes.push(shifted as u8);
                }
                map.insert((side, finger), Chord::new(notes));
            }
        }
        ChordTable::new(map)
    }

    /// Resolve a slot to its chord.  Total — cannot fail once the table
    /// exists.
    pub fn lookup(&self, side: HandSide, finger: FingerId) -> &Chord {
        &self.chords[side.index()][finger.index()]
    }
}

impl Default for ChordTable {
    fn default() -> Self {
        ChordTable::d_major()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn full_map() -> HashMap<ChordKey, Chord> {
        let mut map = HashMap::new();
        for side in HandSide::BOTH {
            for finger in FingerId::ALL {
                map.insert((side, finger), Chord::new(vec![60 + finger.index() as u8]));
            }
        }
        map
    }

    #[test]
    fn complete_map_builds() {
        let table = ChordTable::new(full_map()).unwrap();
        assert_eq!(table.lookup(HandSide::Left, FingerId::Ring).notes(), &[63]);
    }

    #[test]
    fn missing_entry_is_rejected() {
        let mut map = full_map();
        map.remove(&(HandSide::Right, FingerId::Middle));
        let err = ChordTable::new(map).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingChord { side: "right", finger: "middle" }
        );
    }

    #[test]
    fn out_of_range_note_is_rejected() {
        let mut map = full_map();
        map.insert((HandSide::Left, FingerId::Pinky), Chord::new(vec![60, 200]));
        let err = ChordTable::new(map).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NoteOutOfRange { side: "left", finger: "pinky", note: 200 }
        );
    }

    #[test]
    fn d_major_is_total() {
        let table = ChordTable::d_major();
        for side in HandSide::BOTH {
            for finger in FingerId::ALL {
                assert_eq!(table.lookup(side, finger).notes().len(), 3);
            }
        }
    }

    #[test]
    fn d_major_thumb_chord() {
        let table = ChordTable::d_major();
        assert_eq!(table.lookup(HandSide::Right, FingerId::Thumb).notes(), &[62, 66, 69]);
        assert_eq!(table.lookup(HandSide::Left,  FingerId::Thumb).notes(), &[62, 66, 69]);
    }

    #[test]
    fn d_major_pinky_chord() {
        let table = ChordTable::d_major();
        assert_eq!(table.lookup(HandSide::Right, FingerId::Pinky).notes(), &[69, 73, 76]);
    }

    #[test]
    fn transposition_shifts_every_note() {
        let table = ChordTable::d_major_transposed(2).unwrap();
        assert_eq!(table.lookup(HandSide::Right, FingerId::Thumb).notes(), &[64, 68, 71]);
    }

    #[test]
    fn transposition_out_of_range_is_rejected() {
        assert!(ChordTable::d_major_transposed(60).is_err());
        assert!(ChordTable::d_major_transposed(-90).is_err());
    }

    #[test]
    fn zero_transposition_matches_the_default() {
        let shifted = ChordTable::d_major_transposed(0).unwrap();
        let base    = ChordTable::d_major();
        for side in HandSide::BOTH {
            for finger in FingerId::ALL {
                assert_eq!(shifted.lookup(side, finger), base.lookup(side, finger));
            }
        }
    }

    #[test]
    fn chords_keep_duplicate_notes() {
        let chord = Chord::new(vec![60, 60, 64]);
        assert_eq!(chord.notes(), &[60, 60, 64]);
    }
}
