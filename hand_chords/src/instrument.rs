//! Instrument presets and the cycling selector.
//!
//! A fixed ordered list of General MIDI programs; one wrapping index picks
//! the active one.  Cycling applies the program change to the sink and opens
//! a transient display window so the HUD can announce the switch.

use std::time::{Duration, Instant};

use crate::midi::SharedSink;

/// How long the HUD shows "Instrument: {name}" after a change.
pub const DEFAULT_DISPLAY_TIME: Duration = Duration::from_secs(3);

// ════════════════════════════════════════════════════════════════════════════
// Instrument
// ════════════════════════════════════════════════════════════════════════════

/// (General MIDI program number, display name).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instrument {
    pub program: u8,
    pub name:    &'static str,
}

impl Instrument {
    pub const fn new(program: u8, name: &'static str) -> Self {
        Instrument { program, name }
    }
}

/// The stock preset list.
pub fn default_presets() -> Vec<Instrument> {
    vec![
        Instrument::new(0,   "Acoustic Grand Piano"),
        Instrument::new(24,  "Nylon Guitar"),
        Instrument::new(40,  "Violin"),
        Instrument::new(56,  "Trumpet"),
        Instrument::new(73,  "Flute"),
        Instrument::new(118, "Synth Drum"),
    ]
}

// ════════════════════════════════════════════════════════════════════════════
// InstrumentSelector
// ════════════════════════════════════════════════════════════════════════════

/// Owns the preset list, the active index and the announce window.
///
/// The selector is independent of gesture state; only the discrete
/// cycle command mutates it.
pub struct InstrumentSelector {
    presets:      Vec<Instrument>,
    index:        usize,
    last_change:  Option<Instant>,
    display_time: Duration,
    sink:         SharedSink,
}

impl InstrumentSelector {
    /// Applies the first preset's program to the sink straight away, so the
    /// synth and the selector agree from the start.  The display window
    /// starts closed.
    ///
    /// `presets` must be non-empty; the caller validates that at startup.
    pub fn new(presets: Vec<Instrument>, display_time: Duration, sink: SharedSink) -> Self {
        debug_assert!(!presets.is_empty());
        if let Err(e) = sink.set_instrument(presets[0].program) {
            log::warn!("initial program change lost: {}", e);
        }
        InstrumentSelector {
            presets,
            index: 0,
            last_change: None,
            display_time,
            sink,
        }
    }

    /// Advance to the next preset (wrapping), apply its program change and
    /// open the display window.  Returns the newly active preset.
    pub fn cycle(&mut self, now: Instant) -> &Instrument {
        self.index = (self.index + 1) % self.presets.len();
        let preset = self.presets[self.index];
        if let Err(e) = self.sink.set_instrument(preset.program) {
            log::warn!("program change to {} lost: {}", preset.name, e);
        }
        self.last_change = Some(now);
        &self.presets[self.index]
    }

    /// The active preset, announce window or not.
    pub fn current(&self) -> &Instrument {
        &self.presets[self.index]
    }

    /// The active preset, but only while the announce window is open.
    /// Purely visual; has no effect on sound.
    pub fn current_display(&self, now: Instant) -> Option<&Instrument> {
        match self.last_change {
            Some(changed) if now.saturating_duration_since(changed) < self.display_time => {
                Some(self.current())
            }
            _ => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::testing::{RecordingSink, SinkCall};

    fn two_presets() -> Vec<Instrument> {
        vec![Instrument::new(0, "Piano"), Instrument::new(24, "Guitar")]
    }

    #[test]
    fn new_applies_the_first_program() {
        let (rec, sink) = RecordingSink::new().shared();
        let sel = InstrumentSelector::new(two_presets(), DEFAULT_DISPLAY_TIME, sink);
        assert_eq!(rec.calls(), vec![SinkCall::Program(0)]);
        assert_eq!(sel.current().name, "Piano");
    }

    #[test]
    fn cycle_advances_and_applies_program() {
        let (rec, sink) = RecordingSink::new().shared();
        let mut sel = InstrumentSelector::new(two_presets(), DEFAULT_DISPLAY_TIME, sink);
        let inst = sel.cycle(Instant::now());
        assert_eq!(*inst, Instrument::new(24, "Guitar"));
        assert!(rec.calls().contains(&SinkCall::Program(24)));
    }

    #[test]
    fn cycling_the_full_list_wraps_to_the_start() {
        let (_rec, sink) = RecordingSink::new().shared();
        let mut sel = InstrumentSelector::new(default_presets(), DEFAULT_DISPLAY_TIME, sink);
        let original = *sel.current();
        let n = default_presets().len();
        for _ in 0..n {
            sel.cycle(Instant::now());
        }
        assert_eq!(*sel.current(), original);
    }

    #[test]
    fn display_is_closed_before_any_change() {
        let (_rec, sink) = RecordingSink::new().shared();
        let sel = InstrumentSelector::new(two_presets(), DEFAULT_DISPLAY_TIME, sink);
        assert!(sel.current_display(Instant::now()).is_none());
    }

    #[test]
    fn display_opens_on_change_and_times_out() {
        let display = Duration::from_secs(3);
        let (_rec, sink) = RecordingSink::new().shared();
        let mut sel = InstrumentSelector::new(two_presets(), display, sink);

        let t0 = Instant::now();
        sel.cycle(t0);

        assert_eq!(sel.current_display(t0).map(|i| i.name), Some("Guitar"));
        let just_inside = t0 + display - Duration::from_millis(1);
        assert!(sel.current_display(just_inside).is_some());
        let just_past = t0 + display + Duration::from_millis(1);
        assert!(sel.current_display(just_past).is_none());
    }

    #[test]
    fn display_does_not_change_the_active_preset() {
        let (_rec, sink) = RecordingSink::new().shared();
        let mut sel = InstrumentSelector::new(two_presets(), DEFAULT_DISPLAY_TIME, sink);
        let t0 = Instant::now();
        sel.cycle(t0);
        sel.current_display(t0 + Duration::from_secs(60));
        assert_eq!(sel.current().name, "Guitar");
    }
}
