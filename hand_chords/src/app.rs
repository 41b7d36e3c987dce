//! Top-level application state machine and frame loop.
//!
//! `AppState` owns the chord table, the gesture tracker, the sustain
//! scheduler and the instrument selector.  Each detector frame flows
//! tracker → edges → scheduler; the discrete keyboard commands flow to the
//! selector, independent of gesture state.
//!
//! Per (hand, finger) slot the state machine is {Silent, Sounding}:
//! Silent → Sounding on finger-up (note-on now), Sounding → Silent on
//! finger-down or hands-lost (note-off after the sustain delay).

use std::sync::mpsc;
use std::time::{Duration, Instant};

use thiserror::Error;

use chord_engine::{ChordTable, EdgeKind, FingerId, GestureTracker, HandSide, HandSnapshot};

use crate::hud::{Hud, UiCommand};
use crate::instrument::{default_presets, Instrument, InstrumentSelector, DEFAULT_DISPLAY_TIME};
use crate::midi::{open_midi_output, SharedSink, VELOCITY};
use crate::source::{HandSource, SimHands};
use crate::sustain::{SustainScheduler, DEFAULT_SUSTAIN};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig / AppError
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    pub table:        ChordTable,
    pub presets:      Vec<Instrument>,
    pub sustain:      Duration,
    pub display_time: Duration,
    pub velocity:     u8,
    pub channel:      u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            table:        ChordTable::d_major(),
            presets:      default_presets(),
            sustain:      DEFAULT_SUSTAIN,
            display_time: DEFAULT_DISPLAY_TIME,
            velocity:     VELOCITY,
            channel:      0,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window error: {0}")]
    Window(String),

    #[error("no instrument presets configured")]
    NoPresets,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    table:     ChordTable,
    tracker:   GestureTracker,
    scheduler: SustainScheduler,
    selector:  InstrumentSelector,
    pub status: String,
}

impl AppState {
    pub fn new(cfg: AppConfig, sink: SharedSink) -> Result<Self, AppError> {
        if cfg.presets.is_empty() {
            return Err(AppError::NoPresets);
        }
        let scheduler = SustainScheduler::spawn(sink.clone(), cfg.sustain, cfg.velocity);
        let selector  = InstrumentSelector::new(cfg.presets, cfg.display_time, sink);

        Ok(AppState {
            table:     cfg.table,
            tracker:   GestureTracker::new(),
            scheduler, selector,
            status:    "Ready - raise a finger to play".to_string(),
        })
    }

    /// Feed one detector frame through the tracker and out to MIDI.
    pub fn handle_frame(&mut self, snapshots: &[HandSnapshot]) {
        let hands_lost = snapshots.is_empty();

        for (key, edge) in self.tracker.update(snapshots) {
            let (side, finger) = key;
            let chord = self.table.lookup(side, finger);
            match edge {
                EdgeKind::Rose => {
                    self.scheduler.on_rose(chord);
                    self.status = format!(
                        "{} {} up - notes {:?}",
                        side.name(), finger.name(), chord.notes()
                    );
                }
                EdgeKind::Fell => {
                    self.scheduler.on_fell(key, chord.clone());
                    self.status = if hands_lost {
                        "tracking lost - stopping all chords".to_string()
                    } else {
                        format!("{} {} down - sustaining", side.name(), finger.name())
                    };
                }
            }
        }
    }

    /// Advance to the next instrument preset.
    pub fn cycle_instrument(&mut self, now: Instant) -> &Instrument {
        let name = self.selector.cycle(now).name;
        self.status = format!("switched to {}", name);
        self.selector.current()
    }

    /// Transient instrument announcement, if its window is still open.
    pub fn display(&self, now: Instant) -> Option<&Instrument> {
        self.selector.current_display(now)
    }

    /// Sounding flags `[side][finger]` for the HUD.
    pub fn sounding(&self) -> [[bool; 5]; 2] {
        let mut out = [[false; 5]; 2];
        for side in HandSide::BOTH {
            for finger in FingerId::ALL {
                out[side.index()][finger.index()] = self.tracker.is_sounding(side, finger);
            }
        }
        out
    }

    /// Flush every pending sustain (note-offs fire immediately) and stop
    /// the worker.
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main frame loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application: open the MIDI sink, the HUD window and the
/// simulated hand source, then drive one iteration per frame at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let sink = open_midi_output(cfg.channel);

    let (sim_tx, sim_rx) = mpsc::channel();
    let mut hud    = Hud::new(sim_tx).map_err(AppError::Window)?;
    let mut source = SimHands { rx: sim_rx };
    let mut app    = AppState::new(cfg, sink)?;

    'frames: while hud.is_open() {
        // Sampling the keyboard also produces this frame's sim snapshot.
        let commands = hud.poll_input();

        match source.poll() {
            Ok(snapshots) => app.handle_frame(&snapshots),
            Err(e) => log::warn!("{} - skipping frame", e),
        }

        hud.render(app.sounding(), app.display(Instant::now()), &app.status);

        for cmd in commands {
            match cmd {
                UiCommand::CycleInstrument => {
                    let inst = app.cycle_instrument(Instant::now());
                    log::info!("switched to: {}", inst.name);
                }
                UiCommand::Quit => break 'frames,
            }
        }
    }

    // Termination policy: anything still sustaining stops now.
    app.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
