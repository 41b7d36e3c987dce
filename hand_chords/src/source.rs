//! Hand detection sources — keyboard simulation and scripted playback.
//!
//! The capture pipeline and the hand-pose detector are external
//! collaborators; everything behind [`HandSource::poll`] is a black box that
//! produces zero or more per-hand finger snapshots each frame.
//!
//! The shipped implementation is the keyboard simulator: the HUD window
//! samples finger keys once per frame and sends a [`SimFrame`] over a
//! channel, which [`SimHands`] translates into detector snapshots.  A real
//! camera/pose backend would slot in behind the same trait.

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;

use thiserror::Error;

use chord_engine::{HandSide, HandSnapshot};

// ════════════════════════════════════════════════════════════════════════════
// CaptureError
// ════════════════════════════════════════════════════════════════════════════

/// No frame arrived this cycle.  Recoverable: log, skip the cycle, keep the
/// loop running.
#[derive(Debug, Error)]
#[error("no frame from hand tracker: {0}")]
pub struct CaptureError(pub String);

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver one detector frame per call.
///
/// An empty vec is a valid frame: it means "no hands in view" and triggers
/// the tracker's fail-safe.
pub trait HandSource {
    fn poll(&mut self) -> Result<Vec<HandSnapshot>, CaptureError>;
}

// ════════════════════════════════════════════════════════════════════════════
// SimHands — keyboard simulation (default mode)
// ════════════════════════════════════════════════════════════════════════════

/// Raw per-frame key state sampled by the HUD window.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimFrame {
    /// Held finger keys, `[side][finger]`, thumb first.
    pub fingers:       [[bool; 5]; 2],
    /// Tab held: both hands vanish, exercising the tracking-lost fail-safe.
    pub tracking_lost: bool,
}

/// Translates [`SimFrame`]s from the HUD into detector snapshots.  Both
/// simulated hands are always in view unless tracking loss is being faked.
pub struct SimHands {
    pub rx: Receiver<SimFrame>,
}

impl HandSource for SimHands {
    fn poll(&mut self) -> Result<Vec<HandSnapshot>, CaptureError> {
        let frame = self.rx.recv()
            .map_err(|_| CaptureError("simulation window closed".into()))?;

        if frame.tracking_lost {
            return Ok(Vec::new());
        }
        Ok(vec![
            HandSnapshot {
                side:       HandSide::Left,
                fingers_up: frame.fingers[HandSide::Left.index()],
            },
            HandSnapshot {
                side:       HandSide::Right,
                fingers_up: frame.fingers[HandSide::Right.index()],
            },
        ])
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedHands — fixed frame sequence (tests, headless runs)
// ════════════════════════════════════════════════════════════════════════════

/// Replays a fixed sequence of detector frames, then reports capture
/// failures once exhausted.
pub struct ScriptedHands {
    frames: VecDeque<Vec<HandSnapshot>>,
}

impl ScriptedHands {
    pub fn new(frames: Vec<Vec<HandSnapshot>>) -> Self {
        ScriptedHands { frames: frames.into() }
    }
}

impl HandSource for ScriptedHands {
    fn poll(&mut self) -> Result<Vec<HandSnapshot>, CaptureError> {
        self.frames.pop_front()
            .ok_or_else(|| CaptureError("script exhausted".into()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chord_engine::FingerId;
    use std::sync::mpsc;

    #[test]
    fn sim_hands_reports_both_hands() {
        let (tx, rx) = mpsc::channel();
        let mut source = SimHands { rx };

        let mut frame = SimFrame::default();
        frame.fingers[HandSide::Right.index()][FingerId::Thumb.index()] = true;
        tx.send(frame).unwrap();

        let snaps = source.poll().unwrap();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].side, HandSide::Left);
        assert_eq!(snaps[1].side, HandSide::Right);
        assert!(snaps[1].fingers_up[0]);
    }

    #[test]
    fn sim_hands_tracking_loss_yields_empty_frame() {
        let (tx, rx) = mpsc::channel();
        let mut source = SimHands { rx };
        tx.send(SimFrame { tracking_lost: true, ..SimFrame::default() }).unwrap();
        assert!(source.poll().unwrap().is_empty());
    }

    #[test]
    fn sim_hands_closed_window_is_a_capture_error() {
        let (tx, rx) = mpsc::channel::<SimFrame>();
        drop(tx);
        let mut source = SimHands { rx };
        assert!(source.poll().is_err());
    }

    #[test]
    fn scripted_hands_replays_then_errors() {
        let mut source = ScriptedHands::new(vec![
            vec![HandSnapshot::raised(HandSide::Right, &[FingerId::Thumb])],
            vec![],
        ]);
        assert_eq!(source.poll().unwrap().len(), 1);
        assert!(source.poll().unwrap().is_empty());
        assert!(source.poll().is_err());
    }
}
