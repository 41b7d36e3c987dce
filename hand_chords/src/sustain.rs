//! Sustain scheduling — immediate note-ons, deferred note-offs.
//!
//! Every falling edge becomes a [`PendingSustain`] that fires its note-offs
//! SUSTAIN_TIME later.  Instead of one sleeping thread per edge, a single
//! worker thread holds all deadlines in a min-heap ([`SustainQueue`]) and
//! waits only until the earliest one; the frame loop never blocks on it.
//!
//! Deliberately preserved quirk: a pending note-off is *not* cancelled when
//! the same chord rises again before the delay elapses.  The redundant
//! note-off is harmless because every rise re-sends its note-ons.  Entries
//! carry their [`ChordKey`] so a cancellation policy could be keyed on it
//! later.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chord_engine::{Chord, ChordKey};

use crate::midi::SharedSink;

/// Seconds a chord keeps ringing after its finger drops.
pub const DEFAULT_SUSTAIN: Duration = Duration::from_secs(2);

// ════════════════════════════════════════════════════════════════════════════
// PendingSustain / SustainQueue
// ════════════════════════════════════════════════════════════════════════════

/// One scheduled note-off batch.  No identity beyond its contents: two
/// pending sustains for the same chord are independent and both fire.
#[derive(Clone, Debug)]
pub struct PendingSustain {
    pub key:      ChordKey,
    pub chord:    Chord,
    pub deadline: Instant,
}

// Ordered by deadline only, reversed so BinaryHeap pops earliest first.
impl PartialEq for PendingSustain {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline
    }
}
impl Eq for PendingSustain {}
impl PartialOrd for PendingSustain {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for PendingSustain {
    fn cmp(&self, other: &Self) -> Ordering {
        other.deadline.cmp(&self.deadline)
    }
}

/// Deadline min-heap.  Pure container, no clock of its own — callers pass
/// `now`, which keeps it testable without waiting.
#[derive(Debug, Default)]
pub struct SustainQueue {
    heap: BinaryHeap<PendingSustain>,
}

impl SustainQueue {
    pub fn new() -> Self {
        SustainQueue::default()
    }

    pub fn push(&mut self, pending: PendingSustain) {
        self.heap.push(pending);
    }

    /// Earliest deadline currently queued, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|p| p.deadline)
    }

    /// Pop the earliest entry if its deadline has passed.
    pub fn pop_due(&mut self, now: Instant) -> Option<PendingSustain> {
        if self.heap.peek().map_or(false, |p| p.deadline <= now) {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Remove everything, deadlines ignored.  Used by the shutdown flush.
    pub fn drain(&mut self) -> Vec<PendingSustain> {
        self.heap.drain().collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SustainScheduler — public handle
// ════════════════════════════════════════════════════════════════════════════

enum WorkerMsg {
    Defer(PendingSustain),
    Shutdown,
}

/// Handle to the sustain worker thread.
///
/// `on_rose` writes to the sink synchronously from the caller's thread;
/// `on_fell` hands the chord to the worker and returns immediately.
pub struct SustainScheduler {
    tx:       Sender<WorkerMsg>,
    handle:   Option<JoinHandle<()>>,
    sink:     SharedSink,
    sustain:  Duration,
    velocity: u8,
}

impl SustainScheduler {
    pub fn spawn(sink: SharedSink, sustain: Duration, velocity: u8) -> Self {
        let (tx, rx) = mpsc::channel::<WorkerMsg>();
        let worker_sink = sink.clone();
        let handle = thread::spawn(move || worker(rx, worker_sink, velocity));

        SustainScheduler { tx, handle: Some(handle), sink, sustain, velocity }
    }

    /// A chord started sounding: note-on for every note, right now.
    /// Sink failures are logged and the remaining notes still go out.
    pub fn on_rose(&self, chord: &Chord) {
        for &note in chord.notes() {
            if let Err(e) = self.sink.note_on(note, self.velocity) {
                log::warn!("note-on {} lost: {}", note, e);
            }
        }
    }

    /// A chord stopped sounding: schedule its note-offs for
    /// `now + sustain`.  Does not block and does not deduplicate.
    pub fn on_fell(&self, key: ChordKey, chord: Chord) {
        let pending = PendingSustain {
            key,
            chord,
            deadline: Instant::now() + self.sustain,
        };
        if self.tx.send(WorkerMsg::Defer(pending)).is_err() {
            log::warn!("sustain worker gone; note-off dropped");
        }
    }

    /// Termination policy: force-flush.  Every pending sustain fires its
    /// note-offs immediately, then the worker exits and is joined.
    pub fn shutdown(&mut self) {
        let _ = self.tx.send(WorkerMsg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SustainScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// worker — the timer thread
// ════════════════════════════════════════════════════════════════════════════

fn worker(rx: Receiver<WorkerMsg>, sink: SharedSink, velocity: u8) {
    let mut queue = SustainQueue::new();

    loop {
        let msg = match queue.next_deadline() {
            Some(deadline) => {
                let now = Instant::now();
                if deadline <= now {
                    fire_due(&mut queue, &sink, velocity, now);
                    continue;
                }
                match rx.recv_timeout(deadline - now) {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout) => {
                        fire_due(&mut queue, &sink, velocity, Instant::now());
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            // Nothing pending: block until the next command.
            None => match rx.recv() {
                Ok(msg) => msg,
                Err(_) => break,
            },
        };

        match msg {
            WorkerMsg::Defer(pending) => queue.push(pending),
            WorkerMsg::Shutdown => break,
        }
    }

    // Flush: whatever is still pending stops now, not never.
    for pending in queue.drain() {
        send_note_offs(&sink, &pending.chord, velocity);
    }
}

fn fire_due(queue: &mut SustainQueue, sink: &SharedSink, velocity: u8, now: Instant) {
    while let Some(pending) = queue.pop_due(now) {
        send_note_offs(sink, &pending.chord, velocity);
    }
}

fn send_note_offs(sink: &SharedSink, chord: &Chord, velocity: u8) {
    for &note in chord.notes() {
        if let Err(e) = sink.note_off(note, velocity) {
            log::warn!("note-off {} lost: {}", note, e);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::testing::{FailingSink, RecordingSink, SinkCall};
    use crate::midi::VELOCITY;
    use chord_engine::{FingerId, HandSide};

    fn key() -> ChordKey {
        (HandSide::Right, FingerId::Thumb)
    }

    fn d_major() -> Chord {
        Chord::new(vec![62, 66, 69])
    }

    // ── SustainQueue (pure, no waiting) ──────────────────────────────────

    fn pending_at(deadline: Instant) -> PendingSustain {
        PendingSustain { key: key(), chord: d_major(), deadline }
    }

    #[test]
    fn queue_pops_earliest_deadline_first() {
        let now = Instant::now();
        let mut q = SustainQueue::new();
        q.push(pending_at(now + Duration::from_millis(300)));
        q.push(pending_at(now + Duration::from_millis(100)));
        q.push(pending_at(now + Duration::from_millis(200)));

        assert_eq!(q.next_deadline(), Some(now + Duration::from_millis(100)));
        let late = now + Duration::from_secs(1);
        assert_eq!(q.pop_due(late).unwrap().deadline, now + Duration::from_millis(100));
        assert_eq!(q.pop_due(late).unwrap().deadline, now + Duration::from_millis(200));
        assert_eq!(q.pop_due(late).unwrap().deadline, now + Duration::from_millis(300));
        assert!(q.is_empty());
    }

    #[test]
    fn queue_holds_entries_until_due() {
        let now = Instant::now();
        let mut q = SustainQueue::new();
        q.push(pending_at(now + Duration::from_secs(10)));
        assert!(q.pop_due(now).is_none());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn queue_keeps_same_chord_entries_independent() {
        let now = Instant::now();
        let mut q = SustainQueue::new();
        q.push(pending_at(now));
        q.push(pending_at(now));
        assert_eq!(q.len(), 2);
        assert!(q.pop_due(now).is_some());
        assert!(q.pop_due(now).is_some());
    }

    #[test]
    fn queue_drain_ignores_deadlines() {
        let now = Instant::now();
        let mut q = SustainQueue::new();
        q.push(pending_at(now + Duration::from_secs(60)));
        q.push(pending_at(now + Duration::from_secs(120)));
        assert_eq!(q.drain().len(), 2);
        assert!(q.is_empty());
    }

    // ── SustainScheduler (short real delays) ─────────────────────────────

    #[test]
    fn rose_sends_note_ons_immediately() {
        let (rec, sink) = RecordingSink::new().shared();
        let sched = SustainScheduler::spawn(sink, Duration::from_secs(10), VELOCITY);
        sched.on_rose(&d_major());
        assert_eq!(
            rec.calls(),
            vec![
                SinkCall::NoteOn(62, 127),
                SinkCall::NoteOn(66, 127),
                SinkCall::NoteOn(69, 127),
            ]
        );
    }

    #[test]
    fn fell_defers_note_offs_for_the_sustain_time() {
        let (rec, sink) = RecordingSink::new().shared();
        let sched = SustainScheduler::spawn(sink, Duration::from_millis(50), VELOCITY);
        sched.on_fell(key(), d_major());

        // Not yet.
        assert!(rec.calls().is_empty());

        thread::sleep(Duration::from_millis(300));
        assert_eq!(
            rec.calls(),
            vec![
                SinkCall::NoteOff(62, 127),
                SinkCall::NoteOff(66, 127),
                SinkCall::NoteOff(69, 127),
            ]
        );
    }

    #[test]
    fn overlapping_fells_for_the_same_chord_both_fire() {
        let (rec, sink) = RecordingSink::new().shared();
        let sched = SustainScheduler::spawn(sink, Duration::from_millis(30), VELOCITY);
        sched.on_fell(key(), d_major());
        sched.on_fell(key(), d_major());

        thread::sleep(Duration::from_millis(300));
        let offs = rec.calls().iter()
            .filter(|c| matches!(c, SinkCall::NoteOff(..)))
            .count();
        assert_eq!(offs, 6);
    }

    #[test]
    fn rose_after_fell_does_not_cancel_the_pending_off() {
        let (rec, sink) = RecordingSink::new().shared();
        let sched = SustainScheduler::spawn(sink, Duration::from_millis(50), VELOCITY);
        sched.on_fell(key(), d_major());
        sched.on_rose(&d_major());

        thread::sleep(Duration::from_millis(300));
        let calls = rec.calls();
        assert!(calls.contains(&SinkCall::NoteOn(62, 127)));
        assert!(calls.contains(&SinkCall::NoteOff(62, 127)));
    }

    #[test]
    fn shutdown_flushes_pending_offs_immediately() {
        let (rec, sink) = RecordingSink::new().shared();
        let mut sched = SustainScheduler::spawn(sink, Duration::from_secs(60), VELOCITY);
        sched.on_fell(key(), d_major());
        sched.shutdown();

        // Long deadline, yet the offs are already out.
        let offs = rec.calls().iter()
            .filter(|c| matches!(c, SinkCall::NoteOff(..)))
            .count();
        assert_eq!(offs, 3);
    }

    #[test]
    fn sink_failure_does_not_kill_the_worker() {
        let sink = SharedSink::new(Box::new(FailingSink));
        let mut sched = SustainScheduler::spawn(sink, Duration::from_millis(20), VELOCITY);
        sched.on_rose(&d_major());
        sched.on_fell(key(), d_major());
        thread::sleep(Duration::from_millis(150));
        // Worker is still alive and joins cleanly.
        sched.shutdown();
    }
}
