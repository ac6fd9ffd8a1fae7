/// Time-ordered event queue and virtual clock.
///
/// Uses a `BinaryHeap` with reversed `Ord` on `ScheduledEntry` to act
/// as a min-heap keyed by `(time, seq)`. Sequence numbers are minted at
/// push, so two entries at the same time pop in scheduling order — the
/// dispatch order of a run is a pure function of program order, never
/// of heap internals.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::event::{Event, EventId, EventIdGen};
use crate::process::{ProcessId, ProcessIdGen};
use crate::time::VirtualTime;

// ── Scheduled entry ───────────────────────────────────────────────────

/// One queue entry: an event due at a time, with the tie-breaking
/// sequence number. Consumed exactly once, when popped.
pub(crate) struct ScheduledEntry {
    pub(crate) at: VirtualTime,
    pub(crate) seq: u64,
    pub(crate) event: Event,
}

/// Ordering: smallest `(at, seq)` first.
///
/// Rust's `BinaryHeap` is a *max*-heap, so the natural ordering is
/// reversed here to turn it into a min-heap. The event itself takes no
/// part in the ordering.
impl Ord for ScheduledEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEntry {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for ScheduledEntry {}

// ── Scheduler ─────────────────────────────────────────────────────────

/// Owner of the virtual clock, the event queue, and the ID generators.
///
/// All scheduling goes through this struct; the clock is advanced only
/// by the simulation loop popping entries.
pub(crate) struct Scheduler {
    now: VirtualTime,
    queue: BinaryHeap<ScheduledEntry>,
    /// Monotonic tie-break counter, minted at push.
    next_seq: u64,
    event_ids: EventIdGen,
    process_ids: ProcessIdGen,
}

impl Scheduler {
    /// Create an empty scheduler with the clock at `epoch`.
    pub(crate) fn starting_at(epoch: VirtualTime) -> Self {
        Scheduler {
            now: epoch,
            queue: BinaryHeap::new(),
            next_seq: 0,
            event_ids: EventIdGen::new(),
            process_ids: ProcessIdGen::new(),
        }
    }

    /// Current virtual time.
    pub(crate) fn now(&self) -> VirtualTime {
        self.now
    }

    /// Push `event` to be processed at `at`.
    ///
    /// # Panics
    /// Panics if `at` is before the current time (non-causal
    /// scheduling).
    pub(crate) fn schedule(&mut self, event: Event, at: VirtualTime) {
        assert!(
            at >= self.now,
            "cannot schedule into the past: now={}, at={}",
            self.now,
            at
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(ScheduledEntry { at, seq, event });
    }

    /// Pop the entry with the smallest `(time, seq)`, or `None` when
    /// the queue is empty.
    pub(crate) fn pop_next(&mut self) -> Option<ScheduledEntry> {
        self.queue.pop()
    }

    /// Due time of the next entry without removing it.
    pub(crate) fn next_time(&self) -> Option<VirtualTime> {
        self.queue.peek().map(|entry| entry.at)
    }

    /// Move the clock forward to `to`. Time never runs backward.
    pub(crate) fn advance_to(&mut self, to: VirtualTime) {
        assert!(
            to >= self.now,
            "time went backward: now={}, to={}",
            self.now,
            to
        );
        self.now = to;
    }

    /// Number of pending queue entries.
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Mint the next event ID.
    pub(crate) fn mint_event_id(&mut self) -> EventId {
        self.event_ids.next_id()
    }

    /// Mint the next process ID.
    pub(crate) fn mint_process_id(&mut self) -> ProcessId {
        self.process_ids.next_id()
    }
}
