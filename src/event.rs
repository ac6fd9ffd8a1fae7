/// Event lifecycle for the simulation kernel.
///
/// An `Event` is a cheap, clonable handle to shared lifecycle state: an
/// occurrence that will, may, or has happened at some simulated time.
/// Processes suspend on events, callbacks ride on events, and the
/// scheduler's queue holds events. All mutation goes through the kernel
/// operations (`trigger`, `abort`, `process`) — client code only ever
/// reads state through the predicates.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::KairosResult;
use crate::process::runtime::{self, ProcessCell};
use crate::scheduler::Scheduler;

// ── Event ID ──────────────────────────────────────────────────────────

/// A unique, strictly-increasing event identifier.
///
/// Minted by the scheduler at event creation. Identifies events in
/// traces and error reports; queue ordering uses a separate sequence
/// number minted at *scheduling* time, so same-time ties resolve by
/// scheduling order, not creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EventId(u64);

impl EventId {
    /// Wrap a raw u64 into an `EventId`.
    #[inline]
    pub fn new(raw: u64) -> Self {
        EventId(raw)
    }

    /// Return the raw value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E#{}", self.0)
    }
}

/// Monotonic event-ID generator. Each scheduler owns exactly one;
/// single-threaded execution makes the counter trivially deterministic.
#[derive(Debug, Clone, Default)]
pub struct EventIdGen {
    next: u64,
}

impl EventIdGen {
    /// Create a generator starting at 0.
    pub fn new() -> Self {
        EventIdGen { next: 0 }
    }

    /// Mint the next event ID.
    pub fn next_id(&mut self) -> EventId {
        let id = EventId(self.next);
        self.next += 1;
        id
    }
}

// ── Event state ───────────────────────────────────────────────────────

/// Lifecycle state of an event.
///
/// `pending → triggered → processed`, or `pending → aborted`. A pending
/// event sitting in the queue (a timeout) goes `pending → processed`
/// directly when popped. `Processed` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum EventState {
    /// Not yet triggered or aborted.
    Pending,
    /// Will be processed at the current simulation time.
    Triggered,
    /// Processed; waiters and callbacks have run.
    Processed,
    /// Aborted; waiters were destroyed, callbacks discarded.
    Aborted,
}

impl EventState {
    /// Whether this state never changes again.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, EventState::Processed | EventState::Aborted)
    }
}

// ── Event ─────────────────────────────────────────────────────────────

type Callback = Box<dyn FnOnce(&Event)>;

/// Shared backing record of an event.
///
/// Referenced by every handle clone, by the scheduler queue while the
/// event is enqueued, and by nothing else. The scheduler back-reference
/// is weak so a dropped simulation frees its events.
struct EventInner {
    id: EventId,
    state: EventState,
    /// Suspended processes to resume on processing, in registration
    /// order. Owning the cells here is what makes `abort` release their
    /// captured locals immediately.
    waiters: Vec<ProcessCell>,
    /// Callbacks to invoke on processing, in registration order.
    callbacks: Vec<Callback>,
    sched: Weak<RefCell<Scheduler>>,
}

/// Handle to one event.
///
/// Clones share the same backing record; the last handle dropped frees
/// it. Equality is identity of the backing record.
#[derive(Clone)]
pub struct Event {
    inner: Rc<RefCell<EventInner>>,
}

impl Event {
    /// Create a fresh pending event owned by `sched`. Mints the next
    /// event ID.
    pub(crate) fn fresh(sched: &Rc<RefCell<Scheduler>>) -> Event {
        let id = sched.borrow_mut().mint_event_id();
        Event {
            inner: Rc::new(RefCell::new(EventInner {
                id,
                state: EventState::Pending,
                waiters: Vec::new(),
                callbacks: Vec::new(),
                sched: Rc::downgrade(sched),
            })),
        }
    }

    /// This event's unique ID.
    pub fn id(&self) -> EventId {
        self.inner.borrow().id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EventState {
        self.inner.borrow().state
    }

    /// Whether the event is pending.
    pub fn pending(&self) -> bool {
        self.state() == EventState::Pending
    }

    /// Whether the event is triggered or processed.
    pub fn triggered(&self) -> bool {
        matches!(self.state(), EventState::Triggered | EventState::Processed)
    }

    /// Whether the event is processed.
    pub fn processed(&self) -> bool {
        self.state() == EventState::Processed
    }

    /// Whether the event is aborted.
    pub fn aborted(&self) -> bool {
        self.state() == EventState::Aborted
    }

    /// Whether a wait on this event completes without suspending.
    ///
    /// True iff `processed`. Combinators rely on this fast path so that
    /// aggregating already-settled events neither deadlocks nor
    /// double-registers.
    pub fn ready(&self) -> bool {
        self.processed()
    }

    /// Set the event state to `triggered` and enqueue it at the current
    /// simulation time with the next sequence number. No-op unless the
    /// event is pending.
    ///
    /// # Panics
    /// Panics if the owning simulation has been dropped.
    pub fn trigger(&self) {
        if !self.pending() {
            return;
        }
        let sched = self.scheduler();
        {
            let mut sched = sched.borrow_mut();
            let now = sched.now();
            sched.schedule(self.clone(), now);
        }
        self.inner.borrow_mut().state = EventState::Triggered;
    }

    /// Set the event state to `aborted`, destroy every suspended
    /// continuation (releasing its captured locals immediately), and
    /// discard the callback list. No-op unless the event is pending.
    pub fn abort(&self) {
        let (waiters, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != EventState::Pending {
                return;
            }
            inner.state = EventState::Aborted;
            (
                std::mem::take(&mut inner.waiters),
                std::mem::take(&mut inner.callbacks),
            )
        };
        // Dropped outside the borrow: a cell's Drop may touch other
        // events (aborting a held request, say) or even this one.
        drop(waiters);
        drop(callbacks);
    }

    /// Register `f` to run when the event is processed. Ignored if the
    /// event is already processed or aborted; callbacks registered on a
    /// triggered event still fire.
    pub fn add_callback(&self, f: impl FnOnce(&Event) + 'static) {
        let mut inner = self.inner.borrow_mut();
        if inner.state.is_terminal() {
            return;
        }
        inner.callbacks.push(Box::new(f));
    }

    /// Append a suspended process to the waiter list. If the event is
    /// already aborted the cell is destroyed immediately and the
    /// process never resumes past its wait-point.
    pub(crate) fn push_waiter(&self, cell: ProcessCell) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state != EventState::Aborted {
                inner.waiters.push(cell);
                return;
            }
        }
        drop(cell);
    }

    /// Process the event: set `processed`, resume every waiter in
    /// registration order, then invoke every callback in registration
    /// order, clearing both lists.
    ///
    /// No-op if the event is already terminal — a popped queue entry
    /// may reference an event that was aborted while enqueued, or one
    /// that was enqueued twice (scheduled, then triggered).
    ///
    /// A waiter failure does not stop the remaining waiters or the
    /// callbacks; the first failure is returned once the event is fully
    /// processed.
    pub(crate) fn process(&self, sched: &Rc<RefCell<Scheduler>>) -> KairosResult<()> {
        let (waiters, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state.is_terminal() {
                return Ok(());
            }
            inner.state = EventState::Processed;
            (
                std::mem::take(&mut inner.waiters),
                std::mem::take(&mut inner.callbacks),
            )
        };

        let mut first_err = None;
        for cell in waiters {
            if let Err(e) = runtime::drive(sched, cell) {
                first_err.get_or_insert(e);
            }
        }
        for cb in callbacks {
            cb(self);
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Upgrade the scheduler back-reference.
    ///
    /// An event outliving its simulation is a contract violation; this
    /// is the defensive, non-recoverable check.
    pub(crate) fn scheduler(&self) -> Rc<RefCell<Scheduler>> {
        self.inner
            .borrow()
            .sched
            .upgrade()
            .expect("event used after its simulation was dropped")
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Event {}

impl std::hash::Hash for Event {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Event")
            .field("id", &inner.id)
            .field("state", &inner.state)
            .field("waiters", &inner.waiters.len())
            .field("callbacks", &inner.callbacks.len())
            .finish()
    }
}
