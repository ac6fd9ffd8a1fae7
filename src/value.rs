/// Value-carrying events.
///
/// A `ValueEvent<T>` is an ordinary [`Event`] plus a shared slot: the
/// payload is stored when the event is triggered and becomes readable
/// once the event is processed. Purely a composition — the kernel
/// knows nothing about values.

use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{Event, EventState};
use crate::scheduler::Scheduler;

/// Handle to an event that carries a value.
///
/// Clones share the same underlying event and slot.
#[derive(Clone)]
pub struct ValueEvent<T> {
    event: Event,
    slot: Rc<RefCell<Option<T>>>,
}

impl<T> ValueEvent<T> {
    pub(crate) fn fresh(sched: &Rc<RefCell<Scheduler>>) -> Self {
        ValueEvent {
            event: Event::fresh(sched),
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// The underlying event, for waiting and combining.
    pub fn event(&self) -> Event {
        self.event.clone()
    }

    /// Store `value` and trigger the event. No-op (the value is
    /// dropped) unless the event is pending.
    pub fn trigger(&self, value: T) {
        if !self.event.pending() {
            return;
        }
        *self.slot.borrow_mut() = Some(value);
        self.event.trigger();
    }

    /// Abort the underlying event. Any stored value stays unset.
    pub fn abort(&self) {
        self.event.abort();
    }

    /// Current lifecycle state of the underlying event.
    pub fn state(&self) -> EventState {
        self.event.state()
    }

    /// Whether the value is available to read.
    pub fn ready(&self) -> bool {
        self.event.ready()
    }
}

impl<T: Clone> ValueEvent<T> {
    /// The stored value, once the event has been processed.
    pub fn value(&self) -> Option<T> {
        if !self.event.processed() {
            return None;
        }
        self.slot.borrow().clone()
    }
}

impl<T> std::fmt::Debug for ValueEvent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueEvent")
            .field("id", &self.event.id())
            .field("state", &self.event.state())
            .finish()
    }
}
