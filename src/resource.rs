/// Capacity-limited resource with FIFO-fair granting.
///
/// Built entirely from events: a request is an event triggered when a
/// slot is granted; waiting for the grant, racing it against a timeout,
/// or abandoning it are all ordinary event operations. The resource
/// itself never touches the queue of the scheduler.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::event::Event;
use crate::scheduler::Scheduler;

struct ResourceInner {
    capacity: usize,
    granted: usize,
    /// Requests waiting for a slot, in arrival order. Aborted entries
    /// are skipped and dropped at grant time; observable order and
    /// accounting match eager removal.
    queue: VecDeque<Event>,
    sched: Weak<RefCell<Scheduler>>,
}

/// Handle to a shared resource with a fixed number of slots.
///
/// Clones share the same slots and queue.
#[derive(Clone)]
pub struct Resource {
    inner: Rc<RefCell<ResourceInner>>,
}

impl Resource {
    /// Create a resource with `capacity` slots.
    ///
    /// # Panics
    /// Panics if `capacity` is zero — such a resource could never
    /// grant anything.
    pub(crate) fn fresh(sched: &Rc<RefCell<Scheduler>>, capacity: usize) -> Resource {
        assert!(capacity > 0, "resource capacity must be at least 1");
        Resource {
            inner: Rc::new(RefCell::new(ResourceInner {
                capacity,
                granted: 0,
                queue: VecDeque::new(),
                sched: Rc::downgrade(sched),
            })),
        }
    }

    /// Request a slot.
    ///
    /// Returns the grant event: triggered immediately if a slot is
    /// free, otherwise pending until holders ahead in line release.
    /// Abandon a queued request by aborting the returned event — it
    /// consumes no slot and the rest of the line keeps its order.
    pub fn request(&self) -> Event {
        let sched = self
            .inner
            .borrow()
            .sched
            .upgrade()
            .expect("resource used after its simulation was dropped");
        let ev = Event::fresh(&sched);

        let mut inner = self.inner.borrow_mut();
        if inner.granted < inner.capacity {
            inner.granted += 1;
            drop(inner);
            ev.trigger();
        } else {
            inner.queue.push_back(ev.clone());
        }
        ev
    }

    /// Release a previously granted slot.
    ///
    /// The slot transfers to the first live queued request (its grant
    /// event is triggered; the granted count is unchanged). With no
    /// live waiter the granted count is decremented — a slot is never
    /// idled while a requester waits.
    ///
    /// # Panics
    /// Panics if no slot is currently granted.
    pub fn release(&self) {
        let next = {
            let mut inner = self.inner.borrow_mut();
            loop {
                match inner.queue.pop_front() {
                    Some(ev) if ev.aborted() => continue,
                    Some(ev) => break Some(ev),
                    None => {
                        assert!(
                            inner.granted > 0,
                            "release without a granted slot"
                        );
                        inner.granted -= 1;
                        break None;
                    }
                }
            }
        };
        if let Some(ev) = next {
            ev.trigger();
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    /// Number of currently granted slots.
    pub fn granted(&self) -> usize {
        self.inner.borrow().granted
    }

    /// Number of requests still waiting, abandoned ones excluded.
    pub fn queued(&self) -> usize {
        self.inner
            .borrow()
            .queue
            .iter()
            .filter(|ev| !ev.aborted())
            .count()
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Resource")
            .field("capacity", &inner.capacity)
            .field("granted", &inner.granted)
            .field("queued", &inner.queue.len())
            .finish()
    }
}
