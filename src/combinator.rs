/// Derived events aggregating a set of underlying events.
///
/// A combinator is an independently owned event that registers a small
/// fire-closure on each input — callback registration, never a cyclic
/// object graph. An input that is already processed at construction
/// fires the same closure immediately (the `ready()` fast path), so
/// settled events count through the ordinary mechanism rather than a
/// separate rule.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::event::Event;
use crate::scheduler::Scheduler;

/// New pending event triggered as soon as any of `events` is
/// processed. Later firings find it no longer pending and are inert.
///
/// With an empty slice the returned event never triggers.
pub(crate) fn any_of(sched: &Rc<RefCell<Scheduler>>, events: &[Event]) -> Event {
    let combined = Event::fresh(sched);
    for ev in events {
        let c = combined.clone();
        let fire = move |_: &Event| c.trigger();
        if ev.ready() {
            fire(ev);
        } else {
            ev.add_callback(fire);
        }
    }
    combined
}

/// New pending event triggered once all of `events` are processed, in
/// any order. Each input decrements a shared remaining-count; the last
/// one triggers the result.
///
/// With an empty slice there is nothing to wait for and the returned
/// event triggers immediately.
pub(crate) fn all_of(sched: &Rc<RefCell<Scheduler>>, events: &[Event]) -> Event {
    let combined = Event::fresh(sched);
    if events.is_empty() {
        combined.trigger();
        return combined;
    }
    let remaining = Rc::new(Cell::new(events.len()));
    for ev in events {
        let c = combined.clone();
        let left = remaining.clone();
        let fire = move |_: &Event| {
            left.set(left.get() - 1);
            if left.get() == 0 {
                c.trigger();
            }
        };
        if ev.ready() {
            fire(ev);
        } else {
            ev.add_callback(fire);
        }
    }
    combined
}

/// `&a | &b` — any-of sugar. Adds no semantics over
/// [`Simulation::any_of`](crate::simulation::Simulation::any_of).
impl std::ops::BitOr for &Event {
    type Output = Event;

    fn bitor(self, rhs: &Event) -> Event {
        let sched = self.scheduler();
        any_of(&sched, &[self.clone(), rhs.clone()])
    }
}

/// `&a & &b` — all-of sugar. Adds no semantics over
/// [`Simulation::all_of`](crate::simulation::Simulation::all_of).
impl std::ops::BitAnd for &Event {
    type Output = Event;

    fn bitand(self, rhs: &Event) -> Event {
        let sched = self.scheduler();
        all_of(&sched, &[self.clone(), rhs.clone()])
    }
}

#[cfg(test)]
mod tests {
    use crate::simulation::Simulation;
    use crate::time::VirtualTime;

    #[test]
    fn test_any_of_fires_on_first() {
        let mut sim = Simulation::new();
        let slow = sim.timeout(20);
        let fast = sim.timeout(5);
        let either = sim.any_of(&[slow.clone(), fast.clone()]);

        sim.run_until(VirtualTime::new(5)).unwrap();
        assert!(fast.processed());
        assert!(!slow.processed());
        // Triggered and processed at T=5, before the slow input fires.
        assert!(either.processed());
    }

    #[test]
    fn test_any_of_never_fires_twice() {
        let mut sim = Simulation::new();
        let a = sim.timeout(5);
        let b = sim.timeout(10);
        let either = sim.any_of(&[a.clone(), b.clone()]);

        let fired = std::rc::Rc::new(std::cell::Cell::new(0u32));
        let f = fired.clone();
        either.add_callback(move |_| f.set(f.get() + 1));

        sim.run().unwrap();
        assert!(a.processed());
        assert!(b.processed());
        assert!(either.processed());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_any_of_with_already_processed_input() {
        let mut sim = Simulation::new();
        let done = sim.timeout(1);
        sim.run().unwrap();
        assert!(done.ready());

        let never = sim.event();
        let either = sim.any_of(&[done, never]);
        assert!(either.triggered(), "fast path must trigger immediately");
        sim.run().unwrap();
        assert!(either.processed());
    }

    #[test]
    fn test_all_of_requires_both_in_either_order() {
        let mut sim = Simulation::new();
        let a = sim.timeout(10);
        let b = sim.timeout(3);
        let both = sim.all_of(&[a.clone(), b.clone()]);

        sim.run_until(VirtualTime::new(5)).unwrap();
        assert!(b.processed());
        assert!(!both.triggered());

        sim.run().unwrap();
        assert!(a.processed());
        assert!(both.processed());
    }

    #[test]
    fn test_all_of_empty_triggers_immediately() {
        let mut sim = Simulation::new();
        let none = sim.all_of(&[]);
        assert!(none.triggered());
        sim.run().unwrap();
        assert!(none.processed());
    }

    #[test]
    fn test_any_of_empty_never_triggers() {
        let mut sim = Simulation::new();
        let never = sim.any_of(&[]);
        sim.run().unwrap();
        assert!(never.pending());
    }

    #[test]
    fn test_all_of_with_already_processed_inputs() {
        let mut sim = Simulation::new();
        let a = sim.timeout(1);
        let b = sim.timeout(2);
        sim.run().unwrap();

        let both = sim.all_of(&[a, b]);
        assert!(both.triggered());
        sim.run().unwrap();
        assert!(both.processed());
    }

    #[test]
    fn test_infix_sugar() {
        let mut sim = Simulation::new();
        let a = sim.timeout(5);
        let b = sim.timeout(20);

        let either = &a | &b;
        let both = &a & &b;

        sim.run_until(VirtualTime::new(10)).unwrap();
        assert!(either.processed());
        assert!(!both.triggered());

        sim.run().unwrap();
        assert!(both.processed());
    }

    #[test]
    fn test_all_of_with_aborted_input_never_fires() {
        let mut sim = Simulation::new();
        let a = sim.timeout(5);
        let b = sim.timeout(10);
        let both = sim.all_of(&[a.clone(), b.clone()]);

        b.abort();
        sim.run().unwrap();
        assert!(a.processed());
        assert!(both.pending(), "aborted input can never complete all_of");
    }
}
