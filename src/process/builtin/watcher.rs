//! `Watcher` — records when a target event fires.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ProcessFailure;
use crate::event::Event;
use crate::process::{Process, Step};
use crate::simulation::SimContext;
use crate::time::VirtualTime;

/// A process that waits for one event and appends the time it observed
/// it to a shared log.
///
/// The sink end of tests: spawn a watcher per interesting event and
/// assert on the log afterwards. If the target is aborted the watcher
/// is destroyed with it and records nothing.
pub struct Watcher {
    target: Event,
    log: Rc<RefCell<Vec<VirtualTime>>>,
    armed: bool,
}

impl Watcher {
    /// Create a watcher for `target` appending to `log`.
    pub fn new(target: Event, log: Rc<RefCell<Vec<VirtualTime>>>) -> Self {
        Watcher {
            target,
            log,
            armed: false,
        }
    }
}

impl Process for Watcher {
    fn resume(&mut self, ctx: &mut SimContext<'_>) -> Result<Step, ProcessFailure> {
        if !self.armed {
            self.armed = true;
            return Ok(Step::Wait(self.target.clone()));
        }
        self.log.borrow_mut().push(ctx.now());
        Ok(Step::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Simulation;

    #[test]
    fn test_watcher_records_fire_time() {
        let mut sim = Simulation::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let target = sim.timeout(40);
        sim.spawn(Watcher::new(target, log.clone()));

        sim.run().unwrap();
        assert_eq!(*log.borrow(), vec![VirtualTime::new(40)]);
    }

    #[test]
    fn test_watcher_on_aborted_target_records_nothing() {
        let mut sim = Simulation::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let target = sim.timeout(10);
        let done = sim.spawn(Watcher::new(target.clone(), log.clone()));
        target.abort();

        sim.run().unwrap();
        assert!(log.borrow().is_empty());
        assert!(done.pending(), "destroyed watcher never completes");
    }
}
