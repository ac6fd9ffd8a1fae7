//! Process cells and the resume loop.
//!
//! A suspended process lives in exactly one place: the waiter list of
//! the event it is parked on. Ownership of the cell moves from the
//! spawning call into an internal start event, then from event to
//! event as the process advances, and is dropped on completion, on
//! failure, or when a holding event aborts — dropping the cell is what
//! releases the captured locals.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{KairosError, KairosResult};
use crate::event::Event;
use crate::process::{Process, ProcessId, Step};
use crate::scheduler::Scheduler;
use crate::simulation::SimContext;

/// One spawned process: body state machine plus completion event.
pub(crate) struct ProcessCell {
    pub(crate) id: ProcessId,
    pub(crate) body: Box<dyn Process>,
    pub(crate) completion: Event,
}

/// Spawn a process.
///
/// The body does not run here. An internal start event holding the
/// cell is scheduled at the current time, so the first resume happens
/// on the next tick, from inside `step()`. The returned completion
/// event stays pending until the body returns [`Step::Done`] — an
/// awaiter of a still-running process therefore suspends instead of
/// falling through the `ready()` fast path.
pub(crate) fn spawn(sched: &Rc<RefCell<Scheduler>>, body: Box<dyn Process>) -> Event {
    let completion = Event::fresh(sched);
    let start = Event::fresh(sched);
    let id = sched.borrow_mut().mint_process_id();

    start.push_waiter(ProcessCell {
        id,
        body,
        completion: completion.clone(),
    });
    let now = sched.borrow().now();
    sched.borrow_mut().schedule(start, now);

    completion
}

/// Resume a process and park it on its next wait-point.
///
/// Loops over the `ready()` fast path: a wait on an already-processed
/// event continues synchronously. On [`Step::Done`] the completion
/// event is triggered and the cell dropped. On failure the completion
/// event is aborted — destroying any continuations awaiting this
/// process rather than leaking them — and the error is returned to
/// surface from `step()`/`run()`.
pub(crate) fn drive(sched: &Rc<RefCell<Scheduler>>, mut cell: ProcessCell) -> KairosResult<()> {
    loop {
        let step = {
            let mut ctx = SimContext::new(sched);
            cell.body.resume(&mut ctx)
        };
        match step {
            Ok(Step::Done) => {
                cell.completion.trigger();
                return Ok(());
            }
            Ok(Step::Wait(ev)) => {
                if ev.ready() {
                    continue;
                }
                if ev.aborted() {
                    // Suspending on an aborted event destroys the
                    // continuation; the process never resumes.
                    return Ok(());
                }
                ev.push_waiter(cell);
                return Ok(());
            }
            Err(failure) => {
                let process = cell.id;
                let at = sched.borrow().now();
                cell.completion.abort();
                return Err(KairosError::ProcessFailed {
                    process,
                    at,
                    reason: failure.0,
                });
            }
        }
    }
}
