/// Simulation driver.
///
/// `Simulation` owns the scheduler core and drives the loop: pop the
/// earliest queue entry, advance the clock to its time, process its
/// event. Processing resumes suspended processes and fires callbacks,
/// which may create and enqueue new events — the loop ends when the
/// queue is empty or a stop time is reached.
///
/// `SimContext` is the same scheduling surface handed to a process body
/// on every resume. Ambient access to "the current simulation" is
/// always this explicit value, never hidden global state.

use std::cell::RefCell;
use std::rc::Rc;

use crate::combinator;
use crate::error::KairosResult;
use crate::event::Event;
use crate::process::runtime;
use crate::process::Process;
use crate::resource::Resource;
use crate::scheduler::Scheduler;
use crate::time::VirtualTime;
use crate::trace::EventTrace;
use crate::value::ValueEvent;

// ── Context ───────────────────────────────────────────────────────────

/// Scheduling surface available inside a process body.
///
/// Passed to [`Process::resume`](crate::process::Process::resume) on
/// every resume. All operations borrow the scheduler core only for the
/// duration of the call, so events created here interleave freely with
/// the kernel's own bookkeeping.
pub struct SimContext<'a> {
    sched: &'a Rc<RefCell<Scheduler>>,
}

impl<'a> SimContext<'a> {
    pub(crate) fn new(sched: &'a Rc<RefCell<Scheduler>>) -> Self {
        SimContext { sched }
    }

    /// Current virtual time.
    pub fn now(&self) -> VirtualTime {
        self.sched.borrow().now()
    }

    /// Create a fresh pending event.
    pub fn event(&mut self) -> Event {
        Event::fresh(self.sched)
    }

    /// Create a fresh pending event and schedule it `delay` ticks into
    /// the future. The event is processed when the clock reaches that
    /// time; until then it reports `pending`.
    ///
    /// # Panics
    /// Panics on clock overflow.
    pub fn timeout(&mut self, delay: u64) -> Event {
        let ev = self.event();
        self.schedule(&ev, delay);
        ev
    }

    /// Schedule an existing event `delay` ticks into the future.
    pub fn schedule(&mut self, event: &Event, delay: u64) {
        let at = self
            .now()
            .advance(delay)
            .expect("virtual clock overflow while scheduling");
        self.schedule_at(event, at);
    }

    /// Schedule an existing event at an absolute time.
    ///
    /// # Panics
    /// Panics if `at` is before the current time.
    pub fn schedule_at(&mut self, event: &Event, at: VirtualTime) {
        self.sched.borrow_mut().schedule(event.clone(), at);
    }

    /// Spawn a process. Its first resume is scheduled at the current
    /// time (the body runs on the next tick, never inside `spawn`);
    /// the returned completion event is triggered when the body
    /// returns [`Step::Done`](crate::process::Step::Done).
    pub fn spawn<P: Process + 'static>(&mut self, body: P) -> Event {
        runtime::spawn(self.sched, Box::new(body))
    }

    /// Derived event triggered as soon as any of `events` is processed.
    ///
    /// With an empty slice the returned event never triggers.
    pub fn any_of(&mut self, events: &[Event]) -> Event {
        combinator::any_of(self.sched, events)
    }

    /// Derived event triggered once all of `events` are processed.
    ///
    /// With an empty slice the returned event triggers immediately.
    pub fn all_of(&mut self, events: &[Event]) -> Event {
        combinator::all_of(self.sched, events)
    }

    /// Create a fresh pending value event.
    pub fn value_event<T>(&mut self) -> ValueEvent<T> {
        ValueEvent::fresh(self.sched)
    }

    /// Create a resource with `capacity` slots.
    pub fn resource(&mut self, capacity: usize) -> Resource {
        Resource::fresh(self.sched, capacity)
    }

    /// Number of pending queue entries.
    pub fn pending_count(&self) -> usize {
        self.sched.borrow().len()
    }
}

// ── Simulation ────────────────────────────────────────────────────────

/// Top-level simulation: the scheduler core plus the execution loop.
pub struct Simulation {
    sched: Rc<RefCell<Scheduler>>,
    events_processed: u64,
    trace: Option<EventTrace>,
}

impl Simulation {
    /// Create a simulation with the clock at zero.
    pub fn new() -> Self {
        Self::starting_at(VirtualTime::ZERO)
    }

    /// Create a simulation with the clock at a supplied epoch.
    pub fn starting_at(epoch: VirtualTime) -> Self {
        Simulation {
            sched: Rc::new(RefCell::new(Scheduler::starting_at(epoch))),
            events_processed: 0,
            trace: None,
        }
    }

    fn ctx(&mut self) -> SimContext<'_> {
        SimContext::new(&self.sched)
    }

    /// Current virtual time.
    pub fn now(&self) -> VirtualTime {
        self.sched.borrow().now()
    }

    /// Create a fresh pending event.
    pub fn event(&mut self) -> Event {
        self.ctx().event()
    }

    /// Create a fresh pending event scheduled `delay` ticks from now.
    pub fn timeout(&mut self, delay: u64) -> Event {
        self.ctx().timeout(delay)
    }

    /// Schedule an existing event `delay` ticks from now.
    pub fn schedule(&mut self, event: &Event, delay: u64) {
        self.ctx().schedule(event, delay);
    }

    /// Schedule an existing event at an absolute time.
    pub fn schedule_at(&mut self, event: &Event, at: VirtualTime) {
        self.ctx().schedule_at(event, at);
    }

    /// Spawn a process; see [`SimContext::spawn`].
    pub fn spawn<P: Process + 'static>(&mut self, body: P) -> Event {
        self.ctx().spawn(body)
    }

    /// Derived event triggered as soon as any input is processed; see
    /// [`SimContext::any_of`].
    pub fn any_of(&mut self, events: &[Event]) -> Event {
        self.ctx().any_of(events)
    }

    /// Derived event triggered once all inputs are processed; see
    /// [`SimContext::all_of`].
    pub fn all_of(&mut self, events: &[Event]) -> Event {
        self.ctx().all_of(events)
    }

    /// Create a fresh pending value event.
    pub fn value_event<T>(&mut self) -> ValueEvent<T> {
        self.ctx().value_event()
    }

    /// Create a resource with `capacity` slots.
    pub fn resource(&mut self, capacity: usize) -> Resource {
        self.ctx().resource(capacity)
    }

    // ── Execution loop ────────────────────────────────────────────

    /// Execute a single step: pop the earliest entry, advance the
    /// clock, process the event.
    ///
    /// Returns `Ok(None)` when the queue is empty, otherwise the event
    /// that was processed. A process-body failure surfaces as `Err`
    /// after the event is fully processed; the queue stays consistent
    /// and the simulation may keep running.
    pub fn step(&mut self) -> KairosResult<Option<Event>> {
        let entry = self.sched.borrow_mut().pop_next();
        let Some(entry) = entry else {
            return Ok(None);
        };

        self.sched.borrow_mut().advance_to(entry.at);
        self.events_processed += 1;
        if let Some(trace) = self.trace.as_mut() {
            trace.record(entry.at, entry.event.id());
        }

        entry.event.process(&self.sched)?;
        Ok(Some(entry.event))
    }

    /// Run until the queue is empty. Returns the number of events
    /// processed during this call.
    pub fn run(&mut self) -> KairosResult<u64> {
        let start = self.events_processed;
        while self.step()?.is_some() {}
        Ok(self.events_processed - start)
    }

    /// Run while the next entry is due at or before `until`, then land
    /// the clock exactly on `until`.
    ///
    /// # Panics
    /// Panics if `until` is before the current time.
    pub fn run_until(&mut self, until: VirtualTime) -> KairosResult<u64> {
        assert!(
            until >= self.now(),
            "cannot run backward: now={}, until={}",
            self.now(),
            until
        );
        let start = self.events_processed;
        while let Some(at) = self.next_event_time() {
            if at > until {
                break;
            }
            self.step()?;
        }
        self.sched.borrow_mut().advance_to(until);
        Ok(self.events_processed - start)
    }

    // ── Introspection ─────────────────────────────────────────────

    /// Total events processed so far.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Whether there are no more queue entries.
    pub fn is_finished(&self) -> bool {
        self.sched.borrow().is_empty()
    }

    /// Number of pending queue entries.
    pub fn pending_count(&self) -> usize {
        self.sched.borrow().len()
    }

    /// Due time of the next queue entry, if any.
    pub fn next_event_time(&self) -> Option<VirtualTime> {
        self.sched.borrow().next_time()
    }

    // ── Trace ─────────────────────────────────────────────────────

    /// Start recording every processed event into an [`EventTrace`].
    pub fn enable_trace(&mut self) {
        if self.trace.is_none() {
            self.trace = Some(EventTrace::new());
        }
    }

    /// The recorded trace, if tracing is enabled.
    pub fn trace(&self) -> Option<&EventTrace> {
        self.trace.as_ref()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_timeout_processes_at_due_time() {
        let mut sim = Simulation::new();
        let ev = sim.timeout(30);
        assert!(ev.pending());

        let processed = sim.run().unwrap();
        assert_eq!(processed, 1);
        assert!(ev.processed());
        assert_eq!(sim.now(), VirtualTime::new(30));
    }

    #[test]
    fn test_step_by_step() {
        let mut sim = Simulation::new();
        let a = sim.timeout(5);
        let b = sim.timeout(15);

        let first = sim.step().unwrap().unwrap();
        assert_eq!(first, a);
        assert_eq!(sim.now(), VirtualTime::new(5));

        let second = sim.step().unwrap().unwrap();
        assert_eq!(second, b);
        assert_eq!(sim.now(), VirtualTime::new(15));

        assert!(sim.step().unwrap().is_none());
        assert_eq!(sim.events_processed(), 2);
    }

    #[test]
    fn test_run_until_stops_and_lands_on_until() {
        let mut sim = Simulation::new();
        let early = sim.timeout(10);
        let late = sim.timeout(100);

        let processed = sim.run_until(VirtualTime::new(50)).unwrap();
        assert_eq!(processed, 1);
        assert!(early.processed());
        assert!(late.pending());
        assert_eq!(sim.now(), VirtualTime::new(50));
        assert!(!sim.is_finished());
    }

    #[test]
    fn test_run_until_inclusive_boundary() {
        let mut sim = Simulation::new();
        let at_boundary = sim.timeout(50);
        sim.run_until(VirtualTime::new(50)).unwrap();
        assert!(at_boundary.processed());
    }

    #[test]
    fn test_callbacks_fire_in_time_order() {
        let mut sim = Simulation::new();
        let ticks = Rc::new(RefCell::new(Vec::new()));

        let e1 = sim.timeout(10);
        let t = ticks.clone();
        e1.add_callback(move |_| t.borrow_mut().push(10));
        let e2 = sim.timeout(20);
        let t = ticks.clone();
        e2.add_callback(move |_| t.borrow_mut().push(20));
        let e3 = sim.timeout(30);
        let t = ticks.clone();
        e3.add_callback(move |_| t.borrow_mut().push(30));

        sim.run().unwrap();
        assert_eq!(*ticks.borrow(), vec![10, 20, 30]);
        assert_eq!(sim.now(), VirtualTime::new(30));
    }

    #[test]
    fn test_epoch_start() {
        let mut sim = Simulation::starting_at(VirtualTime::new(1_000));
        assert_eq!(sim.now(), VirtualTime::new(1_000));

        let ev = sim.timeout(5);
        sim.run().unwrap();
        assert!(ev.processed());
        assert_eq!(sim.now(), VirtualTime::new(1_005));
    }

    #[test]
    fn test_empty_simulation_run() {
        let mut sim = Simulation::new();
        assert_eq!(sim.run().unwrap(), 0);
        assert!(sim.is_finished());
        assert_eq!(sim.now(), VirtualTime::ZERO);
    }

    #[test]
    fn test_trigger_processes_at_current_time() {
        let mut sim = Simulation::new();
        let gate = sim.event();
        let fired_at = Rc::new(Cell::new(None));

        // Reach tick 40 first, then trigger the gate from a callback.
        let t = sim.timeout(40);
        let g = gate.clone();
        t.add_callback(move |_| g.trigger());

        let f = fired_at.clone();
        gate.add_callback(move |_| f.set(Some(40u64)));

        sim.run().unwrap();
        assert!(gate.processed());
        assert_eq!(fired_at.get(), Some(40));
        assert_eq!(sim.now(), VirtualTime::new(40));
    }

    #[test]
    fn test_deterministic_trace_replay() {
        fn run_once() -> (u64, Vec<(u64, u64)>) {
            let mut sim = Simulation::new();
            sim.enable_trace();
            sim.timeout(5);
            sim.timeout(5);
            sim.timeout(3);
            let ev = sim.event();
            sim.schedule(&ev, 10);
            sim.run().unwrap();
            let trace = sim.trace().unwrap();
            (
                trace.trace_hash(),
                trace
                    .entries()
                    .iter()
                    .map(|e| (e.time.ticks(), e.event.raw()))
                    .collect(),
            )
        }
        assert_eq!(run_once(), run_once());
    }
}
