//! The [`Process`] trait and the [`Step`] wait/done protocol.

use crate::error::ProcessFailure;
use crate::event::Event;
use crate::simulation::SimContext;

/// What a process body does next.
#[derive(Debug)]
pub enum Step {
    /// Suspend until the event is processed, then resume. If the event
    /// is already processed the kernel re-invokes `resume` at once —
    /// no suspension, no queue interaction. If the event is aborted
    /// the process is destroyed and never resumes past this point.
    Wait(Event),
    /// The body has logically returned; the completion event triggers
    /// and every awaiter of the process is released.
    Done,
}

/// Trait implemented by every process body.
///
/// `resume` is called once when the process first runs (on the tick it
/// was spawned) and once more after every wait-point completes. The
/// struct's fields are the captured locals; a resume-point tag picks
/// up where the previous call left off.
///
/// # Contract
///
/// Implementations **must**:
/// - Route all scheduling through `ctx` — no global mutable state.
/// - Be deterministic for equal inputs.
/// - Advance their resume-point before returning [`Step::Wait`], so
///   the next call continues past the wait-point.
///
/// # Example
///
/// ```rust
/// use kairos::{Process, ProcessFailure, SimContext, Simulation, Step};
///
/// /// Rings twice, one tick apart.
/// struct Bell {
///     rings: u32,
/// }
///
/// impl Process for Bell {
///     fn resume(&mut self, ctx: &mut SimContext<'_>) -> Result<Step, ProcessFailure> {
///         if self.rings == 2 {
///             return Ok(Step::Done);
///         }
///         self.rings += 1;
///         Ok(Step::Wait(ctx.timeout(1)))
///     }
/// }
///
/// let mut sim = Simulation::new();
/// let done = sim.spawn(Bell { rings: 0 });
/// sim.run().unwrap();
/// assert!(done.processed());
/// ```
pub trait Process {
    /// Run the body from its current resume-point to the next
    /// wait-point (or to completion).
    ///
    /// Returning `Err` is fatal to this process: the kernel aborts its
    /// completion event and surfaces the failure from `run()`.
    fn resume(&mut self, ctx: &mut SimContext<'_>) -> Result<Step, ProcessFailure>;
}
