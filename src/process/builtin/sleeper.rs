//! `Sleeper` — holds for a fixed delay, then completes.

use crate::error::ProcessFailure;
use crate::process::{Process, Step};
use crate::simulation::SimContext;

/// A process that waits `delay` ticks and returns.
///
/// Useful as a hold/stand-in stage: its completion event fires exactly
/// `delay` ticks after the sleeper's first resume.
#[derive(Debug)]
pub struct Sleeper {
    delay: u64,
    sleeping: bool,
}

impl Sleeper {
    /// Create a sleeper that holds for `delay` ticks.
    pub fn new(delay: u64) -> Self {
        Sleeper {
            delay,
            sleeping: false,
        }
    }
}

impl Process for Sleeper {
    fn resume(&mut self, ctx: &mut SimContext<'_>) -> Result<Step, ProcessFailure> {
        if self.sleeping {
            return Ok(Step::Done);
        }
        self.sleeping = true;
        Ok(Step::Wait(ctx.timeout(self.delay)))
    }
}
