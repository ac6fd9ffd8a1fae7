//! # Kairos — Deterministic Discrete-Event Simulation Kernel
//!
//! A library for queueing and performance models: describe processes
//! that advance through simulated time by waiting for a point in time
//! or for a condition, and the kernel guarantees bit-reproducible
//! event ordering. No async, no threads, no wall-clock time — just
//! state machines driven by a virtual clock that always executes the
//! earliest pending event.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────┐
//! │        Simulation          │ ← execution loop + SimContext
//! │  ┌─────────────────────┐  │
//! │  │     Scheduler        │  │ ← (time, seq) min-heap + clock
//! │  └─────────────────────┘  │
//! │  ┌─────────────────────┐  │
//! │  │      Events          │  │ ← shared lifecycle handles
//! │  └─────────────────────┘  │
//! │  ┌──────────┐ ┌────────┐  │
//! │  │ Processes │ │Resource│  │ ← built on events
//! │  └──────────┘ └────────┘  │
//! └───────────────────────────┘
//! ```
//!
//! Same-time events fire in scheduling order, so two runs of the same
//! program (and the same seed) dispatch identically — verifiable with
//! the built-in event trace.

pub mod error;
pub mod event;
pub mod process;
pub mod resource;
pub mod rng;
pub mod simulation;
pub mod time;
pub mod trace;
pub mod value;

mod combinator;
mod scheduler;

// Re-exports for convenience.
pub use error::{KairosError, KairosResult, ProcessFailure};
pub use event::{Event, EventId, EventState};
pub use process::{Process, ProcessId, Sleeper, Step, Watcher};
pub use resource::Resource;
pub use rng::DeterministicRng;
pub use simulation::{SimContext, Simulation};
pub use time::VirtualTime;
pub use trace::{EventTrace, TraceEntry};
pub use value::ValueEvent;
