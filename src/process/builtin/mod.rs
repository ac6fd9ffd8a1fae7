//! Built-in process implementations — Sleeper and Watcher.
//!
//! Small reference processes used by tests and as authoring templates
//! for the state-machine style.

pub mod sleeper;
pub mod watcher;

pub use sleeper::Sleeper;
pub use watcher::Watcher;
