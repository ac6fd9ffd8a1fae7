//! Structured error types for the kernel.
//!
//! Fallible public APIs return `Result<T, KairosError>`. Only genuine
//! runtime outcomes are errors: a process body failing, or a trace
//! export going wrong. Contract violations (scheduling in the past,
//! releasing a resource with no grant, a handle outliving its
//! simulation) panic immediately instead — the broken invariant cannot
//! be meaningfully continued from.

use crate::process::ProcessId;
use crate::time::VirtualTime;

/// The top-level error type for the simulation kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum KairosError {
    /// A process body returned a failure from `resume`. Fatal to that
    /// process: its completion event is aborted and the error surfaces
    /// from `step()`/`run()`. The scheduler queue stays consistent.
    ProcessFailed {
        process: ProcessId,
        at: VirtualTime,
        reason: String,
    },

    /// A serialization error at the trace-export boundary.
    Serialization(String),
}

impl std::fmt::Display for KairosError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KairosError::ProcessFailed {
                process,
                at,
                reason,
            } => {
                write!(f, "process {} failed at {}: {}", process, at, reason)
            }
            KairosError::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for KairosError {}

/// Convenience alias for `Result<T, KairosError>`.
pub type KairosResult<T> = Result<T, KairosError>;

/// A failure raised by a process body.
///
/// Bodies do not know their own [`ProcessId`]; they return this
/// lightweight reason and the kernel attaches the process identity and
/// the current time, producing [`KairosError::ProcessFailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure(pub String);

impl ProcessFailure {
    /// Build a failure from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        ProcessFailure(reason.into())
    }
}

impl From<&str> for ProcessFailure {
    fn from(reason: &str) -> Self {
        ProcessFailure(reason.to_string())
    }
}

impl From<String> for ProcessFailure {
    fn from(reason: String) -> Self {
        ProcessFailure(reason)
    }
}

impl std::fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
