//! Process ID — a lightweight, ordered, copyable process identifier.

/// A unique identifier for a spawned process.
///
/// A newtype around `u64` rather than a bare integer so process
/// identities cannot be confused with event IDs or timestamps at
/// compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessId(u64);

impl ProcessId {
    /// Create a process ID from a raw integer.
    #[inline]
    pub fn new(id: u64) -> Self {
        ProcessId(id)
    }

    /// Return the underlying integer.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Monotonic process-ID generator, owned by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ProcessIdGen {
    next: u64,
}

impl ProcessIdGen {
    /// Create a generator starting at 0.
    pub fn new() -> Self {
        ProcessIdGen { next: 0 }
    }

    /// Mint the next process ID.
    pub fn next_id(&mut self) -> ProcessId {
        let id = ProcessId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = ProcessIdGen::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a < b);
        assert_eq!(a.raw(), 0);
        assert_eq!(b.to_string(), "P1");
    }
}
