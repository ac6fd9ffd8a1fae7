/// Processed-event trace for replay verification.
///
/// When enabled on a [`Simulation`](crate::simulation::Simulation),
/// every dispatched event is appended here as `(time, event-id)`. Two
/// runs of the same program are deterministic exactly when their
/// traces — and therefore their trace hashes — are identical.

use crate::event::EventId;
use crate::time::VirtualTime;

/// Combine two u64 hashes deterministically.
pub fn hash_combine(a: u64, b: u64) -> u64 {
    let mut h = a;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h = h.wrapping_add(b);
    h ^= h >> 32;
    h
}

/// A record of a single dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceEntry {
    /// Virtual time at which the event was processed.
    pub time: VirtualTime,
    /// The event's unique ID.
    pub event: EventId,
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {}]", self.time, self.event)
    }
}

/// Append-only log of dispatched events.
#[derive(Debug, Clone, Default)]
pub struct EventTrace {
    entries: Vec<TraceEntry>,
}

impl EventTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        EventTrace {
            entries: Vec::new(),
        }
    }

    /// Record one dispatch.
    pub(crate) fn record(&mut self, time: VirtualTime, event: EventId) {
        self.entries.push(TraceEntry { time, event });
    }

    /// The recorded entries, in dispatch order.
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deterministic hash of the whole trace. Equal hashes across two
    /// runs mean equal dispatch sequences.
    pub fn trace_hash(&self) -> u64 {
        let mut h = 0u64;
        for entry in &self.entries {
            h = hash_combine(h, entry.time.ticks());
            h = hash_combine(h, entry.event.raw());
        }
        h
    }

    /// Export the trace as pretty-printed JSON.
    #[cfg(feature = "serialize")]
    pub fn to_json(&self) -> crate::error::KairosResult<String> {
        serde_json::to_string_pretty(&self.entries)
            .map_err(|e| crate::error::KairosError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_combine_order_sensitive() {
        assert_ne!(hash_combine(1, 2), hash_combine(2, 1));
        assert_eq!(hash_combine(1, 2), hash_combine(1, 2));
    }

    #[test]
    fn test_record_and_hash() {
        let mut a = EventTrace::new();
        let mut b = EventTrace::new();
        assert!(a.is_empty());

        for i in 0..10 {
            a.record(VirtualTime::new(i), EventId::new(i));
            b.record(VirtualTime::new(i), EventId::new(i));
        }
        assert_eq!(a.len(), 10);
        assert_eq!(a.trace_hash(), b.trace_hash());

        b.record(VirtualTime::new(11), EventId::new(11));
        assert_ne!(a.trace_hash(), b.trace_hash());
    }

    #[test]
    fn test_entry_display() {
        let e = TraceEntry {
            time: VirtualTime::new(3),
            event: EventId::new(9),
        };
        assert_eq!(e.to_string(), "[T=3 E#9]");
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_json_export() {
        let mut trace = EventTrace::new();
        trace.record(VirtualTime::new(1), EventId::new(0));
        let json = trace.to_json().unwrap();
        assert!(json.contains("\"time\""));
    }
}
