//! Ring buffer of recently dispatched events.
//!
//! The controller records every event it sees, including the ones it drops
//! because another event was still being handled.

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::driver::WindowId;

/// Maximum number of events to keep
const DEFAULT_MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    Handled,
    /// Arrived while another event was in flight
    Dropped,
}

/// One dispatched event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub event: String,
    pub window: Option<WindowId>,
    pub outcome: EventOutcome,
}

#[derive(Debug)]
pub struct EventLog {
    entries: VecDeque<EventLogEntry>,
    max_entries: usize,
    sequence: u64,
    start_time: Instant,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries: max_entries.max(1),
            sequence: 0,
            start_time: Instant::now(),
        }
    }

    fn timestamp(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    pub fn record(&mut self, event: &str, window: Option<WindowId>, outcome: EventOutcome) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }

        self.sequence += 1;
        self.entries.push_back(EventLogEntry {
            sequence: self.sequence,
            timestamp_ms: self.timestamp(),
            event: event.to_string(),
            window,
            outcome,
        });
    }

    /// The last `n` entries, oldest first
    pub fn last(&self, n: usize) -> Vec<EventLogEntry> {
        let start = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(start).cloned().collect()
    }

    pub fn entries(&self) -> Vec<EventLogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn dropped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == EventOutcome::Dropped)
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.sequence = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut log = EventLog::new();
        log.record("window_focused", Some(WindowId(7)), EventOutcome::Handled);

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "window_focused");
        assert_eq!(entries[0].window, Some(WindowId(7)));
        assert_eq!(entries[0].outcome, EventOutcome::Handled);
    }

    #[test]
    fn test_ring_buffer_overflow() {
        let mut log = EventLog::with_capacity(3);
        for name in ["a", "b", "c", "d"] {
            log.record(name, None, EventOutcome::Handled);
        }

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].event, "b");
        assert_eq!(entries[2].event, "d");
        assert_eq!(entries[2].sequence, 4);
    }

    #[test]
    fn test_last() {
        let mut log = EventLog::new();
        for i in 0..10 {
            log.record(&format!("event{}", i), None, EventOutcome::Handled);
        }

        let last = log.last(3);
        assert_eq!(last.len(), 3);
        assert_eq!(last[0].event, "event7");
        assert_eq!(last[2].event, "event9");
        assert_eq!(log.last(50).len(), 10);
    }

    #[test]
    fn test_dropped_count_and_clear() {
        let mut log = EventLog::new();
        log.record("window_moved", Some(WindowId(1)), EventOutcome::Handled);
        log.record("geometry_changed", Some(WindowId(1)), EventOutcome::Dropped);
        log.record("geometry_changed", Some(WindowId(2)), EventOutcome::Dropped);
        assert_eq!(log.dropped_count(), 2);

        log.clear();
        assert!(log.is_empty());
        log.record("a", None, EventOutcome::Handled);
        assert_eq!(log.entries()[0].sequence, 1);
    }
}
