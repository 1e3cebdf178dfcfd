//! Ring buffer for trace records.
//!
//! Keeps the most recent trace records, with lookup by session number.

use std::collections::{HashMap, VecDeque};

use super::record::{TraceEvent, TraceRecord};

// =============================================================================
// Trace Buffer
// =============================================================================

/// A ring buffer for storing trace records.
///
/// Maintains a fixed maximum size, discarding oldest records when full.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    /// The records, oldest first.
    records: VecDeque<TraceRecord>,
    /// Maximum number of records to store.
    max_size: usize,
    /// Next record ID to assign.
    next_id: u64,
    /// Records discarded to stay within `max_size`.
    evicted: u64,
}

impl TraceBuffer {
    /// Default maximum number of records.
    pub const DEFAULT_SIZE: usize = 10_000;

    /// Creates a new trace buffer with the given maximum size.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            next_id: 0,
            evicted: 0,
        }
    }

    /// Pushes a new event to the buffer.
    ///
    /// Returns the assigned record ID.
    pub fn push(&mut self, session: u64, timestamp_ns: u64, event: TraceEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.records
            .push_back(TraceRecord::new(id, session, timestamp_ns, event));

        while self.records.len() > self.max_size {
            self.records.pop_front();
            self.evicted += 1;
        }

        id
    }

    /// Returns the number of records in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clears all records from the buffer.
    ///
    /// Record IDs keep increasing after a clear.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns an iterator over all records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// Returns the most recently pushed record.
    #[must_use]
    pub fn last(&self) -> Option<&TraceRecord> {
        self.records.back()
    }

    /// Returns records for a specific session.
    #[must_use]
    pub fn records_for_session(&self, session: u64) -> Vec<&TraceRecord> {
        self.filter(|r| r.session == session)
    }

    /// Returns records in a session range (inclusive).
    #[must_use]
    pub fn records_in_range(&self, first: u64, last: u64) -> Vec<&TraceRecord> {
        self.filter(|r| (first..=last).contains(&r.session))
    }

    /// Returns the most recent N records.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&TraceRecord> {
        let start = self.records.len().saturating_sub(count);
        self.records.iter().skip(start).collect()
    }

    /// Returns records matching a predicate.
    pub fn filter<F>(&self, predicate: F) -> Vec<&TraceRecord>
    where
        F: Fn(&TraceRecord) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).collect()
    }

    /// Returns records of a specific event type.
    #[must_use]
    pub fn by_event_type(&self, event_type: &str) -> Vec<&TraceRecord> {
        self.filter(|r| r.event_type() == event_type)
    }

    /// Returns records concerning the named rule.
    #[must_use]
    pub fn by_rule(&self, rule: &str) -> Vec<&TraceRecord> {
        self.filter(|r| r.event.rule() == Some(rule))
    }

    /// Returns the oldest session number in the buffer.
    #[must_use]
    pub fn oldest_session(&self) -> Option<u64> {
        self.records.front().map(|r| r.session)
    }

    /// Returns the newest session number in the buffer.
    #[must_use]
    pub fn newest_session(&self) -> Option<u64> {
        self.records.back().map(|r| r.session)
    }

    /// Returns all distinct session numbers in the buffer, oldest first.
    #[must_use]
    pub fn sessions(&self) -> Vec<u64> {
        let mut sessions: Vec<u64> = self.records.iter().map(|r| r.session).collect();
        sessions.dedup();
        sessions
    }

    /// Returns statistics about the buffer.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        let mut event_counts = HashMap::new();
        for record in &self.records {
            *event_counts.entry(record.event_type()).or_insert(0) += 1;
        }

        TraceBufferStats {
            record_count: self.records.len(),
            max_size: self.max_size,
            evicted: self.evicted,
            oldest_session: self.oldest_session(),
            newest_session: self.newest_session(),
            session_count: self.sessions().len(),
            event_counts,
        }
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

// =============================================================================
// Buffer Statistics
// =============================================================================

/// Statistics about a trace buffer.
#[derive(Clone, Debug)]
pub struct TraceBufferStats {
    /// Number of records currently in buffer.
    pub record_count: usize,
    /// Maximum buffer size.
    pub max_size: usize,
    /// Records discarded because the buffer was full.
    pub evicted: u64,
    /// Oldest session in buffer.
    pub oldest_session: Option<u64>,
    /// Newest session in buffer.
    pub newest_session: Option<u64>,
    /// Number of distinct sessions.
    pub session_count: usize,
    /// Count of each event type.
    pub event_counts: HashMap<&'static str, usize>,
}

impl TraceBufferStats {
    /// Returns the count for an event type.
    #[must_use]
    pub fn count(&self, event_type: &str) -> usize {
        self.event_counts.get(event_type).copied().unwrap_or(0)
    }
}
