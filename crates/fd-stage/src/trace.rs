//! StageTrace — Bounded ring buffer of recent stage events
//!
//! Capacity is fixed at construction. When full, the oldest event is
//! evicted before the new one is stored.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::event::StageEvent;
use crate::stage::{Stage, StageCategory};

/// Default number of events retained
pub const DEFAULT_TRACE_CAPACITY: usize = 256;

/// Fixed-capacity trace of the most recent stage events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTrace {
    capacity: usize,
    events: VecDeque<StageEvent>,
    next_seq: u64,
    dropped: u64,
}

impl StageTrace {
    /// Create a trace holding at most `capacity` events (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity),
            next_seq: 0,
            dropped: 0,
        }
    }

    /// Append an event, evicting the oldest when full. Returns the assigned sequence number.
    pub fn push(&mut self, mut event: StageEvent) -> u64 {
        event.seq = self.next_seq;
        self.next_seq += 1;

        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
        self.next_seq - 1
    }

    /// Record a stage at the given time and tick
    pub fn record(&mut self, stage: Stage, timestamp_ms: f64, tick: u64) -> u64 {
        self.push(StageEvent::new(stage, timestamp_ms).at_tick(tick))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events evicted since creation
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Total events ever recorded
    pub fn total_recorded(&self) -> u64 {
        self.next_seq
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &StageEvent> {
        self.events.iter()
    }

    /// Copy of the newest `n` events, oldest first
    pub fn recent(&self, n: usize) -> Vec<StageEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip).cloned().collect()
    }

    /// Get events by stage type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.type_name() == type_name)
            .collect()
    }

    /// Get events by category
    pub fn events_by_category(&self, category: StageCategory) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.category() == category)
            .collect()
    }

    /// Events of a given type for one reel
    pub fn reel_events(&self, reel_index: u8, type_name: &str) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.reel_index() == Some(reel_index) && e.type_name() == type_name)
            .collect()
    }

    /// Most recent event of a given type
    pub fn last_of_type(&self, type_name: &str) -> Option<&StageEvent> {
        self.events.iter().rev().find(|e| e.type_name() == type_name)
    }

    /// Check if trace contains a specific stage type
    pub fn has_stage(&self, type_name: &str) -> bool {
        self.events.iter().any(|e| e.type_name() == type_name)
    }

    /// Render retained events as text lines
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(|e| e.to_string()).collect()
    }
}

impl Default for StageTrace {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TRACE_CAPACITY)
    }
}
