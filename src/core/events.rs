//! Agent events
//!
//! The agent reports notable things that happened during a tick as
//! `AgentEvent`s in its `TickOutput`. The simulation driver also stamps them
//! with the tick they happened on and keeps the most recent ones in a bounded
//! `EventLog`, so a game can be inspected after the fact.
//!
//! # Example
//!
//! ```ignore
//! let before = sim.tick_count();
//! sim.tick(direction);
//! for entry in sim.events().since(before) {
//!     log::info!("tick {}: {:?}", entry.tick, entry.event);
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;

use crate::ai::BehaviorState;

// ============================================================================
// Event Types
// ============================================================================

/// Something notable an agent did during a tick
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AgentEvent {
    /// The behavior state changed.
    StateChanged {
        /// Previous state
        from: BehaviorState,
        /// New state
        to: BehaviorState,
    },

    /// Re-entering patrol picked a waypoint to resume from.
    PatrolResumed {
        /// Waypoint index
        index: usize,
    },

    /// A waypoint was reached and the route advanced.
    WaypointReached {
        /// Index of the waypoint that was reached
        index: usize,
        /// Index now targeted
        next: usize,
    },

    /// A waypoint was abandoned after the agent hit an obstacle.
    WaypointSkipped {
        /// Index of the abandoned waypoint
        index: usize,
        /// Index now targeted
        next: usize,
    },

    /// Stuck resolution ran.
    Unstuck {
        /// Position after the nudges
        position: Vec2,
        /// Whether the overlap was cleared
        cleared: bool,
    },

    /// Health regenerated while fleeing.
    Regenerated {
        /// Points gained
        amount: i32,
        /// Health afterwards
        health: i32,
    },

    /// The attack cooldown elapsed while the player is in contact range.
    AttackReady,
}

// ============================================================================
// Event Log
// ============================================================================

/// An event together with the tick it happened on
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    /// Tick the event was produced on
    pub tick: u64,
    /// The event itself
    pub event: AgentEvent,
}

/// Bounded log of recent agent events, oldest first.
///
/// Ticks are recorded in non-decreasing order. Once full, each new entry
/// evicts the oldest one.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<TimedEvent>,
    capacity: usize,
}

impl EventLog {
    /// Default number of entries kept.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create an empty log with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create an empty log keeping at most `capacity` entries (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record the events of one tick.
    pub fn record(&mut self, tick: u64, events: impl IntoIterator<Item = AgentEvent>) {
        for event in events {
            if self.entries.len() >= self.capacity {
                self.entries.pop_front();
            }
            self.entries.push_back(TimedEvent { tick, event });
        }
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TimedEvent> {
        self.entries.iter()
    }

    /// Entries recorded on `tick` or later.
    pub fn since(&self, tick: u64) -> impl Iterator<Item = &TimedEvent> {
        let start = self.entries.partition_point(|entry| entry.tick < tick);
        self.entries.range(start..)
    }

    /// Most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&TimedEvent> {
        self.entries.back()
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn resumed(index: usize) -> AgentEvent {
        AgentEvent::PatrolResumed { index }
    }

    #[test]
    fn test_record_stamps_tick() {
        let mut log = EventLog::new();
        log.record(
            7,
            [
                AgentEvent::StateChanged {
                    from: BehaviorState::Patrol,
                    to: BehaviorState::Pursue,
                },
                AgentEvent::AttackReady,
            ],
        );

        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|entry| entry.tick == 7));
        assert_eq!(log.last().map(|entry| &entry.event), Some(&AgentEvent::AttackReady));
    }

    #[test]
    fn test_full_log_evicts_oldest() {
        let mut log = EventLog::with_capacity(3);
        for tick in 0..5 {
            log.record(tick, [resumed(tick as usize)]);
        }

        assert_eq!(log.len(), 3);
        let ticks: Vec<u64> = log.iter().map(|entry| entry.tick).collect();
        assert_eq!(ticks, vec![2, 3, 4]);
    }

    #[test]
    fn test_since_skips_older_ticks() {
        let mut log = EventLog::new();
        log.record(1, [resumed(0)]);
        log.record(3, [resumed(1), resumed(2)]);
        log.record(4, [resumed(3)]);

        let indices: Vec<_> = log
            .since(3)
            .map(|entry| match entry.event {
                AgentEvent::PatrolResumed { index } => index,
                _ => usize::MAX,
            })
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(log.since(5).count(), 0);
        assert_eq!(log.since(0).count(), 4);
    }

    #[test]
    fn test_empty_tick_records_nothing() {
        let mut log = EventLog::with_capacity(0);
        log.record(0, std::iter::empty());
        assert!(log.is_empty());
        assert_eq!(log.capacity(), 1);

        log.record(1, [resumed(0), resumed(1)]);
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.last().is_none());
    }
}
