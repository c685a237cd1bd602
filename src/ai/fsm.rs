//! Behavior state machine
//!
//! Three mutually exclusive states with a single pure transition function.
//! Per-state actions live on the agent; this module only decides *which*
//! state is active.
//!
//! # Transition priority
//!
//! 1. Low health forces `Flee`, whatever the current state.
//! 2. Otherwise the current state's own exit rule is checked:
//!    - `Patrol -> Pursue` when the player is visible and close enough
//!    - `Pursue -> Patrol` when the player is lost or too far
//!    - `Flee -> Patrol` once health has recovered and the player is out of range

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tuning::BehaviorTuning;

// ============================================================================
// States
// ============================================================================

/// The agent's current behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Walking the patrol route
    #[default]
    Patrol,
    /// Chasing the player
    Pursue,
    /// Running away while regenerating
    Flee,
}

impl BehaviorState {
    /// State name for debugging and logging
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Patrol => "Patrol",
            Self::Pursue => "Pursue",
            Self::Flee => "Flee",
        }
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Observation & Transition
// ============================================================================

/// What the agent knows about the world when deciding its next state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Current health
    pub health: i32,
    /// Distance to the player
    pub distance: f32,
    /// Whether the player is in line of sight and within vision
    pub player_visible: bool,
    /// Current vision radius
    pub vision: f32,
    /// Current aggression
    pub aggression: f32,
}

/// Represents a state transition decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stay in the current state
    None,
    /// Switch to another state
    To(BehaviorState),
}

/// Decide the next state.
#[must_use]
pub fn evaluate(current: BehaviorState, obs: &Observation, tuning: &BehaviorTuning) -> Transition {
    if obs.health <= tuning.flee_health {
        return if current == BehaviorState::Flee {
            Transition::None
        } else {
            Transition::To(BehaviorState::Flee)
        };
    }

    match current {
        BehaviorState::Patrol => {
            let trigger = tuning.pursue_trigger_distance(obs.vision, obs.aggression);
            if obs.player_visible && obs.distance < trigger {
                Transition::To(BehaviorState::Pursue)
            } else {
                Transition::None
            }
        }
        BehaviorState::Pursue => {
            if !obs.player_visible || obs.distance > tuning.pursue_lose_distance(obs.vision) {
                Transition::To(BehaviorState::Patrol)
            } else {
                Transition::None
            }
        }
        BehaviorState::Flee => {
            if obs.health > tuning.recover_health && obs.distance > obs.vision {
                Transition::To(BehaviorState::Patrol)
            } else {
                Transition::None
            }
        }
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// Holds the active state and how long it has been active
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMachine {
    current: BehaviorState,
    ticks_in_state: u32,
}

impl StateMachine {
    /// Create a state machine in `Patrol`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate and apply the transition for this tick.
    ///
    /// Returns the previous state when a transition happened.
    pub fn update(&mut self, obs: &Observation, tuning: &BehaviorTuning) -> Option<BehaviorState> {
        match evaluate(self.current, obs, tuning) {
            Transition::To(next) => {
                let previous = self.current;
                log::debug!("Behavior: {previous} -> {next}");
                self.current = next;
                self.ticks_in_state = 0;
                Some(previous)
            }
            Transition::None => {
                self.ticks_in_state = self.ticks_in_state.saturating_add(1);
                None
            }
        }
    }

    /// Force a state, bypassing the transition rules
    pub fn force(&mut self, state: BehaviorState) {
        if state != self.current {
            self.current = state;
            self.ticks_in_state = 0;
        }
    }

    /// Current state
    #[must_use]
    pub fn current(&self) -> BehaviorState {
        self.current
    }

    /// Ticks spent in the current state
    #[must_use]
    pub fn ticks_in_state(&self) -> u32 {
        self.ticks_in_state
    }

    /// Check if the machine is in `state`
    #[must_use]
    pub fn is_in_state(&self, state: BehaviorState) -> bool {
        self.current == state
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn obs() -> Observation {
        Observation {
            health: 100,
            distance: 500.0,
            player_visible: false,
            vision: 90.0,
            aggression: 0.5,
        }
    }

    #[test]
    fn test_fsm_initial_state() {
        let fsm = StateMachine::new();
        assert_eq!(fsm.current(), BehaviorState::Patrol);
        assert!(fsm.is_in_state(BehaviorState::Patrol));
    }

    #[test]
    fn test_patrol_to_pursue() {
        let o = Observation {
            distance: 50.0,
            player_visible: true,
            ..obs()
        };
        assert_eq!(
            evaluate(BehaviorState::Patrol, &o, &BehaviorTuning::default()),
            Transition::To(BehaviorState::Pursue)
        );
    }

    #[test]
    fn test_patrol_needs_line_of_sight() {
        let o = Observation {
            distance: 10.0,
            player_visible: false,
            ..obs()
        };
        assert_eq!(
            evaluate(BehaviorState::Patrol, &o, &BehaviorTuning::default()),
            Transition::None
        );
    }

    #[test]
    fn test_pursue_trigger_scales_with_aggression() {
        let tuning = BehaviorTuning::default();
        let o = Observation {
            distance: 80.0,
            player_visible: true,
            ..obs()
        };

        // 90 * (0.6 + 0.4 * 0.5) = 72 < 80
        assert_eq!(evaluate(BehaviorState::Patrol, &o, &tuning), Transition::None);

        // 90 * (0.6 + 0.4 * 1.0) = 90 > 80
        let eager = Observation {
            aggression: 1.0,
            ..o
        };
        assert_eq!(
            evaluate(BehaviorState::Patrol, &eager, &tuning),
            Transition::To(BehaviorState::Pursue)
        );
    }

    #[test]
    fn test_pursue_lost() {
        let tuning = BehaviorTuning::default();

        let hidden = Observation {
            distance: 20.0,
            player_visible: false,
            ..obs()
        };
        assert_eq!(
            evaluate(BehaviorState::Pursue, &hidden, &tuning),
            Transition::To(BehaviorState::Patrol)
        );

        let close = Observation {
            distance: 100.0,
            player_visible: true,
            ..obs()
        };
        assert_eq!(evaluate(BehaviorState::Pursue, &close, &tuning), Transition::None);
    }

    #[test]
    fn test_forced_flee_overrides_everything() {
        let tuning = BehaviorTuning::default();
        let o = Observation {
            health: 20,
            distance: 1.0,
            player_visible: true,
            ..obs()
        };

        for state in [BehaviorState::Patrol, BehaviorState::Pursue] {
            assert_eq!(
                evaluate(state, &o, &tuning),
                Transition::To(BehaviorState::Flee)
            );
        }
        assert_eq!(evaluate(BehaviorState::Flee, &o, &tuning), Transition::None);
    }

    #[test]
    fn test_flee_recovery_needs_health_and_distance() {
        let tuning = BehaviorTuning::default();

        let weak = Observation {
            health: 30,
            distance: 500.0,
            ..obs()
        };
        assert_eq!(evaluate(BehaviorState::Flee, &weak, &tuning), Transition::None);

        let near = Observation {
            health: 31,
            distance: 60.0,
            ..obs()
        };
        assert_eq!(evaluate(BehaviorState::Flee, &near, &tuning), Transition::None);

        let safe = Observation {
            health: 31,
            distance: 91.0,
            ..obs()
        };
        assert_eq!(
            evaluate(BehaviorState::Flee, &safe, &tuning),
            Transition::To(BehaviorState::Patrol)
        );
    }

    #[test]
    fn test_machine_tracks_time_in_state() {
        let mut fsm = StateMachine::new();
        let tuning = BehaviorTuning::default();

        assert_eq!(fsm.update(&obs(), &tuning), None);
        assert_eq!(fsm.update(&obs(), &tuning), None);
        assert_eq!(fsm.ticks_in_state(), 2);

        let seen = Observation {
            distance: 30.0,
            player_visible: true,
            ..obs()
        };
        assert_eq!(fsm.update(&seen, &tuning), Some(BehaviorState::Patrol));
        assert_eq!(fsm.current(), BehaviorState::Pursue);
        assert_eq!(fsm.ticks_in_state(), 0);
    }

    #[test]
    fn test_forced_transition() {
        let mut fsm = StateMachine::new();

        fsm.force(BehaviorState::Flee);

        assert_eq!(fsm.current(), BehaviorState::Flee);
        assert_eq!(BehaviorState::Flee.to_string(), "Flee");
    }
}
