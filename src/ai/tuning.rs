//! Behavior tuning constants
//!
//! Every coefficient the state machine, steering and combat reactions use.
//! Values are the stock ones; override individual fields to experiment.

use serde::{Deserialize, Serialize};

/// Tuning for state transitions, movement and combat reactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorTuning {
    /// Health at or below which the agent is forced to flee
    pub flee_health: i32,
    /// Health the agent must exceed before it stops fleeing
    pub recover_health: i32,
    /// Pursue trigger: `vision * (base + aggression_gain * aggression)`
    pub pursue_trigger_base: f32,
    /// Aggression weight of the pursue trigger
    pub pursue_trigger_aggression: f32,
    /// Pursuit is abandoned beyond `vision * pursue_lose_factor`
    pub pursue_lose_factor: f32,
    /// Pursuit speed: `speed * (base + aggression_gain * aggression)`
    pub pursue_speed_base: f32,
    /// Aggression weight of the pursuit speed
    pub pursue_speed_aggression: f32,
    /// Flee speed as a multiple of base speed
    pub flee_speed_factor: f32,
    /// Distance at which a waypoint counts as reached
    pub waypoint_arrival_radius: f32,
    /// Fraction of a blocked axis step that is still applied
    pub blocked_axis_factor: f32,
    /// Sideways unstick step as a multiple of base speed
    pub unstick_speed_factor: f32,
    /// Length of a single stuck-resolution nudge
    pub stuck_nudge_step: f32,
    /// Maximum nudges per overlapping obstacle
    pub stuck_nudge_attempts: u32,
    /// Health regenerated per second while fleeing
    pub regen_per_second: f32,
    /// Ticks between attacks
    pub attack_cooldown_ticks: u32,
    /// Aggression gained when the agent lands an attack
    pub attack_aggression_bonus: f32,
    /// Aggression lost when the agent is hit
    pub hit_aggression_penalty: f32,
}

impl Default for BehaviorTuning {
    fn default() -> Self {
        Self {
            flee_health: 20,
            recover_health: 30,
            pursue_trigger_base: 0.6,
            pursue_trigger_aggression: 0.4,
            pursue_lose_factor: 1.2,
            pursue_speed_base: 1.2,
            pursue_speed_aggression: 0.8,
            flee_speed_factor: 1.6,
            waypoint_arrival_radius: 6.0,
            blocked_axis_factor: 0.15,
            unstick_speed_factor: 0.5,
            stuck_nudge_step: 2.0,
            stuck_nudge_attempts: 12,
            regen_per_second: 5.0,
            attack_cooldown_ticks: 45,
            attack_aggression_bonus: 0.05,
            hit_aggression_penalty: 0.1,
        }
    }
}

impl BehaviorTuning {
    /// Distance under which a visible player triggers pursuit
    #[must_use]
    pub fn pursue_trigger_distance(&self, vision: f32, aggression: f32) -> f32 {
        vision * (self.pursue_trigger_base + self.pursue_trigger_aggression * aggression)
    }

    /// Distance beyond which pursuit is abandoned
    #[must_use]
    pub fn pursue_lose_distance(&self, vision: f32) -> f32 {
        vision * self.pursue_lose_factor
    }

    /// Movement speed while pursuing
    #[must_use]
    pub fn pursue_speed(&self, speed: f32, aggression: f32) -> f32 {
        speed * (self.pursue_speed_base + self.pursue_speed_aggression * aggression)
    }
}
