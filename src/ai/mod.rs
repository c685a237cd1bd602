//! NPC behavior
//!
//! Perception, steering, the Patrol / Pursue / Flee state machine, online
//! adaptation and the `Npc` aggregate that ties them together.

mod adaptation;
mod agent;
mod fsm;
mod patrol;
mod perception;
mod steering;
mod tuning;
mod vitality;

pub use adaptation::{
    Adaptable, AdaptationOutcome, AdaptationTuning, MAX_VISION, MIN_VISION, PlayerHistory, adapt,
    learning_scale_for_games,
};
pub use agent::{
    AgentError, DEFAULT_AGGRESSION, DEFAULT_RADIUS, DEFAULT_SPEED, DEFAULT_VISION, EventList,
    HISTORY_CAPACITY, LearnedParams, Npc, TickInput, TickOutput,
};
pub use fsm::{BehaviorState, Observation, StateMachine, Transition, evaluate};
pub use patrol::PatrolRoute;
pub use perception::{can_see, visible_fraction};
pub use steering::{
    Body, Flee, Seek, SteeringBehavior, SteeringOutput, move_towards, resolve_patrol_start,
    resolve_stuck, step,
};
pub use tuning::BehaviorTuning;
pub use vitality::{MAX_HEALTH, Vitality};
