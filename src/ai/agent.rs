//! The NPC agent
//!
//! `Npc` is a plain value that owns its body, behavior state, vitality,
//! patrol route and observation window. Everything it needs from the outside
//! world (player position and history, the arena) is passed into `update`
//! explicitly each tick; the arena is only ever read.
//!
//! # Tick order
//!
//! 1. Replace the observation window and run online adaptation
//! 2. Tick down the attack cooldown
//! 3. Evaluate the state machine (re-anchoring the patrol on re-entry)
//! 4. Run the per-state action (patrol / pursue / flee + regeneration)
//! 5. Clamp the position into the arena
//!
//! # Example
//!
//! ```ignore
//! let mut npc = Npc::new(Vec2::new(100.0, 100.0), route)?;
//! let output = npc.update(&TickInput::new(player).with_history(&history), &arena);
//! if output.attack_ready {
//!     player_health -= damage;
//!     npc.register_attack();
//! }
//! ```

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::adaptation::{
    Adaptable, AdaptationOutcome, AdaptationTuning, MAX_VISION, MIN_VISION, PlayerHistory, adapt,
};
use super::fsm::{BehaviorState, Observation, StateMachine};
use super::patrol::PatrolRoute;
use super::perception;
use super::steering::{
    self, Body, Flee, SteeringBehavior, move_towards, random_direction, resolve_patrol_start,
};
use super::tuning::BehaviorTuning;
use super::vitality::Vitality;
use crate::arena::{Arena, ObstacleField};
use crate::core::{AgentEvent, TICK_RATE};

/// Starting aggression
pub const DEFAULT_AGGRESSION: f32 = 0.5;
/// Starting vision radius
pub const DEFAULT_VISION: f32 = 90.0;
/// Starting base speed (units per tick)
pub const DEFAULT_SPEED: f32 = 1.2;
/// Collision and visual radius
pub const DEFAULT_RADIUS: f32 = 12.0;
/// Player positions the agent keeps for adaptation
pub const HISTORY_CAPACITY: usize = 120;

const DEFAULT_SEED: u64 = 0x5EED_A11E;

// ============================================================================
// Parameters & I/O
// ============================================================================

/// The tunable parameters that persist between sessions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnedParams {
    /// Aggression in `[0, 1]`
    pub aggression: f32,
    /// Vision radius in `[MIN_VISION, MAX_VISION]`
    pub vision: f32,
    /// Base speed
    pub speed: f32,
}

impl Default for LearnedParams {
    fn default() -> Self {
        Self {
            aggression: DEFAULT_AGGRESSION,
            vision: DEFAULT_VISION,
            speed: DEFAULT_SPEED,
        }
    }
}

impl LearnedParams {
    /// Bring every field into its valid range; non-finite values become defaults
    #[must_use]
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };
        Self {
            aggression: finite_or(self.aggression, defaults.aggression).clamp(0.0, 1.0),
            vision: finite_or(self.vision, defaults.vision).clamp(MIN_VISION, MAX_VISION),
            speed: finite_or(self.speed, defaults.speed).max(0.0),
        }
    }
}

/// What the driver hands the agent each tick
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    /// Live player position
    pub player: Vec2,
    /// Trailing player positions, oldest first; `None` skips adaptation
    pub history: Option<&'a [Vec2]>,
    /// Simulated seconds since the previous tick
    pub dt: f32,
    /// Distance under which an attack can connect
    pub contact_range: f32,
}

impl<'a> TickInput<'a> {
    /// Input with no history, a nominal tick duration and no contact range
    #[must_use]
    pub fn new(player: Vec2) -> Self {
        Self {
            player,
            history: None,
            dt: 1.0 / TICK_RATE as f32,
            contact_range: 0.0,
        }
    }

    /// Attach the trailing player history
    #[must_use]
    pub fn with_history(mut self, history: &'a [Vec2]) -> Self {
        self.history = Some(history);
        self
    }

    /// Set the tick duration
    #[must_use]
    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    /// Set the attack contact range
    #[must_use]
    pub fn with_contact_range(mut self, range: f32) -> Self {
        self.contact_range = range;
        self
    }
}

/// Events raised during one tick
pub type EventList = SmallVec<[AgentEvent; 4]>;

/// What the agent reports back after a tick
#[derive(Debug, Clone)]
pub struct TickOutput {
    /// Position after movement and clamping
    pub position: Vec2,
    /// Active behavior state
    pub state: BehaviorState,
    /// Current health
    pub health: i32,
    /// Cooldown elapsed, pursuing, and player within contact range
    pub attack_ready: bool,
    /// Notable things that happened this tick
    pub events: EventList,
}

/// Errors that can occur when building an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// A patrol route needs at least one waypoint
    EmptyPatrolRoute,
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPatrolRoute => write!(f, "Patrol route has no waypoints"),
        }
    }
}

impl std::error::Error for AgentError {}

// ============================================================================
// Agent
// ============================================================================

/// An autonomous NPC
#[derive(Debug, Clone)]
pub struct Npc {
    body: Body,
    fsm: StateMachine,
    vision: f32,
    aggression: f32,
    vitality: Vitality,
    route: PatrolRoute,
    attack_cooldown: u32,
    history: PlayerHistory,
    learning_scale: f32,
    tuning: BehaviorTuning,
    adaptation: AdaptationTuning,
    rng: ChaCha8Rng,
}

impl Npc {
    /// Create an agent at `position` with default parameters, patrolling `waypoints`
    ///
    /// # Errors
    ///
    /// Returns `AgentError::EmptyPatrolRoute` if `waypoints` is empty
    pub fn new(position: Vec2, waypoints: impl Into<Vec<Vec2>>) -> Result<Self, AgentError> {
        let route = PatrolRoute::new(waypoints)?;
        Ok(Self {
            body: Body::new(position, DEFAULT_RADIUS, DEFAULT_SPEED),
            fsm: StateMachine::new(),
            vision: DEFAULT_VISION,
            aggression: DEFAULT_AGGRESSION,
            vitality: Vitality::new(),
            route,
            attack_cooldown: 0,
            history: PlayerHistory::new(HISTORY_CAPACITY),
            learning_scale: 0.0,
            tuning: BehaviorTuning::default(),
            adaptation: AdaptationTuning::default(),
            rng: ChaCha8Rng::seed_from_u64(DEFAULT_SEED),
        })
    }

    /// Override the behavior tuning
    #[must_use]
    pub fn with_tuning(mut self, tuning: BehaviorTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Override the adaptation tuning
    #[must_use]
    pub fn with_adaptation(mut self, adaptation: AdaptationTuning) -> Self {
        self.adaptation = adaptation;
        self
    }

    /// Reseed the random source used for fallback directions
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Override the collision radius
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.body.radius = radius.max(0.0);
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current position
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Teleport the agent (no clamping until the next update)
    pub fn set_position(&mut self, position: Vec2) {
        self.body.position = position;
    }

    /// Collision radius
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.body.radius
    }

    /// Base speed
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.body.speed
    }

    /// Active behavior state
    #[must_use]
    pub fn state(&self) -> BehaviorState {
        self.fsm.current()
    }

    /// Ticks spent in the active state
    #[must_use]
    pub fn ticks_in_state(&self) -> u32 {
        self.fsm.ticks_in_state()
    }

    /// Force a behavior state, bypassing the transition rules
    pub fn force_state(&mut self, state: BehaviorState) {
        self.fsm.force(state);
    }

    /// Vision radius
    #[must_use]
    pub fn vision(&self) -> f32 {
        self.vision
    }

    /// Aggression
    #[must_use]
    pub fn aggression(&self) -> f32 {
        self.aggression
    }

    /// Current health
    #[must_use]
    pub fn health(&self) -> i32 {
        self.vitality.health()
    }

    /// Overwrite health (clamped to `[0, 100]`)
    pub fn set_health(&mut self, health: i32) {
        self.vitality.set_health(health);
    }

    /// Patrol route
    #[must_use]
    pub fn route(&self) -> &PatrolRoute {
        &self.route
    }

    /// Index of the waypoint currently targeted
    #[must_use]
    pub fn waypoint_index(&self) -> usize {
        self.route.index()
    }

    /// Remaining attack cooldown in ticks
    #[must_use]
    pub fn attack_cooldown(&self) -> u32 {
        self.attack_cooldown
    }

    /// Observation window
    #[must_use]
    pub fn history(&self) -> &PlayerHistory {
        &self.history
    }

    /// Learning scale
    #[must_use]
    pub fn learning_scale(&self) -> f32 {
        self.learning_scale
    }

    /// Set the learning scale (clamped to `[0, 1]`, non-finite becomes 0)
    pub fn set_learning_scale(&mut self, scale: f32) {
        self.learning_scale = if scale.is_finite() {
            scale.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Behavior tuning
    #[must_use]
    pub fn tuning(&self) -> &BehaviorTuning {
        &self.tuning
    }

    /// Persistable parameters
    #[must_use]
    pub fn params(&self) -> LearnedParams {
        LearnedParams {
            aggression: self.aggression,
            vision: self.vision,
            speed: self.body.speed,
        }
    }

    /// Load persisted (or externally adjusted) parameters, clamped to range
    pub fn apply_params(&mut self, params: LearnedParams) {
        let params = params.clamped();
        self.aggression = params.aggression;
        self.vision = params.vision;
        self.body.speed = params.speed;
    }

    /// Forget everything learned: default parameters, empty history, scale 0
    pub fn reset_learning(&mut self) {
        self.apply_params(LearnedParams::default());
        self.history.clear();
        self.learning_scale = 0.0;
    }

    // ------------------------------------------------------------------------
    // Perception & combat hooks
    // ------------------------------------------------------------------------

    /// Whether `target` is within vision and in line of sight
    #[must_use]
    pub fn can_see(&self, target: Vec2, obstacles: &ObstacleField) -> bool {
        perception::can_see(self.body.position, self.vision, target, obstacles)
    }

    /// Whether the cooldown allows another attack
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.attack_cooldown == 0
    }

    /// The driver applied this agent's attack: start the cooldown and grow bolder
    pub fn register_attack(&mut self) {
        self.attack_cooldown = self.tuning.attack_cooldown_ticks;
        self.aggression = (self.aggression + self.tuning.attack_aggression_bonus).clamp(0.0, 1.0);
    }

    /// The agent was hit for `amount`: lose health and some aggression.
    ///
    /// Returns the health actually lost.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let lost = self.vitality.damage(amount);
        self.aggression = (self.aggression - self.tuning.hit_aggression_penalty).clamp(0.0, 1.0);
        lost
    }

    /// Push the agent out of any obstacle it overlaps.
    ///
    /// Bounded; returns whether the overlap was cleared.
    pub fn resolve_stuck(&mut self, obstacles: &ObstacleField) -> bool {
        steering::resolve_stuck(&mut self.body, obstacles, &self.tuning, &mut self.rng)
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advance the agent by one tick.
    pub fn update(&mut self, input: &TickInput<'_>, arena: &Arena) -> TickOutput {
        let obstacles = arena.obstacles();
        let mut events = EventList::new();

        if let Some(history) = input.history {
            self.history.replace_with(history);
            self.learn(obstacles);
        }

        if self.attack_cooldown > 0 {
            self.attack_cooldown -= 1;
        }

        let observation = Observation {
            health: self.vitality.health(),
            distance: self.body.position.distance(input.player),
            player_visible: self.can_see(input.player, obstacles),
            vision: self.vision,
            aggression: self.aggression,
        };

        if let Some(previous) = self.fsm.update(&observation, &self.tuning) {
            let current = self.fsm.current();
            events.push(AgentEvent::StateChanged {
                from: previous,
                to: current,
            });
            if current == BehaviorState::Patrol {
                let index = resolve_patrol_start(self.body.position, &self.route, obstacles);
                self.route.set_index(index);
                events.push(AgentEvent::PatrolResumed { index });
            }
        }

        match self.fsm.current() {
            BehaviorState::Patrol => self.patrol(obstacles, &mut events),
            BehaviorState::Pursue => {
                let speed = self.tuning.pursue_speed(self.body.speed, self.aggression);
                move_towards(&mut self.body, input.player, speed, obstacles, &self.tuning);
            }
            BehaviorState::Flee => self.flee(input.player, input.dt, obstacles, &mut events),
        }

        self.body.position = arena.clamp_circle(self.body.position, self.body.radius);

        let attack_ready = self.can_attack()
            && self.fsm.is_in_state(BehaviorState::Pursue)
            && self.body.position.distance(input.player) < input.contact_range;
        if attack_ready {
            events.push(AgentEvent::AttackReady);
        }

        TickOutput {
            position: self.body.position,
            state: self.fsm.current(),
            health: self.vitality.health(),
            attack_ready,
            events,
        }
    }

    fn learn(&mut self, obstacles: &ObstacleField) -> Option<AdaptationOutcome> {
        let outcome = adapt(
            Adaptable {
                aggression: &mut self.aggression,
                vision: &mut self.vision,
            },
            self.body.position,
            &self.history,
            obstacles,
            self.learning_scale,
            &self.adaptation,
        );
        if let Some(outcome) = &outcome {
            log::trace!(
                "Adapted: aggression {:.3} -> target {:.3}, vision {:.1}",
                self.aggression,
                outcome.target_aggression,
                self.vision
            );
        }
        outcome
    }

    fn patrol(&mut self, obstacles: &ObstacleField, events: &mut EventList) {
        let target = self.route.current();
        let speed = self.body.speed;
        let moved = move_towards(&mut self.body, target, speed, obstacles, &self.tuning);

        if self.body.is_blocked(obstacles) {
            // Treat the collision as "waypoint unreachable": free the body, try the next one
            let cleared = self.resolve_stuck(obstacles);
            events.push(AgentEvent::Unstuck {
                position: self.body.position,
                cleared,
            });
            let index = self.route.index();
            let next = self.route.advance();
            log::trace!("Waypoint {index} unreachable, skipping to {next}");
            events.push(AgentEvent::WaypointSkipped { index, next });
        } else if moved && self.body.position.distance(target) < self.tuning.waypoint_arrival_radius {
            let index = self.route.index();
            let next = self.route.advance();
            log::trace!("Waypoint {index} reached, heading to {next}");
            events.push(AgentEvent::WaypointReached { index, next });
        }
    }

    fn flee(&mut self, player: Vec2, dt: f32, obstacles: &ObstacleField, events: &mut EventList) {
        let speed = self.body.speed * self.tuning.flee_speed_factor;
        let output = Flee::new(player, speed).calculate(self.body.position);
        let delta = if output.is_zero() {
            random_direction(&mut self.rng) * speed
        } else {
            output.linear
        };

        steering::step(&mut self.body, delta, obstacles, &self.tuning);
        if self.body.is_blocked(obstacles) {
            let cleared = self.resolve_stuck(obstacles);
            events.push(AgentEvent::Unstuck {
                position: self.body.position,
                cleared,
            });
        }

        let amount = self.vitality.regenerate(self.tuning.regen_per_second, dt);
        if amount > 0 {
            events.push(AgentEvent::Regenerated {
                amount,
                health: self.vitality.health(),
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
