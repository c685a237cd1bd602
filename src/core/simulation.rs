//! Headless simulation driver
//!
//! Owns everything the agent itself does not: the arena, the player body and
//! its health, the driver-side player history, session statistics and the
//! event log. Damage amounts stay with the caller; the driver only applies
//! them.

use std::path::Path;

use glam::Vec2;

use super::config::ArenaConfig;
use super::events::EventLog;
use super::snapshot::{GameOutcome, LearningSnapshot, SnapshotError};
use crate::ai::{
    AgentError, BehaviorState, Npc, PlayerHistory, TickInput, TickOutput, Vitality,
    learning_scale_for_games,
};
use crate::arena::{Arena, Player};

/// Player speed multiplier while the NPC is breathing down their neck
pub const BOOST_MULTIPLIER: f32 = 1.5;
/// How long a boost lasts, in ticks
pub const BOOST_TICKS: u32 = 60;
/// Extra distance beyond touching at which the boost kicks in
const BOOST_MARGIN: f32 = 36.0;
/// Extra distance beyond touching at which attacks connect
const CONTACT_MARGIN: f32 = 6.0;

/// One NPC, one player, one arena
#[derive(Debug)]
pub struct Simulation {
    config: ArenaConfig,
    arena: Arena,
    npc: Npc,
    player: Player,
    player_vitality: Vitality,
    history: PlayerHistory,
    snapshot: LearningSnapshot,
    events: EventLog,
    tick: u64,
}

impl Simulation {
    /// Create a simulation with a fresh snapshot
    ///
    /// # Errors
    ///
    /// Returns `AgentError::EmptyPatrolRoute` if the config has no patrol route
    pub fn new(config: ArenaConfig) -> Result<Self, AgentError> {
        Self::with_snapshot(config, LearningSnapshot::default())
    }

    /// Create a simulation that resumes from a persisted snapshot
    ///
    /// # Errors
    ///
    /// Returns `AgentError::EmptyPatrolRoute` if the config has no patrol route
    pub fn with_snapshot(
        config: ArenaConfig,
        snapshot: LearningSnapshot,
    ) -> Result<Self, AgentError> {
        let mut npc = Npc::new(config.npc_start, config.patrol_route.clone())?;
        npc.apply_params(snapshot.params());
        npc.set_learning_scale(learning_scale_for_games(snapshot.games_played));

        log::info!(
            "Simulation ready: {}x{} arena, {} obstacles, {} games played",
            config.width,
            config.height,
            config.obstacles.len(),
            snapshot.games_played
        );

        Ok(Self {
            arena: config.build_arena(),
            player: Player::new(config.player_start, config.player_radius, config.player_speed),
            player_vitality: Vitality::new(),
            history: PlayerHistory::new(config.history_capacity),
            events: EventLog::new(),
            tick: 0,
            npc,
            snapshot,
            config,
        })
    }

    /// Advance one tick with the player moving along `direction`
    pub fn tick(&mut self, direction: Vec2) -> TickOutput {
        self.player.update(direction, &self.arena);
        self.history.push(self.player.position);
        self.npc
            .set_learning_scale(learning_scale_for_games(self.snapshot.games_played));

        let contact_range = self.contact_range();
        let input = TickInput::new(self.player.position)
            .with_history(self.history.make_contiguous())
            .with_dt(self.config.tick_duration())
            .with_contact_range(contact_range);
        let output = self.npc.update(&input, &self.arena);

        self.update_boost();
        self.events.record(self.tick, output.events.iter().cloned());
        self.tick += 1;
        output
    }

    /// Boost the player while a pursuing NPC is very close and in sight; drop
    /// the boost once the pursuit is broken.
    fn update_boost(&mut self) {
        let obstacles = self.arena.obstacles();
        let npc_position = self.npc.position();
        let distance = npc_position.distance(self.player.position);
        let pursuing = self.npc.state() == BehaviorState::Pursue;
        let close = self.npc.radius() + self.player.radius + BOOST_MARGIN;

        if pursuing && distance < close && self.npc.can_see(self.player.position, obstacles) {
            if !self.player.is_boosted() {
                log::debug!("Player boosted at tick {}", self.tick);
            }
            self.player.boost(BOOST_MULTIPLIER, BOOST_TICKS);
        } else if !pursuing
            || distance >= self.npc.vision() * 1.2
            || obstacles.blocks_segment(npc_position, self.player.position)
        {
            self.player.clear_boost();
        }
    }

    /// Distance under which either side can land a hit
    #[must_use]
    pub fn contact_range(&self) -> f32 {
        self.npc.radius() + self.player.radius + CONTACT_MARGIN
    }

    /// Apply an NPC attack that the last tick reported as ready
    pub fn npc_attack(&mut self, damage: i32) {
        let dealt = self.player_vitality.damage(damage);
        self.npc.register_attack();
        log::debug!(
            "NPC hits player for {dealt}, player health {}",
            self.player_vitality.health()
        );
    }

    /// Player melee attack; lands only within contact range.
    ///
    /// Returns whether it landed.
    pub fn player_attack(&mut self, damage: i32) -> bool {
        if self.player.position.distance(self.npc.position()) >= self.contact_range() {
            return false;
        }
        let dealt = self.npc.apply_damage(damage);
        log::debug!("Player hits NPC for {dealt}, NPC health {}", self.npc.health());
        true
    }

    /// Who won, once either side is out of health
    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        match (self.player_vitality.is_depleted(), self.npc.health() <= 0) {
            (true, true) => Some(GameOutcome::Draw),
            (true, false) => Some(GameOutcome::NpcWin),
            (false, true) => Some(GameOutcome::PlayerWin),
            (false, false) => None,
        }
    }

    /// Record a finished game and copy the learned parameters into the snapshot
    pub fn finish_game(&mut self, outcome: GameOutcome) {
        self.snapshot.record_outcome(outcome);
        self.snapshot.store_params(self.npc.params());
        log::info!(
            "Game over after {} ticks: {:?} (games played: {}, aggression {:.3}, vision {:.1})",
            self.tick,
            outcome,
            self.snapshot.games_played,
            self.npc.aggression(),
            self.npc.vision()
        );
    }

    /// Start another game, keeping what the NPC learned
    ///
    /// # Errors
    ///
    /// Returns `AgentError::EmptyPatrolRoute` if the config has no patrol route
    pub fn restart(&mut self) -> Result<(), AgentError> {
        let mut npc = Npc::new(self.config.npc_start, self.config.patrol_route.clone())?;
        npc.apply_params(self.snapshot.params());
        npc.set_learning_scale(learning_scale_for_games(self.snapshot.games_played));
        self.npc = npc;

        self.player = Player::new(
            self.config.player_start,
            self.config.player_radius,
            self.config.player_speed,
        );
        self.player_vitality = Vitality::new();
        self.history.clear();
        self.events.clear();
        self.tick = 0;
        Ok(())
    }

    /// Forget everything learned and all statistics.
    ///
    /// Only the in-memory state is reset; a snapshot saved earlier stays on
    /// disk. Use [`Simulation::reset_learning_persisted`] to remove it too.
    pub fn reset_learning(&mut self) {
        self.snapshot.reset();
        self.npc.reset_learning();
        self.history.clear();
        log::info!("Learning reset");
    }

    /// Reset learning and delete the snapshot persisted at `path`.
    ///
    /// Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::IoError` if the file exists but cannot be removed
    pub fn reset_learning_persisted(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<bool, SnapshotError> {
        self.reset_learning();
        let removed = LearningSnapshot::delete(path.as_ref())?;
        if removed {
            log::info!("Removed learning snapshot {}", path.as_ref().display());
        }
        Ok(removed)
    }

    /// The NPC
    #[must_use]
    pub fn npc(&self) -> &Npc {
        &self.npc
    }

    /// The NPC, mutably
    pub fn npc_mut(&mut self) -> &mut Npc {
        &mut self.npc
    }

    /// The player body
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Player health
    #[must_use]
    pub fn player_health(&self) -> i32 {
        self.player_vitality.health()
    }

    /// The arena
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Driver-side player history
    #[must_use]
    pub fn history(&self) -> &PlayerHistory {
        &self.history
    }

    /// The learning snapshot
    #[must_use]
    pub fn snapshot(&self) -> &LearningSnapshot {
        &self.snapshot
    }

    /// Recent agent events, stamped with the tick they happened on
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Ticks since the game started
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }
}
