//! Headless demo: a scripted player plays a few games against the NPC
//!
//! Usage: `arena-npc [SNAPSHOT_PATH] [GAMES]`, or `arena-npc --reset [SNAPSHOT_PATH]`
//! to forget everything the NPC has learned.

use arena_npc::prelude::*;

/// NPC hit on the player, after the player's damage reduction
const NPC_ATTACK_DAMAGE: i32 = 13;
/// Player melee hit on the NPC, after the NPC's damage reduction
const PLAYER_MELEE_DAMAGE: i32 = 18;
/// Ticks between player swings while in range
const PLAYER_SWING_INTERVAL: u64 = 40;
/// A game that runs this long is called a draw
const MAX_GAME_TICKS: u64 = TICK_RATE as u64 * 120;

const DEFAULT_SNAPSHOT: &str = "npc_learning.json";
const DEFAULT_GAMES: u32 = 5;

/// Where the scripted player wants to go this tick
fn player_direction(sim: &Simulation) -> Vec2 {
    let tick = sim.tick_count();
    let player = sim.player().position;
    let npc = sim.npc().position();

    // Alternate between circling the arena and charging the NPC
    if (tick / 600) % 2 == 1 || sim.npc().state() == BehaviorState::Flee {
        return npc - player;
    }

    let angle = tick as f32 * 0.01;
    let orbit = Vec2::new(320.0, 240.0) + Vec2::new(angle.cos() * 200.0, angle.sin() * 150.0);
    orbit - player
}

fn play_game(sim: &mut Simulation) -> GameOutcome {
    loop {
        let direction = player_direction(sim);
        let tick = sim.tick_count();
        let output = sim.tick(direction);

        if output.attack_ready {
            sim.npc_attack(NPC_ATTACK_DAMAGE);
        }
        if sim.tick_count() % PLAYER_SWING_INTERVAL == 0 {
            sim.player_attack(PLAYER_MELEE_DAMAGE);
        }

        for event in &output.events {
            if let AgentEvent::StateChanged { from, to } = event {
                log::debug!("[{tick}] NPC {from} -> {to}");
            }
        }

        let outcome = match sim.outcome() {
            Some(outcome) => outcome,
            None if sim.tick_count() >= MAX_GAME_TICKS => GameOutcome::Draw,
            None => continue,
        };
        if let Some(last) = sim.events().last() {
            log::debug!("Last NPC event at tick {}: {:?}", last.tick, last.event);
        }
        return outcome;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let first = args.next();

    if first.as_deref() == Some("--reset") {
        let path = args.next().unwrap_or_else(|| DEFAULT_SNAPSHOT.to_owned());
        let snapshot = LearningSnapshot::load_or_default(&path);
        let mut sim = Simulation::with_snapshot(ArenaConfig::default(), snapshot)?;
        if !sim.reset_learning_persisted(&path)? {
            log::info!("Nothing to reset at {path}");
        }
        return Ok(());
    }

    let path = first.unwrap_or_else(|| DEFAULT_SNAPSHOT.to_owned());
    let games = match args.next() {
        Some(games) => games.parse()?,
        None => DEFAULT_GAMES,
    };

    let snapshot = LearningSnapshot::load_or_default(&path);
    let mut sim = Simulation::with_snapshot(ArenaConfig::default(), snapshot)?;

    for game in 1..=games {
        let outcome = play_game(&mut sim);
        log::info!(
            "Game {game}/{games}: {outcome:?}, player {} HP, NPC {} HP",
            sim.player_health(),
            sim.npc().health()
        );
        sim.finish_game(outcome);
        sim.snapshot().save_json(&path)?;
        sim.restart()?;
    }

    let snapshot = sim.snapshot();
    log::info!(
        "{} games played: player {} / NPC {} / draws {}",
        snapshot.games_played,
        snapshot.wins(GameOutcome::PlayerWin),
        snapshot.wins(GameOutcome::NpcWin),
        snapshot.wins(GameOutcome::Draw)
    );

    Ok(())
}
