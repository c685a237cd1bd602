//! Core module
//!
//! Configuration, agent events, the persisted learning snapshot and the
//! headless simulation driver.

mod config;
mod events;
mod simulation;
mod snapshot;

pub use config::{ArenaConfig, ConfigError, TICK_RATE};
pub use events::{AgentEvent, EventLog, TimedEvent};
pub use simulation::{BOOST_MULTIPLIER, BOOST_TICKS, Simulation};
pub use snapshot::{GameOutcome, LearningSnapshot, SNAPSHOT_VERSION, SnapshotError};
