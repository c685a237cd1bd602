//! An adaptive NPC for a 2D top-down arena
//!
//! This crate provides:
//! - 2D geometry predicates (segments, rectangles, circles)
//! - Line-of-sight perception against an obstacle field
//! - Collision-aware steering with wall sliding and stuck recovery
//! - A Patrol / Pursue / Flee behavior state machine
//! - Online adaptation of aggression and vision to the player's habits
//! - A persisted learning snapshot and a headless simulation driver

pub mod ai;
pub mod arena;
pub mod core;
pub mod geometry;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        AgentError, BehaviorState, BehaviorTuning, LearnedParams, Npc, TickInput, TickOutput,
    };
    pub use crate::arena::{Arena, ObstacleField, Player};
    pub use crate::core::{
        AgentEvent, ArenaConfig, GameOutcome, LearningSnapshot, Simulation, TICK_RATE,
    };
    pub use crate::geometry::Rect;
    pub use glam::Vec2;
}
