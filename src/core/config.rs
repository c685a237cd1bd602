//! Simulation configuration

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::arena::{Arena, ObstacleField};

/// Nominal fixed simulation rate in ticks per second.
///
/// Per-second rates (health regeneration) are scaled by the tick duration;
/// tick-counted values (attack cooldown, boost duration) assume this rate.
pub const TICK_RATE: u32 = 60;

/// Arena and driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Arena width
    pub width: f32,
    /// Arena height
    pub height: f32,
    /// Fixed ticks per second (0 falls back to `TICK_RATE`)
    pub tick_rate: u32,
    /// How many recent player positions the driver keeps
    pub history_capacity: usize,
    /// Player collision radius
    pub player_radius: f32,
    /// Player speed in units per tick
    pub player_speed: f32,
    /// Player spawn point
    pub player_start: Vec2,
    /// NPC spawn point
    pub npc_start: Vec2,
    /// NPC patrol route
    pub patrol_route: Vec<Vec2>,
    /// Solid obstacles
    pub obstacles: ObstacleField,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            tick_rate: TICK_RATE,
            history_capacity: 240,
            player_radius: 10.0,
            player_speed: 2.6,
            player_start: Vec2::new(320.0, 240.0),
            npc_start: Vec2::new(100.0, 100.0),
            patrol_route: vec![
                Vec2::new(80.0, 80.0),
                Vec2::new(560.0, 80.0),
                Vec2::new(560.0, 400.0),
                Vec2::new(80.0, 400.0),
            ],
            obstacles: ObstacleField::default_layout(),
        }
    }
}

impl ArenaConfig {
    /// Set arena dimensions
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the tick rate
    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Replace the obstacle field
    pub fn with_obstacles(mut self, obstacles: ObstacleField) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// Replace the patrol route
    pub fn with_patrol_route(mut self, route: Vec<Vec2>) -> Self {
        self.patrol_route = route;
        self
    }

    /// Set spawn points for the NPC and the player
    pub fn with_spawns(mut self, npc: Vec2, player: Vec2) -> Self {
        self.npc_start = npc;
        self.player_start = player;
        self
    }

    /// Duration of one tick in seconds
    #[must_use]
    pub fn tick_duration(&self) -> f32 {
        let rate = if self.tick_rate == 0 {
            TICK_RATE
        } else {
            self.tick_rate
        };
        1.0 / rate as f32
    }

    /// Build the arena described by this config
    #[must_use]
    pub fn build_arena(&self) -> Arena {
        Arena::new(self.width, self.height, self.obstacles.clone())
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a config from a RON file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        ron::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArenaConfig::default();

        assert_eq!(config.tick_rate, TICK_RATE);
        assert_eq!(config.patrol_route.len(), 4);
        assert!((config.tick_duration() - 1.0 / 60.0).abs() < 1e-7);
    }

    #[test]
    fn test_zero_tick_rate_falls_back() {
        let config = ArenaConfig::default().with_tick_rate(0);
        assert!((config.tick_duration() - 1.0 / 60.0).abs() < 1e-7);
    }

    #[test]
    fn test_config_ron_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arena.ron");

        let config = ArenaConfig::default()
            .with_size(800.0, 600.0)
            .with_obstacles(ObstacleField::new());
        config.save_ron(&path).unwrap();

        let loaded = ArenaConfig::load_ron(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: ArenaConfig = ron::from_str("(width: 320.0)").unwrap();

        assert_eq!(config.width, 320.0);
        assert_eq!(config.height, 480.0);
        assert_eq!(config.obstacles.len(), 6);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ArenaConfig::load_ron("/nonexistent/arena.ron");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
