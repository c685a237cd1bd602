//! Persisted learning snapshot
//!
//! What the agent has learned (aggression, vision, speed) plus session
//! statistics, saved between runs as JSON (or RON). Loading is lenient: every
//! missing or malformed field falls back to its own default without
//! discarding the rest of the file. The older nested layout
//! `{ "games_played", "npc": { "aggr", "vision", "speed" }, "stats" }` is
//! accepted too.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::ai::{DEFAULT_AGGRESSION, DEFAULT_SPEED, DEFAULT_VISION, LearnedParams};

/// Current on-disk layout version
pub const SNAPSHOT_VERSION: u32 = 1;

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The NPC ran out of health
    PlayerWin,
    /// The player ran out of health
    NpcWin,
    /// Neither side won
    Draw,
}

impl GameOutcome {
    /// Key used in the statistics table
    #[must_use]
    pub const fn stat_key(self) -> &'static str {
        match self {
            Self::PlayerWin => "player_wins",
            Self::NpcWin => "npc_wins",
            Self::Draw => "draws",
        }
    }
}

/// Learned parameters and session statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct LearningSnapshot {
    /// Layout version
    pub version: u32,
    /// Learned aggression
    pub aggression: f32,
    /// Learned vision radius
    pub vision: f32,
    /// Base speed
    pub speed: f32,
    /// Completed games
    pub games_played: u32,
    /// Outcome counters keyed by `GameOutcome::stat_key`
    pub stats: FxHashMap<String, u32>,
}

impl Default for LearningSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            aggression: DEFAULT_AGGRESSION,
            vision: DEFAULT_VISION,
            speed: DEFAULT_SPEED,
            games_played: 0,
            stats: FxHashMap::default(),
        }
    }
}

impl LearningSnapshot {
    /// A fresh snapshot with default parameters and no games
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters to hand to `Npc::apply_params`
    #[must_use]
    pub fn params(&self) -> LearnedParams {
        LearnedParams {
            aggression: self.aggression,
            vision: self.vision,
            speed: self.speed,
        }
        .clamped()
    }

    /// Copy parameters out of the agent (clamped to range)
    pub fn store_params(&mut self, params: LearnedParams) {
        let params = params.clamped();
        self.aggression = params.aggression;
        self.vision = params.vision;
        self.speed = params.speed;
    }

    /// Count a finished game
    pub fn record_outcome(&mut self, outcome: GameOutcome) {
        self.games_played = self.games_played.saturating_add(1);
        let count = self.stats.entry(outcome.stat_key().to_owned()).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// How many games ended with `outcome`
    #[must_use]
    pub fn wins(&self, outcome: GameOutcome) -> u32 {
        self.stats.get(outcome.stat_key()).copied().unwrap_or(0)
    }

    /// Forget everything
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Save the snapshot to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| SnapshotError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a snapshot from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not JSON at all
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content =
            fs::read_to_string(path).map_err(|e| SnapshotError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| SnapshotError::DeserializeError(e.to_string()))
    }

    /// Save the snapshot to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SnapshotError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| SnapshotError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a snapshot from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not RON at all
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content =
            fs::read_to_string(path).map_err(|e| SnapshotError::IoError(e.to_string()))?;
        ron::from_str(&content).map_err(|e| SnapshotError::DeserializeError(e.to_string()))
    }

    /// Load from `path` (RON for a `.ron` extension, JSON otherwise), or
    /// start fresh if the file is absent or unreadable.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No snapshot at {}, starting fresh", path.display());
            return Self::default();
        }

        let is_ron = path.extension().is_some_and(|ext| ext == "ron");
        let loaded = if is_ron {
            Self::load_ron(path)
        } else {
            Self::load_json(path)
        };

        match loaded {
            Ok(snapshot) => {
                log::info!(
                    "Loaded snapshot from {} ({} games played)",
                    path.display(),
                    snapshot.games_played
                );
                snapshot
            }
            Err(e) => {
                log::warn!("Ignoring snapshot at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Remove a persisted snapshot.
    ///
    /// Returns whether a file was actually removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed
    pub fn delete(path: impl AsRef<Path>) -> Result<bool, SnapshotError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SnapshotError::IoError(e.to_string())),
        }
    }
}

// ============================================================================
// Lenient decoding
// ============================================================================

/// A value that either parsed or is ignored
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

impl<T> Default for Lenient<T> {
    fn default() -> Self {
        Self::Invalid(IgnoredAny)
    }
}

impl<T> Lenient<T> {
    fn ok(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default, rename = "LearningSnapshot")]
struct RawSnapshot {
    version: Lenient<u32>,
    aggression: Lenient<f32>,
    vision: Lenient<f32>,
    speed: Lenient<f32>,
    games_played: Lenient<u32>,
    stats: Lenient<FxHashMap<String, Lenient<u32>>>,
    npc: Lenient<LegacyParams>,
}

/// Nested parameter block of the older layout
#[derive(Default, Deserialize)]
#[serde(default)]
struct LegacyParams {
    aggr: Lenient<f32>,
    vision: Lenient<f32>,
    speed: Lenient<f32>,
}

impl From<RawSnapshot> for LearningSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        let legacy = raw.npc.ok().unwrap_or_default();

        let version = raw.version.ok().unwrap_or(0);
        if version > SNAPSHOT_VERSION {
            log::warn!("Snapshot version {version} is newer than {SNAPSHOT_VERSION}");
        }

        let params = LearnedParams {
            aggression: raw
                .aggression
                .ok()
                .or_else(|| legacy.aggr.ok())
                .unwrap_or(DEFAULT_AGGRESSION),
            vision: raw
                .vision
                .ok()
                .or_else(|| legacy.vision.ok())
                .unwrap_or(DEFAULT_VISION),
            speed: raw
                .speed
                .ok()
                .or_else(|| legacy.speed.ok())
                .unwrap_or(DEFAULT_SPEED),
        }
        .clamped();

        let stats = raw
            .stats
            .ok()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, count)| count.ok().map(|count| (key, count)))
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            aggression: params.aggression,
            vision: params.vision,
            speed: params.speed,
            games_played: raw.games_played.ok().unwrap_or(0),
            stats,
        }
    }
}

/// Errors that can occur while persisting a snapshot
#[derive(Debug, Clone)]
pub enum SnapshotError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let snapshot = LearningSnapshot::new();

        assert_eq!(snapshot.params(), LearnedParams::default());
        assert_eq!(snapshot.games_played, 0);
        assert!(snapshot.stats.is_empty());
    }

    #[test]
    fn test_record_outcome() {
        let mut snapshot = LearningSnapshot::new();

        snapshot.record_outcome(GameOutcome::NpcWin);
        snapshot.record_outcome(GameOutcome::NpcWin);
        snapshot.record_outcome(GameOutcome::PlayerWin);

        assert_eq!(snapshot.games_played, 3);
        assert_eq!(snapshot.wins(GameOutcome::NpcWin), 2);
        assert_eq!(snapshot.wins(GameOutcome::PlayerWin), 1);
        assert_eq!(snapshot.wins(GameOutcome::Draw), 0);
    }

    #[test]
    fn test_snapshot_serialization_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.json");

        let mut snapshot = LearningSnapshot::new();
        snapshot.store_params(LearnedParams {
            aggression: 0.8,
            vision: 120.0,
            speed: 1.5,
        });
        snapshot.record_outcome(GameOutcome::Draw);
        snapshot.save_json(&path).unwrap();

        let loaded = LearningSnapshot::load_json(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_snapshot_serialization_ron() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.ron");

        let mut snapshot = LearningSnapshot::new();
        snapshot.record_outcome(GameOutcome::PlayerWin);
        snapshot.save_ron(&path).unwrap();

        let loaded = LearningSnapshot::load_or_default(&path);
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_legacy_layout() {
        let json = r#"{
            "games_played": 7,
            "npc": { "aggr": 0.72, "vision": 110.0, "speed": 1.2 },
            "stats": { "player_wins": 3, "npc_wins": 4 }
        }"#;

        let snapshot: LearningSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.games_played, 7);
        assert!((snapshot.aggression - 0.72).abs() < 1e-6);
        assert_eq!(snapshot.vision, 110.0);
        assert_eq!(snapshot.wins(GameOutcome::NpcWin), 4);
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    }

    #[test]
    fn test_malformed_fields_default_independently() {
        let json = r#"{
            "aggression": "very",
            "vision": 150,
            "speed": null,
            "games_played": -2,
            "stats": { "npc_wins": 2, "player_wins": "many" }
        }"#;

        let snapshot: LearningSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.aggression, DEFAULT_AGGRESSION);
        assert_eq!(snapshot.vision, 150.0);
        assert_eq!(snapshot.speed, DEFAULT_SPEED);
        assert_eq!(snapshot.games_played, 0);
        assert_eq!(snapshot.wins(GameOutcome::NpcWin), 2);
        assert_eq!(snapshot.wins(GameOutcome::PlayerWin), 0);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let json = r#"{ "aggression": 4.0, "vision": 5000.0 }"#;

        let snapshot: LearningSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.aggression, 1.0);
        assert_eq!(snapshot.vision, 200.0);
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();

        let missing = LearningSnapshot::load_or_default(dir.path().join("absent.json"));
        assert_eq!(missing, LearningSnapshot::default());

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "not json {").unwrap();
        assert!(matches!(
            LearningSnapshot::load_json(&garbage),
            Err(SnapshotError::DeserializeError(_))
        ));
        assert_eq!(
            LearningSnapshot::load_or_default(&garbage),
            LearningSnapshot::default()
        );
    }

    #[test]
    fn test_reset_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.json");

        let mut snapshot = LearningSnapshot::new();
        snapshot.record_outcome(GameOutcome::NpcWin);
        snapshot.save_json(&path).unwrap();

        snapshot.reset();
        assert_eq!(snapshot, LearningSnapshot::default());

        assert!(LearningSnapshot::delete(&path).unwrap());
        assert!(!path.exists());
        assert!(!LearningSnapshot::delete(&path).unwrap());
    }
}
