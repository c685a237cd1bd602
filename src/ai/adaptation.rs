//! Online adaptation from observed player movement
//!
//! Each tick the agent looks at a trailing window of player positions and
//! nudges its aggression (and, slightly, its vision radius) towards a target
//! derived from how fast the player moves and how exposed they have been.
//! How quickly it reacts is gated by an external learning scale that grows
//! with the number of games played.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::perception::visible_fraction;
use crate::arena::ObstacleField;

/// Lower bound of the vision radius
pub const MIN_VISION: f32 = 60.0;
/// Upper bound of the vision radius
pub const MAX_VISION: f32 = 200.0;

// ============================================================================
// Player history
// ============================================================================

/// Bounded, insertion-ordered window of player positions (most recent last)
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerHistory {
    samples: VecDeque<Vec2>,
    capacity: usize,
}

impl PlayerHistory {
    /// Create an empty history holding at most `capacity` samples
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a sample, evicting the oldest one when full
    pub fn push(&mut self, position: Vec2) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(position);
    }

    /// Replace the contents with the most recent `capacity` entries of `samples`
    pub fn replace_with(&mut self, samples: &[Vec2]) {
        let start = samples.len().saturating_sub(self.capacity);
        self.samples.clear();
        self.samples.extend(samples[start..].iter().copied());
    }

    /// Samples oldest first
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Vec2> {
        self.samples.iter()
    }

    /// Samples oldest first, as one slice
    pub fn make_contiguous(&mut self) -> &[Vec2] {
        self.samples.make_contiguous()
    }

    /// Most recent sample
    #[must_use]
    pub fn latest(&self) -> Option<Vec2> {
        self.samples.back().copied()
    }

    /// Number of samples held
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no samples are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Mean distance between consecutive samples (0.0 with fewer than two)
    #[must_use]
    pub fn average_step(&self) -> f32 {
        if self.samples.len() < 2 {
            return 0.0;
        }
        let total: f32 = self
            .samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .map(|(a, b)| a.distance(*b))
            .sum();
        total / (self.samples.len() - 1) as f32
    }
}

// ============================================================================
// Tuning
// ============================================================================

/// Coefficients of the adaptation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationTuning {
    /// Samples required before adapting at all
    pub min_samples: usize,
    /// Aggression target with an invisible, motionless player
    pub base_aggression: f32,
    /// Weight of the visible fraction in the aggression target
    pub visibility_weight: f32,
    /// Average step is divided by this before joining the target
    pub speed_divisor: f32,
    /// Learning rate at learning scale 0
    pub base_rate: f32,
    /// Extra learning rate at learning scale 1
    pub rate_span: f32,
    /// Vision correction gain
    pub vision_gain: f32,
    /// Multiplier applied to the learning rate for vision corrections
    pub vision_rate_scale: f32,
}

impl Default for AdaptationTuning {
    fn default() -> Self {
        Self {
            min_samples: 5,
            base_aggression: 0.3,
            visibility_weight: 0.7,
            speed_divisor: 3.0,
            base_rate: 0.005,
            rate_span: 0.045,
            vision_gain: 0.2,
            vision_rate_scale: 10.0,
        }
    }
}

impl AdaptationTuning {
    /// Learning rate for a given learning scale (scale clamped to `[0, 1]`)
    #[must_use]
    pub fn learning_rate(&self, learning_scale: f32) -> f32 {
        self.base_rate + self.rate_span * learning_scale.clamp(0.0, 1.0)
    }

    /// Aggression target for the observed exposure and speed
    #[must_use]
    pub fn target_aggression(&self, visible_fraction: f32, average_speed: f32) -> f32 {
        (self.base_aggression
            + self.visibility_weight * visible_fraction
            + average_speed / self.speed_divisor)
            .clamp(0.0, 1.0)
    }
}

// ============================================================================
// Adaptation
// ============================================================================

/// Summary of one adaptation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptationOutcome {
    /// Fraction of samples the agent could see
    pub visible_fraction: f32,
    /// Mean player step length
    pub average_speed: f32,
    /// Aggression the agent is moving towards
    pub target_aggression: f32,
    /// Rate used for this step
    pub learning_rate: f32,
}

/// Parameters adaptation may change
#[derive(Debug)]
pub struct Adaptable<'a> {
    /// Aggression in `[0, 1]`
    pub aggression: &'a mut f32,
    /// Vision radius in `[MIN_VISION, MAX_VISION]`
    pub vision: &'a mut f32,
}

/// Apply one adaptation step.
///
/// No-op (returns `None`) with fewer than `min_samples` samples. Visibility
/// is judged with the vision radius from before this step.
pub fn adapt(
    params: Adaptable<'_>,
    origin: Vec2,
    history: &PlayerHistory,
    obstacles: &ObstacleField,
    learning_scale: f32,
    tuning: &AdaptationTuning,
) -> Option<AdaptationOutcome> {
    if history.len() < tuning.min_samples.max(1) {
        return None;
    }

    let average_speed = history.average_step();
    let fraction = visible_fraction(origin, *params.vision, history.iter(), obstacles);
    let target = tuning.target_aggression(fraction, average_speed);
    let rate = tuning.learning_rate(learning_scale);

    *params.aggression = (*params.aggression + (target - *params.aggression) * rate).clamp(0.0, 1.0);
    *params.vision = (*params.vision
        + (fraction - 0.5) * tuning.vision_gain * rate * tuning.vision_rate_scale)
        .clamp(MIN_VISION, MAX_VISION);

    Some(AdaptationOutcome {
        visible_fraction: fraction,
        average_speed,
        target_aggression: target,
        learning_rate: rate,
    })
}

/// Learning scale for the number of games played so far.
///
/// Ramps linearly from 0.0 to 0.3 over the first three games, then from 0.3
/// to 1.0 over the next seventeen, and stays at 1.0 afterwards.
#[must_use]
pub fn learning_scale_for_games(games_played: u32) -> f32 {
    const WARMUP_GAMES: u32 = 3;
    const WARMUP_SCALE: f32 = 0.3;
    const RAMP_GAMES: u32 = 17;

    if games_played < WARMUP_GAMES {
        (games_played as f32 / WARMUP_GAMES as f32 * WARMUP_SCALE).min(WARMUP_SCALE)
    } else {
        let progress = (games_played - WARMUP_GAMES) as f32 / RAMP_GAMES as f32;
        (WARMUP_SCALE + (1.0 - WARMUP_SCALE) * progress).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(samples: &[Vec2]) -> PlayerHistory {
        let mut history = PlayerHistory::new(120);
        history.replace_with(samples);
        history
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = PlayerHistory::new(3);
        for i in 0..5 {
            history.push(Vec2::new(i as f32, 0.0));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(
            history.iter().copied().collect::<Vec<_>>(),
            vec![Vec2::new(2.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(4.0, 0.0)]
        );
        assert_eq!(history.latest(), Some(Vec2::new(4.0, 0.0)));
    }

    #[test]
    fn test_replace_keeps_most_recent() {
        let mut history = PlayerHistory::new(2);
        history.replace_with(&[Vec2::ZERO, Vec2::X, Vec2::Y]);

        assert_eq!(history.make_contiguous(), &[Vec2::X, Vec2::Y]);
    }

    #[test]
    fn test_average_step() {
        let history = history_of(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 4.0),
            Vec2::new(3.0, 4.0),
        ]);
        assert!((history.average_step() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_too_few_samples_is_noop() {
        let history = history_of(&[Vec2::ZERO; 4]);
        let mut aggression = 0.5;
        let mut vision = 90.0;

        let outcome = adapt(
            Adaptable {
                aggression: &mut aggression,
                vision: &mut vision,
            },
            Vec2::new(10.0, 0.0),
            &history,
            &ObstacleField::new(),
            1.0,
            &AdaptationTuning::default(),
        );

        assert!(outcome.is_none());
        assert_eq!(aggression, 0.5);
        assert_eq!(vision, 90.0);
    }

    #[test]
    fn test_aggression_rises_monotonically_without_overshoot() {
        // Motionless, always-visible player: target = 0.3 + 0.7 = 1.0
        let history = history_of(&[Vec2::new(110.0, 100.0); 10]);
        let origin = Vec2::new(100.0, 100.0);
        let tuning = AdaptationTuning::default();
        let mut aggression = 0.5;
        let mut vision = 90.0;

        let mut previous = aggression;
        for _ in 0..500 {
            let outcome = adapt(
                Adaptable {
                    aggression: &mut aggression,
                    vision: &mut vision,
                },
                origin,
                &history,
                &ObstacleField::new(),
                1.0,
                &tuning,
            )
            .unwrap();

            assert!((outcome.target_aggression - 1.0).abs() < 1e-6);
            assert!(aggression >= previous);
            assert!(aggression <= outcome.target_aggression);
            previous = aggression;
        }
        assert!(aggression > 0.99);
        // Full visibility widens vision, within bounds
        assert!(vision > 90.0 && vision <= MAX_VISION);
    }

    #[test]
    fn test_aggression_falls_towards_target() {
        // Motionless, never-visible player: target = 0.3
        let history = history_of(&[Vec2::new(600.0, 450.0); 10]);
        let origin = Vec2::new(50.0, 50.0);
        let tuning = AdaptationTuning::default();
        let mut aggression = 0.9;
        let mut vision = 90.0;

        let mut previous = aggression;
        for _ in 0..2000 {
            adapt(
                Adaptable {
                    aggression: &mut aggression,
                    vision: &mut vision,
                },
                origin,
                &history,
                &ObstacleField::new(),
                0.0,
                &tuning,
            );
            assert!(aggression <= previous);
            assert!(aggression >= 0.3);
            previous = aggression;
        }
        assert!(aggression < 0.35);
        // No visibility at all narrows vision, never below the floor
        assert!(vision < 90.0 && vision >= MIN_VISION);
    }

    #[test]
    fn test_fast_player_saturates_target() {
        let samples: Vec<Vec2> = (0..10).map(|i| Vec2::new(i as f32 * 5.0, 0.0)).collect();
        let tuning = AdaptationTuning::default();
        let history = history_of(&samples);

        // 0.3 + 0 + 5/3 -> clamped to 1
        let target = tuning.target_aggression(0.0, history.average_step());
        assert!((target - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_learning_rate_bounds() {
        let tuning = AdaptationTuning::default();

        assert!((tuning.learning_rate(0.0) - 0.005).abs() < 1e-7);
        assert!((tuning.learning_rate(1.0) - 0.05).abs() < 1e-7);
        assert!((tuning.learning_rate(4.0) - 0.05).abs() < 1e-7);
        assert!((tuning.learning_rate(-1.0) - 0.005).abs() < 1e-7);
    }

    #[test]
    fn test_learning_scale_ramp() {
        assert_eq!(learning_scale_for_games(0), 0.0);
        assert!((learning_scale_for_games(1) - 0.1).abs() < 1e-6);
        assert!((learning_scale_for_games(2) - 0.2).abs() < 1e-6);
        assert!((learning_scale_for_games(3) - 0.3).abs() < 1e-6);
        assert!((learning_scale_for_games(20) - 1.0).abs() < 1e-6);
        assert_eq!(learning_scale_for_games(500), 1.0);

        let mut previous = 0.0;
        for games in 0..40 {
            let scale = learning_scale_for_games(games);
            assert!(scale >= previous);
            previous = scale;
        }
    }
}
