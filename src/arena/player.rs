//! Player body
//!
//! Input polling lives outside the crate; the driver hands the player a
//! direction each tick and the body slides along obstacles the same way the
//! NPC does, minus the partial-step fallback.

use glam::Vec2;

use super::Arena;

/// The human-controlled circle the NPC reacts to
#[derive(Debug, Clone)]
pub struct Player {
    /// Center position
    pub position: Vec2,
    /// Collision radius
    pub radius: f32,
    /// Speed without boost, in units per tick
    pub base_speed: f32,
    /// Ticks of boost remaining
    boost_timer: u32,
    /// Current speed multiplier
    boost_multiplier: f32,
}

impl Player {
    /// Create a player at the given position
    #[must_use]
    pub fn new(position: Vec2, radius: f32, base_speed: f32) -> Self {
        Self {
            position,
            radius,
            base_speed,
            boost_timer: 0,
            boost_multiplier: 1.0,
        }
    }

    /// Current effective speed
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.base_speed * self.boost_multiplier
    }

    /// Whether a boost is currently active
    #[must_use]
    pub fn is_boosted(&self) -> bool {
        self.boost_timer > 0
    }

    /// Start (or refresh) a speed boost
    pub fn boost(&mut self, multiplier: f32, ticks: u32) {
        self.boost_multiplier = multiplier;
        self.boost_timer = ticks;
    }

    /// Cancel any active boost
    pub fn clear_boost(&mut self) {
        self.boost_multiplier = 1.0;
        self.boost_timer = 0;
    }

    /// Advance one tick, moving along `direction` (any length, normalized here)
    pub fn update(&mut self, direction: Vec2, arena: &Arena) {
        if self.boost_timer > 0 {
            self.boost_timer -= 1;
            if self.boost_timer == 0 {
                self.boost_multiplier = 1.0;
            }
        }

        let delta = direction.normalize_or_zero() * self.speed();
        if delta != Vec2::ZERO {
            let obstacles = arena.obstacles();

            let nx = self.position.x + delta.x;
            if !obstacles.overlaps_circle(Vec2::new(nx, self.position.y), self.radius) {
                self.position.x = nx;
            }

            let ny = self.position.y + delta.y;
            if !obstacles.overlaps_circle(Vec2::new(self.position.x, ny), self.radius) {
                self.position.y = ny;
            }
        }

        self.position = arena.clamp_circle(self.position, self.radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ObstacleField;
    use crate::geometry::Rect;

    #[test]
    fn test_player_moves_at_speed() {
        let arena = Arena::open(640.0, 480.0);
        let mut player = Player::new(Vec2::new(320.0, 240.0), 10.0, 2.6);

        player.update(Vec2::new(3.0, 0.0), &arena);

        assert!((player.position.x - 322.6).abs() < 1e-4);
        assert!((player.position.y - 240.0).abs() < 1e-4);
    }

    #[test]
    fn test_player_slides_along_wall() {
        let arena = Arena::new(
            640.0,
            480.0,
            ObstacleField::from_rects(vec![Rect::new(335.0, 0.0, 20.0, 480.0)]),
        );
        let mut player = Player::new(Vec2::new(324.0, 240.0), 10.0, 2.6);

        player.update(Vec2::new(1.0, 1.0), &arena);

        // X blocked by the wall, Y still advances
        assert!((player.position.x - 324.0).abs() < 1e-4);
        assert!(player.position.y > 240.0);
    }

    #[test]
    fn test_boost_expires() {
        let arena = Arena::open(640.0, 480.0);
        let mut player = Player::new(Vec2::new(320.0, 240.0), 10.0, 2.0);

        player.boost(1.5, 2);
        assert!((player.speed() - 3.0).abs() < 1e-6);

        player.update(Vec2::ZERO, &arena);
        assert!(player.is_boosted());
        player.update(Vec2::ZERO, &arena);
        assert!(!player.is_boosted());
        assert!((player.speed() - 2.0).abs() < 1e-6);
    }
}
