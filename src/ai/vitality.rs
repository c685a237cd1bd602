//! Agent health
//!
//! Health is a whole number in `[0, MAX_HEALTH]`. Regeneration is tracked
//! fractionally and released in whole points only.

/// Maximum (and starting) health
pub const MAX_HEALTH: i32 = 100;

/// Health plus the fractional regeneration carry
#[derive(Debug, Clone, PartialEq)]
pub struct Vitality {
    health: i32,
    regen_carry: f32,
}

impl Vitality {
    /// Full health, empty carry
    #[must_use]
    pub fn new() -> Self {
        Self::with_health(MAX_HEALTH)
    }

    /// Start at the given health (clamped)
    #[must_use]
    pub fn with_health(health: i32) -> Self {
        Self {
            health: health.clamp(0, MAX_HEALTH),
            regen_carry: 0.0,
        }
    }

    /// Current health
    #[must_use]
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Fractional regeneration not yet applied
    #[must_use]
    pub fn regen_carry(&self) -> f32 {
        self.regen_carry
    }

    /// Overwrite health (clamped)
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, MAX_HEALTH);
    }

    /// Remove health. Negative amounts are ignored.
    ///
    /// Returns the amount actually removed.
    pub fn damage(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health - amount.max(0)).clamp(0, MAX_HEALTH);
        before - self.health
    }

    /// Accumulate `rate_per_second * dt` and apply whole points.
    ///
    /// The carry keeps its fractional remainder; whole points beyond
    /// `MAX_HEALTH` are consumed. An unbounded amount (huge or infinite `dt`)
    /// heals fully and empties the carry. Returns the health actually gained.
    pub fn regenerate(&mut self, rate_per_second: f32, dt: f32) -> i32 {
        self.regen_carry += (rate_per_second * dt).max(0.0);
        let whole = self.regen_carry.floor();
        if whole < 1.0 {
            return 0;
        }
        self.regen_carry = if self.regen_carry.is_finite() {
            self.regen_carry - whole
        } else {
            0.0
        };

        let points = whole.min(MAX_HEALTH as f32) as i32;
        let before = self.health;
        self.health = self.health.saturating_add(points).min(MAX_HEALTH);
        self.health - before
    }

    /// Check whether health has reached zero
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.health == 0
    }
}

impl Default for Vitality {
    fn default() -> Self {
        Self::new()
    }
}
