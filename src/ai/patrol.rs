//! Cyclic patrol route

use glam::Vec2;

use super::agent::AgentError;

/// Ordered, cyclic list of waypoints plus the index of the current one.
///
/// Never empty, so the current index is always valid.
#[derive(Debug, Clone, PartialEq)]
pub struct PatrolRoute {
    waypoints: Vec<Vec2>,
    index: usize,
}

impl PatrolRoute {
    /// Create a route starting at the first waypoint
    ///
    /// # Errors
    ///
    /// Returns `AgentError::EmptyPatrolRoute` if `waypoints` is empty
    pub fn new(waypoints: impl Into<Vec<Vec2>>) -> Result<Self, AgentError> {
        let waypoints = waypoints.into();
        if waypoints.is_empty() {
            return Err(AgentError::EmptyPatrolRoute);
        }
        Ok(Self {
            waypoints,
            index: 0,
        })
    }

    /// All waypoints in route order
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false for a constructed route
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Index of the current waypoint
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current waypoint
    #[must_use]
    pub fn current(&self) -> Vec2 {
        self.waypoints[self.index]
    }

    /// Waypoint at `index` (wrapped)
    #[must_use]
    pub fn get(&self, index: usize) -> Vec2 {
        self.waypoints[index % self.waypoints.len()]
    }

    /// Move to the next waypoint, wrapping around. Returns the new index.
    pub fn advance(&mut self) -> usize {
        self.index = (self.index + 1) % self.waypoints.len();
        self.index
    }

    /// Jump to `index` (wrapped into range)
    pub fn set_index(&mut self, index: usize) {
        self.index = index % self.waypoints.len();
    }

    /// Index of the waypoint closest to `position` (first one on ties)
    #[must_use]
    pub fn nearest_index(&self, position: Vec2) -> usize {
        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for (i, waypoint) in self.waypoints.iter().enumerate() {
            let d = position.distance(*waypoint);
            if d < best_distance {
                best = i;
                best_distance = d;
            }
        }
        best
    }
}
