//! Spatial layer: positions, the hazard query seam and the default flood map

pub mod flood_map;
pub mod movement;

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

pub use flood_map::{FloodLayer, FloodMap, FloodZone};
pub use movement::{candidate_moves, choose_safe_move, CANDIDATE_MOVES};

/// Planar position in study-area units
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Offset by a distance along an angle in radians
    pub fn offset(&self, angle: f64, distance: f64) -> Position {
        Position::new(self.x + distance * angle.cos(), self.y + distance * angle.sin())
    }

    /// Uniform point inside a disc around this position
    pub fn random_point_within(&self, radius: f64, rng: &mut SmallRng) -> Position {
        let angle = rng.gen_range(0.0..TAU);
        let distance = radius * rng.gen::<f64>().sqrt();
        self.offset(angle, distance)
    }

    /// Movement command
    pub fn move_to(&mut self, target: Position) {
        *self = target;
    }
}

/// Answers "is this position flooded, and how deep".
///
/// Returns 0.0 when the position is dry, otherwise a sampled depth.
pub trait HazardQuery: Send + Sync + 'static {
    fn hazard_level(&self, position: Position, rng: &mut SmallRng) -> f64;

    /// Called once per hour before anything queries the hazard
    fn advance(&mut self, _hour: u64) {}
}

/// Hazard that is always dry
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHazard;

impl HazardQuery for NoHazard {
    fn hazard_level(&self, _position: Position, _rng: &mut SmallRng) -> f64 {
        0.0
    }
}

/// The active hazard source
#[derive(Resource)]
pub struct Hazard(pub Box<dyn HazardQuery>);

impl Hazard {
    pub fn new(query: impl HazardQuery) -> Self {
        Self(Box::new(query))
    }

    pub fn level(&self, position: Position, rng: &mut SmallRng) -> f64 {
        self.0.hazard_level(position, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_random_point_within_radius() {
        let center = Position::new(10.0, -5.0);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            let p = center.random_point_within(4.0, &mut rng);
            assert!(center.distance_to(p) <= 4.0 + 1e-9);
        }
    }

    #[test]
    fn test_offset() {
        let p = Position::new(0.0, 0.0).offset(0.0, 5.0);
        assert!((p.x - 5.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn test_no_hazard_is_dry() {
        let hazard = Hazard::new(NoHazard);
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(hazard.level(Position::new(1.0, 1.0), &mut rng), 0.0);
    }
}
