//! Wandering moves and the safety check against the hazard

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::f64::consts::TAU;

use super::{HazardQuery, Position};

/// Moves sampled per wandering attempt
pub const CANDIDATE_MOVES: usize = 10;

/// Distance covered per unit of mobility
const MOBILITY_RANGE: f64 = 20.0;

/// Sample candidate destinations around `from`
pub fn candidate_moves(from: Position, mobility: f64, rng: &mut SmallRng) -> Vec<Position> {
    let reach = (mobility * MOBILITY_RANGE).max(0.0);
    (0..CANDIDATE_MOVES)
        .map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let distance = if reach > 0.0 { rng.gen_range(0.0..reach) } else { 0.0 };
            from.offset(angle, distance)
        })
        .collect()
}

/// Pick a random safe destination, or None when every candidate is deeper
/// than the walker's resilience.
pub fn choose_safe_move(
    from: Position,
    mobility: f64,
    resilience: f64,
    hazard: &dyn HazardQuery,
    rng: &mut SmallRng,
) -> Option<Position> {
    let candidates = candidate_moves(from, mobility, rng);
    let safe: Vec<Position> = candidates
        .into_iter()
        .filter(|&p| resilience > hazard.hazard_level(p, rng))
        .collect();
    safe.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::NoHazard;
    use rand::SeedableRng;

    struct Submerged;

    impl HazardQuery for Submerged {
        fn hazard_level(&self, _position: Position, _rng: &mut SmallRng) -> f64 {
            50.0
        }
    }

    #[test]
    fn test_candidates_stay_in_reach() {
        let mut rng = SmallRng::seed_from_u64(11);
        let from = Position::new(0.0, 0.0);
        let moves = candidate_moves(from, 0.5, &mut rng);
        assert_eq!(moves.len(), CANDIDATE_MOVES);
        assert!(moves.iter().all(|p| from.distance_to(*p) <= 10.0 + 1e-9));
    }

    #[test]
    fn test_dry_ground_always_has_a_move() {
        let mut rng = SmallRng::seed_from_u64(11);
        let result = choose_safe_move(Position::default(), 1.0, 5.0, &NoHazard, &mut rng);
        assert!(result.is_some());
    }

    #[test]
    fn test_deep_water_blocks_every_move() {
        let mut rng = SmallRng::seed_from_u64(11);
        let result = choose_safe_move(Position::default(), 1.0, 15.0, &Submerged, &mut rng);
        assert!(result.is_none());
    }
}
