//! Random draws shared by the decision engine and the lifecycle.
//!
//! `gauss` accepts a negative standard deviation (the draw is simply
//! `mean + std * z`), which the motivation thresholds rely on when a
//! motivation turns negative.

use std::f64::consts::TAU;

use rand::rngs::SmallRng;
use rand::Rng;

use flood_events::DisasterPhase;

/// Uniform draw on `[low, high)`; `low == high` returns `low`.
pub fn uniform(rng: &mut SmallRng, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.gen::<f64>()
}

/// Normal draw with the given mean and (possibly negative) deviation,
/// via the Box-Muller transform.
pub fn gauss(rng: &mut SmallRng, mean: f64, std_dev: f64) -> f64 {
    let u1 = rng.gen::<f64>().max(f64::EPSILON);
    let u2 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
    mean + std_dev * z
}

/// Per-phase range of the threshold scaling factor
pub fn scaling_range(phase: DisasterPhase) -> (f64, f64) {
    match phase {
        DisasterPhase::DuringFlood => (0.01, 1.0),
        DisasterPhase::PostFlood => (0.7, 2.0),
        DisasterPhase::PreFlood | DisasterPhase::Baseline => (0.2, 10.0),
    }
}

/// Fresh scaling factor for the phase
pub fn scaling_factor(rng: &mut SmallRng, phase: DisasterPhase) -> f64 {
    let (low, high) = scaling_range(phase);
    uniform(rng, low, high)
}

/// Threshold drawn around a motivation: mean `m * s1`, deviation `m / s2`,
/// with independent scaling factors for mean and deviation.
pub fn scaled_threshold(rng: &mut SmallRng, motivation: f64, phase: DisasterPhase) -> f64 {
    let mean = motivation * scaling_factor(rng, phase);
    let std_dev = motivation / scaling_factor(rng, phase);
    gauss(rng, mean, std_dev)
}
