//! Individual Lifecycle State Machine
//!
//! Routine movement, stranding, injury and death, plus the phase-gated calls
//! into the decision engine and the care pools.

pub mod routine;
pub mod step;
pub mod survival;

pub use routine::{hourly_wage, Activity};
pub use step::{step_individual, step_individuals, PersonMut, TickContext};
pub use survival::stranded_behavior;
