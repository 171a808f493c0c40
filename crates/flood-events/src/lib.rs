//! Shared event and snapshot types for the flood behavior simulation.
//!
//! This crate contains pure data structures with no simulation logic. It is
//! the read-only surface handed to data collectors, plotting and reporting.

pub mod event;
pub mod snapshot;
pub mod timestamp;

// Re-export timestamp types
pub use timestamp::{DisasterPhase, ParsePhaseError, SimTimestamp, HOURS_PER_DAY};

// Re-export event types
pub use event::{DeathCause, LifecycleEvent, LifecycleEventKind};

// Re-export snapshot types
pub use snapshot::{
    generate_snapshot_id, EconomySnapshot, IndividualSnapshot, PoolSnapshot, PopulationCounts,
    RunId, TickSnapshot,
};
