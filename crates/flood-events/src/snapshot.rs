//! Snapshot Types
//!
//! Serialization structs for the per-tick observable state of a run.
//!
//! Snapshots are read-only copies: collectors can store, plot or diff them
//! but nothing flows back into the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::SimTimestamp;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Identifier of one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Builds a run id from random bytes (drawn from the seeded RNG so runs
    /// with the same seed share an id).
    pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Disaster-state flags and decision provenance of one individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualSnapshot {
    pub person_id: u32,
    pub alive: bool,
    pub evacuated: bool,
    pub stranded: bool,
    pub injured: bool,
    pub sheltered: bool,
    pub hospitalized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preflood_decision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_during_decision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postflood_decision: Option<String>,
    pub mitigation_implemented: bool,
    pub coping_implemented: bool,
    pub adaptation_planned: bool,
    pub ses_1: f64,
    pub ses_2: f64,
}

/// Occupancy and balance of a care pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub occupancy: usize,
    pub capacity: usize,
    pub wealth: f64,
    pub initial_wealth: f64,
}

impl PoolSnapshot {
    /// Wealth relative to initial funding (`wealth / initial - 1`).
    pub fn relative_wealth(&self) -> f64 {
        if self.initial_wealth == 0.0 {
            0.0
        } else {
            self.wealth / self.initial_wealth - 1.0
        }
    }
}

/// Head counts across the whole (ever-created) population
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub total: usize,
    pub alive: usize,
    pub dead: usize,
    pub stranded: usize,
    pub injured: usize,
    pub sheltered: usize,
    pub hospitalized: usize,
    pub evacuated: usize,
}

impl PopulationCounts {
    /// Share of the population for a count, 0 for an empty population.
    pub fn fraction(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }
}

/// Wealth totals of the economic side-model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    pub government_wealth: f64,
    pub business_wealth: f64,
    pub school_wealth: f64,
    /// Income held by individuals currently on the map
    pub household_income: f64,
    pub houses_flooded: usize,
    pub businesses_flooded: usize,
    pub schools_flooded: usize,
}

/// Complete observable state at one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub snapshot_id: String,
    pub run_id: RunId,
    pub timestamp: SimTimestamp,
    pub triggered_by: String,
    pub population: PopulationCounts,
    pub shelter: PoolSnapshot,
    pub healthcare: PoolSnapshot,
    pub economy: EconomySnapshot,
    #[serde(default)]
    pub individuals: Vec<IndividualSnapshot>,
}
