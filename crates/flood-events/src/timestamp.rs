//! Simulation Timestamp Types
//!
//! One tick is one simulated hour. The disaster phase is derived from the
//! hour by the core's timeline and carried here so outputs are self-describing.
//!
//! # Example
//!
//! ```
//! use flood_events::{DisasterPhase, SimTimestamp};
//!
//! let ts = SimTimestamp::new(53, DisasterPhase::PreFlood);
//! assert_eq!(ts.day, 2);
//! assert_eq!(ts.hour_of_day, 5);
//! assert_eq!(ts.to_string(), "day_2.hour_05");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of ticks (hours) per simulated day.
pub const HOURS_PER_DAY: u64 = 24;

/// Stage of the flood disaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisasterPhase {
    /// Ordinary life before the evacuation window opens
    #[default]
    Baseline,
    /// Evacuation window ahead of the flood
    PreFlood,
    /// Flood layers active
    DuringFlood,
    /// Recovery after the flood window
    PostFlood,
}

impl DisasterPhase {
    /// Short label used inside decision provenance tags.
    pub fn tag_label(self) -> &'static str {
        match self {
            DisasterPhase::Baseline => "baseline",
            DisasterPhase::PreFlood => "preflood",
            DisasterPhase::DuringFlood => "duringflood",
            DisasterPhase::PostFlood => "postflood",
        }
    }

    /// True once the flood has begun (during or after).
    pub fn flood_started(self) -> bool {
        matches!(self, DisasterPhase::DuringFlood | DisasterPhase::PostFlood)
    }
}

impl fmt::Display for DisasterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisasterPhase::Baseline => write!(f, "baseline"),
            DisasterPhase::PreFlood => write!(f, "pre_flood"),
            DisasterPhase::DuringFlood => write!(f, "during_flood"),
            DisasterPhase::PostFlood => write!(f, "post_flood"),
        }
    }
}

/// Error type for parsing a phase name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsePhaseError(pub String);

impl fmt::Display for ParsePhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid disaster phase: '{}'", self.0)
    }
}

impl std::error::Error for ParsePhaseError {}

impl FromStr for DisasterPhase {
    type Err = ParsePhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" => Ok(DisasterPhase::Baseline),
            "pre_flood" | "preflood" => Ok(DisasterPhase::PreFlood),
            "during_flood" | "duringflood" => Ok(DisasterPhase::DuringFlood),
            "post_flood" | "postflood" => Ok(DisasterPhase::PostFlood),
            _ => Err(ParsePhaseError(s.to_string())),
        }
    }
}

/// A point in simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTimestamp {
    /// Absolute hour since the start of the run
    pub tick: u64,
    /// Zero-based day index
    pub day: u64,
    /// Hour within the day (0-23)
    pub hour_of_day: u8,
    pub phase: DisasterPhase,
}

impl SimTimestamp {
    pub fn new(tick: u64, phase: DisasterPhase) -> Self {
        Self {
            tick,
            day: tick / HOURS_PER_DAY,
            hour_of_day: (tick % HOURS_PER_DAY) as u8,
            phase,
        }
    }
}

impl fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day_{}.hour_{:02}", self.day, self.hour_of_day)
    }
}
