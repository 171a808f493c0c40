//! Simulation clock and disaster timeline

use bevy_ecs::prelude::*;
use flood_events::{DisasterPhase, SimTimestamp, HOURS_PER_DAY};
use serde::{Deserialize, Serialize};

use crate::config::PhaseConfig;

/// Hour boundaries of the disaster phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisasterTimeline {
    /// First hour of the evacuation window
    pub evacuation_start: u64,
    /// Last hour of the evacuation window; the flood begins after it
    pub evacuation_end: u64,
    /// First post-flood hour
    pub flood_end: u64,
    /// Hour at which the run stops
    pub total_hours: u64,
    pub flood_days: u64,
}

impl DisasterTimeline {
    pub fn from_config(phases: &PhaseConfig) -> Self {
        let start_day = phases
            .pre_flood_days
            .saturating_sub(phases.evacuation_window_days);
        Self {
            evacuation_start: start_day * HOURS_PER_DAY,
            evacuation_end: phases.pre_flood_days * HOURS_PER_DAY,
            flood_end: (phases.pre_flood_days + phases.flood_days) * HOURS_PER_DAY,
            total_hours: (phases.pre_flood_days + phases.flood_days + phases.post_flood_days)
                * HOURS_PER_DAY,
            flood_days: phases.flood_days,
        }
    }

    pub fn phase_at(&self, hour: u64) -> DisasterPhase {
        if hour >= self.flood_end {
            DisasterPhase::PostFlood
        } else if hour > self.evacuation_end {
            DisasterPhase::DuringFlood
        } else if hour >= self.evacuation_start {
            DisasterPhase::PreFlood
        } else {
            DisasterPhase::Baseline
        }
    }

    /// Care facilities only operate once the evacuation window has closed
    pub fn care_active(&self, hour: u64) -> bool {
        hour > self.evacuation_end
    }
}

/// Current simulated hour
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    pub hour: u64,
    pub timeline: DisasterTimeline,
}

impl SimClock {
    pub fn new(timeline: DisasterTimeline) -> Self {
        Self { hour: 0, timeline }
    }

    pub fn phase(&self) -> DisasterPhase {
        self.timeline.phase_at(self.hour)
    }

    pub fn timestamp(&self) -> SimTimestamp {
        SimTimestamp::new(self.hour, self.phase())
    }

    pub fn hour_of_day(&self) -> u64 {
        self.hour % HOURS_PER_DAY
    }

    pub fn advance(&mut self) {
        self.hour += 1;
    }

    pub fn finished(&self) -> bool {
        self.hour >= self.timeline.total_hours
    }
}
