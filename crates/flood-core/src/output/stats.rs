//! Statistics Output
//!
//! Accumulates per-tick counts, deaths and decision tallies into a run summary.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use flood_events::{
    DeathCause, LifecycleEvent, LifecycleEventKind, PoolSnapshot, PopulationCounts, RunId,
};

use super::OutputError;
use crate::decision::DecisionTag;

/// File name of the run summary inside the output directory
pub const SUMMARY_FILE: &str = "summary.json";

/// Population shares of each disaster state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateFractions {
    pub dead: f64,
    pub stranded: f64,
    pub injured: f64,
    pub sheltered: f64,
    pub hospitalized: f64,
    pub evacuated: f64,
}

impl StateFractions {
    pub fn from_counts(counts: &PopulationCounts) -> Self {
        Self {
            dead: counts.fraction(counts.dead),
            stranded: counts.fraction(counts.stranded),
            injured: counts.fraction(counts.injured),
            sheltered: counts.fraction(counts.sheltered),
            hospitalized: counts.fraction(counts.hospitalized),
            evacuated: counts.fraction(counts.evacuated),
        }
    }

    /// Component-wise maximum
    pub fn max(self, other: Self) -> Self {
        Self {
            dead: self.dead.max(other.dead),
            stranded: self.stranded.max(other.stranded),
            injured: self.injured.max(other.injured),
            sheltered: self.sheltered.max(other.sheltered),
            hospitalized: self.hospitalized.max(other.hospitalized),
            evacuated: self.evacuated.max(other.evacuated),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathCounts {
    pub stranded: usize,
    pub in_care: usize,
}

impl DeathCounts {
    pub fn total(&self) -> usize {
        self.stranded + self.in_care
    }
}

/// Positive and negative outcomes of one theory's decisions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionCount {
    pub taken: usize,
    pub declined: usize,
}

/// phase label -> theory label -> outcomes
pub type DecisionTally = BTreeMap<String, BTreeMap<String, DecisionCount>>;

/// Final statistics of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub seed: u64,
    pub total_ticks: u64,
    pub population: PopulationCounts,
    pub peak_fractions: StateFractions,
    pub final_fractions: StateFractions,
    pub deaths: DeathCounts,
    pub decisions: DecisionTally,
    pub events_by_type: BTreeMap<String, usize>,
    pub shelter_relative_wealth: f64,
    pub healthcare_relative_wealth: f64,
    pub government_relative_wealth: f64,
}

/// Resource to accumulate statistics during simulation
#[derive(Resource, Debug, Default)]
pub struct StatsCollector {
    pub ticks_recorded: u64,
    pub latest: PopulationCounts,
    pub peak: StateFractions,
    pub deaths: DeathCounts,
    pub decisions: DecisionTally,
    pub events_by_type: BTreeMap<String, usize>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state and output of one tick
    pub fn record_tick(
        &mut self,
        counts: &PopulationCounts,
        events: &[LifecycleEvent],
        decisions: &[DecisionTag],
    ) {
        self.ticks_recorded += 1;
        self.latest = *counts;
        self.peak = self.peak.max(StateFractions::from_counts(counts));

        for event in events {
            *self
                .events_by_type
                .entry(event.kind.name().to_string())
                .or_insert(0) += 1;
            if let LifecycleEventKind::Died { cause } = event.kind {
                match cause {
                    DeathCause::Stranded => self.deaths.stranded += 1,
                    DeathCause::InCare => self.deaths.in_care += 1,
                }
            }
        }

        for tag in decisions {
            let count = self
                .decisions
                .entry(tag.phase.tag_label().to_string())
                .or_default()
                .entry(tag.theory.label().to_string())
                .or_default();
            if tag.taken {
                count.taken += 1;
            } else {
                count.declined += 1;
            }
        }
    }

    /// Total decisions a theory made across all phases
    pub fn theory_total(&self, theory_label: &str) -> usize {
        self.decisions
            .values()
            .filter_map(|by_theory| by_theory.get(theory_label))
            .map(|count| count.taken + count.declined)
            .sum()
    }

    /// Generate final statistics
    pub fn generate_summary(
        &self,
        run_id: RunId,
        seed: u64,
        shelter: &PoolSnapshot,
        healthcare: &PoolSnapshot,
        government_relative_wealth: f64,
    ) -> RunSummary {
        RunSummary {
            run_id,
            seed,
            total_ticks: self.ticks_recorded,
            population: self.latest,
            peak_fractions: self.peak,
            final_fractions: StateFractions::from_counts(&self.latest),
            deaths: self.deaths,
            decisions: self.decisions.clone(),
            events_by_type: self.events_by_type.clone(),
            shelter_relative_wealth: shelter.relative_wealth(),
            healthcare_relative_wealth: healthcare.relative_wealth(),
            government_relative_wealth,
        }
    }
}

/// Write the run summary into the output directory
pub fn write_summary(summary: &RunSummary, output_dir: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(output_dir.join(SUMMARY_FILE), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{Action, Theory};
    use flood_events::{DisasterPhase, SimTimestamp};

    fn counts(total: usize, dead: usize, stranded: usize) -> PopulationCounts {
        PopulationCounts {
            total,
            alive: total - dead,
            dead,
            stranded,
            ..PopulationCounts::default()
        }
    }

    fn tag(theory: Theory, phase: DisasterPhase, taken: bool) -> DecisionTag {
        DecisionTag {
            theory,
            phase,
            action: Action::Evacuation,
            taken,
        }
    }

    #[test]
    fn test_stats_collector_new() {
        let collector = StatsCollector::new();
        assert_eq!(collector.ticks_recorded, 0);
        assert!(collector.decisions.is_empty());
    }

    #[test]
    fn test_peak_survives_recovery() {
        let mut collector = StatsCollector::new();
        collector.record_tick(&counts(10, 0, 5), &[], &[]);
        collector.record_tick(&counts(10, 1, 0), &[], &[]);

        assert_eq!(collector.peak.stranded, 0.5);
        assert_eq!(collector.peak.dead, 0.1);
        let fractions = StateFractions::from_counts(&collector.latest);
        assert_eq!(fractions.stranded, 0.0);
    }

    #[test]
    fn test_deaths_and_decisions_are_tallied() {
        let ts = SimTimestamp::new(200, DisasterPhase::DuringFlood);
        let events = vec![
            LifecycleEvent::new(
                "evt_00000001",
                ts,
                3,
                LifecycleEventKind::Died {
                    cause: DeathCause::Stranded,
                },
            ),
            LifecycleEvent::new(
                "evt_00000002",
                ts,
                4,
                LifecycleEventKind::Died {
                    cause: DeathCause::InCare,
                },
            ),
            LifecycleEvent::new("evt_00000003", ts, 5, LifecycleEventKind::Stranded),
        ];
        let decisions = vec![
            tag(Theory::Pmt, DisasterPhase::DuringFlood, true),
            tag(Theory::Pmt, DisasterPhase::DuringFlood, false),
            tag(Theory::Crt, DisasterPhase::PreFlood, true),
        ];

        let mut collector = StatsCollector::new();
        collector.record_tick(&counts(10, 2, 1), &events, &decisions);

        assert_eq!(collector.deaths.total(), 2);
        assert_eq!(collector.events_by_type.get("died"), Some(&2));
        let during = &collector.decisions["duringflood"]["PMT"];
        assert_eq!(during.taken, 1);
        assert_eq!(during.declined, 1);
        assert_eq!(collector.theory_total("PMT"), 2);
        assert_eq!(collector.theory_total("CRT"), 1);
        assert_eq!(collector.theory_total("SCT"), 0);
    }

    #[test]
    fn test_write_summary() {
        let mut collector = StatsCollector::new();
        collector.record_tick(&counts(4, 1, 0), &[], &[]);
        let pool = PoolSnapshot {
            occupancy: 0,
            capacity: 1,
            wealth: 50.0,
            initial_wealth: 100.0,
        };
        let summary =
            collector.generate_summary(RunId::from_random_bytes([1; 16]), 9, &pool, &pool, 0.0);
        assert_eq!(summary.shelter_relative_wealth, -0.5);

        let dir = tempfile::tempdir().unwrap();
        write_summary(&summary, dir.path()).unwrap();
        let written = fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        let parsed: RunSummary = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.seed, 9);
        assert_eq!(parsed.population.dead, 1);
    }
}
