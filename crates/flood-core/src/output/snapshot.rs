//! Snapshot Generation
//!
//! Builds the observable per-tick state from the world and writes it as JSON.

use bevy_ecs::prelude::*;
use std::fs;
use std::path::Path;

use flood_events::{generate_snapshot_id, IndividualSnapshot, PopulationCounts, TickSnapshot};

use super::{OutputError, RunMeta};
use crate::allocator::{HealthcarePool, ShelterPool};
use crate::components::{Condition, Decisions, Demographics, PersonId, SimClock, Town};
use crate::economy::{economy_snapshot, Treasury};

/// Resource to track snapshot generation
#[derive(Resource)]
pub struct SnapshotGenerator {
    next_snapshot_id: u64,
    snapshot_interval: u64,
    include_individuals: bool,
}

impl SnapshotGenerator {
    pub fn new(snapshot_interval: u64, include_individuals: bool) -> Self {
        Self {
            next_snapshot_id: 1,
            snapshot_interval,
            include_individuals,
        }
    }

    pub fn should_snapshot(&self, current_tick: u64) -> bool {
        current_tick == 0
            || (self.snapshot_interval > 0 && current_tick % self.snapshot_interval == 0)
    }

    pub fn next_id(&mut self) -> String {
        let id = generate_snapshot_id(self.next_snapshot_id);
        self.next_snapshot_id += 1;
        id
    }

    pub fn snapshot_count(&self) -> u64 {
        self.next_snapshot_id - 1
    }
}

/// Head counts over every individual ever spawned
pub fn population_counts(world: &mut World) -> PopulationCounts {
    let mut counts = PopulationCounts::default();
    let mut entities = Vec::new();

    let mut query = world.query::<(Entity, &Condition)>();
    for (entity, condition) in query.iter(world) {
        counts.total += 1;
        if !condition.alive {
            counts.dead += 1;
            continue;
        }
        counts.alive += 1;
        counts.stranded += usize::from(condition.stranded);
        counts.injured += usize::from(condition.injured);
        counts.evacuated += usize::from(condition.evacuated);
        entities.push(entity);
    }

    let shelter = world.resource::<ShelterPool>();
    let healthcare = world.resource::<HealthcarePool>();
    counts.sheltered = entities.iter().filter(|e| shelter.contains(**e)).count();
    counts.hospitalized = entities.iter().filter(|e| healthcare.contains(**e)).count();
    counts
}

fn collect_individuals(world: &mut World) -> (Vec<IndividualSnapshot>, f64) {
    let mut individuals = Vec::new();
    let mut household_income = 0.0;

    let mut query = world.query::<(Entity, &PersonId, &Demographics, &Decisions, &Condition)>();
    let shelter = world.resource::<ShelterPool>();
    let healthcare = world.resource::<HealthcarePool>();

    for (entity, id, person, decisions, condition) in query.iter(world) {
        if condition.alive && condition.on_map {
            household_income += person.income;
        }
        individuals.push(IndividualSnapshot {
            person_id: id.0,
            alive: condition.alive,
            evacuated: condition.evacuated,
            stranded: condition.stranded,
            injured: condition.injured,
            sheltered: shelter.contains(entity),
            hospitalized: healthcare.contains(entity),
            preflood_decision: decisions.preflood.as_ref().map(ToString::to_string),
            pre_during_decision: decisions.pre_during.as_ref().map(ToString::to_string),
            postflood_decision: decisions.postflood.as_ref().map(ToString::to_string),
            mitigation_implemented: decisions.mitigation_implemented,
            coping_implemented: decisions.coping_implemented,
            adaptation_planned: decisions.adaptation_planned,
            ses_1: person.ses_1,
            ses_2: person.ses_2,
        });
    }

    individuals.sort_by_key(|individual| individual.person_id);
    (individuals, household_income)
}

/// Generate a complete tick snapshot
pub fn generate_snapshot(world: &mut World, triggered_by: &str) -> TickSnapshot {
    let (snapshot_id, include_individuals) = match world.get_resource_mut::<SnapshotGenerator>() {
        Some(mut generator) => (generator.next_id(), generator.include_individuals),
        None => (generate_snapshot_id(0), true),
    };

    let population = population_counts(world);
    let (individuals, household_income) = collect_individuals(world);

    let run_id = world.resource::<RunMeta>().run_id;
    let timestamp = world.resource::<SimClock>().timestamp();
    let shelter = world.resource::<ShelterPool>().to_snapshot();
    let healthcare = world.resource::<HealthcarePool>().to_snapshot();
    let economy = economy_snapshot(
        world.resource::<Treasury>(),
        world.resource::<Town>(),
        household_income,
    );

    TickSnapshot {
        snapshot_id,
        run_id,
        timestamp,
        triggered_by: triggered_by.to_string(),
        population,
        shelter,
        healthcare,
        economy,
        individuals: if include_individuals {
            individuals
        } else {
            Vec::new()
        },
    }
}

/// Write snapshot to file
pub fn write_snapshot(snapshot: &TickSnapshot, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write snapshot into `<output>/snapshots/`, named by tick
pub fn write_snapshot_to_dir(
    snapshot: &TickSnapshot,
    output_dir: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let dir = output_dir.as_ref().join("snapshots");
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("snap_{:06}.json", snapshot.timestamp.tick));
    write_snapshot(snapshot, path)
}

/// Write current state (overwrites each time)
pub fn write_current_state(
    snapshot: &TickSnapshot,
    output_dir: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_snapshot(snapshot, output_dir.as_ref().join("current_state.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::Simulation;

    #[test]
    fn test_should_snapshot() {
        let generator = SnapshotGenerator::new(24, true);
        assert!(generator.should_snapshot(0));
        assert!(!generator.should_snapshot(5));
        assert!(generator.should_snapshot(48));

        let never = SnapshotGenerator::new(0, true);
        assert!(never.should_snapshot(0));
        assert!(!never.should_snapshot(24));
    }

    #[test]
    fn test_snapshot_reflects_population() {
        let mut config = Config::default();
        config.population.size = 30;
        let mut sim = Simulation::new(&config, 5).unwrap();

        let snapshot = sim.snapshot("test");
        assert_eq!(snapshot.snapshot_id, "snap_000001");
        assert_eq!(snapshot.population.total, 30);
        assert_eq!(snapshot.population.alive, 30);
        assert_eq!(snapshot.individuals.len(), 30);
        assert_eq!(snapshot.shelter.capacity, 1);
        assert_eq!(snapshot.healthcare.capacity, 2);
        assert!(snapshot.individuals.windows(2).all(|w| w[0].person_id < w[1].person_id));
    }

    #[test]
    fn test_write_snapshot_to_dir() {
        let mut config = Config::default();
        config.population.size = 10;
        let mut sim = Simulation::new(&config, 1).unwrap();
        let snapshot = sim.snapshot("test");

        let dir = tempfile::tempdir().unwrap();
        write_snapshot_to_dir(&snapshot, dir.path()).unwrap();
        write_current_state(&snapshot, dir.path()).unwrap();

        let written = fs::read_to_string(dir.path().join("snapshots/snap_000000.json")).unwrap();
        let parsed: TickSnapshot = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.population.total, 10);
        assert!(dir.path().join("current_state.json").exists());
    }
}
