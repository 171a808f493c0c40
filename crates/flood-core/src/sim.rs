//! Simulation Assembly
//!
//! Builds the world from a configuration and seed, and drives the hourly
//! schedule: hazard, buildings, individuals, care pools, then the economy.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use flood_events::{RunId, TickSnapshot};

use crate::allocator::{healthcare_upkeep, shelter_upkeep, HealthcarePool, RescuePolicy, ShelterPool};
use crate::components::{DisasterTimeline, SimClock};
use crate::config::{Config, ConfigError};
use crate::economy::{advance_hazard, government_finances, school_upkeep, update_flood_status, Treasury};
use crate::events::{EventLogger, TickEvents};
use crate::lifecycle::step_individuals;
use crate::output::{
    generate_snapshot, population_counts, RunMeta, RunSummary, SnapshotGenerator, StatsCollector,
};
use crate::setup::{build_town, get_spawn_summary, spawn_population};
use crate::space::{FloodMap, Hazard, HazardQuery};
use crate::SimRng;

/// A seeded, fully assembled simulation run
pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Simulation {
    /// Build a run over the configured flood map.
    pub fn new(config: &Config, seed: u64) -> Result<Self, ConfigError> {
        let timeline = DisasterTimeline::from_config(&config.phases);
        let flood_map = FloodMap::from_config(&config.flood, &timeline);
        Self::with_hazard(config, seed, flood_map)
    }

    /// Build a run over an arbitrary hazard field.
    ///
    /// The configuration is validated first; an invalid one never produces a
    /// world.
    pub fn with_hazard(
        config: &Config,
        seed: u64,
        hazard: impl HazardQuery,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let run_id = RunId::from_random_bytes(rng.gen());
        let population = config.population.size;
        let funding = &config.funding;

        let mut world = World::new();
        let mut town = build_town(config, population, &mut rng);
        spawn_population(&mut world, &mut town, population, &mut rng);

        world.insert_resource(RunMeta { run_id, seed });
        world.insert_resource(SimClock::new(DisasterTimeline::from_config(&config.phases)));
        world.insert_resource(Hazard::new(hazard));
        world.insert_resource(town);
        world.insert_resource(ShelterPool::new(
            config.facilities.shelter_capacity(population),
            funding.pool(funding.shelter_per_capita, population),
        ));
        world.insert_resource(HealthcarePool::new(
            config.facilities.healthcare_capacity(population),
            funding.pool(funding.healthcare_per_capita, population),
        ));
        world.insert_resource(Treasury::from_funding(
            funding,
            population,
            config.economy.tax_schedule,
        ));
        world.insert_resource(RescuePolicy::from(&config.rescue));
        world.insert_resource(TickEvents::new());
        world.insert_resource(StatsCollector::new());
        world.insert_resource(SnapshotGenerator::new(
            config.simulation.snapshot_interval,
            config.simulation.snapshot_individuals,
        ));
        world.insert_resource(SimRng(rng));

        let summary = get_spawn_summary(&mut world);
        info!(
            %run_id,
            seed,
            individuals = summary.total,
            employed = summary.employed,
            students = summary.students,
            "simulation initialized"
        );

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(
            (
                advance_hazard,
                update_flood_status,
                step_individuals,
                shelter_upkeep,
                healthcare_upkeep,
                school_upkeep,
                government_finances,
            )
                .chain(),
        );

        Ok(Self { world, schedule })
    }

    /// Append every lifecycle event to a JSONL log from now on.
    pub fn set_event_logger(&mut self, logger: EventLogger) {
        self.world.insert_resource(logger);
    }

    /// Run one hour: the schedule, then bookkeeping, then the clock.
    pub fn step(&mut self) {
        self.schedule.run(&mut self.world);

        let (events, decisions) = {
            let mut tick_events = self.world.resource_mut::<TickEvents>();
            (tick_events.drain(), tick_events.drain_decisions())
        };
        let counts = population_counts(&mut self.world);
        self.world
            .resource_mut::<StatsCollector>()
            .record_tick(&counts, &events, &decisions);

        if let Some(mut logger) = self.world.get_resource_mut::<EventLogger>() {
            if let Err(e) = logger.log_batch(&events) {
                warn!("could not write lifecycle events: {}", e);
            }
        }

        let mut clock = self.world.resource_mut::<SimClock>();
        let before = clock.phase();
        clock.advance();
        let after = clock.phase();
        if before != after {
            info!(
                hour = clock.hour,
                alive = counts.alive,
                dead = counts.dead,
                "entering {:?}",
                after
            );
        }
    }

    /// Run a fixed number of hours.
    pub fn run(&mut self, hours: u64) {
        for _ in 0..hours {
            self.step();
        }
    }

    /// Run until the disaster timeline is over.
    pub fn run_to_end(&mut self) {
        while !self.world.resource::<SimClock>().finished() {
            self.step();
        }
    }

    pub fn hour(&self) -> u64 {
        self.world.resource::<SimClock>().hour
    }

    pub fn run_id(&self) -> RunId {
        self.world.resource::<RunMeta>().run_id
    }

    /// Whether a periodic snapshot is due at the current hour
    pub fn snapshot_due(&self) -> bool {
        let hour = self.hour();
        hour > 0 && self.world.resource::<SnapshotGenerator>().should_snapshot(hour)
    }

    pub fn snapshot(&mut self, triggered_by: &str) -> TickSnapshot {
        generate_snapshot(&mut self.world, triggered_by)
    }

    pub fn snapshot_count(&self) -> u64 {
        self.world.resource::<SnapshotGenerator>().snapshot_count()
    }

    /// Final statistics over the hours run so far
    pub fn summary(&self) -> RunSummary {
        let meta = self.world.resource::<RunMeta>();
        let treasury = self.world.resource::<Treasury>();
        let government_relative_wealth = if treasury.initial_wealth == 0.0 {
            0.0
        } else {
            treasury.wealth / treasury.initial_wealth - 1.0
        };
        self.world.resource::<StatsCollector>().generate_summary(
            meta.run_id,
            meta.seed,
            &self.world.resource::<ShelterPool>().to_snapshot(),
            &self.world.resource::<HealthcarePool>().to_snapshot(),
            government_relative_wealth,
        )
    }

    /// Flush the event log, if any.
    pub fn flush_events(&mut self) {
        if let Some(mut logger) = self.world.get_resource_mut::<EventLogger>() {
            if let Err(e) = logger.flush() {
                warn!("could not flush lifecycle events: {}", e);
            }
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::NoHazard;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.population.size = 40;
        config
    }

    #[test]
    fn test_step_advances_clock() {
        let mut sim = Simulation::with_hazard(&small_config(), 1, NoHazard).unwrap();
        sim.run(3);
        assert_eq!(sim.hour(), 3);
        assert_eq!(sim.world().resource::<StatsCollector>().ticks_recorded, 3);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = small_config();
        config.town.houses = 0;
        assert!(matches!(
            Simulation::with_hazard(&config, 1, NoHazard),
            Err(ConfigError::Invalid(_))
        ));
        config.town.houses = 20;
        config.phases.flood_days = 0;
        assert!(Simulation::new(&config, 1).is_err());
    }

    #[test]
    fn test_run_id_follows_seed() {
        let a = Simulation::with_hazard(&small_config(), 7, NoHazard).unwrap();
        let b = Simulation::with_hazard(&small_config(), 7, NoHazard).unwrap();
        let c = Simulation::with_hazard(&small_config(), 8, NoHazard).unwrap();
        assert_eq!(a.run_id(), b.run_id());
        assert_ne!(a.run_id(), c.run_id());
    }

    #[test]
    fn test_dry_baseline_has_no_deaths() {
        // Hours before the evacuation window are routine only
        let mut sim = Simulation::with_hazard(&small_config(), 3, NoHazard).unwrap();
        sim.run(24);
        let summary = sim.summary();
        assert_eq!(summary.deaths.total(), 0);
        assert_eq!(summary.population.alive, 40);
        assert!(summary.decisions.is_empty());
    }

    #[test]
    fn test_snapshot_due_on_interval() {
        let mut config = small_config();
        config.simulation.snapshot_interval = 5;
        let mut sim = Simulation::with_hazard(&config, 3, NoHazard).unwrap();
        assert!(!sim.snapshot_due());
        sim.run(5);
        assert!(sim.snapshot_due());
        sim.step();
        assert!(!sim.snapshot_due());
    }
}
