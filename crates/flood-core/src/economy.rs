//! Economy side-model
//!
//! Building flood status, school spending, business taxes and government
//! grants. Shelter and healthcare spending lives with the care pools.

use bevy_ecs::prelude::*;
use flood_events::EconomySnapshot;

use crate::allocator::{HealthcarePool, ShelterPool};
use crate::components::{BuildingKind, SimClock, Town};
use crate::config::{FundingConfig, TaxSchedule};
use crate::decision::sampling::uniform;
use crate::space::Hazard;
use crate::SimRng;

/// Government funds and the funding bases its grants are drawn from
#[derive(Resource, Debug, Clone)]
pub struct Treasury {
    pub wealth: f64,
    pub initial_wealth: f64,
    pub shelter_base: f64,
    pub healthcare_base: f64,
    pub school_base: f64,
    pub business_base: f64,
    pub tax_schedule: TaxSchedule,
}

impl Treasury {
    pub fn from_funding(funding: &FundingConfig, population: usize, tax_schedule: TaxSchedule) -> Self {
        let wealth = funding.pool(funding.government_per_capita, population);
        Self {
            wealth,
            initial_wealth: wealth,
            shelter_base: funding.pool(funding.shelter_per_capita, population),
            healthcare_base: funding.pool(funding.healthcare_per_capita, population),
            school_base: funding.pool(funding.school_per_capita, population),
            business_base: funding.pool(funding.business_per_capita, population),
            tax_schedule,
        }
    }

    pub fn taxes_due(&self, hour: u64) -> bool {
        self.tax_schedule.is_due(hour)
    }

    pub fn deposit(&mut self, amount: f64) {
        self.wealth += amount;
    }
}

/// System: move the flood layers forward to the current hour
pub fn advance_hazard(clock: Res<SimClock>, mut hazard: ResMut<Hazard>) {
    hazard.0.advance(clock.hour);
}

/// System: flag buildings whose site is deeper than their resilience
pub fn update_flood_status(hazard: Res<Hazard>, mut rng: ResMut<SimRng>, mut town: ResMut<Town>) {
    let rng = &mut rng.0;
    for building in town.buildings_mut() {
        building.update_flood_status(&*hazard.0, rng);
    }
}

/// System: schools spend per student at a random business
pub fn school_upkeep(mut rng: ResMut<SimRng>, mut town: ResMut<Town>) {
    let rng = &mut rng.0;
    for id in town.ids_of(BuildingKind::School) {
        let rate = uniform(rng, 0.001, 0.01);
        let Some(school) = town.get_mut(id) else {
            continue;
        };
        let cost = school.wealth * rate * school.members as f64;
        school.wealth -= cost;
        if let Some(business) = town.random_business(rng) {
            business.wealth += cost;
        }
    }
}

/// System: on tax day businesses pay the government, which then tops up
/// shelter, healthcare and schools.
pub fn government_finances(
    clock: Res<SimClock>,
    mut rng: ResMut<SimRng>,
    mut treasury: ResMut<Treasury>,
    mut town: ResMut<Town>,
    mut shelter: ResMut<ShelterPool>,
    mut healthcare: ResMut<HealthcarePool>,
) {
    if !treasury.taxes_due(clock.hour) {
        return;
    }
    let rng = &mut rng.0;

    let mut collected = 0.0;
    for building in town
        .buildings_mut()
        .iter_mut()
        .filter(|b| b.kind == BuildingKind::Business)
    {
        let tax = building.wealth * uniform(rng, 0.0, 0.05);
        building.wealth -= tax;
        collected += tax;
    }
    treasury.deposit(collected);

    let to_shelter = uniform(rng, 0.01, 0.2) * treasury.shelter_base;
    let to_healthcare = uniform(rng, 0.01, 0.2) * treasury.healthcare_base;
    let to_schools = uniform(rng, 0.01, 0.2) * treasury.school_base;

    shelter.credit(to_shelter);
    healthcare.credit(to_healthcare);
    treasury.wealth -= to_shelter + to_healthcare;

    let schools = town.ids_of(BuildingKind::School);
    if !schools.is_empty() {
        let share = to_schools / schools.len() as f64;
        for id in schools {
            if let Some(school) = town.get_mut(id) {
                school.wealth += share;
                treasury.wealth -= share;
            }
        }
    }

    tracing::info!(
        hour = clock.hour,
        business_tax = collected,
        government_wealth = treasury.wealth,
        "Tax day"
    );
}

/// Economy totals for snapshots
pub fn economy_snapshot(treasury: &Treasury, town: &Town, household_income: f64) -> EconomySnapshot {
    EconomySnapshot {
        government_wealth: treasury.wealth,
        business_wealth: town.total_wealth(BuildingKind::Business),
        school_wealth: town.total_wealth(BuildingKind::School),
        household_income,
        houses_flooded: town.flooded_count(BuildingKind::House),
        businesses_flooded: town.flooded_count(BuildingKind::Business),
        schools_flooded: town.flooded_count(BuildingKind::School),
    }
}
