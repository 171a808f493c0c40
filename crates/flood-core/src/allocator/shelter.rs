//! Shelter pool and its hourly upkeep

use bevy_ecs::prelude::*;
use flood_events::LifecycleEventKind;
use std::ops::{Deref, DerefMut};

use super::{request_healthcare, CarePool, HealthcarePool, RescuePolicy};
use crate::components::{Affiliations, Condition, PersonId, SimClock, Town};
use crate::decision::sampling::uniform;
use crate::events::TickEvents;
use crate::space::Position;
use crate::SimRng;

/// Shelter occupancy and funds
#[derive(Resource, Debug, Clone)]
pub struct ShelterPool(pub CarePool);

impl ShelterPool {
    pub fn new(capacity: usize, wealth: f64) -> Self {
        Self(CarePool::new(capacity, wealth))
    }
}

impl Deref for ShelterPool {
    type Target = CarePool;

    fn deref(&self) -> &CarePool {
        &self.0
    }
}

impl DerefMut for ShelterPool {
    fn deref_mut(&mut self) -> &mut CarePool {
        &mut self.0
    }
}

/// System: charge for sheltered people, forward the injured to healthcare
/// and send people home once their house is dry.
#[allow(clippy::too_many_arguments)]
pub fn shelter_upkeep(
    clock: Res<SimClock>,
    policy: Res<RescuePolicy>,
    mut rng: ResMut<SimRng>,
    mut shelter: ResMut<ShelterPool>,
    mut healthcare: ResMut<HealthcarePool>,
    mut town: ResMut<Town>,
    mut events: ResMut<TickEvents>,
    mut people: Query<(&PersonId, &mut Condition, &Affiliations, &mut Position)>,
) {
    if !clock.timeline.care_active(clock.hour) {
        return;
    }
    let rng = &mut rng.0;
    let timestamp = clock.timestamp();

    let cost = uniform(rng, 0.0, 50.0) * shelter.len() as f64;
    shelter.charge(cost);
    if let Some(business) = town.random_business(rng) {
        if business.flooded {
            business.wealth -= cost * uniform(rng, 1.0, 20.0);
        } else {
            business.wealth += cost * uniform(rng, 0.0, 0.1);
        }
    }

    let hospital = town.hospital_site;
    for entity in shelter.snapshot() {
        let Ok((id, mut condition, _, mut position)) = people.get_mut(entity) else {
            continue;
        };
        condition.time_in_shelter += 1;
        if !condition.injured {
            continue;
        }
        if healthcare.has_room()
            && request_healthcare(&mut shelter, &mut healthcare, &policy, entity, &mut condition)
        {
            if let Some(site) = hospital {
                position.move_to(site.random_point(rng));
            }
            events.record(timestamp, *id, LifecycleEventKind::Hospitalized);
        } else {
            // Still waiting for a bed
            condition.time_injured += 1;
        }
    }

    for entity in shelter.snapshot() {
        let Ok((id, mut condition, affiliations, _)) = people.get_mut(entity) else {
            continue;
        };
        if condition.time_in_shelter >= policy.shelter_stay_hours
            && !town.is_flooded(affiliations.household)
        {
            shelter.discharge(entity);
            condition.time_in_shelter = 0;
            events.record(timestamp, *id, LifecycleEventKind::ReleasedFromShelter);
        }
    }
}
