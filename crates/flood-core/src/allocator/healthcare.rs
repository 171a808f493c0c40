//! Healthcare pool, patient billing and continued care

use bevy_ecs::prelude::*;
use flood_events::{DeathCause, LifecycleEventKind};
use std::ops::{Deref, DerefMut};

use super::{CarePool, RescuePolicy};
use crate::components::{Condition, Decisions, Demographics, PersonId, SimClock, Town};
use crate::decision::sampling::{gauss, uniform};
use crate::events::TickEvents;
use crate::SimRng;

/// Hospital occupancy and funds
#[derive(Resource, Debug, Clone)]
pub struct HealthcarePool(pub CarePool);

impl HealthcarePool {
    pub fn new(capacity: usize, wealth: f64) -> Self {
        Self(CarePool::new(capacity, wealth))
    }
}

impl Deref for HealthcarePool {
    type Target = CarePool;

    fn deref(&self) -> &CarePool {
        &self.0
    }
}

impl DerefMut for HealthcarePool {
    fn deref_mut(&mut self) -> &mut CarePool {
        &mut self.0
    }
}

/// Outcome of one hour of care for a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareOutcome {
    Recovered,
    StillInjured,
    Died,
}

/// Evaluate one patient. Patients at or below the recovery threshold leave
/// healed; the rest accrue injured hours until survivability runs out.
pub fn continued_care(condition: &mut Condition, threshold: f64) -> CareOutcome {
    if condition.recovery_rate <= threshold {
        condition.injured = false;
        condition.time_injured = 0;
        return CareOutcome::Recovered;
    }
    condition.time_injured += 1;
    if condition.time_injured >= condition.survivability_duration {
        condition.kill();
        CareOutcome::Died
    } else {
        CareOutcome::StillInjured
    }
}

/// System: bill every patient, then run continued care.
#[allow(clippy::too_many_arguments)]
pub fn healthcare_upkeep(
    clock: Res<SimClock>,
    policy: Res<RescuePolicy>,
    mut rng: ResMut<SimRng>,
    mut healthcare: ResMut<HealthcarePool>,
    mut town: ResMut<Town>,
    mut events: ResMut<TickEvents>,
    mut patients: Query<(&PersonId, &mut Condition, &mut Demographics, &mut Decisions)>,
) {
    if !clock.timeline.care_active(clock.hour) {
        return;
    }
    let rng = &mut rng.0;
    let timestamp = clock.timestamp();

    for entity in healthcare.snapshot() {
        let Ok((_, _, mut demographics, _)) = patients.get_mut(entity) else {
            continue;
        };
        let cost = uniform(rng, 0.0, 100.0);
        demographics.income -= cost;
        healthcare.charge(cost * uniform(rng, 0.0, 0.3));

        if let Some(business) = town.random_business(rng) {
            if business.flooded {
                business.wealth -= cost * gauss(rng, 10.0, 3.0);
            } else {
                business.wealth += cost * uniform(rng, 0.0, 0.1);
            }
        }
    }

    for entity in healthcare.snapshot() {
        let Ok((id, mut condition, _, mut decisions)) = patients.get_mut(entity) else {
            continue;
        };
        match continued_care(&mut condition, policy.recovery_threshold) {
            CareOutcome::Recovered => {
                healthcare.discharge(entity);
                events.record(timestamp, *id, LifecycleEventKind::Recovered);
            }
            CareOutcome::Died => {
                healthcare.discharge(entity);
                decisions.mitigation_implemented = false;
                decisions.adaptation_planned = false;
                decisions.coping_implemented = false;
                events.record(
                    timestamp,
                    *id,
                    LifecycleEventKind::Died {
                        cause: DeathCause::InCare,
                    },
                );
            }
            CareOutcome::StillInjured => {}
        }
    }
}
