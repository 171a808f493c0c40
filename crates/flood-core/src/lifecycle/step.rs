//! Per-individual hourly step and the system that drives it

use bevy_ecs::prelude::*;
use flood_events::{DisasterPhase, LifecycleEventKind};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::routine::{routine_activity, wander};
use crate::allocator::{request_healthcare, HealthcarePool, RescuePolicy, ShelterPool};
use crate::components::{
    Affiliations, Condition, Decisions, Demographics, PersonId, Psyche, SimClock, Town,
};
use crate::decision::{self, sampling, Action, DecisionTag};
use crate::economy::Treasury;
use crate::events::TickEvents;
use crate::space::{Hazard, HazardQuery, Position};
use crate::SimRng;

/// Pre-flood deliberation happens when a fresh `gauss(0.5, 1/6)` falls below this
const PRE_FLOOD_GATE: f64 = 0.25;

/// Chance per post-flood hour that an evacuee returns
const RETURN_CHANCE: f64 = 0.5;

/// Chance per post-flood hour that a sheltered individual is sent home
const POST_FLOOD_RELEASE_CHANCE: f64 = 0.7;

/// Upper bound of the evacuation trip cost
const MAX_EVACUATION_COST: f64 = 1_500.0;

/// Shared state borrowed for the individual pass
pub struct TickContext<'a> {
    pub rng: &'a mut SmallRng,
    pub clock: &'a SimClock,
    pub hazard: &'a dyn HazardQuery,
    pub town: &'a mut Town,
    pub shelter: &'a mut ShelterPool,
    pub healthcare: &'a mut HealthcarePool,
    pub treasury: &'a mut Treasury,
    pub policy: &'a RescuePolicy,
    pub events: &'a mut TickEvents,
}

/// Mutable view of one individual's components
pub struct PersonMut<'a> {
    pub entity: Entity,
    pub id: PersonId,
    pub demographics: &'a mut Demographics,
    pub psyche: &'a mut Psyche,
    pub decisions: &'a mut Decisions,
    pub condition: &'a mut Condition,
    pub position: &'a mut Position,
    pub affiliations: &'a Affiliations,
}

impl PersonMut<'_> {
    /// Not evacuated and not in either care pool
    pub fn is_circulating(&self, ctx: &TickContext) -> bool {
        !self.condition.evacuated
            && !ctx.shelter.contains(self.entity)
            && !ctx.healthcare.contains(self.entity)
    }
}

/// Advance one individual by one hour.
pub fn step_individual(ctx: &mut TickContext, person: &mut PersonMut) {
    if !person.condition.alive {
        person.decisions.clear_tags();
        person.decisions.coping_implemented = false;
        person.decisions.mitigation_implemented = false;
        return;
    }

    if person.is_circulating(ctx) {
        if person.condition.stranded {
            wander(ctx, person);
        } else {
            routine_activity(ctx, person);
        }
        if !person.condition.alive {
            return;
        }
    }

    if ctx.treasury.taxes_due(ctx.clock.hour) {
        pay_taxes(ctx, person);
    }

    match ctx.clock.phase() {
        DisasterPhase::Baseline => {}
        DisasterPhase::PreFlood => {
            if !person.condition.evacuated
                && sampling::gauss(ctx.rng, 0.5, 0.5 / 3.0) < PRE_FLOOD_GATE
            {
                deliberate(ctx, person);
            }
        }
        DisasterPhase::DuringFlood => {
            person.decisions.mitigation_implemented = false;
            person.decisions.preflood = None;
            if !person.condition.evacuated {
                deliberate(ctx, person);
            }
        }
        DisasterPhase::PostFlood => post_flood(ctx, person),
    }
}

fn post_flood(ctx: &mut TickContext, person: &mut PersonMut) {
    let timestamp = ctx.clock.timestamp();
    person.decisions.coping_implemented = false;
    person.decisions.pre_during = None;
    person.condition.stranded = false;

    deliberate(ctx, person);

    if person.condition.evacuated && ctx.rng.gen::<f64>() < RETURN_CHANCE {
        return_home(ctx, person);
    }

    if ctx.shelter.contains(person.entity) && ctx.rng.gen::<f64>() < POST_FLOOD_RELEASE_CHANCE {
        ctx.shelter.discharge(person.entity);
        person.condition.time_in_shelter = 0;
        ctx.events
            .record(timestamp, person.id, LifecycleEventKind::ReleasedFromShelter);
    }

    if person.condition.injured
        && !ctx.healthcare.contains(person.entity)
        && request_healthcare(
            ctx.shelter,
            ctx.healthcare,
            ctx.policy,
            person.entity,
            person.condition,
        )
    {
        if let Some(site) = ctx.town.hospital_site {
            person.position.move_to(site.random_point(ctx.rng));
        }
        ctx.events
            .record(timestamp, person.id, LifecycleEventKind::Hospitalized);
    }
}

/// Run the decision engine and apply evacuation side effects
fn deliberate(ctx: &mut TickContext, person: &mut PersonMut) -> Option<DecisionTag> {
    let tag = decision::step(
        person.demographics,
        person.psyche,
        person.decisions,
        ctx.clock.phase(),
        ctx.rng,
    )?;
    ctx.events.record_decision(tag);

    if tag.action == Action::Evacuation {
        if tag.taken {
            evacuate(ctx, person, tag);
        } else {
            person.condition.evacuated = false;
        }
    }
    Some(tag)
}

/// Leave the study area, paying for the trip.
fn evacuate(ctx: &mut TickContext, person: &mut PersonMut, tag: DecisionTag) {
    let condition = &mut *person.condition;
    condition.evacuated = true;
    condition.on_map = false;
    condition.stranded = false;
    condition.time_stranded = 0;
    if ctx.shelter.discharge(person.entity) {
        condition.time_in_shelter = 0;
    }
    ctx.healthcare.discharge(person.entity);

    let cost = sampling::uniform(ctx.rng, 0.0, MAX_EVACUATION_COST);
    person.demographics.income -= cost;
    if let Some(business) = ctx.town.random_business(ctx.rng) {
        business.wealth += cost / 3.0;
    }

    ctx.events.record(
        ctx.clock.timestamp(),
        person.id,
        LifecycleEventKind::Evacuated {
            decision: tag.to_string(),
            cost,
        },
    );
}

/// Come back to circulation at home
fn return_home(ctx: &mut TickContext, person: &mut PersonMut) {
    person.condition.evacuated = false;
    person.condition.on_map = true;
    if let Some(home) = ctx.town.get(person.affiliations.household) {
        person.position.move_to(home.random_point(ctx.rng));
    }
    ctx.events
        .record(ctx.clock.timestamp(), person.id, LifecycleEventKind::Returned);
}

fn pay_taxes(ctx: &mut TickContext, person: &mut PersonMut) {
    let amount = person.demographics.income * sampling::uniform(ctx.rng, 0.0, 0.07);
    person.demographics.income -= amount;
    ctx.treasury.deposit(amount);
    ctx.events.record(
        ctx.clock.timestamp(),
        person.id,
        LifecycleEventKind::TaxPaid { amount },
    );
}

/// System: step every individual once, in a seeded random order.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn step_individuals(
    clock: Res<SimClock>,
    policy: Res<RescuePolicy>,
    hazard: Res<Hazard>,
    mut rng: ResMut<SimRng>,
    mut town: ResMut<Town>,
    mut shelter: ResMut<ShelterPool>,
    mut healthcare: ResMut<HealthcarePool>,
    mut treasury: ResMut<Treasury>,
    mut events: ResMut<TickEvents>,
    mut people: Query<(
        Entity,
        &PersonId,
        &mut Demographics,
        &mut Psyche,
        &mut Decisions,
        &mut Condition,
        &mut Position,
        &Affiliations,
    )>,
) {
    let mut order: Vec<(PersonId, Entity)> =
        people.iter().map(|(entity, id, ..)| (*id, entity)).collect();
    order.sort_unstable_by_key(|(id, _)| *id);
    order.shuffle(&mut rng.0);

    let mut ctx = TickContext {
        rng: &mut rng.0,
        clock: &*clock,
        hazard: &*hazard.0,
        town: &mut *town,
        shelter: &mut *shelter,
        healthcare: &mut *healthcare,
        treasury: &mut *treasury,
        policy: &*policy,
        events: &mut *events,
    };

    for (_, entity) in order {
        let Ok((
            entity,
            id,
            mut demographics,
            mut psyche,
            mut decisions,
            mut condition,
            mut position,
            affiliations,
        )) = people.get_mut(entity)
        else {
            continue;
        };
        let mut person = PersonMut {
            entity,
            id: *id,
            demographics: &mut *demographics,
            psyche: &mut *psyche,
            decisions: &mut *decisions,
            condition: &mut *condition,
            position: &mut *position,
            affiliations,
        };
        step_individual(&mut ctx, &mut person);
    }
}
