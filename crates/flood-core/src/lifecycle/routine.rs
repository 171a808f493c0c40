//! Daily routine: resting, working, school and wandering

use rand::rngs::SmallRng;

use super::step::{PersonMut, TickContext};
use super::survival::stranded_behavior;
use crate::components::{BuildingId, WealthClass};
use crate::decision::sampling::uniform;
use crate::space::choose_safe_move;

/// What an individual does at a given hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Rest,
    Work,
    School,
    Wander,
}

impl Activity {
    pub fn for_hour(hour_of_day: u64, employed: bool, student: bool) -> Self {
        match hour_of_day {
            0..=7 => Activity::Rest,
            8..=11 | 14..=17 => {
                if employed {
                    Activity::Work
                } else if student {
                    Activity::School
                } else {
                    Activity::Wander
                }
            }
            _ => Activity::Wander,
        }
    }
}

/// Hourly wage drawn from the tier's annual range
pub fn hourly_wage(class: WealthClass, rng: &mut SmallRng) -> f64 {
    let (low, high) = class.annual_income_range();
    uniform(rng, low, high) / (365.0 * 24.0)
}

/// Carry out the scheduled activity for the hour.
pub fn routine_activity(ctx: &mut TickContext, person: &mut PersonMut) {
    let hour_of_day = ctx.clock.hour_of_day();
    let activity = Activity::for_hour(
        hour_of_day,
        person.demographics.employed,
        person.demographics.student,
    );
    match activity {
        Activity::Rest => {
            let home = person.affiliations.household;
            if ctx.town.is_flooded(home) {
                wander(ctx, person);
            } else if hour_of_day == 0 {
                go_to(ctx, person, home);
            }
        }
        Activity::Work => match person.affiliations.workplace {
            Some(work) if !ctx.town.is_flooded(work) => {
                go_to(ctx, person, work);
                let wage = hourly_wage(person.demographics.wealth_class, ctx.rng);
                person.demographics.income += wage;
                if let Some(business) = ctx.town.get_mut(work) {
                    business.wealth -= wage;
                }
            }
            _ => wander(ctx, person),
        },
        Activity::School => match person.affiliations.school {
            Some(school) if !ctx.town.is_flooded(school) => go_to(ctx, person, school),
            _ => wander(ctx, person),
        },
        Activity::Wander => wander(ctx, person),
    }
}

fn go_to(ctx: &mut TickContext, person: &mut PersonMut, building: BuildingId) {
    if let Some(target) = ctx.town.get(building).map(|b| b.random_point(ctx.rng)) {
        person.position.move_to(target);
    }
}

/// Random walk that avoids water deeper than the walker's resilience.
/// With no safe move the individual is stranded where they stand.
pub fn wander(ctx: &mut TickContext, person: &mut PersonMut) {
    let destination = choose_safe_move(
        *person.position,
        person.demographics.mobility,
        person.demographics.resilience,
        ctx.hazard,
        ctx.rng,
    );
    let Some(destination) = destination else {
        stranded_behavior(ctx, person);
        return;
    };

    person.condition.stranded = false;
    person.condition.time_stranded = 0;
    person.position.move_to(destination);

    if let Some(business) = ctx.town.business_at(destination) {
        let cost = hourly_wage(person.demographics.wealth_class, ctx.rng) * uniform(ctx.rng, 0.5, 1.5);
        if business.flooded {
            business.wealth -= cost * uniform(ctx.rng, 10.0, 40.0);
        } else {
            person.demographics.income -= cost;
            business.wealth += cost * uniform(ctx.rng, 1.0, 5.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_schedule() {
        assert_eq!(Activity::for_hour(3, true, false), Activity::Rest);
        assert_eq!(Activity::for_hour(9, true, false), Activity::Work);
        assert_eq!(Activity::for_hour(9, false, true), Activity::School);
        assert_eq!(Activity::for_hour(9, false, false), Activity::Wander);
        assert_eq!(Activity::for_hour(12, true, false), Activity::Wander);
        assert_eq!(Activity::for_hour(15, false, true), Activity::School);
        assert_eq!(Activity::for_hour(20, true, false), Activity::Wander);
    }

    #[test]
    fn test_hourly_wage_range() {
        let mut rng = SmallRng::seed_from_u64(8);
        for _ in 0..100 {
            let wage = hourly_wage(WealthClass::Middle, &mut rng);
            assert!(wage >= 50_000.0 / 8_760.0 && wage < 100_000.0 / 8_760.0);
        }
    }
}
