//! Population Spawning
//!
//! Generates individuals with demographic, psychological and survival traits,
//! assigns households, workplaces and schools, and spawns them as entities.

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::individual::{
    Affiliations, Condition, Decisions, Demographics, Ethnicity, Gender, PersonId, Psyche,
    WealthClass, Worldview,
};
use crate::components::town::{BuildingId, BuildingKind, Town};
use crate::decision::sampling::uniform;

/// Population shares for the wealth tiers, richest first; the rest are lower
const UPPER_SHARE: f64 = 0.024;
const UPPER_MIDDLE_SHARE: f64 = 0.204;
const MIDDLE_SHARE: f64 = 0.446;

const INDIGENOUS_SHARE: f64 = 0.05;
const IMMIGRANT_SHARE: f64 = 0.23;

/// Cumulative age band cut-offs by population index
const CHILD_BAND: f64 = 0.16;
const WORKING_BAND: f64 = 0.81;

const TERTIARY_EDUCATION_SHARE: f64 = 0.89;
const MALE_SHARE: f64 = 0.49;

/// Days of income an individual holds in savings
const SAVINGS_DAYS: f64 = 10.0;

/// Traits drawn independently for one individual
struct Profile {
    age: u32,
    wealth_class: WealthClass,
    ethnicity: Ethnicity,
}

fn share(population: usize, fraction: f64) -> usize {
    (population as f64 * fraction) as usize
}

fn wealth_tiers(population: usize, rng: &mut SmallRng) -> Vec<WealthClass> {
    let upper = share(population, UPPER_SHARE);
    let upper_middle = share(population, UPPER_MIDDLE_SHARE);
    let middle = share(population, MIDDLE_SHARE);
    let lower = population.saturating_sub(upper + upper_middle + middle);

    let mut tiers = Vec::with_capacity(population);
    tiers.extend(std::iter::repeat(WealthClass::Upper).take(upper));
    tiers.extend(std::iter::repeat(WealthClass::UpperMiddle).take(upper_middle));
    tiers.extend(std::iter::repeat(WealthClass::Middle).take(middle));
    tiers.extend(std::iter::repeat(WealthClass::Lower).take(lower));
    tiers.truncate(population);
    tiers.shuffle(rng);
    tiers
}

fn ethnicities(population: usize, rng: &mut SmallRng) -> Vec<Ethnicity> {
    let indigenous = share(population, INDIGENOUS_SHARE);
    let immigrant = share(population, IMMIGRANT_SHARE);
    let canadian = population.saturating_sub(indigenous + immigrant);

    let mut groups = Vec::with_capacity(population);
    groups.extend(std::iter::repeat(Ethnicity::Indigenous).take(indigenous));
    groups.extend(std::iter::repeat(Ethnicity::Immigrant).take(immigrant));
    groups.extend(std::iter::repeat(Ethnicity::Canadian).take(canadian));
    groups.truncate(population);
    groups.shuffle(rng);
    groups
}

fn age_for_index(index: usize, population: usize, rng: &mut SmallRng) -> u32 {
    if index < share(population, CHILD_BAND) {
        rng.gen_range(0..=14)
    } else if index < share(population, WORKING_BAND) {
        rng.gen_range(15..=64)
    } else {
        rng.gen_range(65..=100)
    }
}

fn education_for_age(age: u32, rng: &mut SmallRng) -> f64 {
    if age >= 18 {
        if rng.gen::<f64>() < TERTIARY_EDUCATION_SHARE {
            1.0
        } else {
            uniform(rng, 0.5, 0.9)
        }
    } else {
        0.4 / 18.0 * age as f64
    }
}

/// Beta(2,5) density at `age/100` plus a logistic term in income
pub fn mobility(age: u32, income: f64) -> f64 {
    let x = age as f64 / 100.0;
    let beta = 30.0 * x * (1.0 - x).powi(4);
    beta + 1.0 / (1.0 + (-0.1 * (income - 50.0)).exp())
}

fn age_vulnerability(age: u32) -> f64 {
    match age {
        0..=14 => 1.0,
        15..=64 => 0.1,
        _ => 0.8,
    }
}

fn gender_vulnerability(gender: Gender) -> f64 {
    match gender {
        Gender::Male => 0.1,
        Gender::Female => 1.0,
    }
}

fn ethnicity_vulnerability(ethnicity: Ethnicity) -> f64 {
    match ethnicity {
        Ethnicity::Canadian => 0.1,
        Ethnicity::Immigrant => 0.8,
        Ethnicity::Indigenous => 1.0,
    }
}

fn wealth_vulnerability(wealth_class: WealthClass) -> f64 {
    match wealth_class {
        WealthClass::Upper => 0.01,
        WealthClass::UpperMiddle => 0.1,
        WealthClass::Middle => 0.8,
        WealthClass::Lower => 1.0,
    }
}

/// Socio-economic vulnerability: (arithmetic mean, geometric mean) of the
/// five component vulnerabilities.
pub fn ses_index(
    age: u32,
    education: f64,
    gender: Gender,
    ethnicity: Ethnicity,
    wealth_class: WealthClass,
) -> (f64, f64) {
    let parts = [
        age_vulnerability(age),
        1.0 - 0.9 * education,
        gender_vulnerability(gender),
        ethnicity_vulnerability(ethnicity),
        wealth_vulnerability(wealth_class),
    ];
    let n = parts.len() as f64;
    let arithmetic = parts.iter().sum::<f64>() / n;
    let geometric = parts.iter().product::<f64>().powf(1.0 / n);
    (arithmetic, geometric)
}

fn generate_demographics(profile: &Profile, rng: &mut SmallRng) -> Demographics {
    let Profile { age, wealth_class, ethnicity } = *profile;
    let education = education_for_age(age, rng);
    let gender = if rng.gen::<f64>() <= MALE_SHARE {
        Gender::Male
    } else {
        Gender::Female
    };
    let (low, high) = wealth_class.annual_income_range();
    let income = uniform(rng, low, high) / 365.0 * SAVINGS_DAYS;
    let (ses_1, ses_2) = ses_index(age, education, gender, ethnicity, wealth_class);

    Demographics {
        age,
        education,
        gender,
        ethnicity,
        wealth_class,
        income,
        vulnerability: (ses_1 + ses_2) / 2.0,
        ses_1,
        ses_2,
        mobility: mobility(age, income),
        resilience: uniform(rng, 5.0, 15.0),
        employed: false,
        student: false,
    }
}

fn coin_flip(rng: &mut SmallRng) -> f64 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        0.0
    }
}

fn generate_psyche(rng: &mut SmallRng) -> Psyche {
    let worldview = Worldview::ALL[rng.gen_range(0..Worldview::ALL.len())];
    Psyche {
        worldview,
        severity: rng.gen(),
        self_efficacy: rng.gen(),
        response_efficacy: rng.gen(),
        costs: rng.gen(),
        intention: rng.gen(),
        past_experience: rng.gen(),
        high_risk_area: rng.gen_bool(0.5),
        trust_in_authorities: coin_flip(rng),
        media_trust: coin_flip(rng),
        social_trust: coin_flip(rng),
        bonding: rng.gen(),
        bridging: rng.gen(),
        linking: rng.gen(),
        social_capital_score: 0.0,
    }
}

fn generate_condition(rng: &mut SmallRng) -> Condition {
    let injury_duration = rng.gen_range(12..=60);
    let survivability_duration = injury_duration + rng.gen_range(70..=120);
    Condition::new(injury_duration, survivability_duration, rng.gen())
}

/// Household per individual: within each tier adults first, then minors,
/// dealt round-robin across the houses.
fn assign_households(
    demographics: &[Demographics],
    houses: &[BuildingId],
) -> Vec<Option<BuildingId>> {
    let mut households = vec![None; demographics.len()];
    if houses.is_empty() {
        return households;
    }

    let mut slot = 0;
    for tier in WealthClass::ALL {
        for adults in [true, false] {
            for (index, person) in demographics.iter().enumerate() {
                if person.wealth_class == tier && (person.age >= 18) == adults {
                    households[index] = Some(houses[slot % houses.len()]);
                    slot += 1;
                }
            }
        }
    }
    households
}

fn pick(ids: &[BuildingId], rng: &mut SmallRng) -> Option<BuildingId> {
    ids.choose(rng).copied()
}

/// Spawn `size` individuals into the world and register them with their
/// buildings. Returns the spawned entities in id order.
pub fn spawn_population(
    world: &mut World,
    town: &mut Town,
    size: usize,
    rng: &mut SmallRng,
) -> Vec<Entity> {
    let tiers = wealth_tiers(size, rng);
    let groups = ethnicities(size, rng);

    let mut demographics: Vec<Demographics> = (0..size)
        .map(|index| {
            let profile = Profile {
                age: age_for_index(index, size, rng),
                wealth_class: tiers[index],
                ethnicity: groups[index],
            };
            generate_demographics(&profile, rng)
        })
        .collect();

    let houses = town.ids_of(BuildingKind::House);
    let businesses = town.ids_of(BuildingKind::Business);
    let schools = town.ids_of(BuildingKind::School);
    let households = assign_households(&demographics, &houses);

    let mut entities = Vec::with_capacity(size);
    for (index, mut person) in demographics.drain(..).enumerate() {
        let Some(household) = households[index] else {
            continue;
        };

        let workplace = if (18..=64).contains(&person.age) {
            pick(&businesses, rng)
        } else {
            None
        };
        let school = if (5..=17).contains(&person.age) {
            pick(&schools, rng)
        } else {
            None
        };
        person.employed = workplace.is_some();
        person.student = school.is_some();

        for id in [Some(household), workplace, school].into_iter().flatten() {
            if let Some(building) = town.get_mut(id) {
                building.members += 1;
            }
        }

        let position = town
            .get(household)
            .map(|house| house.random_point(rng))
            .unwrap_or_default();

        let entity = world
            .spawn((
                PersonId(index as u32),
                person,
                generate_psyche(rng),
                Decisions::default(),
                generate_condition(rng),
                position,
                Affiliations {
                    household,
                    workplace,
                    school,
                },
            ))
            .id();
        entities.push(entity);
    }

    entities
}

/// Summary of a spawned population
#[derive(Debug, Default)]
pub struct SpawnSummary {
    pub total: u32,
    pub employed: u32,
    pub students: u32,
    pub by_wealth_class: HashMap<String, u32>,
    pub by_ethnicity: HashMap<String, u32>,
}

/// Get summary stats for the spawned population
pub fn get_spawn_summary(world: &mut World) -> SpawnSummary {
    let mut summary = SpawnSummary::default();
    let mut query = world.query::<(&PersonId, &Demographics)>();

    for (_id, person) in query.iter(world) {
        summary.total += 1;
        summary.employed += u32::from(person.employed);
        summary.students += u32::from(person.student);
        *summary
            .by_wealth_class
            .entry(format!("{:?}", person.wealth_class))
            .or_insert(0) += 1;
        *summary
            .by_ethnicity
            .entry(format!("{:?}", person.ethnicity))
            .or_insert(0) += 1;
    }

    summary
}

impl std::fmt::Display for SpawnSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total individuals: {}", self.total)?;
        writeln!(f, "Employed: {}, students: {}", self.employed, self.students)?;
        writeln!(f, "By wealth class:")?;
        for (class, count) in &self.by_wealth_class {
            writeln!(f, "  {}: {}", class, count)?;
        }
        writeln!(f, "By ethnicity:")?;
        for (group, count) in &self.by_ethnicity {
            writeln!(f, "  {}: {}", group, count)?;
        }
        Ok(())
    }
}
