//! Individual Components
//!
//! Demographics, psychological scalars, decision state and survival counters
//! for the people living in the town.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use super::town::BuildingId;
use crate::decision::DecisionTag;

/// Unique, stable identifier for an individual
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub u32);

/// Income tier, ordered from richest to poorest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WealthClass {
    Upper,
    UpperMiddle,
    Middle,
    Lower,
}

impl WealthClass {
    pub const ALL: [WealthClass; 4] = [
        WealthClass::Upper,
        WealthClass::UpperMiddle,
        WealthClass::Middle,
        WealthClass::Lower,
    ];

    /// Annual income range for the tier
    pub fn annual_income_range(self) -> (f64, f64) {
        match self {
            WealthClass::Upper => (250_000.0, 500_000.0),
            WealthClass::UpperMiddle => (100_000.0, 250_000.0),
            WealthClass::Middle => (50_000.0, 100_000.0),
            WealthClass::Lower => (0.0, 50_000.0),
        }
    }

    /// Upper and upper-middle tiers
    pub fn is_affluent(self) -> bool {
        matches!(self, WealthClass::Upper | WealthClass::UpperMiddle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ethnicity {
    Canadian,
    Immigrant,
    Indigenous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Cultural risk archetype, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Worldview {
    Hierarchist,
    Egalitarian,
    Individualist,
    Fatalist,
}

impl Worldview {
    pub const ALL: [Worldview; 4] = [
        Worldview::Hierarchist,
        Worldview::Egalitarian,
        Worldview::Individualist,
        Worldview::Fatalist,
    ];
}

/// Demographic attributes. Only `income` changes after creation.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Demographics {
    pub age: u32,
    /// 0.0 to 1.0
    pub education: f64,
    pub gender: Gender,
    pub ethnicity: Ethnicity,
    pub wealth_class: WealthClass,
    /// Saved income, spent on evacuation, care and services
    pub income: f64,
    /// Average of the arithmetic and geometric SES indices
    pub vulnerability: f64,
    pub ses_1: f64,
    pub ses_2: f64,
    /// Scales the wandering distance
    pub mobility: f64,
    /// Flood depth the individual can walk through
    pub resilience: f64,
    pub employed: bool,
    pub student: bool,
}

/// Psychological and social scalars read by the decision engine.
/// Everything except `social_capital_score` stays within 0.0 to 1.0.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Psyche {
    pub worldview: Worldview,
    pub severity: f64,
    pub self_efficacy: f64,
    pub response_efficacy: f64,
    /// Perceived cost of acting
    pub costs: f64,
    pub intention: f64,
    pub past_experience: f64,
    pub high_risk_area: bool,
    /// Binary trust flags, stored as 0.0 or 1.0
    pub trust_in_authorities: f64,
    pub media_trust: f64,
    pub social_trust: f64,
    pub bonding: f64,
    pub bridging: f64,
    pub linking: f64,
    /// Running score, accumulates every update and is never clamped
    pub social_capital_score: f64,
}

impl Default for Psyche {
    fn default() -> Self {
        Self {
            worldview: Worldview::Hierarchist,
            severity: 0.5,
            self_efficacy: 0.5,
            response_efficacy: 0.5,
            costs: 0.5,
            intention: 0.5,
            past_experience: 0.5,
            high_risk_area: false,
            trust_in_authorities: 0.0,
            media_trust: 0.0,
            social_trust: 0.0,
            bonding: 0.5,
            bridging: 0.5,
            linking: 0.5,
            social_capital_score: 0.0,
        }
    }
}

/// Latest decision provenance per phase, plus the resulting behaviour flags.
/// Overwritten on each relevant tick; history lives in the event log.
#[derive(Component, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Decisions {
    pub preflood: Option<DecisionTag>,
    pub pre_during: Option<DecisionTag>,
    pub postflood: Option<DecisionTag>,
    pub mitigation_implemented: bool,
    pub coping_implemented: bool,
    pub adaptation_planned: bool,
}

impl Decisions {
    pub fn clear_tags(&mut self) {
        self.preflood = None;
        self.pre_during = None;
        self.postflood = None;
    }
}

/// Survival state and counters. Shelter and hospital membership live in the
/// care pools, not here.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub alive: bool,
    pub evacuated: bool,
    pub stranded: bool,
    pub injured: bool,
    /// False while evacuated out of the study area
    pub on_map: bool,
    pub time_stranded: u32,
    pub time_injured: u32,
    pub time_in_shelter: u32,
    /// Stranded hours before injury sets in
    pub injury_duration: u32,
    /// Stranded or injured hours before death
    pub survivability_duration: u32,
    /// Patients above the care threshold do not recover
    pub recovery_rate: f64,
}

impl Condition {
    pub fn new(injury_duration: u32, survivability_duration: u32, recovery_rate: f64) -> Self {
        Self {
            alive: true,
            evacuated: false,
            stranded: false,
            injured: false,
            on_map: true,
            time_stranded: 0,
            time_injured: 0,
            time_in_shelter: 0,
            injury_duration,
            survivability_duration,
            recovery_rate,
        }
    }

    /// Terminal transition; clears every transient flag exactly once.
    pub fn kill(&mut self) {
        self.alive = false;
        self.stranded = false;
        self.injured = false;
        self.evacuated = false;
    }
}

/// Buildings an individual belongs to
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Affiliations {
    pub household: BuildingId,
    pub workplace: Option<BuildingId>,
    pub school: Option<BuildingId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_clears_flags() {
        let mut condition = Condition::new(12, 100, 0.5);
        condition.stranded = true;
        condition.injured = true;
        condition.evacuated = true;

        condition.kill();

        assert!(!condition.alive);
        assert!(!condition.stranded);
        assert!(!condition.injured);
        assert!(!condition.evacuated);
    }

    #[test]
    fn test_wealth_class_ranges() {
        for class in WealthClass::ALL {
            let (low, high) = class.annual_income_range();
            assert!(low < high);
        }
        assert!(WealthClass::UpperMiddle.is_affluent());
        assert!(!WealthClass::Middle.is_affluent());
    }
}
