//! Theory-Specific Decision Functions
//!
//! Each theory turns the individual's state into one scalar motivation and
//! compares it against a stochastic threshold drawn around that motivation.

use flood_events::DisasterPhase;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::sampling::{gauss, scaled_threshold, scaling_factor};
use crate::components::{Decisions, Demographics, Psyche, WealthClass, Worldview};

/// Behavioral theory driving a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Theory {
    /// Cultural Risk Theory
    Crt,
    /// Protection Motivation Theory
    Pmt,
    /// Social Capital Theory
    Sct,
    /// Theory of Planned Behavior
    Tpb,
}

impl Theory {
    pub const ALL: [Theory; 4] = [Theory::Crt, Theory::Pmt, Theory::Sct, Theory::Tpb];

    pub fn label(self) -> &'static str {
        match self {
            Theory::Crt => "CRT",
            Theory::Pmt => "PMT",
            Theory::Sct => "SCT",
            Theory::Tpb => "TPB",
        }
    }
}

impl fmt::Display for Theory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Protective action under consideration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Mitigation,
    Evacuation,
    Coping,
    Adaptation,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Mitigation => "mitigation",
            Action::Evacuation => "evacuation",
            Action::Coping => "coping",
            Action::Adaptation => "adaptation",
        }
    }
}

/// Provenance of a decision: which theory, in which phase, about what, and
/// whether the action was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionTag {
    pub theory: Theory,
    pub phase: DisasterPhase,
    pub action: Action,
    pub taken: bool,
}

impl fmt::Display for DecisionTag {
    /// `PMT_preflood_mitigation`, or `..._False` when not taken
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.theory,
            self.phase.tag_label(),
            self.action.label()
        )?;
        if !self.taken {
            f.write_str("_False")?;
        }
        Ok(())
    }
}

/// Worldview-indexed influence used by cultural risk theory
pub fn influence_score(demographics: &Demographics, psyche: &Psyche) -> f64 {
    match psyche.worldview {
        Worldview::Hierarchist => (demographics.income * 0.00001 + 0.5).clamp(0.0, 1.0),
        Worldview::Egalitarian => {
            if psyche.bonding > 0.8 {
                0.7
            } else {
                0.4
            }
        }
        Worldview::Individualist => {
            if demographics.wealth_class == WealthClass::Upper {
                0.9
            } else {
                0.3
            }
        }
        Worldview::Fatalist => 0.2,
    }
}

/// Self-efficacy and social trust, averaged
pub fn planned_intention(psyche: &Psyche) -> f64 {
    (psyche.self_efficacy + psyche.social_trust) / 2.0
}

fn threat_level(demographics: &Demographics, psyche: &Psyche) -> f64 {
    psyche.severity * demographics.vulnerability
}

fn coping_potential(psyche: &Psyche) -> f64 {
    psyche.response_efficacy * psyche.self_efficacy - psyche.costs
}

/// Boost from earlier phases: `hit` when the flag is set, else `miss`
fn reflect(flag: bool, hit: f64, miss: f64) -> f64 {
    if flag {
        hit
    } else {
        miss
    }
}

/// Everything a decision function reads
pub struct DecisionInputs<'a> {
    pub demographics: &'a Demographics,
    pub psyche: &'a Psyche,
    pub decisions: &'a Decisions,
    pub phase: DisasterPhase,
}

/// Evaluate one theory for one action; true when the action is taken.
pub fn decide(theory: Theory, action: Action, inputs: &DecisionInputs, rng: &mut SmallRng) -> bool {
    match action {
        Action::Evacuation => decide_evacuation(theory, inputs, rng),
        Action::Mitigation => decide_mitigation(theory, inputs, rng),
        Action::Coping => decide_coping(theory, inputs, rng),
        Action::Adaptation => decide_adaptation(theory, inputs, rng),
    }
}

/// Evacuation compares the motivation against `gauss(m, m)` without scaling.
fn decide_evacuation(theory: Theory, inputs: &DecisionInputs, rng: &mut SmallRng) -> bool {
    let psyche = inputs.psyche;
    let motivation = match theory {
        Theory::Pmt => psyche.severity * 1.2 - psyche.costs * 1.1,
        Theory::Tpb => planned_intention(psyche),
        Theory::Sct => psyche.social_capital_score,
        Theory::Crt => influence_score(inputs.demographics, psyche),
    };
    motivation > gauss(rng, motivation, motivation)
}

fn decide_mitigation(theory: Theory, inputs: &DecisionInputs, rng: &mut SmallRng) -> bool {
    let psyche = inputs.psyche;
    match theory {
        Theory::Pmt => {
            let threat = threat_level(inputs.demographics, psyche);
            let coping = coping_potential(psyche);
            let gap = threat - coping;
            let threshold = coping + pmt_draw(rng, gap, inputs.phase);
            // Protection motivation acts unless the threat outweighs the threshold
            threat <= threshold
        }
        Theory::Tpb => exceeds(rng, planned_intention(psyche), inputs.phase),
        Theory::Sct => exceeds(rng, psyche.social_capital_score, inputs.phase),
        Theory::Crt => exceeds(rng, influence_score(inputs.demographics, psyche), inputs.phase),
    }
}

fn decide_coping(theory: Theory, inputs: &DecisionInputs, rng: &mut SmallRng) -> bool {
    let psyche = inputs.psyche;
    let mitigated = inputs.decisions.mitigation_implemented;
    match theory {
        Theory::Pmt => {
            let effectiveness = reflect(mitigated, 0.8, 0.0);
            let threat = threat_level(inputs.demographics, psyche) * (1.0 - effectiveness);
            let coping = coping_potential(psyche) + effectiveness * 0.5;
            threat < pmt_draw(rng, threat - coping, inputs.phase)
        }
        Theory::Tpb => {
            let intention = planned_intention(psyche) + reflect(mitigated, 0.1, 0.0);
            exceeds(rng, intention, inputs.phase)
        }
        Theory::Sct => {
            let score = psyche.social_capital_score + reflect(mitigated, 0.9, -0.1);
            exceeds(rng, score, inputs.phase)
        }
        Theory::Crt => exceeds(rng, influence_score(inputs.demographics, psyche), inputs.phase),
    }
}

fn decide_adaptation(theory: Theory, inputs: &DecisionInputs, rng: &mut SmallRng) -> bool {
    let psyche = inputs.psyche;
    let mitigated = inputs.decisions.mitigation_implemented;
    let coped = inputs.decisions.coping_implemented;
    match theory {
        Theory::Pmt => {
            let mitigation_reflection = reflect(mitigated, 1.0, 0.5);
            let coping_reflection = reflect(coped, 1.0, 0.5);
            let threat =
                threat_level(inputs.demographics, psyche) * (1.0 - mitigation_reflection);
            let coping = psyche.response_efficacy * psyche.self_efficacy + coping_reflection
                - psyche.costs;
            threat < coping + pmt_draw(rng, threat - coping, inputs.phase)
        }
        Theory::Tpb => {
            let intention = planned_intention(psyche)
                + reflect(mitigated, 0.2, -0.1)
                + reflect(coped, 0.2, -0.1);
            exceeds(rng, intention, inputs.phase)
        }
        Theory::Sct => {
            let score = psyche.social_capital_score
                + reflect(mitigated, 0.2, -0.1)
                + reflect(coped, 0.2, -0.1);
            exceeds(rng, score, inputs.phase)
        }
        Theory::Crt => exceeds(rng, influence_score(inputs.demographics, psyche), inputs.phase),
    }
}

/// Motivation beats a threshold scaled around itself
fn exceeds(rng: &mut SmallRng, motivation: f64, phase: DisasterPhase) -> bool {
    motivation > scaled_threshold(rng, motivation, phase)
}

/// `gauss(gap * s1, gap / s2)` for the threat-minimizing framing
fn pmt_draw(rng: &mut SmallRng, gap: f64, phase: DisasterPhase) -> f64 {
    let mean = gap * scaling_factor(rng, phase);
    let std_dev = gap / scaling_factor(rng, phase);
    gauss(rng, mean, std_dev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::attributes::tests::demographics;
    use rand::SeedableRng;

    fn rate(theory: Theory, action: Action, inputs: &DecisionInputs, seed: u64) -> f64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let trials = 4_000;
        let taken = (0..trials)
            .filter(|_| decide(theory, action, inputs, &mut rng))
            .count();
        taken as f64 / trials as f64
    }

    #[test]
    fn test_tag_format() {
        let tag = DecisionTag {
            theory: Theory::Pmt,
            phase: DisasterPhase::PreFlood,
            action: Action::Mitigation,
            taken: true,
        };
        assert_eq!(tag.to_string(), "PMT_preflood_mitigation");

        let tag = DecisionTag {
            theory: Theory::Sct,
            phase: DisasterPhase::DuringFlood,
            action: Action::Evacuation,
            taken: false,
        };
        assert_eq!(tag.to_string(), "SCT_duringflood_evacuation_False");
    }

    #[test]
    fn test_influence_by_worldview() {
        let mut demo = demographics();
        let mut psyche = Psyche::default();

        psyche.worldview = Worldview::Fatalist;
        assert_eq!(influence_score(&demo, &psyche), 0.2);

        psyche.worldview = Worldview::Egalitarian;
        psyche.bonding = 0.9;
        assert_eq!(influence_score(&demo, &psyche), 0.7);

        psyche.worldview = Worldview::Individualist;
        demo.wealth_class = WealthClass::Upper;
        assert_eq!(influence_score(&demo, &psyche), 0.9);

        psyche.worldview = Worldview::Hierarchist;
        demo.income = 20_000.0;
        assert!((influence_score(&demo, &psyche) - 0.7).abs() < 1e-12);
        demo.income = 1e9;
        assert_eq!(influence_score(&demo, &psyche), 1.0);
    }

    #[test]
    fn test_positive_evacuation_motivation_is_a_coin_flip() {
        let demo = demographics();
        let psyche = Psyche {
            worldview: Worldview::Fatalist,
            ..Psyche::default()
        };
        let decisions = Decisions::default();
        let inputs = DecisionInputs {
            demographics: &demo,
            psyche: &psyche,
            decisions: &decisions,
            phase: DisasterPhase::PreFlood,
        };
        // m > gauss(m, m) holds exactly when the standard normal draw is negative
        let p = rate(Theory::Crt, Action::Evacuation, &inputs, 1);
        assert!((p - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_zero_motivation_never_acts() {
        let demo = demographics();
        let psyche = Psyche {
            social_capital_score: 0.0,
            ..Psyche::default()
        };
        let decisions = Decisions::default();
        let inputs = DecisionInputs {
            demographics: &demo,
            psyche: &psyche,
            decisions: &decisions,
            phase: DisasterPhase::PreFlood,
        };
        assert_eq!(rate(Theory::Sct, Action::Evacuation, &inputs, 2), 0.0);
        assert_eq!(rate(Theory::Sct, Action::Mitigation, &inputs, 3), 0.0);
    }

    #[test]
    fn test_mitigation_raises_sct_coping() {
        let demo = demographics();
        let psyche = Psyche {
            social_capital_score: 0.05,
            ..Psyche::default()
        };
        let without = Decisions::default();
        let with = Decisions {
            mitigation_implemented: true,
            ..Decisions::default()
        };
        let base = DecisionInputs {
            demographics: &demo,
            psyche: &psyche,
            decisions: &without,
            phase: DisasterPhase::DuringFlood,
        };
        let boosted = DecisionInputs {
            decisions: &with,
            ..base
        };
        // A negative score (0.05 - 0.1) draws thresholds well above it
        let low = rate(Theory::Sct, Action::Coping, &base, 4);
        let high = rate(Theory::Sct, Action::Coping, &boosted, 4);
        assert!(high > low);
    }

    #[test]
    fn test_every_theory_decides_every_action() {
        let demo = demographics();
        let psyche = Psyche {
            worldview: Worldview::Egalitarian,
            severity: 0.6,
            self_efficacy: 0.7,
            response_efficacy: 0.6,
            costs: 0.4,
            social_trust: 0.5,
            social_capital_score: 0.3,
            ..Psyche::default()
        };
        let decisions = Decisions::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let trials = 500;
        for (action, phase) in [
            (Action::Mitigation, DisasterPhase::PreFlood),
            (Action::Evacuation, DisasterPhase::DuringFlood),
            (Action::Coping, DisasterPhase::DuringFlood),
            (Action::Adaptation, DisasterPhase::PostFlood),
        ] {
            let inputs = DecisionInputs {
                demographics: &demo,
                psyche: &psyche,
                decisions: &decisions,
                phase,
            };
            for theory in Theory::ALL {
                let taken = (0..trials)
                    .filter(|_| decide(theory, action, &inputs, &mut rng))
                    .count();
                assert!(
                    taken > 0 && taken < trials,
                    "{} {:?} taken {} of {}",
                    theory,
                    action,
                    taken,
                    trials
                );

                let tag = DecisionTag {
                    theory,
                    phase,
                    action,
                    taken: false,
                };
                let label = tag.to_string();
                assert!(label.starts_with(&format!("{}_{}_", theory, phase.tag_label())));
                assert!(label.ends_with("_False"));
            }
        }
    }

    /// Inputs with `threat = severity * vulnerability` and
    /// `coping = efficacy^2 - costs`.
    fn protection_rate(
        action: Action,
        phase: DisasterPhase,
        severity: f64,
        efficacy: f64,
        costs: f64,
        seed: u64,
    ) -> f64 {
        let demo = Demographics {
            vulnerability: 0.9,
            ..demographics()
        };
        let psyche = Psyche {
            severity,
            self_efficacy: efficacy,
            response_efficacy: efficacy,
            costs,
            ..Psyche::default()
        };
        let decisions = Decisions::default();
        let inputs = DecisionInputs {
            demographics: &demo,
            psyche: &psyche,
            decisions: &decisions,
            phase,
        };
        rate(Theory::Pmt, action, &inputs, seed)
    }

    #[test]
    fn test_pmt_mitigation_follows_sign_of_threat_gap() {
        // threat 0.9 against coping -1: the gap is positive
        let alarmed = protection_rate(Action::Mitigation, DisasterPhase::PreFlood, 1.0, 0.0, 1.0, 11);
        // threat 0.09 against coping 1: the gap is negative
        let comfortable =
            protection_rate(Action::Mitigation, DisasterPhase::PreFlood, 0.1, 1.0, 0.0, 11);
        assert!(alarmed > 0.8, "alarmed rate {}", alarmed);
        assert!(comfortable < 0.2, "comfortable rate {}", comfortable);
    }

    #[test]
    fn test_pmt_coping_acts_when_threat_is_below_threshold() {
        // threat 0.9 against coping 1: the small negative gap keeps the threshold low
        let capable = protection_rate(Action::Coping, DisasterPhase::DuringFlood, 1.0, 1.0, 0.0, 12);
        // no threat against coping -1: a positive gap often lifts the threshold above zero
        let exposed = protection_rate(Action::Coping, DisasterPhase::DuringFlood, 0.0, 0.0, 1.0, 12);
        assert!(capable < 0.15, "capable rate {}", capable);
        assert!(exposed > 0.45, "exposed rate {}", exposed);
    }

    #[test]
    fn test_pmt_adaptation_follows_sign_of_threat_gap() {
        // halved threat 0.45 against coping -0.5
        let burdened =
            protection_rate(Action::Adaptation, DisasterPhase::PostFlood, 1.0, 0.0, 1.0, 13);
        // halved threat 0.45 against coping 1.5
        let capable =
            protection_rate(Action::Adaptation, DisasterPhase::PostFlood, 1.0, 1.0, 0.0, 13);
        assert!(burdened > 0.55, "burdened rate {}", burdened);
        assert!(capable < 0.45, "capable rate {}", capable);
    }
}
