//! Theory Selector
//!
//! Perturbs severity, picks the phase's action category, then draws one
//! theory from the candidates whose eligibility predicates hold. A theory
//! appears once per satisfied predicate, so salient theories are drawn more
//! often.

use flood_events::DisasterPhase;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use super::sampling::{gauss, uniform};
use super::theories::{Action, Theory};
use crate::components::{Demographics, Ethnicity, Psyche, WealthClass, Worldview};

/// Severity above which pre-flood deliberation turns to evacuation
pub const PRE_FLOOD_EVACUATION_SEVERITY: f64 = 0.92;

/// Severity above which during-flood deliberation turns to evacuation
pub const DURING_FLOOD_EVACUATION_SEVERITY: f64 = 0.94;

type Predicate = fn(&Demographics, &Psyche) -> bool;

/// Ordered eligibility table
pub const ELIGIBILITY: [(Theory, Predicate); 16] = [
    (Theory::Crt, crt_insular_worldview),
    (Theory::Crt, crt_exposed_distrustful),
    (Theory::Crt, crt_disconnected),
    (Theory::Crt, crt_poor_and_unsure),
    (Theory::Crt, crt_outward_worldview),
    (Theory::Pmt, pmt_experienced_or_established),
    (Theory::Pmt, pmt_confident_and_alarmed),
    (Theory::Pmt, pmt_exposed_vulnerable),
    (Theory::Pmt, pmt_trusts_warnings),
    (Theory::Sct, sct_close_ties_or_marginalized),
    (Theory::Sct, sct_bridged_or_linked),
    (Theory::Sct, sct_trusting_network),
    (Theory::Sct, sct_strong_bonds),
    (Theory::Tpb, tpb_capable_and_trusting),
    (Theory::Tpb, tpb_resourced),
    (Theory::Tpb, tpb_intends_and_able),
];

fn crt_insular_worldview(_: &Demographics, p: &Psyche) -> bool {
    matches!(p.worldview, Worldview::Hierarchist | Worldview::Fatalist) && p.bonding < 0.5
}

fn crt_exposed_distrustful(_: &Demographics, p: &Psyche) -> bool {
    p.high_risk_area && p.trust_in_authorities == 0.0
}

fn crt_disconnected(_: &Demographics, p: &Psyche) -> bool {
    p.bridging < 0.5 && p.media_trust == 0.0
}

fn crt_poor_and_unsure(d: &Demographics, p: &Psyche) -> bool {
    p.self_efficacy < 0.5 && d.wealth_class == WealthClass::Lower
}

fn crt_outward_worldview(_: &Demographics, p: &Psyche) -> bool {
    matches!(p.worldview, Worldview::Individualist | Worldview::Egalitarian) && p.bridging > 0.5
}

fn pmt_experienced_or_established(d: &Demographics, p: &Psyche) -> bool {
    p.past_experience > 0.5
        || (d.wealth_class.is_affluent()
            && matches!(d.ethnicity, Ethnicity::Canadian | Ethnicity::Immigrant))
}

fn pmt_confident_and_alarmed(_: &Demographics, p: &Psyche) -> bool {
    p.response_efficacy > 0.7 && p.severity > 0.6
}

fn pmt_exposed_vulnerable(d: &Demographics, p: &Psyche) -> bool {
    p.high_risk_area && d.vulnerability > 0.6
}

fn pmt_trusts_warnings(_: &Demographics, p: &Psyche) -> bool {
    p.trust_in_authorities == 1.0 && p.media_trust == 1.0 && p.severity > 0.4
}

fn sct_close_ties_or_marginalized(d: &Demographics, p: &Psyche) -> bool {
    (p.social_trust > 0.7 && p.bonding > 0.2)
        || d.wealth_class == WealthClass::Lower
        || d.ethnicity == Ethnicity::Indigenous
}

fn sct_bridged_or_linked(_: &Demographics, p: &Psyche) -> bool {
    p.bridging > 0.5 || p.linking > 0.4
}

fn sct_trusting_network(_: &Demographics, p: &Psyche) -> bool {
    p.social_trust == 1.0 && p.bonding > 0.5 && p.linking > 0.4
}

fn sct_strong_bonds(_: &Demographics, p: &Psyche) -> bool {
    p.bonding > 0.6
}

fn tpb_capable_and_trusting(_: &Demographics, p: &Psyche) -> bool {
    p.self_efficacy > 0.6 && p.social_trust > 0.6
}

fn tpb_resourced(d: &Demographics, _: &Psyche) -> bool {
    d.wealth_class.is_affluent() || d.education > 0.7
}

fn tpb_intends_and_able(_: &Demographics, p: &Psyche) -> bool {
    p.intention > 0.5 && p.self_efficacy > 0.5
}

/// Inject noise into severity before it is used.
///
/// Out-of-range severity is redrawn around 0.5; otherwise a scaled draw is
/// added on top without reclamping.
pub fn perturb_severity(psyche: &mut Psyche, rng: &mut SmallRng) {
    if psyche.severity > 0.0 && psyche.severity < 1.0 {
        let scaling = uniform(rng, 6.0, 10.0);
        psyche.severity += gauss(rng, psyche.severity, psyche.severity / 3.0) / scaling;
    } else {
        psyche.severity = gauss(rng, 0.5, 0.5 / 3.0);
    }
}

/// Action category for the phase; None outside the disaster
pub fn action_category(phase: DisasterPhase, severity: f64) -> Option<Action> {
    match phase {
        DisasterPhase::Baseline => None,
        DisasterPhase::PreFlood => Some(if severity > PRE_FLOOD_EVACUATION_SEVERITY {
            Action::Evacuation
        } else {
            Action::Mitigation
        }),
        DisasterPhase::DuringFlood => Some(if severity > DURING_FLOOD_EVACUATION_SEVERITY {
            Action::Evacuation
        } else {
            Action::Coping
        }),
        DisasterPhase::PostFlood => Some(Action::Adaptation),
    }
}

/// One entry per satisfied predicate, in table order; CRT alone when none hold.
pub fn candidates(demographics: &Demographics, psyche: &Psyche) -> Vec<Theory> {
    let eligible: Vec<Theory> = ELIGIBILITY
        .iter()
        .filter(|(_, holds)| holds(demographics, psyche))
        .map(|(theory, _)| *theory)
        .collect();
    if eligible.is_empty() {
        vec![Theory::Crt]
    } else {
        eligible
    }
}

/// Uniform choice among the candidates
pub fn select_theory(demographics: &Demographics, psyche: &Psyche, rng: &mut SmallRng) -> Theory {
    candidates(demographics, psyche)
        .choose(rng)
        .copied()
        .unwrap_or(Theory::Crt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Gender;
    use crate::decision::attributes::tests::demographics;
    use rand::SeedableRng;

    fn isolated() -> (Demographics, Psyche) {
        let demo = Demographics {
            wealth_class: WealthClass::Middle,
            education: 0.5,
            gender: Gender::Male,
            ..demographics()
        };
        let psyche = Psyche {
            worldview: Worldview::Egalitarian,
            bonding: 0.5,
            bridging: 0.5,
            linking: 0.3,
            media_trust: 1.0,
            self_efficacy: 0.5,
            past_experience: 0.2,
            intention: 0.2,
            ..Psyche::default()
        };
        (demo, psyche)
    }

    #[test]
    fn test_empty_candidates_default_to_crt() {
        let (demo, psyche) = isolated();
        assert_eq!(candidates(&demo, &psyche), vec![Theory::Crt]);
    }

    #[test]
    fn test_eligibility_table_shape() {
        let count = |theory: Theory| ELIGIBILITY.iter().filter(|(t, _)| *t == theory).count();
        assert_eq!(ELIGIBILITY.len(), 16);
        assert_eq!(count(Theory::Crt), 5);
        assert_eq!(count(Theory::Pmt), 4);
        assert_eq!(count(Theory::Sct), 4);
        assert_eq!(count(Theory::Tpb), 3);
    }

    #[test]
    fn test_trusting_informed_intention_is_not_tpb_eligible() {
        let (demo, mut psyche) = isolated();
        psyche.trust_in_authorities = 1.0;
        psyche.intention = 0.45;
        assert!(!candidates(&demo, &psyche).contains(&Theory::Tpb));
    }

    #[test]
    fn test_repetition_weights_candidates() {
        let (demo, mut psyche) = isolated();
        psyche.bonding = 0.9;
        psyche.social_trust = 1.0;
        psyche.linking = 0.5;

        let list = candidates(&demo, &psyche);
        let sct = list.iter().filter(|t| **t == Theory::Sct).count();
        assert_eq!(sct, 4);
    }

    #[test]
    fn test_selection_only_draws_candidates() {
        let (demo, mut psyche) = isolated();
        psyche.past_experience = 0.9;
        let mut rng = SmallRng::seed_from_u64(17);
        for _ in 0..100 {
            assert_eq!(select_theory(&demo, &psyche, &mut rng), Theory::Pmt);
        }
    }

    #[test]
    fn test_action_category_thresholds() {
        assert_eq!(action_category(DisasterPhase::PreFlood, 0.93), Some(Action::Evacuation));
        assert_eq!(action_category(DisasterPhase::PreFlood, 0.92), Some(Action::Mitigation));
        assert_eq!(action_category(DisasterPhase::DuringFlood, 0.93), Some(Action::Coping));
        assert_eq!(action_category(DisasterPhase::DuringFlood, 0.95), Some(Action::Evacuation));
        assert_eq!(action_category(DisasterPhase::PostFlood, 2.0), Some(Action::Adaptation));
        assert_eq!(action_category(DisasterPhase::Baseline, 0.5), None);
    }

    #[test]
    fn test_perturbation_resamples_out_of_range() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut psyche = Psyche {
            severity: 1.0,
            ..Psyche::default()
        };
        perturb_severity(&mut psyche, &mut rng);
        assert_ne!(psyche.severity, 1.0);
        assert!((psyche.severity - 0.5).abs() < 1.0);
    }

    #[test]
    fn test_perturbation_only_adds_noise_in_range() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut psyche = Psyche {
            severity: 0.6,
            ..Psyche::default()
        };
        perturb_severity(&mut psyche, &mut rng);
        // 0.6 + gauss(0.6, 0.2) / [6, 10] stays near 0.66
        assert!(psyche.severity > 0.6 && psyche.severity < 0.8);
    }
}
