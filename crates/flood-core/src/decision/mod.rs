//! Behavioral Decision Engine
//!
//! One invocation updates the individual's attributes, perturbs severity,
//! selects a theory and records the theory's decision for the phase.

pub mod attributes;
pub mod sampling;
pub mod selector;
pub mod theories;

use flood_events::DisasterPhase;
use rand::rngs::SmallRng;

use crate::components::{Decisions, Demographics, Psyche};

pub use attributes::update_attributes;
pub use selector::{action_category, candidates, perturb_severity, select_theory};
pub use theories::{decide, Action, DecisionInputs, DecisionTag, Theory};

/// Run the decision engine once.
///
/// Writes the provenance tag and behaviour flag for the action into
/// `decisions` and returns the tag. Evacuation side effects (leaving the map,
/// paying for the trip) are left to the caller. Returns None in the baseline
/// phase, where no deliberation happens.
pub fn step(
    demographics: &Demographics,
    psyche: &mut Psyche,
    decisions: &mut Decisions,
    phase: DisasterPhase,
    rng: &mut SmallRng,
) -> Option<DecisionTag> {
    if phase == DisasterPhase::Baseline {
        return None;
    }

    update_attributes(demographics, psyche);
    perturb_severity(psyche, rng);
    let action = action_category(phase, psyche.severity)?;
    let theory = select_theory(demographics, psyche, rng);

    let inputs = DecisionInputs {
        demographics,
        psyche: &*psyche,
        decisions: &*decisions,
        phase,
    };
    let taken = decide(theory, action, &inputs, rng);
    let tag = DecisionTag {
        theory,
        phase,
        action,
        taken,
    };
    record(decisions, tag);
    Some(tag)
}

/// Overwrite the phase's latest decision
fn record(decisions: &mut Decisions, tag: DecisionTag) {
    match tag.action {
        Action::Mitigation => {
            decisions.mitigation_implemented = tag.taken;
            decisions.preflood = Some(tag);
        }
        Action::Evacuation => {
            decisions.pre_during = Some(tag);
            decisions.preflood = None;
        }
        Action::Coping => {
            decisions.coping_implemented = tag.taken;
            decisions.pre_during = Some(tag);
        }
        Action::Adaptation => {
            decisions.adaptation_planned = tag.taken;
            decisions.postflood = Some(tag);
        }
    }
}
