//! Attribute Updater
//!
//! Recomputes threat, efficacy, cost and social capital from demographics and
//! history. Runs at the start of every decision invocation, in a fixed order.

use crate::components::{Demographics, Ethnicity, Gender, Psyche, WealthClass};

/// Response-efficacy weights: authorities, media, self-efficacy, experience.
/// They sum to 1.5; the result is clamped afterwards.
pub const RESPONSE_EFFICACY_WEIGHTS: [f64; 4] = [0.5, 0.5, 0.3, 0.2];

/// Social-capital step per network indicator
const SOCIAL_CAPITAL_STEP: f64 = 0.2;

/// Run all seven update steps.
pub fn update_attributes(demographics: &Demographics, psyche: &mut Psyche) {
    adjust_for_location(psyche);
    adjust_for_demographics(demographics, psyche);
    update_severity(psyche);
    update_response_efficacy(psyche);
    update_self_efficacy(psyche);
    update_perceived_costs(demographics, psyche);
    update_social_capital(psyche);
}

fn adjust_for_location(psyche: &mut Psyche) {
    psyche.severity *= if psyche.high_risk_area { 1.2 } else { 0.8 };
}

fn adjust_for_demographics(demographics: &Demographics, psyche: &mut Psyche) {
    if demographics.age > 65 {
        psyche.severity *= 1.1;
    }
    if demographics.education > 0.6 {
        psyche.severity *= 1.05;
        psyche.response_efficacy *= 1.05;
    }
    if demographics.wealth_class == WealthClass::Lower {
        psyche.costs *= 1.2;
    }
    if demographics.gender == Gender::Female {
        psyche.costs *= 1.2;
    }
    if demographics.ethnicity == Ethnicity::Indigenous {
        psyche.costs *= 1.1;
    }
}

/// Overwrites the multiplicative adjustments above.
fn update_severity(psyche: &mut Psyche) {
    let location = if psyche.high_risk_area { 0.2 } else { -0.1 };
    psyche.severity = (0.5 + 0.1 * psyche.past_experience + location).clamp(0.0, 1.0);
}

fn update_response_efficacy(psyche: &mut Psyche) {
    let [authorities, media, efficacy, experience] = RESPONSE_EFFICACY_WEIGHTS;
    let weighted = psyche.trust_in_authorities * authorities
        + psyche.media_trust * media
        + psyche.self_efficacy * efficacy
        + psyche.past_experience * experience;
    psyche.response_efficacy = weighted.clamp(0.0, 1.0);
}

fn update_self_efficacy(psyche: &mut Psyche) {
    psyche.self_efficacy =
        (0.5 + 0.3 * psyche.past_experience + 0.2 * psyche.bonding).clamp(0.0, 1.0);
}

fn update_perceived_costs(demographics: &Demographics, psyche: &mut Psyche) {
    let income: f64 = if demographics.wealth_class.is_affluent() { -0.05 } else { 0.05 };
    let education: f64 = if demographics.education > 0.7 { -0.025 } else { 0.025 };
    let support: f64 = if psyche.bonding > 0.3 { -0.05 } else { 0.05 };
    let experience: f64 = if psyche.past_experience > 0.5 { 0.1 } else { -0.05 };

    let nudges = (income + education + support + experience).clamp(-0.5, 0.5);
    psyche.costs = (0.5 + nudges).clamp(0.0, 1.0);
}

fn update_social_capital(psyche: &mut Psyche) {
    let indicators = [
        psyche.bonding > 0.7,
        psyche.bridging > 0.5,
        psyche.linking > 0.3,
        psyche.social_trust == 1.0,
    ];
    for present in indicators {
        if present {
            psyche.social_capital_score += SOCIAL_CAPITAL_STEP;
        } else {
            psyche.social_capital_score -= SOCIAL_CAPITAL_STEP;
        }
    }
}
