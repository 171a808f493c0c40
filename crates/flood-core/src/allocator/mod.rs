//! Rescue and Care Allocator
//!
//! Two independent finite-capacity pools. Individuals ask for a place from
//! the lifecycle pass; each pool then runs its own upkeep pass.

pub mod healthcare;
pub mod pool;
pub mod shelter;

use bevy_ecs::prelude::*;
use tracing::debug;

use crate::components::Condition;
use crate::config::RescueConfig;

pub use healthcare::{healthcare_upkeep, HealthcarePool};
pub use pool::{Admission, CarePool};
pub use shelter::{shelter_upkeep, ShelterPool};

/// Admission delays and care thresholds
#[derive(Resource, Debug, Clone)]
pub struct RescuePolicy {
    pub hours_before_rescue: u32,
    pub hours_before_healthcare: u32,
    pub shelter_stay_hours: u32,
    pub recovery_threshold: f64,
}

impl From<&RescueConfig> for RescuePolicy {
    fn from(config: &RescueConfig) -> Self {
        Self {
            hours_before_rescue: config.hours_before_rescue,
            hours_before_healthcare: config.hours_before_healthcare,
            shelter_stay_hours: config.shelter_stay_hours,
            recovery_threshold: config.recovery_threshold,
        }
    }
}

impl Default for RescuePolicy {
    fn default() -> Self {
        Self::from(&RescueConfig::default())
    }
}

/// Shelter request from a stranded individual. Admission clears stranding.
pub fn request_shelter(
    shelter: &mut ShelterPool,
    policy: &RescuePolicy,
    entity: Entity,
    condition: &mut Condition,
) -> bool {
    if shelter.contains(entity) || condition.time_stranded < policy.hours_before_rescue {
        return false;
    }
    if shelter.admit(entity).admitted() {
        condition.stranded = false;
        condition.time_stranded = 0;
        true
    } else {
        debug!(?entity, capacity = shelter.capacity(), "shelter full");
        false
    }
}

/// Healthcare request from an injured individual. Admission moves the
/// individual out of the shelter.
pub fn request_healthcare(
    shelter: &mut ShelterPool,
    healthcare: &mut HealthcarePool,
    policy: &RescuePolicy,
    entity: Entity,
    condition: &mut Condition,
) -> bool {
    if condition.time_injured < policy.hours_before_healthcare {
        return false;
    }
    if healthcare.admit(entity).admitted() {
        if shelter.discharge(entity) {
            condition.time_in_shelter = 0;
        }
        true
    } else {
        debug!(?entity, capacity = healthcare.capacity(), "healthcare full");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stranded(hours: u32) -> Condition {
        let mut condition = Condition::new(12, 100, 0.5);
        condition.stranded = true;
        condition.time_stranded = hours;
        condition
    }

    #[test]
    fn test_shelter_waits_for_rescue_delay() {
        let mut shelter = ShelterPool::new(5, 0.0);
        let policy = RescuePolicy::default();
        let entity = Entity::from_raw(1);

        let mut condition = stranded(1);
        assert!(!request_shelter(&mut shelter, &policy, entity, &mut condition));
        assert!(condition.stranded);

        condition.time_stranded = 2;
        assert!(request_shelter(&mut shelter, &policy, entity, &mut condition));
        assert!(!condition.stranded);
        assert_eq!(condition.time_stranded, 0);
        assert!(shelter.contains(entity));
    }

    #[test]
    fn test_full_shelter_leaves_requester_stranded() {
        let mut shelter = ShelterPool::new(10, 0.0);
        let policy = RescuePolicy::default();
        for n in 0..10 {
            let mut condition = stranded(5);
            assert!(request_shelter(&mut shelter, &policy, Entity::from_raw(n), &mut condition));
        }

        let mut condition = stranded(5);
        assert!(!request_shelter(&mut shelter, &policy, Entity::from_raw(10), &mut condition));
        assert!(condition.stranded);
        assert_eq!(condition.time_stranded, 5);
        assert_eq!(shelter.len(), 10);
    }

    #[test]
    fn test_healthcare_admission_leaves_shelter() {
        let mut shelter = ShelterPool::new(2, 0.0);
        let mut healthcare = HealthcarePool::new(2, 0.0);
        let policy = RescuePolicy::default();
        let entity = Entity::from_raw(3);

        shelter.admit(entity);
        let mut condition = Condition::new(12, 100, 0.95);
        condition.injured = true;
        condition.time_in_shelter = 4;

        assert!(request_healthcare(&mut shelter, &mut healthcare, &policy, entity, &mut condition));
        assert!(healthcare.contains(entity));
        assert!(!shelter.contains(entity));
        assert_eq!(condition.time_in_shelter, 0);
    }
}
