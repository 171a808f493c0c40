//! Finite-capacity care pool
//!
//! Admission and discharge are the only ways membership changes. Occupants
//! keep arrival order and are never duplicated.

use bevy_ecs::prelude::*;
use flood_events::PoolSnapshot;
use serde::{Deserialize, Serialize};

/// Result of an admission request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    Admitted,
    AlreadyPresent,
    /// Dropped; the requester has to ask again on a later tick
    Full,
}

impl Admission {
    pub fn admitted(self) -> bool {
        self == Admission::Admitted
    }
}

#[derive(Debug, Clone)]
pub struct CarePool {
    capacity: usize,
    occupants: Vec<Entity>,
    /// May go negative
    pub wealth: f64,
    initial_wealth: f64,
}

impl CarePool {
    pub fn new(capacity: usize, wealth: f64) -> Self {
        Self {
            capacity,
            occupants: Vec::with_capacity(capacity),
            wealth,
            initial_wealth: wealth,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn has_room(&self) -> bool {
        self.occupants.len() < self.capacity
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.occupants.contains(&entity)
    }

    /// Occupants in arrival order
    pub fn occupants(&self) -> &[Entity] {
        &self.occupants
    }

    /// Copy of the occupant list for passes that discharge as they go
    pub fn snapshot(&self) -> Vec<Entity> {
        self.occupants.clone()
    }

    pub fn admit(&mut self, entity: Entity) -> Admission {
        if self.contains(entity) {
            Admission::AlreadyPresent
        } else if !self.has_room() {
            Admission::Full
        } else {
            self.occupants.push(entity);
            Admission::Admitted
        }
    }

    /// Remove an occupant; false when it was not present
    pub fn discharge(&mut self, entity: Entity) -> bool {
        match self.occupants.iter().position(|&e| e == entity) {
            Some(index) => {
                self.occupants.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn charge(&mut self, amount: f64) {
        self.wealth -= amount;
    }

    pub fn credit(&mut self, amount: f64) {
        self.wealth += amount;
    }

    pub fn initial_wealth(&self) -> f64 {
        self.initial_wealth
    }

    pub fn to_snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            occupancy: self.len(),
            capacity: self.capacity,
            wealth: self.wealth,
            initial_wealth: self.initial_wealth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(n: u32) -> Entity {
        Entity::from_raw(n)
    }

    #[test]
    fn test_full_pool_rejects_admission() {
        let mut pool = CarePool::new(10, 0.0);
        for n in 0..10 {
            assert_eq!(pool.admit(entity(n)), Admission::Admitted);
        }
        assert_eq!(pool.admit(entity(10)), Admission::Full);
        assert_eq!(pool.len(), 10);
        assert!(!pool.contains(entity(10)));
    }

    #[test]
    fn test_membership_is_unique() {
        let mut pool = CarePool::new(3, 0.0);
        pool.admit(entity(1));
        assert_eq!(pool.admit(entity(1)), Admission::AlreadyPresent);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_discharge_keeps_arrival_order() {
        let mut pool = CarePool::new(3, 0.0);
        pool.admit(entity(1));
        pool.admit(entity(2));
        pool.admit(entity(3));

        assert!(pool.discharge(entity(2)));
        assert!(!pool.discharge(entity(2)));
        assert_eq!(pool.occupants(), &[entity(1), entity(3)]);
    }

    #[test]
    fn test_zero_capacity_admits_nobody() {
        let mut pool = CarePool::new(0, 0.0);
        assert_eq!(pool.admit(entity(1)), Admission::Full);
    }

    #[test]
    fn test_wealth_may_go_negative() {
        let mut pool = CarePool::new(1, 10.0);
        pool.charge(25.0);
        assert_eq!(pool.wealth, -15.0);
        let snapshot = pool.to_snapshot();
        assert!((snapshot.relative_wealth() + 2.5).abs() < 1e-12);
    }
}
