//! Town Components
//!
//! Houses, businesses and schools, their flood status and wealth.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::space::{HazardQuery, Position};

/// Index into the town's building list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    House,
    Business,
    School,
}

/// A circular building footprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub position: Position,
    pub radius: f64,
    /// Flood depth the building withstands
    pub resilience: f64,
    pub flooded: bool,
    pub time_flooded: u32,
    /// Operating funds (businesses and schools); houses stay at zero
    pub wealth: f64,
    /// Residents, employees or students
    pub members: usize,
}

impl Building {
    pub fn contains(&self, point: Position) -> bool {
        self.position.distance_to(point) <= self.radius
    }

    /// Random point inside the footprint
    pub fn random_point(&self, rng: &mut SmallRng) -> Position {
        self.position.random_point_within(self.radius, rng)
    }

    /// Refresh flood status against the hazard at the building's site.
    pub fn update_flood_status(&mut self, hazard: &dyn HazardQuery, rng: &mut SmallRng) {
        if self.resilience < hazard.hazard_level(self.position, rng) {
            self.flooded = true;
            self.time_flooded += 1;
        } else {
            self.flooded = false;
            self.time_flooded = 0;
        }
    }
}

/// A care facility site (shelter or hospital)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Site {
    pub position: Position,
    pub radius: f64,
}

impl Site {
    pub fn random_point(&self, rng: &mut SmallRng) -> Position {
        self.position.random_point_within(self.radius, rng)
    }
}

/// Registry of all buildings in the study area
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Town {
    buildings: Vec<Building>,
    pub shelter_site: Option<Site>,
    pub hospital_site: Option<Site>,
}

impl Town {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a building and return its id
    pub fn add_building(
        &mut self,
        kind: BuildingKind,
        position: Position,
        radius: f64,
        resilience: f64,
        wealth: f64,
    ) -> BuildingId {
        let id = BuildingId(self.buildings.len());
        self.buildings.push(Building {
            id,
            kind,
            position,
            radius,
            resilience,
            flooded: false,
            time_flooded: 0,
            wealth,
            members: 0,
        });
        id
    }

    pub fn get(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id.0)
    }

    pub fn get_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(id.0)
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn buildings_mut(&mut self) -> &mut [Building] {
        &mut self.buildings
    }

    pub fn ids_of(&self, kind: BuildingKind) -> Vec<BuildingId> {
        self.buildings
            .iter()
            .filter(|b| b.kind == kind)
            .map(|b| b.id)
            .collect()
    }

    pub fn count_of(&self, kind: BuildingKind) -> usize {
        self.buildings.iter().filter(|b| b.kind == kind).count()
    }

    pub fn is_flooded(&self, id: BuildingId) -> bool {
        self.get(id).map(|b| b.flooded).unwrap_or(false)
    }

    /// Uniformly chosen business
    pub fn random_business(&mut self, rng: &mut SmallRng) -> Option<&mut Building> {
        let count = self.count_of(BuildingKind::Business);
        if count == 0 {
            return None;
        }
        let pick = rng.gen_range(0..count);
        self.buildings
            .iter_mut()
            .filter(|b| b.kind == BuildingKind::Business)
            .nth(pick)
    }

    /// First business whose footprint contains the point
    pub fn business_at(&mut self, point: Position) -> Option<&mut Building> {
        self.buildings
            .iter_mut()
            .find(|b| b.kind == BuildingKind::Business && b.contains(point))
    }

    /// Total wealth held by buildings of a kind
    pub fn total_wealth(&self, kind: BuildingKind) -> f64 {
        self.buildings
            .iter()
            .filter(|b| b.kind == kind)
            .map(|b| b.wealth)
            .sum()
    }

    pub fn flooded_count(&self, kind: BuildingKind) -> usize {
        self.buildings
            .iter()
            .filter(|b| b.kind == kind && b.flooded)
            .count()
    }
}
