//! Town Layout
//!
//! Places houses, businesses and schools at random inside the study area and
//! pins the shelter and hospital sites on the dry edge of the map.

use rand::rngs::SmallRng;
use tracing::debug;

use crate::components::town::{BuildingKind, Site, Town};
use crate::config::Config;
use crate::decision::sampling::uniform;
use crate::space::Position;

/// Footprint radius of the shelter and hospital sites
const CARE_SITE_RADIUS: f64 = 25.0;

fn random_site(extent: f64, rng: &mut SmallRng) -> Position {
    Position::new(uniform(rng, 0.0, extent), uniform(rng, 0.0, extent))
}

/// Build the town registry for a population of the given size.
///
/// Businesses share the business funding pool equally, schools the school pool.
pub fn build_town(config: &Config, population: usize, rng: &mut SmallRng) -> Town {
    let layout = &config.town;
    let funding = &config.funding;
    let mut town = Town::new();

    for _ in 0..layout.houses {
        let position = random_site(layout.extent, rng);
        let resilience = uniform(rng, 10.0, 30.0);
        town.add_building(BuildingKind::House, position, layout.building_radius, resilience, 0.0);
    }

    let business_share = if layout.businesses > 0 {
        funding.pool(funding.business_per_capita, population) / layout.businesses as f64
    } else {
        0.0
    };
    for _ in 0..layout.businesses {
        let position = random_site(layout.extent, rng);
        let resilience = uniform(rng, 15.0, 25.0);
        town.add_building(
            BuildingKind::Business,
            position,
            layout.building_radius,
            resilience,
            business_share,
        );
    }

    let school_share = if layout.schools > 0 {
        funding.pool(funding.school_per_capita, population) / layout.schools as f64
    } else {
        0.0
    };
    for _ in 0..layout.schools {
        let position = random_site(layout.extent, rng);
        let resilience = uniform(rng, 15.0, 25.0);
        town.add_building(
            BuildingKind::School,
            position,
            layout.building_radius,
            resilience,
            school_share,
        );
    }

    town.shelter_site = Some(Site {
        position: Position::new(0.85 * layout.extent, 0.5 * layout.extent),
        radius: CARE_SITE_RADIUS,
    });
    town.hospital_site = Some(Site {
        position: Position::new(0.85 * layout.extent, 0.8 * layout.extent),
        radius: CARE_SITE_RADIUS,
    });

    debug!(
        houses = layout.houses,
        businesses = layout.businesses,
        schools = layout.schools,
        "town laid out"
    );

    town
}
