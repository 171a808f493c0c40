//! Flood disaster behavioral simulation.
//!
//! Individuals choose among four behavioral theories to mitigate, evacuate,
//! cope or adapt; their stranding and injury feed two finite-capacity care
//! pools whose spending drives a small town economy.

use bevy_ecs::system::Resource;
use rand::rngs::SmallRng;

pub mod allocator;
pub mod components;
pub mod config;
pub mod decision;
pub mod economy;
pub mod events;
pub mod lifecycle;
pub mod output;
pub mod setup;
pub mod sim;
pub mod space;

pub use components::*;
pub use config::{Config, ConfigError};
pub use sim::Simulation;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
