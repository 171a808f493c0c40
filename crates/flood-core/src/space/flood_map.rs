//! Flood Map
//!
//! Three layers of circular flood zones that are added in sequence once the
//! evacuation window closes and removed newest-first.

use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{HazardQuery, Position};
use crate::components::DisasterTimeline;
use crate::config::FloodConfig;

/// Number of flood layers
pub const LAYER_COUNT: usize = 3;

/// Circular flooded area
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FloodZone {
    pub center: Position,
    pub radius: f64,
}

impl FloodZone {
    pub fn contains(&self, position: Position) -> bool {
        self.center.distance_to(position) <= self.radius
    }
}

/// A set of zones switched on and off together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodLayer {
    pub zones: Vec<FloodZone>,
    pub add_at: u64,
    pub remove_at: u64,
    pub active: bool,
}

/// Default hazard source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodMap {
    layers: Vec<FloodLayer>,
    /// (hour, layer index) pairs, in the order layers are removed
    removals: Vec<(u64, usize)>,
    min_depth: f64,
    max_depth: f64,
}

impl FloodMap {
    /// Concentric layers around the configured flood center. Layer `k` is
    /// added at `evacuation_end + 1 + k * interval`; the removal slots
    /// `add_k + 3 * interval` are consumed by the layers in reverse order.
    pub fn from_config(flood: &FloodConfig, timeline: &DisasterTimeline) -> Self {
        let interval = timeline.flood_days * 24 / 6;
        let center = Position::new(flood.center_x, flood.center_y);

        let layers: Vec<FloodLayer> = (0..LAYER_COUNT)
            .map(|k| {
                let add_at = timeline.evacuation_end + 1 + k as u64 * interval;
                FloodLayer {
                    zones: vec![FloodZone {
                        center,
                        radius: flood.base_radius + k as f64 * flood.radius_step,
                    }],
                    add_at,
                    remove_at: 0,
                    active: false,
                }
            })
            .collect();

        Self::with_layers(layers, interval, flood.min_depth, flood.max_depth)
    }

    /// Build from explicit zones per layer, using their `add_at` times
    pub fn with_layers(
        mut layers: Vec<FloodLayer>,
        interval: u64,
        min_depth: f64,
        max_depth: f64,
    ) -> Self {
        let slots: Vec<u64> = layers.iter().map(|l| l.add_at + 3 * interval).collect();
        let count = layers.len();
        let mut removals = Vec::with_capacity(count);
        for (slot, &hour) in slots.iter().enumerate() {
            let layer = count - 1 - slot;
            layers[layer].remove_at = hour;
            removals.push((hour, layer));
        }
        Self {
            layers,
            removals,
            min_depth,
            max_depth,
        }
    }

    pub fn layers(&self) -> &[FloodLayer] {
        &self.layers
    }

    pub fn active_layers(&self) -> usize {
        self.layers.iter().filter(|l| l.active).count()
    }

    fn is_exposed(&self, position: Position) -> bool {
        self.layers
            .iter()
            .filter(|l| l.active)
            .any(|l| l.zones.iter().any(|z| z.contains(position)))
    }
}

impl HazardQuery for FloodMap {
    fn hazard_level(&self, position: Position, rng: &mut SmallRng) -> f64 {
        if self.is_exposed(position) {
            rng.gen_range(self.min_depth..=self.max_depth)
        } else {
            0.0
        }
    }

    fn advance(&mut self, hour: u64) {
        if let Some(layer) = self.layers.iter_mut().find(|l| l.add_at == hour) {
            if !layer.active {
                tracing::debug!(hour, "flood layer added");
            }
            layer.active = true;
        }
        if let Some(&(_, index)) = self.removals.iter().find(|(at, _)| *at == hour) {
            self.layers[index].active = false;
            tracing::debug!(hour, layer = index, "flood layer receded");
        }
    }
}
