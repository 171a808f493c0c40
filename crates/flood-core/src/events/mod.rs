//! Lifecycle events raised during a tick

pub mod logger;

use bevy_ecs::prelude::*;
use flood_events::{LifecycleEvent, LifecycleEventKind, SimTimestamp};

use crate::components::PersonId;
use crate::decision::DecisionTag;

pub use logger::EventLogger;

/// Events and decisions produced during the current tick
#[derive(Resource, Debug, Default)]
pub struct TickEvents {
    pub events: Vec<LifecycleEvent>,
    pub decisions: Vec<DecisionTag>,
    next_event_id: u64,
}

impl TickEvents {
    pub fn new() -> Self {
        Self {
            next_event_id: 1,
            ..Self::default()
        }
    }

    pub fn generate_id(&mut self) -> String {
        let id = format!("evt_{:08}", self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub fn record(&mut self, timestamp: SimTimestamp, person: PersonId, kind: LifecycleEventKind) {
        let id = self.generate_id();
        self.events
            .push(LifecycleEvent::new(id, timestamp, person.0, kind));
    }

    pub fn record_decision(&mut self, tag: DecisionTag) {
        self.decisions.push(tag);
    }

    pub fn drain(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_decisions(&mut self) -> Vec<DecisionTag> {
        std::mem::take(&mut self.decisions)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
