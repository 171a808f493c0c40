//! Event Types
//!
//! Lifecycle transitions of individuals, emitted by the core each tick and
//! appended to the JSONL event log.

use serde::{Deserialize, Serialize};

use crate::SimTimestamp;

/// How an individual died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Stranded past survivability without rescue
    Stranded,
    /// Died while hospitalized
    InCare,
}

/// What happened to the individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEventKind {
    /// No safe move was found; the individual is stuck in place
    Stranded,
    /// Stranded long enough to be hurt
    Injured,
    Died { cause: DeathCause },
    Evacuated {
        /// Provenance tag of the decision that led to evacuating
        decision: String,
        cost: f64,
    },
    /// Came back into circulation after evacuating
    Returned,
    Sheltered,
    ReleasedFromShelter,
    Hospitalized,
    Recovered,
    TaxPaid { amount: f64 },
}

impl LifecycleEventKind {
    /// Stable snake_case name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEventKind::Stranded => "stranded",
            LifecycleEventKind::Injured => "injured",
            LifecycleEventKind::Died { .. } => "died",
            LifecycleEventKind::Evacuated { .. } => "evacuated",
            LifecycleEventKind::Returned => "returned",
            LifecycleEventKind::Sheltered => "sheltered",
            LifecycleEventKind::ReleasedFromShelter => "released_from_shelter",
            LifecycleEventKind::Hospitalized => "hospitalized",
            LifecycleEventKind::Recovered => "recovered",
            LifecycleEventKind::TaxPaid { .. } => "tax_paid",
        }
    }
}

/// A single lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub event_id: String,
    pub timestamp: SimTimestamp,
    pub person_id: u32,
    #[serde(flatten)]
    pub kind: LifecycleEventKind,
}

impl LifecycleEvent {
    pub fn new(
        event_id: impl Into<String>,
        timestamp: SimTimestamp,
        person_id: u32,
        kind: LifecycleEventKind,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            timestamp,
            person_id,
            kind,
        }
    }

    pub fn is_death(&self) -> bool {
        matches!(self.kind, LifecycleEventKind::Died { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DisasterPhase;

    #[test]
    fn test_event_serialization_is_flat() {
        let event = LifecycleEvent::new(
            "evt_00000001",
            SimTimestamp::new(250, DisasterPhase::DuringFlood),
            17,
            LifecycleEventKind::Died {
                cause: DeathCause::Stranded,
            },
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "died");
        assert_eq!(json["cause"], "stranded");
        assert_eq!(json["person_id"], 17);
        assert_eq!(json["timestamp"]["phase"], "during_flood");
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{
            "event_id": "evt_00000009",
            "timestamp": {"tick": 10, "day": 0, "hour_of_day": 10, "phase": "pre_flood"},
            "person_id": 3,
            "type": "evacuated",
            "decision": "TPB_preflood_evacuation",
            "cost": 812.5
        }"#;

        let event: LifecycleEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.person_id, 3);
        assert_eq!(event.kind.name(), "evacuated");
        assert!(!event.is_death());
    }
}
