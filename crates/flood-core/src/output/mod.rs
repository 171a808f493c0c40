//! Output Generation
//!
//! Snapshot generation and run statistics.

pub mod snapshot;
pub mod stats;

use bevy_ecs::prelude::*;
use flood_events::RunId;
use thiserror::Error;

pub use snapshot::*;
pub use stats::*;

/// Identity of the current run, stamped on every snapshot and the summary
#[derive(Resource, Debug, Clone, Copy)]
pub struct RunMeta {
    pub run_id: RunId,
    pub seed: u64,
}

/// Errors from writing run output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}
