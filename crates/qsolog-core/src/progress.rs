//! Import progress events.
//!
//! The reconciler reports one event per processed record to an optional
//! [`ImportProgress`] sink. Rendering (stderr, JSON lines) is left to the
//! application.

use crate::models::ImportOutcome;
use crate::reconcile::Decision;

/// A single progress event for an import.
#[derive(Clone, Debug)]
pub enum ImportEvent {
    /// Retrieving raw data from an external source.
    Fetching { source: String },
    /// One record has been handled.
    Record {
        source: String,
        ordinal: usize,
        decision: Decision,
    },
    /// The batch is complete.
    Finished {
        source: String,
        outcome: ImportOutcome,
    },
}

/// Receives import progress events.
pub trait ImportProgress: Send + Sync {
    fn report(&self, event: ImportEvent);
}

/// No-op sink.
pub struct NoProgress;

impl ImportProgress for NoProgress {
    fn report(&self, _event: ImportEvent) {}
}
