//! Reaction selection.
//!
//! The `confirmed` flag selects exactly one category of side effect per
//! observation of a request event, never both.

use crate::events::{EventKind, RequestEvent};

/// After-save reaction for one request event observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// First, authoritative application: projection sync, then capability
    /// propagation.
    Sync,
    /// Confirmation replay: notification only.
    Notify,
    /// Nothing to do (confirmed rollback).
    Skip,
}

impl Reaction {
    /// Pick the reaction for `event`.
    pub fn for_event(event: &RequestEvent) -> Self {
        match (event.confirmed, event.kind) {
            (false, _) => Self::Sync,
            (true, EventKind::RequestRolledBack) => Self::Skip,
            (true, _) => Self::Notify,
        }
    }
}
