//! Before-save guard shared by all event classes.

use pf_02_access_guard::require_privileged;
use shared_types::{Caller, TriggerError};
use tracing::debug;

use crate::events::EventRecord;

/// Events are facts written by the backend only; a client-authored event is
/// never accepted.
pub fn before_save_event(caller: &Caller, event: &EventRecord) -> Result<(), TriggerError> {
    require_privileged(event.class(), caller)?;
    debug!("[pf-03] Accepted {} {}", event.class(), event.key());
    Ok(())
}
