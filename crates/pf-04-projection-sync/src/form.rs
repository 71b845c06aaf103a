//! Form projection sync.

use pf_03_event_log::FormEvent;
use shared_types::{read_object, Form, ObjectStore, RecordClass, TriggerError};
use tracing::{debug, info};

use crate::outcome::SyncOutcome;

/// Mirror a form event onto its Form projection.
///
/// `FormCreated` copies `isEnabled` and `requireApproval`; `FormUpdated`
/// copies `isEnabled` only. Runs before the event commits, so an error here
/// aborts the event write.
///
/// # Errors
///
/// `NotFound` if no Form has the event's `formId`.
pub async fn sync_form<S: ObjectStore>(
    store: &S,
    event: &FormEvent,
) -> Result<SyncOutcome, TriggerError> {
    let mut form = read_object::<S, Form>(store, RecordClass::Form, event.form_id()).await?;

    let before = form.record.clone();
    match *event {
        FormEvent::Created {
            is_enabled,
            require_approval,
            ..
        } => {
            form.record.is_enabled = Some(is_enabled);
            form.record.require_approval = Some(require_approval);
        }
        FormEvent::Updated { is_enabled, .. } => {
            form.record.is_enabled = Some(is_enabled);
        }
    }

    if form.record == before {
        debug!(form_id = %event.form_id(), "[pf-04] Form already in sync");
        return Ok(SyncOutcome::AlreadyApplied);
    }

    store.save(&form).await?;
    info!(
        form_id = %event.form_id(),
        is_enabled = ?form.record.is_enabled,
        require_approval = ?form.record.require_approval,
        "[pf-04] Form synced"
    );
    Ok(SyncOutcome::Applied)
}
