//! Request projection sync.

use pf_03_event_log::{EventKind, RequestEvent};
use shared_types::{
    read_object, Amount, ObjectStore, RecordClass, RequestStatus, TriggerError,
};
use tracing::{debug, info, warn};

use crate::context::RequestContext;
use crate::outcome::SyncOutcome;

/// Apply an unconfirmed request event to the Request projection.
///
/// Fills `creator` (from the Form) and `value` (from the creation fact) when
/// they are still unset, then moves `status` to the event's target. The
/// updated projection is written back into `ctx`.
///
/// - target equals current status: `AlreadyApplied`
/// - transition not allowed: `Ignored`, logged
/// - otherwise: saved, `Applied`
///
/// # Errors
///
/// `NotFound` if `value` must be filled and no `RequestCreated` exists for
/// the request; store failures.
pub async fn sync_request<S: ObjectStore>(
    store: &S,
    ctx: &mut RequestContext,
    event: &RequestEvent,
) -> Result<SyncOutcome, TriggerError> {
    let target = event.kind.target_status();
    let current = ctx.request.record.status;

    if current == Some(target) {
        debug!(
            request_id = %ctx.request_id,
            status = %target,
            "[pf-04] Request already {}",
            target
        );
        return Ok(SyncOutcome::AlreadyApplied);
    }

    if !RequestStatus::can_transition(current, target) {
        warn!(
            request_id = %ctx.request_id,
            kind = %event.kind,
            current = ?current,
            "[pf-04] Ignoring out-of-order transition to {}",
            target
        );
        return Ok(SyncOutcome::Ignored);
    }

    let mut request = ctx.request.clone();
    if request.record.creator.is_none() {
        request.record.creator = ctx.form.record.creator.clone();
    }
    if request.record.value.is_none() {
        request.record.value = Some(created_value(store, event).await?);
    }
    request.record.status = Some(target);

    store.save(&request).await?;
    info!(
        request_id = %ctx.request_id,
        form_id = %ctx.form_id,
        "[pf-04] Request {} -> {}",
        current.map_or_else(|| "(none)".to_string(), |s| s.to_string()),
        target
    );

    ctx.request = request;
    Ok(SyncOutcome::Applied)
}

/// Value paid with the request, as recorded by its creation fact.
async fn created_value<S: ObjectStore>(
    store: &S,
    event: &RequestEvent,
) -> Result<Amount, TriggerError> {
    if let Some(value) = event.value {
        return Ok(value);
    }

    let created = read_object::<S, RequestEvent>(
        store,
        EventKind::RequestCreated.class(),
        &event.request_id,
    )
    .await?;

    created.record.value.ok_or_else(|| TriggerError::Inconsistent {
        class: RecordClass::RequestCreated,
        id: event.request_id.to_string(),
        reason: "creation fact carries no value".to_string(),
    })
}
