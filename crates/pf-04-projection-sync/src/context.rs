//! Request context resolution.

use pf_03_event_log::RequestEvent;
use shared_types::{
    read_object, Form, FormId, ObjectStore, RecordClass, Request, RequestId, Stored, TriggerError,
};
use tracing::error;

/// Everything a request event reaction needs, resolved once per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Copied from the event.
    pub confirmed: bool,
    /// Copied from the event.
    pub request_id: RequestId,
    /// Request projection found by `requestId`.
    pub request: Stored<Request>,
    /// Taken from the request.
    pub form_id: FormId,
    /// Form projection found by `formId`.
    pub form: Stored<Form>,
}

/// Resolve the Request, then its Form, by business identifier.
///
/// # Errors
///
/// `NotFound` if either lookup finds nothing. The event is already
/// committed at this point, so the miss is logged as an inconsistency.
pub async fn resolve_context<S: ObjectStore>(
    store: &S,
    event: &RequestEvent,
) -> Result<RequestContext, TriggerError> {
    let request_id = event.request_id.clone();

    let request = read_object::<S, Request>(store, RecordClass::Request, &request_id)
        .await
        .inspect_err(|e| log_inconsistency(event, e))?;

    let form_id = request.record.form_id.clone();
    let form = read_object::<S, Form>(store, RecordClass::Form, &form_id)
        .await
        .inspect_err(|e| log_inconsistency(event, e))?;

    Ok(RequestContext {
        confirmed: event.confirmed,
        request_id,
        request,
        form_id,
        form,
    })
}

fn log_inconsistency(event: &RequestEvent, err: &TriggerError) {
    error!(
        request_id = %event.request_id,
        kind = %event.kind,
        confirmed = event.confirmed,
        "[pf-04] Cannot resolve request context: {}",
        err
    );
}
