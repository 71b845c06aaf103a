//! Receipt read grants.

use pf_03_event_log::EventKind;
use pf_04_projection_sync::RequestContext;
use shared_types::{
    read_object, AclSubject, ObjectStore, Receipt, RecordClass, TriggerError, UserId,
};
use std::fmt;
use tracing::{debug, info};

use crate::principals::{form_owner, request_sender};

/// Branch taken by `grant_receipt_access`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// `RequestCreated` on a form without approval; pre-receipt not gated.
    NotRequired,
    /// Event kind never grants anything.
    NotApplicable,
    /// Request ACL names nobody but the form owner.
    NoSender,
    /// Sender could already read the receipt.
    AlreadyGranted {
        /// Receipt class.
        receipt: RecordClass,
        /// Sender.
        sender: UserId,
    },
    /// Read access granted and saved.
    Granted {
        /// Receipt class.
        receipt: RecordClass,
        /// Sender.
        sender: UserId,
    },
}

impl fmt::Display for GrantOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRequired => f.write_str("not required"),
            Self::NotApplicable => f.write_str("not applicable"),
            Self::NoSender => f.write_str("no sender"),
            Self::AlreadyGranted { receipt, sender } => {
                write!(f, "{} already readable by {}", receipt, sender)
            }
            Self::Granted { receipt, sender } => write!(f, "{} granted to {}", receipt, sender),
        }
    }
}

/// Receipt class unlocked by an event kind, if any.
fn receipt_class(kind: EventKind) -> Option<RecordClass> {
    match kind {
        EventKind::RequestCreated => Some(RecordClass::PreReceipt),
        EventKind::RequestApproved => Some(RecordClass::PostReceipt),
        EventKind::RequestRejected | EventKind::RequestRolledBack => None,
    }
}

/// Give the request's sender read access to the receipt unlocked by `kind`.
///
/// Runs after projection sync for unconfirmed events.
///
/// # Errors
///
/// `NotFound` if the form has no receipt of the required class; store
/// failures.
pub async fn grant_receipt_access<S: ObjectStore>(
    store: &S,
    ctx: &RequestContext,
    kind: EventKind,
) -> Result<GrantOutcome, TriggerError> {
    let Some(receipt_class) = receipt_class(kind) else {
        return Ok(GrantOutcome::NotApplicable);
    };

    if kind == EventKind::RequestCreated && !ctx.form.record.requires_approval() {
        debug!(form_id = %ctx.form_id, "[pf-05] Pre-receipt not gated by approval");
        return Ok(GrantOutcome::NotRequired);
    }

    let owner = form_owner(&ctx.form.acl);
    let Some(sender) = request_sender(&ctx.request.acl, owner.as_ref()) else {
        debug!(request_id = %ctx.request_id, "[pf-05] Request has no sender to grant");
        return Ok(GrantOutcome::NoSender);
    };

    let mut receipt = read_object::<S, Receipt>(store, receipt_class, &ctx.form_id).await?;
    let subject = AclSubject::User(sender.clone());

    if receipt.acl.read_access(&subject) {
        debug!(
            request_id = %ctx.request_id,
            form_id = %ctx.form_id,
            "[pf-05] {} already readable by {}",
            receipt_class,
            sender
        );
        return Ok(GrantOutcome::AlreadyGranted {
            receipt: receipt_class,
            sender,
        });
    }

    receipt.acl.set_read_access(&subject, true);
    receipt.acl.set_write_access(&subject, false);
    store.save(&receipt).await?;

    info!(
        request_id = %ctx.request_id,
        form_id = %ctx.form_id,
        "[pf-05] Granted {} read to {}",
        receipt_class,
        sender
    );
    Ok(GrantOutcome::Granted {
        receipt: receipt_class,
        sender,
    })
}
