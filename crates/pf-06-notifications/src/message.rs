//! Message rendering.

use pf_01_hex_codec::{encode, REQUEST_ID_WIDTH};
use pf_03_event_log::EventKind;
use shared_types::{EmailLog, RequestId, TriggerError};

use crate::urls::UrlBuilder;

/// A fully rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject, network prefix included.
    pub subject: String,
    /// Body, footer included.
    pub body: String,
}

impl EmailMessage {
    /// Audit record of this message.
    pub fn to_log(&self) -> EmailLog {
        EmailLog {
            email: self.to.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
        }
    }
}

fn template(kind: EventKind, id_hex: &str, urls: &UrlBuilder) -> Option<(String, String)> {
    match kind {
        EventKind::RequestCreated => Some((
            format!("You have a new request ({})", id_hex),
            format!(
                "You have a new request.\nRequest ID: {}\n\nPending requests: {}",
                id_hex,
                urls.url("/pending-requests")
            ),
        )),
        EventKind::RequestApproved => Some((
            format!("Your request is approved ({})", id_hex),
            format!(
                "Your request is approved!\nRequest ID: {}\n\nPlease continue here: {}",
                id_hex,
                urls.url(&format!("/requests/{}/post-receipt", id_hex))
            ),
        )),
        EventKind::RequestRejected => Some((
            format!("Your request is rejected ({})", id_hex),
            format!(
                "The owner of the form has rejected your request. \
                 Your payment has been refunded.\nRequest ID: {}",
                id_hex
            ),
        )),
        EventKind::RequestRolledBack => None,
    }
}

/// Render the message for a confirmed event of `kind`, addressed to `to`.
///
/// `None` for kinds that notify nobody.
///
/// # Errors
///
/// `InvalidIdentifier` if `request_id` is not a decimal digit string.
pub fn compose(
    kind: EventKind,
    request_id: &RequestId,
    to: &str,
    urls: &UrlBuilder,
) -> Result<Option<EmailMessage>, TriggerError> {
    let id_hex = encode(request_id.as_str(), REQUEST_ID_WIDTH).map_err(|e| {
        TriggerError::InvalidIdentifier {
            value: request_id.to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(template(kind, &id_hex, urls).map(|(subject, body)| EmailMessage {
        to: to.to_string(),
        subject: format!("{}{}", urls.subject_prefix(), subject),
        body: format!("{}{}", body, urls.footer()),
    }))
}
