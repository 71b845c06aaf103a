//! Notification dispatch: recipient resolution, audit log, delivery.

use pf_03_event_log::EventKind;
use pf_04_projection_sync::RequestContext;
use shared_types::{
    try_read_object, Acl, CreatorProfile, ObjectStore, RecordClass, Stored, TriggerError,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::RetryConfig;
use crate::message::{compose, EmailMessage};
use crate::transport::EmailTransport;
use crate::urls::UrlBuilder;

/// Result of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Event kind notifies nobody.
    NotApplicable,
    /// Nobody to write to (no profile, no address).
    NoRecipient,
    /// Provider accepted the message.
    Sent {
        /// Transport calls made.
        attempts: u32,
    },
    /// Every transport call failed; the audit log entry remains.
    Failed {
        /// Transport calls made.
        attempts: u32,
        /// Last transport error.
        reason: String,
    },
}

/// Sends the notification of a confirmed request event.
pub struct NotificationDispatcher<S, T> {
    store: Arc<S>,
    transport: Arc<T>,
    urls: UrlBuilder,
    retry: RetryConfig,
}

impl<S: ObjectStore, T: EmailTransport> NotificationDispatcher<S, T> {
    /// Create a dispatcher.
    pub fn new(store: Arc<S>, transport: Arc<T>, urls: UrlBuilder, retry: RetryConfig) -> Self {
        Self {
            store,
            transport,
            urls,
            retry,
        }
    }

    /// Notify the party interested in a confirmed event of `kind`.
    ///
    /// # Errors
    ///
    /// Profile lookup or audit log failures. Transport failures are not
    /// errors; they end as `DeliveryOutcome::Failed`.
    pub async fn notify(
        &self,
        ctx: &RequestContext,
        kind: EventKind,
    ) -> Result<DeliveryOutcome, TriggerError> {
        if kind == EventKind::RequestRolledBack {
            return Ok(DeliveryOutcome::NotApplicable);
        }

        let Some(to) = self.recipient(ctx, kind).await? else {
            info!(
                request_id = %ctx.request_id,
                kind = %kind,
                "[pf-06] No recipient address, nothing to send"
            );
            return Ok(DeliveryOutcome::NoRecipient);
        };

        match compose(kind, &ctx.request_id, &to, &self.urls)? {
            Some(message) => self.dispatch(&message).await,
            None => Ok(DeliveryOutcome::NotApplicable),
        }
    }

    async fn recipient(
        &self,
        ctx: &RequestContext,
        kind: EventKind,
    ) -> Result<Option<String>, TriggerError> {
        let address = match kind {
            EventKind::RequestCreated => {
                let Some(creator) = ctx.form.record.creator.as_ref() else {
                    return Ok(None);
                };
                try_read_object::<S, CreatorProfile>(
                    self.store.as_ref(),
                    RecordClass::CreatorProfile,
                    creator,
                )
                .await?
                .and_then(|profile| profile.record.email)
            }
            EventKind::RequestApproved | EventKind::RequestRejected => {
                ctx.request.record.email.clone()
            }
            EventKind::RequestRolledBack => None,
        };
        Ok(address.filter(|a| !a.trim().is_empty()))
    }

    /// Log, then deliver `message`.
    ///
    /// # Errors
    ///
    /// Audit log save failure; the transport is not called in that case.
    pub async fn dispatch(&self, message: &EmailMessage) -> Result<DeliveryOutcome, TriggerError> {
        let log = Stored::new(message.to_log(), Acl::private());
        self.store.save(&log).await?;
        debug!(to = %message.to, "[pf-06] Email logged");

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.send(message).await {
                Ok(()) => {
                    info!(to = %message.to, attempts = attempt, "[pf-06] Email sent: {}", message.subject);
                    return Ok(DeliveryOutcome::Sent { attempts: attempt });
                }
                Err(e) if attempt >= max_attempts => {
                    error!(
                        to = %message.to,
                        attempts = attempt,
                        error = %e,
                        "[pf-06] Couldn't send e-mail"
                    );
                    return Ok(DeliveryOutcome::Failed {
                        attempts: attempt,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    let backoff = self.retry.backoff(attempt);
                    warn!(
                        to = %message.to,
                        attempts = attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "[pf-06] Email send failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}
