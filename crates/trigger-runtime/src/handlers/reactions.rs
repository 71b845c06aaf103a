//! # Request Event Reactions
//!
//! After-save handler for the four request event classes.
//!
//! ## Flow
//!
//! 1. Write path commits a request event and queues its `CommitNotice`
//! 2. Handler decodes the event as written from the notice
//! 3. `confirmed = false`: projection sync, then capability propagation
//! 4. `confirmed = true`: notification, once per event row (nothing for a
//!    rollback)
//! 5. Handler publishes `ReactionCompleted` or `ReactionFailed`
//!
//! Each notice is handled on its own task; a failure never reaches the
//! writer, whose commit already stands. On shutdown the queue is closed,
//! drained, and every running task is awaited.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use pf_03_event_log::{EventKind, Reaction, RequestEvent};
use pf_04_projection_sync::{resolve_context, sync_request, SyncOutcome};
use pf_05_capability_propagation::grant_receipt_access;
use pf_06_notifications::{EmailTransport, NotificationDispatcher};
use shared_bus::{CommitNotice, CommitReceiver, EventPublisher, ResultBus, TriggerEvent};
use shared_types::{ObjectStore, TriggerError};

/// Handler for request event commits.
pub struct ReactionHandler<S, T> {
    /// Object store shared with the write path.
    store: Arc<S>,
    /// Notification side effects.
    dispatcher: NotificationDispatcher<S, T>,
    /// Bus the results are reported on.
    results: Arc<ResultBus>,
    /// Serializes the check-and-set of the `notified` marker.
    notify_claims: Mutex<()>,
}

impl<S, T> ReactionHandler<S, T>
where
    S: ObjectStore + 'static,
    T: EmailTransport + 'static,
{
    /// Create a new handler.
    pub fn new(
        store: Arc<S>,
        dispatcher: NotificationDispatcher<S, T>,
        results: Arc<ResultBus>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            results,
            notify_claims: Mutex::new(()),
        }
    }

    /// Run the handler loop.
    ///
    /// Every request event notice is handled on a task of its own. When
    /// `shutdown` fires the queue is closed; notices already queued are
    /// still handled and the loop returns once every task has finished.
    pub async fn run(
        self: Arc<Self>,
        mut commits: CommitReceiver,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("[runtime] Reaction handler started");

        let mut tasks = JoinSet::new();
        let mut closing = false;
        loop {
            tokio::select! {
                notice = commits.recv() => {
                    let Some(notice) = notice else {
                        break;
                    };
                    if EventKind::from_class(notice.class).is_none() {
                        continue;
                    }
                    let handler = Arc::clone(&self);
                    tasks.spawn(async move {
                        handler.handle(notice).await;
                    });
                }
                Some(done) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join(done);
                }
                _ = shutdown.changed(), if !closing => {
                    info!(in_flight = tasks.len(), "[runtime] Shutdown signal received, draining reactions");
                    closing = true;
                    commits.close();
                }
            }
        }

        while let Some(done) = tasks.join_next().await {
            log_join(done);
        }
        info!("[runtime] Commit queue drained, reaction handler exiting");
    }

    /// React to one notice and report the result on the bus.
    pub async fn handle(&self, notice: CommitNotice) {
        let report = match self.react(&notice).await {
            Ok(summary) => {
                info!(
                    class = %notice.class,
                    key = %notice.key,
                    delivery = notice.delivery,
                    "[runtime] Reaction completed: {}",
                    summary
                );
                TriggerEvent::ReactionCompleted { notice, summary }
            }
            Err(e) => {
                error!(
                    class = %notice.class,
                    key = %notice.key,
                    delivery = notice.delivery,
                    error = %e,
                    "[runtime] Reaction failed"
                );
                TriggerEvent::ReactionFailed {
                    notice,
                    error: e.to_string(),
                }
            }
        };
        self.results.publish(report).await;
    }

    /// Run the reaction selected by the event as it was committed.
    ///
    /// # Errors
    ///
    /// The notice does not decode, one of the event's cross-references
    /// cannot be read, or a projection/ACL save fails.
    pub async fn react(&self, notice: &CommitNotice) -> Result<String, TriggerError> {
        let event: RequestEvent = notice.record()?;

        match Reaction::for_event(&event) {
            Reaction::Skip => {
                debug!(request_id = %event.request_id, "[runtime] Confirmed rollback, nothing to do");
                Ok("nothing to do".to_string())
            }
            Reaction::Sync => {
                let mut ctx = resolve_context(self.store.as_ref(), &event).await?;
                let sync = sync_request(self.store.as_ref(), &mut ctx, &event).await?;
                if sync == SyncOutcome::Ignored {
                    return Ok(format!("sync {}", sync));
                }
                let grant = grant_receipt_access(self.store.as_ref(), &ctx, event.kind).await?;
                Ok(format!("sync {}, grant {}", sync, grant))
            }
            Reaction::Notify => {
                let ctx = resolve_context(self.store.as_ref(), &event).await?;
                if !self.claim_notification(notice).await? {
                    debug!(request_id = %event.request_id, kind = %event.kind, "[runtime] Already notified");
                    return Ok("notify already sent".to_string());
                }
                let delivery = self.dispatcher.notify(&ctx, event.kind).await?;
                Ok(format!("notify {:?}", delivery))
            }
        }
    }

    /// Mark the committed event row as notified.
    ///
    /// Returns `false` if an earlier delivery already did.
    async fn claim_notification(&self, notice: &CommitNotice) -> Result<bool, TriggerError> {
        let _claim = self.notify_claims.lock().await;

        let mut row = self
            .store
            .get::<RequestEvent>(notice.class, notice.object_id)
            .await?
            .ok_or_else(|| TriggerError::NotFound {
                class: notice.class,
                field: "objectId",
                value: notice.object_id.to_string(),
            })?;
        if row.record.notified {
            return Ok(false);
        }
        row.record.notified = true;
        self.store.save(&row).await?;
        Ok(true)
    }
}

fn log_join(done: Result<(), tokio::task::JoinError>) {
    if let Err(e) = done {
        error!(error = %e, "[runtime] Reaction task did not finish");
    }
}
