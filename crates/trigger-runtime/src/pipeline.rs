//! # Write Pipeline
//!
//! Every write goes through here:
//!
//! 1. Load the stored original by business key.
//! 2. Run the record's before-save guard (may abort the write).
//! 3. Commit (single-record atomic save).
//! 4. Queue the commit, with the record as written, for after-save
//!    reactions.

use pf_02_access_guard::{guard_form_write, guard_request_write};
use pf_03_event_log::{before_save_event, EventRecord, FormEvent, RequestEvent};
use pf_04_projection_sync::sync_form;
use serde::{Deserialize, Serialize};
use shared_bus::{CommitNotice, CommitSender};
use shared_types::{
    try_read_object, Acl, Caller, Form, ObjectStore, Record, RecordClass, Request, StoreError,
    Stored, TriggerError,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Record submitted for writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WriteRecord {
    /// Form projection (client-owned, guarded columns).
    Form(Form),
    /// Request projection (client-owned, guarded columns).
    Request(Request),
    /// `FormCreated` / `FormUpdated`.
    FormEvent(FormEvent),
    /// One of the request events.
    RequestEvent(RequestEvent),
}

impl WriteRecord {
    /// Store class the record lands in.
    pub fn class(&self) -> RecordClass {
        match self {
            Self::Form(r) => r.class(),
            Self::Request(r) => r.class(),
            Self::FormEvent(r) => r.class(),
            Self::RequestEvent(r) => r.class(),
        }
    }
}

impl From<EventRecord> for WriteRecord {
    fn from(event: EventRecord) -> Self {
        match event {
            EventRecord::Form(e) => Self::FormEvent(e),
            EventRecord::Request(e) => Self::RequestEvent(e),
        }
    }
}

/// One write as read from the command stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteCommand {
    /// Author of the write.
    pub caller: Caller,
    /// ACL for a newly created record; private if omitted.
    #[serde(default)]
    pub acl: Acl,
    /// The record.
    pub record: WriteRecord,
}

impl WriteCommand {
    /// Parse one JSON line.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Before-save guards, commit and commit announcement.
pub struct WritePipeline<S> {
    store: Arc<S>,
    commits: CommitSender,
}

impl<S: ObjectStore> WritePipeline<S> {
    /// Create a pipeline writing to `store` and queueing commits on `commits`.
    pub fn new(store: Arc<S>, commits: CommitSender) -> Self {
        Self { store, commits }
    }

    /// Guard, commit and announce one write.
    ///
    /// `acl` applies to newly created records; updates keep the stored ACL.
    /// Waits while the commit queue is full.
    ///
    /// # Errors
    ///
    /// Guard rejections (`PermissionViolation`, `Forbidden`), `NotFound`
    /// from the form sync of a form event, store failures. Nothing is
    /// committed or announced on error.
    pub async fn write(
        &self,
        caller: &Caller,
        record: WriteRecord,
        acl: Acl,
    ) -> Result<CommitNotice, TriggerError> {
        match record {
            WriteRecord::Form(form) => {
                let original =
                    try_read_object::<S, Form>(self.store.as_ref(), RecordClass::Form, &form.form_id)
                        .await?;
                guard_form_write(caller, original.as_ref().map(|o| &o.record), &form)?;
                self.commit(original, form, acl).await
            }
            WriteRecord::Request(request) => {
                let original = try_read_object::<S, Request>(
                    self.store.as_ref(),
                    RecordClass::Request,
                    &request.request_id,
                )
                .await?;
                guard_request_write(caller, original.as_ref().map(|o| &o.record), &request)?;
                self.commit(original, request, acl).await
            }
            WriteRecord::FormEvent(event) => {
                before_save_event(caller, &EventRecord::Form(event.clone()))?;
                sync_form(self.store.as_ref(), &event).await?;
                // Every form event is a distinct fact.
                self.commit(None, event, acl).await
            }
            WriteRecord::RequestEvent(mut event) => {
                before_save_event(caller, &EventRecord::Request(event.clone()))?;
                // A request event is stored once per kind; confirmation
                // updates that row.
                let original = try_read_object::<S, RequestEvent>(
                    self.store.as_ref(),
                    event.class(),
                    &event.request_id,
                )
                .await?;
                event.notified = original.as_ref().is_some_and(|o| o.record.notified);
                if event.value.is_none() {
                    event.value = original.as_ref().and_then(|o| o.record.value);
                }
                self.commit(original, event, acl).await
            }
        }
    }

    async fn commit<R: Record>(
        &self,
        original: Option<Stored<R>>,
        record: R,
        acl: Acl,
    ) -> Result<CommitNotice, TriggerError> {
        let stored = match original {
            Some(original) => Stored {
                id: original.id,
                record,
                acl: original.acl,
            },
            None => Stored::new(record, acl),
        };
        let snapshot =
            serde_json::to_value(&stored.record).map_err(|e| StoreError::Serialization {
                class: stored.class(),
                reason: e.to_string(),
            })?;
        self.store.save(&stored).await?;

        let notice = CommitNotice {
            class: stored.class(),
            object_id: stored.id,
            key: stored
                .record
                .key()
                .map(|k| k.to_string())
                .unwrap_or_default(),
            delivery: 1,
            snapshot,
        };
        info!(class = %notice.class, key = %notice.key, "[runtime] Committed");
        self.announce(notice.clone()).await;
        Ok(notice)
    }

    /// Queue a commit notice for the reaction handler.
    ///
    /// The commit stands even if the handler is gone; that case is logged
    /// by the queue as an error.
    pub async fn announce(&self, notice: CommitNotice) {
        if self.commits.send(notice).await.is_ok() {
            debug!("[runtime] Commit announced");
        }
    }
}
