//! Event records.

use serde::{Deserialize, Serialize};
use shared_types::{Amount, FormId, Record, RecordClass, RequestId, RequestStatus};
use std::fmt;

/// Kind of a request event; also its store class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Request submitted to a form.
    RequestCreated,
    /// Request approved by the form owner.
    RequestApproved,
    /// Request rejected by the form owner.
    RequestRejected,
    /// Request rolled back.
    RequestRolledBack,
}

impl EventKind {
    /// All request event kinds.
    pub const ALL: [EventKind; 4] = [
        Self::RequestCreated,
        Self::RequestApproved,
        Self::RequestRejected,
        Self::RequestRolledBack,
    ];

    /// Store class holding this kind.
    pub fn class(self) -> RecordClass {
        match self {
            Self::RequestCreated => RecordClass::RequestCreated,
            Self::RequestApproved => RecordClass::RequestApproved,
            Self::RequestRejected => RecordClass::RequestRejected,
            Self::RequestRolledBack => RecordClass::RequestRolledBack,
        }
    }

    /// Kind stored in `class`, if it is a request event class.
    pub fn from_class(class: RecordClass) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.class() == class)
    }

    /// Status the request projection moves to.
    pub fn target_status(self) -> RequestStatus {
        match self {
            Self::RequestCreated => RequestStatus::Pending,
            Self::RequestApproved => RequestStatus::Approved,
            Self::RequestRejected => RequestStatus::Rejected,
            Self::RequestRolledBack => RequestStatus::RolledBack,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.class(), f)
    }
}

/// A request event as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEvent {
    /// Discriminant.
    pub kind: EventKind,
    /// Request the fact is about.
    pub request_id: RequestId,
    /// `false` at submission time, `true` once externally confirmed.
    pub confirmed: bool,
    /// Paid amount; carried by `RequestCreated` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Amount>,
    /// Set once the confirmation email went out; owned by the reaction,
    /// never by the writer.
    #[serde(default, skip_serializing_if = "is_false")]
    pub notified: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl RequestEvent {
    /// New event of `kind` without a value.
    pub fn new(kind: EventKind, request_id: RequestId, confirmed: bool) -> Self {
        Self {
            kind,
            request_id,
            confirmed,
            value: None,
            notified: false,
        }
    }

    /// `RequestCreated` carrying the paid amount.
    pub fn created(request_id: RequestId, value: Amount, confirmed: bool) -> Self {
        Self {
            kind: EventKind::RequestCreated,
            request_id,
            confirmed,
            value: Some(value),
            notified: false,
        }
    }

    /// Same fact, as observed after confirmation.
    pub fn confirm(&self) -> Self {
        Self {
            confirmed: true,
            ..self.clone()
        }
    }
}

impl Record for RequestEvent {
    type Key = RequestId;
    const KEY_FIELD: &'static str = "requestId";

    fn class(&self) -> RecordClass {
        self.kind.class()
    }

    fn key(&self) -> Option<RequestId> {
        Some(self.request_id.clone())
    }
}

/// A form event as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FormEvent {
    /// Form registered on-chain.
    #[serde(rename = "FormCreated", rename_all = "camelCase")]
    Created {
        /// Form the fact is about.
        form_id: FormId,
        /// Initial enabled flag.
        is_enabled: bool,
        /// Whether requests need approval; fixed for the life of the form.
        require_approval: bool,
    },
    /// Form toggled on-chain.
    #[serde(rename = "FormUpdated", rename_all = "camelCase")]
    Updated {
        /// Form the fact is about.
        form_id: FormId,
        /// New enabled flag.
        is_enabled: bool,
    },
}

impl FormEvent {
    /// Form the fact is about.
    pub fn form_id(&self) -> &FormId {
        match self {
            Self::Created { form_id, .. } | Self::Updated { form_id, .. } => form_id,
        }
    }
}

impl Record for FormEvent {
    type Key = FormId;
    const KEY_FIELD: &'static str = "formId";

    fn class(&self) -> RecordClass {
        match self {
            Self::Created { .. } => RecordClass::FormCreated,
            Self::Updated { .. } => RecordClass::FormUpdated,
        }
    }

    fn key(&self) -> Option<FormId> {
        Some(self.form_id().clone())
    }
}

/// Any event record; the single dispatch point for triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRecord {
    /// `FormCreated` / `FormUpdated`.
    Form(FormEvent),
    /// One of the four request events.
    Request(RequestEvent),
}

impl EventRecord {
    /// Store class of the wrapped record.
    pub fn class(&self) -> RecordClass {
        match self {
            Self::Form(event) => event.class(),
            Self::Request(event) => event.class(),
        }
    }

    /// Business key, rendered.
    pub fn key(&self) -> String {
        match self {
            Self::Form(event) => event.form_id().to_string(),
            Self::Request(event) => event.request_id.to_string(),
        }
    }
}

impl From<FormEvent> for EventRecord {
    fn from(event: FormEvent) -> Self {
        Self::Form(event)
    }
}

impl From<RequestEvent> for EventRecord {
    fn from(event: RequestEvent) -> Self {
        Self::Request(event)
    }
}
