//! # Core Domain Entities
//!
//! Defines the records persisted in the object store by the ΨForms
//! workflow.
//!
//! ## Clusters
//!
//! - **Identifiers**: `FormId`, `RequestId`, `UserRef`, `UserId`, `ObjectId`
//! - **Projections**: `Form`, `Request`
//! - **Artifacts**: `Receipt` (Pre/Post), `CreatorProfile`
//! - **Audit**: `EmailLog`
//!
//! Field names serialize in camelCase so the persisted documents keep the
//! column names clients see (`formId`, `requireApproval`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::store::{Record, RecordClass};

// Re-export U256 from primitive-types; request values are on-chain amounts.
pub use primitive_types::U256;

/// On-chain amount attached to a request.
pub type Amount = U256;

// =============================================================================
// CLUSTER A: IDENTIFIERS
// =============================================================================

/// Business identifier of a form, as emitted on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub String);

/// Business identifier of a request.
///
/// The on-chain request id is an unsigned integer rendered as a decimal
/// digit string; it may exceed 64 bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

/// Wallet reference of a form creator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRef(pub String);

/// Store account id, as used in access-control lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Store-internal object identity.
///
/// Never used for cross-references between records: events and projections
/// are created independently and are linked by business identifiers only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub Uuid);

macro_rules! string_id {
    ($($name:ident),*) => {
        $(
            impl $name {
                /// Create from anything string-like.
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                /// Borrow the raw string.
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

string_id!(FormId, RequestId, UserRef, UserId);

impl ObjectId {
    /// Allocate a fresh random object id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// CLUSTER B: PROJECTIONS
// =============================================================================

/// Lifecycle of a request.
///
/// Persisted with the numeric codes the clients already understand
/// (pending = 1 ... rolledBack = 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RequestStatus {
    /// Submitted, waiting for the form owner.
    Pending,
    /// Approved by the form owner.
    Approved,
    /// Rejected by the form owner; payment refunded.
    Rejected,
    /// Rolled back on-chain.
    RolledBack,
}

impl RequestStatus {
    /// Numeric code stored in the `status` column.
    pub fn code(self) -> u8 {
        match self {
            Self::Pending => 1,
            Self::Approved => 2,
            Self::Rejected => 3,
            Self::RolledBack => 4,
        }
    }

    /// Check if the request may move from `current` (`None` = no status yet)
    /// to `next`.
    ///
    /// Only `absent -> pending` and `pending -> approved|rejected|rolledBack`
    /// are legal.
    pub fn can_transition(current: Option<Self>, next: Self) -> bool {
        matches!(
            (current, next),
            (None, Self::Pending)
                | (Some(Self::Pending), Self::Approved)
                | (Some(Self::Pending), Self::Rejected)
                | (Some(Self::Pending), Self::RolledBack)
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl From<RequestStatus> for u8 {
    fn from(status: RequestStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for RequestStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Approved),
            3 => Ok(Self::Rejected),
            4 => Ok(Self::RolledBack),
            other => Err(format!("unknown request status code {}", other)),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::RolledBack => "rolledBack",
        };
        f.write_str(name)
    }
}

/// Form projection.
///
/// Created by its owner with only unprotected fields set; `isEnabled` and
/// `requireApproval` are mirrored from `FormCreated` / `FormUpdated` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    /// Business identifier.
    pub form_id: FormId,
    /// Whether the form accepts new requests.
    #[serde(default)]
    pub is_enabled: Option<bool>,
    /// Whether requests must be approved by the owner.
    #[serde(default)]
    pub require_approval: Option<bool>,
    /// Wallet of the form owner.
    #[serde(default)]
    pub creator: Option<UserRef>,
}

impl Form {
    /// New form as a client would create it.
    pub fn new(form_id: FormId, creator: UserRef) -> Self {
        Self {
            form_id,
            is_enabled: None,
            require_approval: None,
            creator: Some(creator),
        }
    }

    /// Unset `requireApproval` counts as "no approval required".
    pub fn requires_approval(&self) -> bool {
        self.require_approval.unwrap_or(false)
    }
}

impl Record for Form {
    type Key = FormId;
    const KEY_FIELD: &'static str = "formId";

    fn class(&self) -> RecordClass {
        RecordClass::Form
    }

    fn key(&self) -> Option<FormId> {
        Some(self.form_id.clone())
    }
}

/// Request projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Business identifier.
    pub request_id: RequestId,
    /// Form the request was submitted to.
    pub form_id: FormId,
    /// Wallet of the form owner (protected).
    #[serde(default)]
    pub creator: Option<UserRef>,
    /// Amount paid with the request (protected).
    #[serde(default)]
    pub value: Option<Amount>,
    /// Lifecycle status (protected).
    #[serde(default)]
    pub status: Option<RequestStatus>,
    /// Sender's contact email.
    #[serde(default)]
    pub email: Option<String>,
}

impl Request {
    /// New request as a client would create it.
    pub fn new(request_id: RequestId, form_id: FormId) -> Self {
        Self {
            request_id,
            form_id,
            creator: None,
            value: None,
            status: None,
            email: None,
        }
    }

    /// Attach the sender's contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl Record for Request {
    type Key = RequestId;
    const KEY_FIELD: &'static str = "requestId";

    fn class(&self) -> RecordClass {
        RecordClass::Request
    }

    fn key(&self) -> Option<RequestId> {
        Some(self.request_id.clone())
    }
}

// =============================================================================
// CLUSTER C: ARTIFACTS
// =============================================================================

/// Which receipt artifact of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptKind {
    /// Visible to senders once their request is submitted.
    Pre,
    /// Visible to senders once their request is approved.
    Post,
}

/// Receipt artifact of a form; access is granted through its ACL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Pre or post receipt.
    pub kind: ReceiptKind,
    /// Form the receipt belongs to.
    pub form_id: FormId,
}

impl Receipt {
    /// Pre-receipt of a form.
    pub fn pre(form_id: FormId) -> Self {
        Self {
            kind: ReceiptKind::Pre,
            form_id,
        }
    }

    /// Post-receipt of a form.
    pub fn post(form_id: FormId) -> Self {
        Self {
            kind: ReceiptKind::Post,
            form_id,
        }
    }
}

impl Record for Receipt {
    type Key = FormId;
    const KEY_FIELD: &'static str = "formId";

    fn class(&self) -> RecordClass {
        match self.kind {
            ReceiptKind::Pre => RecordClass::PreReceipt,
            ReceiptKind::Post => RecordClass::PostReceipt,
        }
    }

    fn key(&self) -> Option<FormId> {
        Some(self.form_id.clone())
    }
}

/// Contact profile of a form creator. Read-only for the triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorProfile {
    /// Wallet of the creator.
    pub creator: UserRef,
    /// Notification address, if the creator left one.
    #[serde(default)]
    pub email: Option<String>,
}

impl Record for CreatorProfile {
    type Key = UserRef;
    const KEY_FIELD: &'static str = "creator";

    fn class(&self) -> RecordClass {
        RecordClass::CreatorProfile
    }

    fn key(&self) -> Option<UserRef> {
        Some(self.creator.clone())
    }
}

// =============================================================================
// CLUSTER D: AUDIT
// =============================================================================

/// Append-only record of an email about to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailLog {
    /// Recipient.
    pub email: String,
    /// Final subject line.
    pub subject: String,
    /// Final body.
    pub body: String,
}

impl Record for EmailLog {
    type Key = String;
    const KEY_FIELD: &'static str = "email";

    fn class(&self) -> RecordClass {
        RecordClass::EmailLog
    }

    fn key(&self) -> Option<String> {
        Some(self.email.clone())
    }
}
