//! # PF-05 Capability Propagation
//!
//! Grants the sender of a request read access to the form's receipt
//! artifacts as the request progresses.
//!
//! | Event | Receipt | Condition |
//! |-------|---------|-----------|
//! | `RequestCreated` | `PreReceipt` | form requires approval |
//! | `RequestApproved` | `PostReceipt` | always |
//! | `RequestRejected` / `RequestRolledBack` | - | never |
//!
//! Grants are additive: read is set, write is explicitly denied, and no
//! entry is ever removed. A grant already in place is not re-issued.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod grant;
mod principals;

pub use grant::{grant_receipt_access, GrantOutcome};
pub use principals::{form_owner, request_sender};
