//! # PF-03 Event Log
//!
//! Append-only facts observed on-chain and written by the backend.
//!
//! **Architecture:** records + before-save guard + reaction selection
//!
//! ## Event classes
//!
//! | Class | Key | Payload |
//! |-------|-----|---------|
//! | `FormCreated` | `formId` | `isEnabled`, `requireApproval` |
//! | `FormUpdated` | `formId` | `isEnabled` |
//! | `RequestCreated` | `requestId` | `confirmed`, `value` |
//! | `RequestApproved` | `requestId` | `confirmed` |
//! | `RequestRejected` | `requestId` | `confirmed` |
//! | `RequestRolledBack` | `requestId` | `confirmed` |
//!
//! Every event write must carry the master credential. A request event is
//! observed twice: once at submission (`confirmed = false`), which drives
//! projection sync and capability propagation, and once after external
//! confirmation (`confirmed = true`), which drives notifications only.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod events;
mod guard;
mod reaction;

pub use events::{EventKind, EventRecord, FormEvent, RequestEvent};
pub use guard::before_save_event;
pub use reaction::Reaction;
