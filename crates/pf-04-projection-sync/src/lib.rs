//! # PF-04 Projection Sync
//!
//! Derives the long-lived `Form` and `Request` projections from event log
//! facts.
//!
//! **Architecture:** stateless async functions over the `ObjectStore` port
//!
//! ```text
//! FormCreated / FormUpdated ──before-save──→ sync_form ──→ Form
//!
//! Request* (confirmed = false) ──after-save──→ resolve_context
//!                                                  │
//!                                                  └──→ sync_request ──→ Request
//! ```
//!
//! ## Request status machine
//!
//! ```text
//! (absent) ──RequestCreated──→ pending ──RequestApproved───→ approved
//!                                  ├─────RequestRejected───→ rejected
//!                                  └─────RequestRolledBack─→ rolledBack
//! ```
//!
//! Replaying the event that produced the current status is a no-op. Any
//! other transition out of a terminal state is ignored and logged.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod context;
mod form;
mod outcome;
mod request;

pub use context::{resolve_context, RequestContext};
pub use form::sync_form;
pub use outcome::SyncOutcome;
pub use request::sync_request;
