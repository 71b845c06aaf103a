//! # PF-06 Notifications
//!
//! Sends one email per confirmed request event and keeps an audit trail of
//! every message attempted.
//!
//! **Architecture:** `NotificationDispatcher` over two outbound ports,
//! `ObjectStore` (audit log, profile lookup) and `EmailTransport`.
//!
//! ## Messages
//!
//! | Event | Recipient | Subject |
//! |-------|-----------|---------|
//! | `RequestCreated` | form creator (via `CreatorProfile`) | `You have a new request (<id>)` |
//! | `RequestApproved` | request sender (`Request.email`) | `Your request is approved (<id>)` |
//! | `RequestRejected` | request sender (`Request.email`) | `Your request is rejected (<id>)` |
//! | `RequestRolledBack` | - | - |
//!
//! `<id>` is the request id rendered as 32 hex digits. Every subject gets
//! the network prefix and every body a "Powered by" footer.
//!
//! ## Delivery
//!
//! 1. `EmailLog` appended with a private ACL; failure aborts the attempt.
//! 2. Transport call, retried with exponential backoff. A final failure is
//!    logged and swallowed.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod dispatcher;
mod message;
mod transport;
mod urls;

pub use config::{EmailConfig, Network, RetryConfig};
pub use dispatcher::{DeliveryOutcome, NotificationDispatcher};
pub use message::{compose, EmailMessage};
pub use transport::{EmailLabsTransport, EmailTransport, RecordingTransport, TransportError};
pub use urls::UrlBuilder;
