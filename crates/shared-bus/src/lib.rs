//! # Shared Bus - Commit Queue and Result Bus
//!
//! Decouples the write path from after-save reactions.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  CommitNotice    ┌──────────────┐
//! │ Write path   │ ───────────────→ │ Handler loop │
//! │ (commit)     │  commit queue    │ (reactions)  │
//! └──────────────┘  (mpsc)          └──────┬───────┘
//!                                          │ TriggerEvent
//!                                          ▼
//!                                   ┌──────────────┐
//!                                   │  Result bus  │ ──→ observers
//!                                   │ (broadcast)  │
//!                                   └──────────────┘
//! ```
//!
//! Every commit reaches the handler exactly once per announcement; its
//! notice carries the record as written. Reactions report back with
//! `ReactionCompleted`, or `ReactionFailed` on the dead letter topic.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod commits;
pub mod errors;
pub mod events;
pub mod results;

// Re-export main types
pub use commits::{commit_queue, CommitReceiver, CommitSender};
pub use errors::BusError;
pub use events::{CommitNotice, EventFilter, EventTopic, TriggerEvent};
pub use results::{EventPublisher, ResultBus, Subscription};

/// Default buffer size of the commit queue and of each result subscriber.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
