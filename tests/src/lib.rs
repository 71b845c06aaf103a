//! # ΨForms Test Suite
//!
//! Cross-crate scenarios driven through `TriggerRuntime`, with an
//! in-memory object store and a recording email transport.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs        # Seeded runtime + helpers
//!     ├── lifecycle.rs      # Projection sync, grants, guards
//!     └── notifications.rs  # Confirmed events, emails, audit log
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pf-tests
//! cargo test -p pf-tests integration::lifecycle::
//! ```

#![allow(dead_code)]

pub mod integration;
