//! # PF-02 Access Guard
//!
//! Before-save validation of client writes.
//!
//! **Architecture:** synchronous guards, invoked by the trigger runtime
//! before a write commits. Any failure aborts the whole write.
//!
//! ## Rules
//!
//! | Record | Protected columns |
//! |--------|-------------------|
//! | Form | `isEnabled`, `requireApproval` |
//! | Request | `creator`, `status`, `value` |
//! | every event class | whole record (privileged authorship only) |
//!
//! For a protected column, an unprivileged update must leave the value
//! untouched and an unprivileged create must leave it unset. The backend
//! (master credential) bypasses every check.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod locked;
mod policy;

pub use locked::{check_locked, require_privileged};
pub use policy::{
    guard_form_write, guard_request_write, guard_write, protected_columns, ProtectedField,
    ProtectedRecord,
};
