//! # Shared Types Crate
//!
//! Records, identifiers, ACLs, the object store port and the error taxonomy
//! shared by every ΨForms trigger crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every persisted record type is defined here
//!   (event records live with the event log in `pf-03-event-log`).
//! - **Business keys only**: records reference each other through
//!   `FormId` / `RequestId` / `UserRef`, never through store identity.
//! - **Typed access**: no field is read by name at runtime; protected-field
//!   checks go through compile-time accessors.

pub mod acl;
pub mod entities;
pub mod errors;
pub mod security;
pub mod store;

pub use acl::{Acl, AclSubject, Permission, PUBLIC_KEY};
pub use entities::*;
pub use errors::*;
pub use security::Caller;
pub use store::{
    read_object, try_read_object, InMemoryObjectStore, ObjectStore, Record, RecordClass, Stored,
};
