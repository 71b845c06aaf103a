//! # Error Types
//!
//! Error taxonomy shared by every trigger.
//!
//! - `PermissionViolation` / `Forbidden` abort a write before it commits and
//!   are the only errors the originating client sees.
//! - `NotFound` aborts the enclosing reaction. After commit it cannot undo
//!   the triggering write, so it is logged as an inconsistency that needs
//!   out-of-band reconciliation.

use thiserror::Error;

use crate::store::RecordClass;

/// Errors raised by the object store adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A record could not be encoded or decoded.
    #[error("Serialization error for {class}: {reason}")]
    Serialization {
        /// Record class being encoded/decoded.
        class: RecordClass,
        /// Underlying serializer message.
        reason: String,
    },

    /// The store rejected or failed the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by before-save guards and after-save reactions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TriggerError {
    /// Unprivileged caller tried to set or alter a protected field.
    #[error("Permission violation on {class}.{field}: {reason}")]
    PermissionViolation {
        /// Record class being written.
        class: RecordClass,
        /// Offending column.
        field: &'static str,
        /// What was attempted.
        reason: String,
    },

    /// Unprivileged caller tried to write a privileged-only record.
    #[error("Forbidden: {caller} may not write {class}")]
    Forbidden {
        /// Record class being written.
        class: RecordClass,
        /// Who attempted the write.
        caller: String,
    },

    /// A required cross-reference did not resolve.
    #[error("Cannot find {class} with {field} = {value}")]
    NotFound {
        /// Class that was queried.
        class: RecordClass,
        /// Column used for the equality query.
        field: &'static str,
        /// Value looked up.
        value: String,
    },

    /// A resolved record lacks data the reaction needs.
    #[error("Inconsistent {class} {id}: {reason}")]
    Inconsistent {
        /// Record class.
        class: RecordClass,
        /// Business identifier.
        id: String,
        /// Missing or contradictory data.
        reason: String,
    },

    /// An identifier could not be rendered.
    #[error("Invalid identifier {value:?}: {reason}")]
    InvalidIdentifier {
        /// Raw identifier.
        value: String,
        /// Codec message.
        reason: String,
    },

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TriggerError {
    /// True for errors that reject a client write synchronously.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::PermissionViolation { .. } | Self::Forbidden { .. }
        )
    }
}
