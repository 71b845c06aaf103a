//! Declarative protected-column table.
//!
//! Each guarded record type lists its protected columns once, with a typed
//! accessor per column. `guard_write` walks that list.

use shared_types::{Caller, Form, Record, RecordClass, Request, TriggerError};

use crate::locked::check_locked;

/// One protected column of `R`.
pub struct ProtectedField<R> {
    /// Column name as clients see it.
    pub name: &'static str,
    /// Runs `check_locked` on this column; `original` is `None` on create.
    pub check: fn(&Caller, Option<&R>, &R) -> Result<(), TriggerError>,
}

/// Record type with protected columns.
pub trait ProtectedRecord: Record {
    /// Store class, for error reporting.
    const CLASS: RecordClass;

    /// Protected columns, in check order.
    const PROTECTED: &'static [ProtectedField<Self>];
}

macro_rules! protected_field {
    ($record:ty, $name:literal, $column:ident) => {
        ProtectedField {
            name: $name,
            check: |caller: &Caller, original: Option<&$record>, new: &$record| {
                check_locked(
                    <$record as ProtectedRecord>::CLASS,
                    $name,
                    caller,
                    original.map(|o| &o.$column),
                    &new.$column,
                )
            },
        }
    };
}

impl ProtectedRecord for Form {
    const CLASS: RecordClass = RecordClass::Form;
    const PROTECTED: &'static [ProtectedField<Self>] = &[
        protected_field!(Form, "isEnabled", is_enabled),
        protected_field!(Form, "requireApproval", require_approval),
    ];
}

impl ProtectedRecord for Request {
    const CLASS: RecordClass = RecordClass::Request;
    const PROTECTED: &'static [ProtectedField<Self>] = &[
        protected_field!(Request, "creator", creator),
        protected_field!(Request, "status", status),
        protected_field!(Request, "value", value),
    ];
}

/// Names of the protected columns of `R`.
pub fn protected_columns<R: ProtectedRecord>() -> Vec<&'static str> {
    R::PROTECTED.iter().map(|f| f.name).collect()
}

/// Before-save guard for a client write of `R`.
///
/// Stops at the first violating column; nothing of the write is applied.
pub fn guard_write<R: ProtectedRecord>(
    caller: &Caller,
    original: Option<&R>,
    new: &R,
) -> Result<(), TriggerError> {
    if caller.is_privileged() {
        return Ok(());
    }
    R::PROTECTED
        .iter()
        .try_for_each(|field| (field.check)(caller, original, new))
}

/// Before-save guard for a client write of a `Form`.
pub fn guard_form_write(caller: &Caller, original: Option<&Form>, new: &Form) -> Result<(), TriggerError> {
    guard_write(caller, original, new)
}

/// Before-save guard for a client write of a `Request`.
pub fn guard_request_write(
    caller: &Caller,
    original: Option<&Request>,
    new: &Request,
) -> Result<(), TriggerError> {
    guard_write(caller, original, new)
}
