//! Column lock and privileged-authorship checks.

use shared_types::{Caller, RecordClass, TriggerError};
use tracing::warn;

/// Check one protected column of a write.
///
/// `original` is `None` for a create, `Some(old_value)` for an update.
/// Unset columns are `None`.
///
/// - privileged caller: always passes
/// - update: new value must equal the stored one
/// - create: new value must be unset
pub fn check_locked<T: PartialEq>(
    class: RecordClass,
    field: &'static str,
    caller: &Caller,
    original: Option<&Option<T>>,
    new: &Option<T>,
) -> Result<(), TriggerError> {
    if caller.is_privileged() {
        return Ok(());
    }

    let reason = match original {
        Some(old) if old != new => format!("cannot change column {}", field),
        None if new.is_some() => format!("cannot set not null value for column {}", field),
        _ => return Ok(()),
    };

    warn!(
        "[pf-02] Rejected write to {}.{} by {}: {}",
        class, field, caller, reason
    );
    Err(TriggerError::PermissionViolation {
        class,
        field,
        reason,
    })
}

/// Reject any write of `class` not made with the master credential.
pub fn require_privileged(class: RecordClass, caller: &Caller) -> Result<(), TriggerError> {
    if caller.is_privileged() {
        return Ok(());
    }

    warn!("[pf-02] Rejected {} write by {}", class, caller);
    Err(TriggerError::Forbidden {
        class,
        caller: caller.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::UserId;

    fn client() -> Caller {
        Caller::User(UserId::new("u1"))
    }

    #[test]
    fn test_privileged_bypasses_everything() {
        let result = check_locked(
            RecordClass::Request,
            "status",
            &Caller::Privileged,
            Some(&Some(1u8)),
            &Some(2u8),
        );
        assert!(result.is_ok());
        assert!(check_locked(RecordClass::Request, "status", &Caller::Privileged, None, &Some(2u8)).is_ok());
    }

    #[test]
    fn test_unprivileged_update_same_value_passes() {
        assert!(check_locked(RecordClass::Form, "isEnabled", &client(), Some(&Some(true)), &Some(true)).is_ok());
        assert!(check_locked::<bool>(RecordClass::Form, "isEnabled", &client(), Some(&None), &None).is_ok());
    }

    #[test]
    fn test_unprivileged_update_changed_value_fails() {
        let err = check_locked(RecordClass::Form, "isEnabled", &client(), Some(&Some(true)), &Some(false))
            .unwrap_err();
        assert_eq!(
            err,
            TriggerError::PermissionViolation {
                class: RecordClass::Form,
                field: "isEnabled",
                reason: "cannot change column isEnabled".to_string(),
            }
        );
    }

    #[test]
    fn test_unprivileged_update_clearing_value_fails() {
        let result = check_locked(RecordClass::Request, "value", &client(), Some(&Some(5u8)), &None);
        assert!(matches!(result, Err(TriggerError::PermissionViolation { field: "value", .. })));
    }

    #[test]
    fn test_unprivileged_create_must_leave_unset() {
        assert!(check_locked::<u8>(RecordClass::Request, "status", &Caller::Anonymous, None, &None).is_ok());
        let err = check_locked(RecordClass::Request, "status", &Caller::Anonymous, None, &Some(1u8))
            .unwrap_err();
        assert!(err.to_string().contains("cannot set not null value for column status"));
    }

    #[test]
    fn test_require_privileged() {
        assert!(require_privileged(RecordClass::RequestCreated, &Caller::Privileged).is_ok());
        let err = require_privileged(RecordClass::RequestCreated, &client()).unwrap_err();
        assert!(matches!(err, TriggerError::Forbidden { class: RecordClass::RequestCreated, .. }));
    }
}
