//! # Request Lifecycle
//!
//! Unconfirmed request events driving the projections and receipt grants,
//! plus the write guards protecting them.
//!
//! ```text
//! RequestCreated(false) ──→ pending  + PreReceipt grant (approval forms)
//! RequestApproved(false) ─→ approved + PostReceipt grant
//! RequestRejected(false) ─→ rejected
//! ```

#[cfg(test)]
mod tests {
    use pf_03_event_log::{EventKind, FormEvent, RequestEvent};
    use shared_types::{
        Acl, Amount, Caller, ObjectStore, Receipt, RecordClass, Request, RequestStatus,
        TriggerError, UserRef,
    };
    use trigger_runtime::WriteRecord;

    use crate::integration::harness::{sender, summary, Harness, Setup, FORM_ID, REQUEST_ID};

    fn created(confirmed: bool) -> RequestEvent {
        RequestEvent::created(REQUEST_ID.into(), Amount::from(1_000_000u64), confirmed)
    }

    fn decided(kind: EventKind) -> RequestEvent {
        RequestEvent::new(kind, REQUEST_ID.into(), false)
    }

    // =========================================================================
    // PROJECTION SYNC
    // =========================================================================

    #[tokio::test]
    async fn test_unconfirmed_created_makes_request_pending() {
        let mut h = Harness::new().await;
        let (_, result) = h.observe(created(false)).await;
        assert!(summary(&result).starts_with("sync applied"));

        let request = h.request().await.record;
        assert_eq!(request.status, Some(RequestStatus::Pending));
        assert_eq!(request.value, Some(Amount::from(1_000_000u64)));
        assert_eq!(request.creator, Some(UserRef::new("0xowner")));

        assert!(h.transport.sent().is_empty());
        assert!(h.email_logs().is_empty());
    }

    #[tokio::test]
    async fn test_full_approval_path() {
        let mut h = Harness::new().await;
        h.observe(created(false)).await;
        let (_, result) = h.observe(decided(EventKind::RequestApproved)).await;

        assert!(summary(&result).contains("PostReceipt granted"));
        assert_eq!(h.request().await.record.status, Some(RequestStatus::Approved));
        assert!(h.sender_can_read(RecordClass::PreReceipt).await);
        assert!(h.sender_can_read(RecordClass::PostReceipt).await);
    }

    #[tokio::test]
    async fn test_rejection_grants_nothing_new() {
        let mut h = Harness::new().await;
        h.observe(created(false)).await;
        let (_, result) = h.observe(decided(EventKind::RequestRejected)).await;

        assert!(summary(&result).contains("not applicable"));
        assert_eq!(h.request().await.record.status, Some(RequestStatus::Rejected));
        assert!(!h.sender_can_read(RecordClass::PostReceipt).await);
    }

    #[tokio::test]
    async fn test_redelivery_is_idempotent() {
        let mut h = Harness::new().await;
        let (notice, _) = h.observe(created(false)).await;
        let before = h.request().await;
        let saves = h.runtime.store().save_count();

        let result = h.redeliver(&notice).await;
        assert!(summary(&result).contains("sync already applied"));
        assert!(summary(&result).contains("already readable"));
        assert_eq!(h.request().await, before);
        assert_eq!(h.runtime.store().save_count(), saves);
    }

    #[tokio::test]
    async fn test_confirmation_racing_submission_still_syncs() {
        let mut h = Harness::new().await;
        let submitted = h.write_event(created(false)).await;
        let confirmed = h.write_event(created(true)).await;
        assert_eq!(submitted.object_id, confirmed.object_id);

        let first = h.result_for(&submitted).await;
        assert!(summary(&first).starts_with("sync applied"));
        let second = h.result_for(&confirmed).await;
        assert!(summary(&second).starts_with("notify Sent"));

        assert_eq!(h.request().await.record.status, Some(RequestStatus::Pending));
        assert!(h.sender_can_read(RecordClass::PreReceipt).await);
        assert_eq!(h.transport.sent().len(), 1);
        assert_eq!(h.email_logs().len(), 1);
    }

    #[tokio::test]
    async fn test_terminal_status_is_sticky() {
        let mut h = Harness::new().await;
        h.observe(created(false)).await;
        h.observe(decided(EventKind::RequestApproved)).await;

        let (_, result) = h.observe(decided(EventKind::RequestRolledBack)).await;
        assert_eq!(summary(&result), "sync ignored");
        assert_eq!(h.request().await.record.status, Some(RequestStatus::Approved));
    }

    #[tokio::test]
    async fn test_decision_before_creation_is_ignored() {
        let mut h = Harness::new().await;
        let (_, result) = h.observe(decided(EventKind::RequestApproved)).await;
        assert_eq!(summary(&result), "sync ignored");
        assert_eq!(h.request().await.record.status, None);
        assert!(!h.sender_can_read(RecordClass::PostReceipt).await);
    }

    // =========================================================================
    // CAPABILITY PROPAGATION
    // =========================================================================

    #[tokio::test]
    async fn test_pre_receipt_granted_on_approval_forms() {
        let mut h = Harness::new().await;
        h.observe(created(false)).await;

        assert!(h.sender_can_read(RecordClass::PreReceipt).await);
        assert!(!h.sender_can_read(RecordClass::PostReceipt).await);
    }

    #[tokio::test]
    async fn test_pre_receipt_not_gated_without_approval() {
        let mut h = Harness::with_setup(Setup {
            require_approval: false,
            ..Setup::default()
        })
        .await;
        let (_, result) = h.observe(created(false)).await;

        assert!(summary(&result).contains("not required"));
        assert!(!h.sender_can_read(RecordClass::PreReceipt).await);
    }

    #[tokio::test]
    async fn test_grants_are_never_duplicated() {
        let mut h = Harness::new().await;
        h.observe(created(false)).await;
        let (notice, _) = h.observe(decided(EventKind::RequestApproved)).await;
        h.redeliver(&notice).await;
        h.redeliver(&notice).await;

        let receipt = h
            .runtime
            .store()
            .first::<Receipt>(RecordClass::PostReceipt, &FORM_ID.into())
            .await
            .unwrap()
            .unwrap();
        // owner + sender
        assert_eq!(receipt.acl.len(), 2);
    }

    // =========================================================================
    // WRITE GUARDS
    // =========================================================================

    #[tokio::test]
    async fn test_sender_cannot_set_status() {
        let mut h = Harness::new().await;
        h.observe(created(false)).await;

        let mut tampered = h.request().await.record;
        tampered.status = Some(RequestStatus::Approved);
        let err = h
            .runtime
            .write(&Caller::User(sender()), WriteRecord::Request(tampered), Acl::private())
            .await
            .unwrap_err();

        assert!(matches!(err, TriggerError::PermissionViolation { field: "status", .. }));
        assert_eq!(h.request().await.record.status, Some(RequestStatus::Pending));
    }

    #[tokio::test]
    async fn test_sender_may_edit_contact_email() {
        let mut h = Harness::new().await;
        h.observe(created(false)).await;

        let edited = h.request().await.record.with_email("new@example.com");
        h.runtime
            .write(&Caller::User(sender()), WriteRecord::Request(edited), Acl::private())
            .await
            .unwrap();

        let stored = h.request().await;
        assert_eq!(stored.record.email.as_deref(), Some("new@example.com"));
        assert_eq!(stored.record.status, Some(RequestStatus::Pending));
    }

    #[tokio::test]
    async fn test_new_request_cannot_carry_value() {
        let h = Harness::new().await;
        let mut request = Request::new("43".into(), FORM_ID.into());
        request.value = Some(Amount::from(1));

        let err = h
            .runtime
            .write(&Caller::User(sender()), WriteRecord::Request(request), Acl::private())
            .await
            .unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(h.runtime.store().count(RecordClass::Request), 1);
    }

    #[tokio::test]
    async fn test_clients_cannot_write_events() {
        let h = Harness::new().await;
        for caller in [Caller::Anonymous, Caller::User(sender())] {
            let err = h
                .runtime
                .write(&caller, WriteRecord::RequestEvent(created(false)), Acl::private())
                .await
                .unwrap_err();
            assert!(matches!(err, TriggerError::Forbidden { .. }));
        }
        assert_eq!(h.runtime.store().count(RecordClass::RequestCreated), 0);
    }

    // =========================================================================
    // FORM EVENTS
    // =========================================================================

    #[tokio::test]
    async fn test_form_update_toggles_enabled_only() {
        let h = Harness::new().await;
        h.runtime
            .write(
                &Caller::Privileged,
                WriteRecord::FormEvent(FormEvent::Updated {
                    form_id: FORM_ID.into(),
                    is_enabled: false,
                }),
                Acl::private(),
            )
            .await
            .unwrap();

        let form = h.form().await.record;
        assert_eq!(form.is_enabled, Some(false));
        assert_eq!(form.require_approval, Some(true));
    }

    #[tokio::test]
    async fn test_form_event_without_form_aborts_write() {
        let h = Harness::new().await;
        let err = h
            .runtime
            .write(
                &Caller::Privileged,
                WriteRecord::FormEvent(FormEvent::Created {
                    form_id: "form-404".into(),
                    is_enabled: true,
                    require_approval: false,
                }),
                Acl::private(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TriggerError::NotFound { class: RecordClass::Form, .. }));
        assert_eq!(h.runtime.store().count(RecordClass::FormCreated), 1);
    }
}
