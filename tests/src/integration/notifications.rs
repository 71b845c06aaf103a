//! # Notifications
//!
//! Confirmed request events: one email per confirmation, an audit entry
//! for every attempt, and no projection or ACL changes.

#[cfg(test)]
mod tests {
    use pf_01_hex_codec::{encode, REQUEST_ID_WIDTH};
    use pf_03_event_log::{EventKind, RequestEvent};
    use pf_06_notifications::Network;
    use shared_types::{Acl, Amount, Caller, RecordClass, RequestStatus};
    use trigger_runtime::WriteRecord;

    use crate::integration::harness::{
        sender, summary, Harness, Setup, OWNER_EMAIL, REQUEST_ID, SENDER_EMAIL,
    };

    fn hex_id() -> String {
        encode(REQUEST_ID, REQUEST_ID_WIDTH).unwrap()
    }

    fn event(kind: EventKind, confirmed: bool) -> RequestEvent {
        match kind {
            EventKind::RequestCreated => {
                RequestEvent::created(REQUEST_ID.into(), Amount::from(7), confirmed)
            }
            _ => RequestEvent::new(kind, REQUEST_ID.into(), confirmed),
        }
    }

    /// Observe `kind` unconfirmed, then confirmed.
    async fn settle(h: &mut Harness, kind: EventKind) {
        h.observe(event(kind, false)).await;
        h.observe(event(kind, true)).await;
    }

    #[tokio::test]
    async fn test_confirmed_creation_emails_form_creator_once() {
        let mut h = Harness::new().await;
        settle(&mut h, EventKind::RequestCreated).await;

        let sent = h.transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, OWNER_EMAIL);
        assert_eq!(
            sent[0].subject,
            format!("[ΨForms] You have a new request ({})", hex_id())
        );

        let logs = h.email_logs();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].body.contains(&hex_id()));
        assert!(logs[0].body.ends_with("Powered by https://psiforms.com/"));
    }

    #[tokio::test]
    async fn test_redelivered_confirmation_does_not_email_again() {
        let mut h = Harness::new().await;
        h.observe(event(EventKind::RequestCreated, false)).await;
        let (notice, _) = h.observe(event(EventKind::RequestCreated, true)).await;

        let replay = h.redeliver(&notice).await;
        assert_eq!(summary(&replay), "notify already sent");

        // A backend re-write of the confirmed row does not reset the marker.
        let (_, rewrite) = h.observe(event(EventKind::RequestCreated, true)).await;
        assert_eq!(summary(&rewrite), "notify already sent");

        assert_eq!(h.transport.sent().len(), 1);
        assert_eq!(h.email_logs().len(), 1);
    }

    #[tokio::test]
    async fn test_confirmation_changes_no_projection() {
        let mut h = Harness::new().await;
        h.observe(event(EventKind::RequestCreated, false)).await;
        let request = h.request().await;

        let (_, result) = h.observe(event(EventKind::RequestCreated, true)).await;
        assert!(summary(&result).starts_with("notify"));
        assert_eq!(h.request().await, request);
        assert_eq!(h.runtime.store().count(RecordClass::RequestCreated), 1);
    }

    #[tokio::test]
    async fn test_confirmed_approval_emails_sender() {
        let mut h = Harness::new().await;
        settle(&mut h, EventKind::RequestCreated).await;
        settle(&mut h, EventKind::RequestApproved).await;

        let sent = h.transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].to, SENDER_EMAIL);
        assert!(sent[1].body.contains(&format!("/requests/{}/post-receipt", hex_id())));
        assert_eq!(h.request().await.record.status, Some(RequestStatus::Approved));
    }

    #[tokio::test]
    async fn test_confirmed_rejection_emails_stored_sender_address() {
        let mut h = Harness::new().await;
        settle(&mut h, EventKind::RequestCreated).await;
        h.observe(event(EventKind::RequestRejected, false)).await;

        let request = h.request().await.record.with_email("changed@example.com");
        h.runtime
            .write(
                &Caller::User(sender()),
                WriteRecord::Request(request),
                Acl::private(),
            )
            .await
            .unwrap();
        h.observe(event(EventKind::RequestRejected, true)).await;

        let sent = h.transport.sent();
        assert_eq!(sent.last().unwrap().to, "changed@example.com");
        assert!(sent.last().unwrap().body.contains("refunded"));
    }

    #[tokio::test]
    async fn test_confirmed_rollback_sends_nothing() {
        let mut h = Harness::new().await;
        h.observe(event(EventKind::RequestCreated, false)).await;
        settle(&mut h, EventKind::RequestRolledBack).await;

        assert!(h.transport.sent().is_empty());
        assert!(h.email_logs().is_empty());
        assert_eq!(h.request().await.record.status, Some(RequestStatus::RolledBack));
    }

    #[tokio::test]
    async fn test_testnet_subject_prefix() {
        let mut h = Harness::with_setup(Setup {
            network: Network::Testnet,
            ..Setup::default()
        })
        .await;
        settle(&mut h, EventKind::RequestCreated).await;

        let sent = h.transport.sent();
        assert!(sent[0].subject.starts_with("[ΨForms:TestNet] "));
        assert!(sent[0].body.ends_with("Powered by https://testnet.psiforms.com/"));
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_audit_entry() {
        let mut h = Harness::with_setup(Setup {
            transport_failures: 10,
            ..Setup::default()
        })
        .await;
        h.observe(event(EventKind::RequestCreated, false)).await;
        let (_, result) = h.observe(event(EventKind::RequestCreated, true)).await;

        // Delivery failure is not a reaction failure.
        assert!(summary(&result).contains("Failed"));
        assert_eq!(h.transport.attempts(), 3);
        assert!(h.transport.sent().is_empty());
        assert_eq!(h.email_logs().len(), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let mut h = Harness::with_setup(Setup {
            transport_failures: 1,
            ..Setup::default()
        })
        .await;
        settle(&mut h, EventKind::RequestCreated).await;

        assert_eq!(h.transport.attempts(), 2);
        assert_eq!(h.transport.sent().len(), 1);
        assert_eq!(h.email_logs().len(), 1);
    }
}
