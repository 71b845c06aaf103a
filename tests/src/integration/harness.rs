//! # Test Harness
//!
//! A started `TriggerRuntime` seeded the way the dApp leaves the store
//! right before a request is submitted on-chain:
//!
//! - Form `form-1` created by `owner` (creator wallet `0xowner`)
//! - `FormCreated` observed by the backend
//! - Pre and post receipts owned by `owner`
//! - Creator profile with `owner@example.com`
//! - Request `42` created by `sender`, contact `sender@example.com`

use std::sync::Arc;
use std::time::Duration;

use pf_03_event_log::{FormEvent, RequestEvent};
use pf_06_notifications::{Network, RecordingTransport, RetryConfig};
use shared_bus::{CommitNotice, Subscription, TriggerEvent};
use shared_types::{
    Acl, AclSubject, Caller, CreatorProfile, EmailLog, Form, InMemoryObjectStore, ObjectStore,
    Receipt, RecordClass, Request, Stored, UserId,
};
use trigger_runtime::{RuntimeConfig, TriggerRuntime, WriteRecord};

/// Request id used by every scenario.
pub const REQUEST_ID: &str = "42";
/// Form id used by every scenario.
pub const FORM_ID: &str = "form-1";
/// Creator contact address.
pub const OWNER_EMAIL: &str = "owner@example.com";
/// Sender contact address.
pub const SENDER_EMAIL: &str = "sender@example.com";

/// Harness options.
#[derive(Debug, Clone, Copy)]
pub struct Setup {
    /// `requireApproval` of the seeded form.
    pub require_approval: bool,
    /// Deployment network.
    pub network: Network,
    /// Transport calls failing before the first success.
    pub transport_failures: u32,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            require_approval: true,
            network: Network::Mainnet,
            transport_failures: 0,
        }
    }
}

/// Seeded, started runtime.
pub struct Harness {
    /// Runtime under test.
    pub runtime: TriggerRuntime<InMemoryObjectStore, RecordingTransport>,
    /// Recording transport.
    pub transport: Arc<RecordingTransport>,
    /// Reaction results.
    results: Subscription,
    /// Results received while waiting for another commit.
    unclaimed: Vec<TriggerEvent>,
}

/// Form owner account.
pub fn owner() -> UserId {
    UserId::new("owner")
}

/// Request sender account.
pub fn sender() -> UserId {
    UserId::new("sender")
}

impl Harness {
    /// Harness with default options.
    pub async fn new() -> Self {
        Self::with_setup(Setup::default()).await
    }

    /// Harness with explicit options.
    pub async fn with_setup(setup: Setup) -> Self {
        let config = RuntimeConfig {
            network: setup.network,
            retry: RetryConfig {
                max_attempts: 3,
                initial_backoff_ms: 1,
                max_backoff_ms: 2,
            },
            dry_run: true,
            ..RuntimeConfig::default()
        };
        let transport = Arc::new(RecordingTransport::failing(setup.transport_failures));
        let runtime = TriggerRuntime::new(
            &config,
            Arc::new(InMemoryObjectStore::new()),
            Arc::clone(&transport),
        )
        .expect("valid config");
        runtime.start();
        let results = runtime.subscribe_results();

        let harness = Self {
            runtime,
            transport,
            results,
            unclaimed: Vec::new(),
        };
        harness.seed(setup.require_approval).await;
        harness
    }

    async fn seed(&self, require_approval: bool) {
        let owner = owner();
        self.runtime
            .write(
                &Caller::User(owner.clone()),
                WriteRecord::Form(Form::new(FORM_ID.into(), "0xowner".into())),
                Acl::owned_by(&owner, true),
            )
            .await
            .expect("owner creates form");
        self.runtime
            .write(
                &Caller::Privileged,
                WriteRecord::FormEvent(FormEvent::Created {
                    form_id: FORM_ID.into(),
                    is_enabled: true,
                    require_approval,
                }),
                Acl::private(),
            )
            .await
            .expect("backend observes FormCreated");

        let store = self.runtime.store();
        for receipt in [Receipt::pre(FORM_ID.into()), Receipt::post(FORM_ID.into())] {
            store
                .save(&Stored::new(receipt, Acl::owned_by(&owner, false)))
                .await
                .expect("seed receipt");
        }
        store
            .save(&Stored::new(
                CreatorProfile {
                    creator: "0xowner".into(),
                    email: Some(OWNER_EMAIL.to_string()),
                },
                Acl::private(),
            ))
            .await
            .expect("seed profile");

        let mut request_acl = Acl::owned_by(&sender(), false);
        request_acl.set_read_access(&AclSubject::User(owner), true);
        self.runtime
            .write(
                &Caller::User(sender()),
                WriteRecord::Request(
                    Request::new(REQUEST_ID.into(), FORM_ID.into()).with_email(SENDER_EMAIL),
                ),
                request_acl,
            )
            .await
            .expect("sender creates request");
    }

    /// Backend writes a request event; waits for its reaction result.
    pub async fn observe(&mut self, event: RequestEvent) -> (CommitNotice, TriggerEvent) {
        let notice = self.write_event(event).await;
        let result = self.result_for(&notice).await;
        (notice, result)
    }

    /// Backend writes a request event without waiting for its reaction.
    pub async fn write_event(&self, event: RequestEvent) -> CommitNotice {
        self.runtime
            .write(&Caller::Privileged, WriteRecord::RequestEvent(event), Acl::private())
            .await
            .expect("backend event write")
    }

    /// Announce a commit again; waits for its reaction result.
    pub async fn redeliver(&mut self, notice: &CommitNotice) -> TriggerEvent {
        let replay = self.runtime.redeliver(notice).await;
        self.result_for(&replay).await
    }

    /// Reaction result of `notice`; results of other commits are kept for
    /// later calls.
    pub async fn result_for(&mut self, notice: &CommitNotice) -> TriggerEvent {
        if let Some(pos) = self.unclaimed.iter().position(|e| e.notice() == notice) {
            return self.unclaimed.remove(pos);
        }
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), self.results.recv())
                .await
                .expect("reaction result in time")
                .expect("bus open");
            if event.notice() == notice {
                return event;
            }
            self.unclaimed.push(event);
        }
    }

    /// Current request projection.
    pub async fn request(&self) -> Stored<Request> {
        self.runtime
            .store()
            .first::<Request>(RecordClass::Request, &REQUEST_ID.into())
            .await
            .expect("store read")
            .expect("request exists")
    }

    /// Current form projection.
    pub async fn form(&self) -> Stored<Form> {
        self.runtime
            .store()
            .first::<Form>(RecordClass::Form, &FORM_ID.into())
            .await
            .expect("store read")
            .expect("form exists")
    }

    /// Whether the sender can read the receipt of `class`.
    pub async fn sender_can_read(&self, class: RecordClass) -> bool {
        let receipt = self
            .runtime
            .store()
            .first::<Receipt>(class, &FORM_ID.into())
            .await
            .expect("store read")
            .expect("receipt exists");
        receipt.acl.read_access(&AclSubject::User(sender()))
    }

    /// Every audit log entry so far.
    pub fn email_logs(&self) -> Vec<EmailLog> {
        self.runtime
            .store()
            .all::<EmailLog>(RecordClass::EmailLog)
            .expect("store read")
            .into_iter()
            .map(|stored| stored.record)
            .collect()
    }
}

/// Summary of a completed reaction; panics on a failed one.
pub fn summary(result: &TriggerEvent) -> &str {
    match result {
        TriggerEvent::ReactionCompleted { summary, .. } => summary,
        other => panic!("reaction did not complete: {:?}", other),
    }
}
