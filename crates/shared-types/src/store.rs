//! # Object Store Port
//!
//! The object store is an external collaborator. This module pins down the
//! narrow interface the triggers consume:
//!
//! - typed records, each with one business key used for equality queries
//! - per-record ACLs
//! - atomic single-record save
//!
//! Production: the hosted store behind the trigger runtime.
//! Testing: `InMemoryObjectStore` (below).

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::acl::Acl;
use crate::entities::ObjectId;
use crate::errors::{StoreError, TriggerError};

/// Store class of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordClass {
    /// Form projection.
    Form,
    /// Form created on-chain.
    FormCreated,
    /// Form updated on-chain.
    FormUpdated,
    /// Request projection.
    Request,
    /// Request created on-chain.
    RequestCreated,
    /// Request approved on-chain.
    RequestApproved,
    /// Request rejected on-chain.
    RequestRejected,
    /// Request rolled back on-chain.
    RequestRolledBack,
    /// Pre-receipt artifact.
    PreReceipt,
    /// Post-receipt artifact.
    PostReceipt,
    /// Creator contact profile.
    CreatorProfile,
    /// Email audit log.
    EmailLog,
}

impl RecordClass {
    /// Class name as the store knows it.
    pub fn name(self) -> &'static str {
        match self {
            Self::Form => "Form",
            Self::FormCreated => "FormCreated",
            Self::FormUpdated => "FormUpdated",
            Self::Request => "Request",
            Self::RequestCreated => "RequestCreated",
            Self::RequestApproved => "RequestApproved",
            Self::RequestRejected => "RequestRejected",
            Self::RequestRolledBack => "RequestRolledBack",
            Self::PreReceipt => "PreReceipt",
            Self::PostReceipt => "PostReceipt",
            Self::CreatorProfile => "CreatorProfile",
            Self::EmailLog => "EmailLog",
        }
    }

    /// Classes holding immutable event facts.
    pub fn is_event(self) -> bool {
        matches!(
            self,
            Self::FormCreated
                | Self::FormUpdated
                | Self::RequestCreated
                | Self::RequestApproved
                | Self::RequestRejected
                | Self::RequestRolledBack
        )
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A strongly typed store record.
///
/// Several classes may share one Rust type (the four request events, the
/// two receipts), so the class is read from the value.
pub trait Record:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Business key used for equality queries.
    type Key: Clone + fmt::Debug + fmt::Display + Serialize + Send + Sync;

    /// Column holding the business key.
    const KEY_FIELD: &'static str;

    /// Store class of this value.
    fn class(&self) -> RecordClass;

    /// Business key of this value.
    fn key(&self) -> Option<Self::Key>;
}

/// A record together with its store identity and ACL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored<R> {
    /// Store-internal identity.
    pub id: ObjectId,
    /// Typed payload.
    pub record: R,
    /// Access-control list.
    pub acl: Acl,
}

impl<R: Record> Stored<R> {
    /// Wrap a new, not yet saved record.
    pub fn new(record: R, acl: Acl) -> Self {
        Self {
            id: ObjectId::new(),
            record,
            acl,
        }
    }

    /// Store class of the wrapped record.
    pub fn class(&self) -> RecordClass {
        self.record.class()
    }
}

/// Object store - outbound port.
///
/// All calls are made with the privileged credential; guards on client
/// writes run in the trigger layer before `save` is reached.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// First record of `class` whose business key equals `key`.
    async fn first<R: Record>(
        &self,
        class: RecordClass,
        key: &R::Key,
    ) -> Result<Option<Stored<R>>, StoreError>;

    /// Record of `class` by store identity.
    async fn get<R: Record>(
        &self,
        class: RecordClass,
        id: ObjectId,
    ) -> Result<Option<Stored<R>>, StoreError>;

    /// Atomically insert or overwrite one record.
    async fn save<R: Record>(&self, object: &Stored<R>) -> Result<(), StoreError>;
}

/// Equality lookup that may legitimately find nothing.
pub async fn try_read_object<S, R>(
    store: &S,
    class: RecordClass,
    key: &R::Key,
) -> Result<Option<Stored<R>>, TriggerError>
where
    S: ObjectStore,
    R: Record,
{
    Ok(store.first::<R>(class, key).await?)
}

/// Equality lookup of a required cross-reference.
///
/// Zero rows is a `NotFound` naming the class, column and value.
pub async fn read_object<S, R>(
    store: &S,
    class: RecordClass,
    key: &R::Key,
) -> Result<Stored<R>, TriggerError>
where
    S: ObjectStore,
    R: Record,
{
    try_read_object::<S, R>(store, class, key)
        .await?
        .ok_or_else(|| TriggerError::NotFound {
            class,
            field: R::KEY_FIELD,
            value: key.to_string(),
        })
}

// =============================================================================
// IN-MEMORY ADAPTER
// =============================================================================

/// One persisted document.
#[derive(Debug, Clone)]
struct Document {
    id: ObjectId,
    key: Option<Value>,
    body: Value,
    acl: Acl,
}

/// In-memory object store for tests and local runs.
///
/// Records are kept as JSON documents per class, in insertion order, so
/// `first` behaves like an unordered equality query returning the oldest
/// match.
#[derive(Default)]
pub struct InMemoryObjectStore {
    classes: RwLock<HashMap<RecordClass, Vec<Document>>>,
    saves: AtomicU64,
}

impl InMemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of a class.
    pub fn count(&self, class: RecordClass) -> usize {
        self.classes.read().get(&class).map_or(0, Vec::len)
    }

    /// Total number of successful saves, across classes.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }

    /// All records of a class, in insertion order.
    pub fn all<R: Record>(&self, class: RecordClass) -> Result<Vec<Stored<R>>, StoreError> {
        let classes = self.classes.read();
        classes
            .get(&class)
            .map(|docs| docs.iter().map(|doc| decode(class, doc)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn decode<R: Record>(class: RecordClass, doc: &Document) -> Result<Stored<R>, StoreError> {
    let record = serde_json::from_value(doc.body.clone()).map_err(|e| {
        StoreError::Serialization {
            class,
            reason: e.to_string(),
        }
    })?;
    Ok(Stored {
        id: doc.id,
        record,
        acl: doc.acl.clone(),
    })
}

fn encode<T: Serialize>(class: RecordClass, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization {
        class,
        reason: e.to_string(),
    })
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn first<R: Record>(
        &self,
        class: RecordClass,
        key: &R::Key,
    ) -> Result<Option<Stored<R>>, StoreError> {
        let wanted = encode(class, key)?;
        let classes = self.classes.read();
        let Some(docs) = classes.get(&class) else {
            return Ok(None);
        };
        docs.iter()
            .find(|doc| doc.key.as_ref() == Some(&wanted))
            .map(|doc| decode(class, doc))
            .transpose()
    }

    async fn get<R: Record>(
        &self,
        class: RecordClass,
        id: ObjectId,
    ) -> Result<Option<Stored<R>>, StoreError> {
        let classes = self.classes.read();
        let Some(docs) = classes.get(&class) else {
            return Ok(None);
        };
        docs.iter()
            .find(|doc| doc.id == id)
            .map(|doc| decode(class, doc))
            .transpose()
    }

    async fn save<R: Record>(&self, object: &Stored<R>) -> Result<(), StoreError> {
        let class = object.class();
        let key = object
            .record
            .key()
            .map(|k| encode(class, &k))
            .transpose()?;
        let doc = Document {
            id: object.id,
            key,
            body: encode(class, &object.record)?,
            acl: object.acl.clone(),
        };

        let mut classes = self.classes.write();
        let docs = classes.entry(class).or_default();
        match docs.iter_mut().find(|d| d.id == doc.id) {
            Some(existing) => *existing = doc,
            None => docs.push(doc),
        }
        drop(classes);

        self.saves.fetch_add(1, Ordering::Relaxed);
        debug!(class = %class, id = %object.id, "Record saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Form, FormId, Request, RequestStatus, UserId};

    fn form(id: &str) -> Stored<Form> {
        Stored::new(
            Form::new(FormId::new(id), "0xowner".into()),
            Acl::owned_by(&UserId::new("owner"), true),
        )
    }

    #[tokio::test]
    async fn test_first_finds_by_business_key() {
        let store = InMemoryObjectStore::new();
        store.save(&form("f-1")).await.unwrap();
        store.save(&form("f-2")).await.unwrap();

        let found: Stored<Form> = store
            .first(RecordClass::Form, &FormId::new("f-2"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.record.form_id, FormId::new("f-2"));
        assert_eq!(store.count(RecordClass::Form), 2);
    }

    #[tokio::test]
    async fn test_first_returns_none_when_missing() {
        let store = InMemoryObjectStore::new();
        let found: Option<Stored<Form>> = store
            .first(RecordClass::Form, &FormId::new("nope"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_same_object() {
        let store = InMemoryObjectStore::new();
        let mut request = Stored::new(Request::new("1".into(), "f".into()), Acl::private());
        store.save(&request).await.unwrap();

        request.record.status = Some(RequestStatus::Pending);
        store.save(&request).await.unwrap();

        assert_eq!(store.count(RecordClass::Request), 1);
        assert_eq!(store.save_count(), 2);
        let back: Stored<Request> = store
            .get(RecordClass::Request, request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(back.record.status, Some(RequestStatus::Pending));
    }

    #[tokio::test]
    async fn test_read_object_not_found_names_lookup() {
        let store = InMemoryObjectStore::new();
        let err = read_object::<_, Form>(&store, RecordClass::Form, &FormId::new("f-9"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TriggerError::NotFound {
                class: RecordClass::Form,
                field: "formId",
                value: "f-9".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_acl_round_trips_through_store() {
        let store = InMemoryObjectStore::new();
        let original = form("f-1");
        store.save(&original).await.unwrap();
        let all: Vec<Stored<Form>> = store.all(RecordClass::Form).unwrap();
        assert_eq!(all, vec![original]);
    }

    #[test]
    fn test_event_classes() {
        assert!(RecordClass::RequestCreated.is_event());
        assert!(RecordClass::FormUpdated.is_event());
        assert!(!RecordClass::Request.is_event());
        assert!(!RecordClass::EmailLog.is_event());
    }
}
