//! # Access-Control Lists
//!
//! Per-record ACLs as the object store models them: a map from subject to
//! `{read, write}` bits, with `*` standing for the public wildcard.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::UserId;

/// Key of the public wildcard entry.
pub const PUBLIC_KEY: &str = "*";

/// Read/write bits of one ACL entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// May read the record.
    #[serde(default, skip_serializing_if = "is_false")]
    pub read: bool,
    /// May write the record.
    #[serde(default, skip_serializing_if = "is_false")]
    pub write: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Permission {
    fn is_empty(&self) -> bool {
        !self.read && !self.write
    }
}

/// Subject of an ACL entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclSubject {
    /// Everyone, including anonymous clients.
    Public,
    /// A single store account.
    User(UserId),
}

impl AclSubject {
    fn key(&self) -> &str {
        match self {
            Self::Public => PUBLIC_KEY,
            Self::User(id) => id.as_str(),
        }
    }
}

/// Access-control list of a stored record.
///
/// Entries whose bits are both cleared are dropped, matching how the store
/// normalizes ACLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acl {
    entries: BTreeMap<String, Permission>,
}

impl Acl {
    /// Empty ACL: nobody but the privileged backend can access the record.
    pub fn private() -> Self {
        Self::default()
    }

    /// ACL owned by one user (read + write), optionally publicly readable.
    pub fn owned_by(owner: &UserId, public_read: bool) -> Self {
        let mut acl = Self::default();
        acl.set_read_access(&AclSubject::User(owner.clone()), true);
        acl.set_write_access(&AclSubject::User(owner.clone()), true);
        if public_read {
            acl.set_read_access(&AclSubject::Public, true);
        }
        acl
    }

    /// Set the read bit of a subject.
    pub fn set_read_access(&mut self, subject: &AclSubject, allowed: bool) {
        self.update(subject, |p| p.read = allowed);
    }

    /// Set the write bit of a subject.
    pub fn set_write_access(&mut self, subject: &AclSubject, allowed: bool) {
        self.update(subject, |p| p.write = allowed);
    }

    /// Read bit of a subject (missing entry = no access).
    pub fn read_access(&self, subject: &AclSubject) -> bool {
        self.entries.get(subject.key()).is_some_and(|p| p.read)
    }

    /// Write bit of a subject (missing entry = no access).
    pub fn write_access(&self, subject: &AclSubject) -> bool {
        self.entries.get(subject.key()).is_some_and(|p| p.write)
    }

    /// User ids having an entry, excluding the public wildcard and `skip`.
    pub fn user_ids_except(&self, skip: &[&UserId]) -> Vec<UserId> {
        self.entries
            .keys()
            .filter(|key| key.as_str() != PUBLIC_KEY)
            .filter(|key| !skip.iter().any(|s| s.as_str() == key.as_str()))
            .map(|key| UserId::new(key.clone()))
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there is no entry at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn update(&mut self, subject: &AclSubject, f: impl FnOnce(&mut Permission)) {
        let key = subject.key().to_string();
        let mut permission = self.entries.get(&key).copied().unwrap_or_default();
        f(&mut permission);
        if permission.is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, permission);
        }
    }
}
