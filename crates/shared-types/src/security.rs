//! # Caller Identity
//!
//! Who is performing a write. The object store tells the trigger layer
//! whether a write was made with the privileged (master) credential; every
//! other write comes from a client session, possibly anonymous.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::UserId;

/// Author of a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Caller {
    /// The backend, holding the master credential.
    Privileged,
    /// An authenticated client session.
    User(UserId),
    /// A client without a session.
    Anonymous,
}

impl Caller {
    /// Only the backend bypasses write guards.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Privileged)
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Privileged => f.write_str("master"),
            Self::User(id) => write!(f, "user:{}", id),
            Self::Anonymous => f.write_str("anonymous"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_master_is_privileged() {
        assert!(Caller::Privileged.is_privileged());
        assert!(!Caller::User(UserId::new("u1")).is_privileged());
        assert!(!Caller::Anonymous.is_privileged());
    }

    #[test]
    fn test_caller_display() {
        assert_eq!(Caller::User(UserId::new("u1")).to_string(), "user:u1");
        assert_eq!(Caller::Privileged.to_string(), "master");
    }
}
