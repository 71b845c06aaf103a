//! Principals derived from ACLs.
//!
//! Projections do not store their owner as a column; the owner of a Form is
//! the one user in its ACL, and the sender of a Request is the one user in
//! its ACL besides the form owner. When an ACL holds more than one
//! candidate the first in key order is used and a warning is logged.

use shared_types::{Acl, UserId};
use tracing::warn;

/// Owner of a form: the user entry of its ACL.
pub fn form_owner(form_acl: &Acl) -> Option<UserId> {
    sole("form owner", form_acl.user_ids_except(&[]))
}

/// Sender of a request: the user entry of its ACL that is not `owner`.
pub fn request_sender(request_acl: &Acl, owner: Option<&UserId>) -> Option<UserId> {
    let skip: Vec<&UserId> = owner.into_iter().collect();
    sole("request sender", request_acl.user_ids_except(&skip))
}

fn sole(role: &'static str, candidates: Vec<UserId>) -> Option<UserId> {
    if candidates.len() > 1 {
        warn!(
            role,
            candidates = ?candidates,
            "[pf-05] ACL names more than one candidate, using the first"
        );
    }
    candidates.into_iter().next()
}
