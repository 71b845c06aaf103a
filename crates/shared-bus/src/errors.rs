//! Bus errors.

use thiserror::Error;

/// Errors from the commit queue and result subscriptions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The other side of the channel is gone.
    #[error("Event bus closed")]
    Closed,
}
