//! # Commit Queue
//!
//! Carries every commit from the write path to the reaction handler.
//!
//! Bounded and lossless: when the handler falls `capacity` notices behind,
//! writers wait instead of notices being dropped.

use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::errors::BusError;
use crate::events::CommitNotice;

/// Create a commit queue buffering up to `capacity` notices.
///
/// # Panics
///
/// `capacity` is 0.
#[must_use]
pub fn commit_queue(capacity: usize) -> (CommitSender, CommitReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (CommitSender { tx }, CommitReceiver { rx })
}

/// Write side of the commit queue.
#[derive(Debug, Clone)]
pub struct CommitSender {
    tx: mpsc::Sender<CommitNotice>,
}

impl CommitSender {
    /// Enqueue a notice, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// `BusError::Closed` once the receiver was closed or dropped.
    pub async fn send(&self, notice: CommitNotice) -> Result<(), BusError> {
        let class = notice.class;
        let key = notice.key.clone();
        match self.tx.send(notice).await {
            Ok(()) => {
                debug!(class = %class, key = %key, "Commit queued");
                Ok(())
            }
            Err(_) => {
                error!(class = %class, key = %key, "Commit queue closed, notice not delivered");
                Err(BusError::Closed)
            }
        }
    }
}

/// Read side of the commit queue.
#[derive(Debug)]
pub struct CommitReceiver {
    rx: mpsc::Receiver<CommitNotice>,
}

impl CommitReceiver {
    /// Next notice; `None` once the queue is closed and drained.
    pub async fn recv(&mut self) -> Option<CommitNotice> {
        self.rx.recv().await
    }

    /// Refuse new notices. Already queued ones are still returned by `recv`.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
